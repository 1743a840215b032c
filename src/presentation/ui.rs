use crate::application::{App, AppMode};
use crate::domain::{Field, FieldDescriptor, Step};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub fn render_ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(4),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(f, chunks[0]);
    render_step_indicator(f, app, chunks[1]);
    render_card(f, app, chunks[2]);
    render_status_bar(f, app, chunks[3]);

    if matches!(app.mode, AppMode::Help) {
        render_help_popup(f, app.help_scroll);
    }
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            "Cosmic Navigator",
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Discover the celestial secrets written in the stars at the moment of your birth",
            Style::default().fg(Color::Gray),
        )),
    ])
    .alignment(Alignment::Center);
    f.render_widget(header, area);
}

fn render_step_indicator(f: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(area);

    let current = app.current_step();
    for (step, column) in Step::ALL.iter().zip(columns.iter()) {
        let (marker, style) = if app.submitted || *step < current {
            ("✓", Style::default().fg(Color::Green))
        } else if *step == current {
            ("●", Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD))
        } else {
            ("○", Style::default().fg(Color::DarkGray))
        };

        let widget = Paragraph::new(vec![
            Line::from(Span::styled(
                format!("{marker} {}. {}", step.number(), step.title()),
                style,
            )),
            Line::from(Span::styled(step.subtitle(), style.remove_modifier(Modifier::BOLD))),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM));
        f.render_widget(widget, *column);
    }
}

fn render_card(f: &mut Frame, app: &App, area: Rect) {
    let step = app.current_step();
    let title = if app.submitted { "Chart Generated" } else { step.title() };
    let block = Block::default().borders(Borders::ALL).title(title);

    let mut lines = Vec::new();
    if app.submitted {
        lines.extend(success_lines());
    } else {
        lines.push(Line::from(Span::styled(
            step.description(),
            Style::default().fg(Color::Gray),
        )));
        lines.push(Line::from(""));
        match step {
            Step::Review => lines.extend(review_lines(app)),
            _ => {
                for (index, descriptor) in step.fields().iter().enumerate() {
                    lines.extend(field_lines(app, index, descriptor));
                }
            }
        }
    }

    let card = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    f.render_widget(card, area);
}

fn field_lines(app: &App, index: usize, descriptor: &FieldDescriptor) -> Vec<Line<'static>> {
    let focused = index == app.focused;
    let editing = focused && matches!(app.mode, AppMode::Editing);

    let value = if editing {
        let split = app
            .input
            .char_indices()
            .nth(app.cursor_position)
            .map(|(i, _)| i)
            .unwrap_or(app.input.len());
        format!("{}│{}", &app.input[..split], &app.input[split..])
    } else if descriptor.field == Field::Gender {
        match app.form.gender {
            Some(gender) => format!("‹ {gender} ›"),
            None => "‹ select ›".to_string(),
        }
    } else {
        app.form.value(descriptor.field).to_string()
    };

    let label_style = if focused {
        Style::default().fg(Color::Black).bg(Color::LightMagenta)
    } else {
        Style::default().fg(Color::Yellow)
    };
    let value_style = if editing {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    let mut lines = vec![Line::from(vec![
        Span::raw(if focused { "> " } else { "  " }),
        Span::styled(format!("{:<12}", descriptor.label), label_style),
        Span::raw(" "),
        Span::styled(value, value_style),
    ])];

    if let Some(message) = app.errors.message_for(descriptor.field) {
        lines.push(Line::from(Span::styled(
            format!("    {message}"),
            Style::default().fg(Color::Red),
        )));
    }
    lines
}

fn review_lines(app: &App) -> Vec<Line<'static>> {
    let form = &app.form;
    let heading = Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD);
    let label = Style::default().fg(Color::Yellow);
    let row = |name: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("  {name:<10}"), label),
            Span::raw(value),
        ])
    };

    let mut lines = vec![
        Line::from(Span::styled("Personal Information", heading)),
        row("Name", form.name.clone()),
        row(
            "Gender",
            form.gender.map(|g| g.to_string()).unwrap_or_default(),
        ),
        Line::from(""),
        Line::from(Span::styled("Birth Details", heading)),
        row("Date", form.birth_date_display()),
        row("Time", form.birth_time_display()),
        row("Place", form.place.clone()),
        Line::from(""),
        Line::from(Span::styled(
            "Your cosmic chart will be calculated based on the exact position of celestial bodies at the moment of your birth.",
            Style::default().fg(Color::Gray),
        )),
    ];

    for (_, message) in app.errors.errors() {
        lines.push(Line::from(Span::styled(
            format!("  {message}"),
            Style::default().fg(Color::Red),
        )));
    }
    lines
}

fn success_lines() -> Vec<Line<'static>> {
    vec![
        Line::from(""),
        Line::from(Span::styled(
            "Chart Generated!",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        Line::from(""),
        Line::from("Your personalized cosmic blueprint has been created and will be delivered shortly.")
            .alignment(Alignment::Center),
        Line::from(""),
        Line::from(Span::styled(
            "Press r to create another chart",
            Style::default().fg(Color::Magenta),
        ))
        .alignment(Alignment::Center),
    ]
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let saved = app
        .last_saved
        .map(|at| format!("Saved {} | ", at.format("%H:%M:%S")))
        .unwrap_or_default();

    let status_text = match app.mode {
        AppMode::Normal => {
            if let Some(ref status) = app.status_message {
                status.clone()
            } else if app.submitted {
                "r: create another | F1/?: help | q: quit".to_string()
            } else if app.is_submitting() {
                "Generating chart...".to_string()
            } else if app.current_step().is_last() {
                format!("{saved}Enter/Ctrl+S: generate chart | PgUp: back | Ctrl+R: reset | F1/?: help | q: quit")
            } else {
                format!("{saved}↑↓: field | Enter: edit | PgDn: continue | PgUp: back | Ctrl+V: paste | F1/?: help | q: quit")
            }
        }
        AppMode::Editing => "Editing (Enter to save, Esc to cancel)".to_string(),
        AppMode::Help => "↑↓/jk: scroll | PgUp/PgDn: fast scroll | Home: top | Esc/q: close help".to_string(),
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(match app.mode {
            AppMode::Normal => Style::default(),
            AppMode::Editing => Style::default().fg(Color::Green),
            AppMode::Help => Style::default().fg(Color::Cyan),
        });
    f.render_widget(status, area);
}

fn render_help_popup(f: &mut Frame, scroll: usize) {
    let area = f.area();
    let popup_area = Rect {
        x: area.width / 10,
        y: area.height / 10,
        width: area.width * 4 / 5,
        height: area.height * 4 / 5,
    };

    f.render_widget(Clear, popup_area);

    let help_lines: Vec<&str> = HELP_TEXT.lines().collect();
    let visible_height = popup_area.height.saturating_sub(2) as usize;

    let start_line = scroll.min(help_lines.len().saturating_sub(visible_height));
    let end_line = (start_line + visible_height).min(help_lines.len());

    let visible_text = help_lines[start_line..end_line].join("\n");

    let help_widget = Paragraph::new(visible_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(
                    "Cosmic Navigator Help (Line {}/{})",
                    start_line + 1,
                    help_lines.len()
                ))
                .style(Style::default().fg(Color::Cyan)),
        )
        .style(Style::default().fg(Color::White));

    f.render_widget(help_widget, popup_area);
}

const HELP_TEXT: &str = r#"COSMIC NAVIGATOR

=== STEPS ===
1. Personal      Your name (2+ characters) and gender
2. Birth Info    Day, month, year, hour (24h), minutes and place (3+ characters)
3. Review        Check your answers and generate the chart

=== MOVING AROUND ===
↑↓ / Tab        Move between fields
Enter           Edit the focused field (cycles gender)
←→              Cycle gender when it is focused
PgDn / Ctrl+N   Continue to the next step (answers are checked first)
PgUp / Ctrl+P   Go back one step

=== EDITING ===
Type            Insert text (date and time fields take digits only)
←→ Home End     Move the cursor
Backspace/Del   Delete characters
Enter           Save the field
Esc             Discard changes to the field
Ctrl+V          Paste from the clipboard

=== FINISHING ===
Enter / Ctrl+S  Generate the chart from the review step
r               Create another chart after a successful submission
Ctrl+R          Clear everything and start over

=== SAVING ===
Progress is saved automatically when you change a field or step,
and every few seconds while you work. Reopen the app to continue
where you left off. Saved progress is removed once the chart
has been generated or the form is reset.

=== HELP NAVIGATION ===
↑↓ or j/k       Scroll help text up/down one line
Page Up/Down    Scroll help text up/down 5 lines
Home            Jump to top of help text
Esc/F1/?/q      Close this help window"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Gender;
    use ratatui::{backend::TestBackend, Terminal};

    fn rendered_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| render_ui(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_first_step_shows_fields() {
        let app = App::default();
        let text = rendered_text(&app);
        assert!(text.contains("Cosmic Navigator"));
        assert!(text.contains("Who are you?"));
        assert!(text.contains("Full Name"));
        assert!(text.contains("select"));
    }

    #[test]
    fn test_inline_errors_are_rendered() {
        let mut app = App::default();
        app.next_step();
        let text = rendered_text(&app);
        assert!(text.contains("Name must be at least 2 characters"));
        assert!(text.contains("Please complete: Name, Gender"));
    }

    #[test]
    fn test_review_pads_date_and_time() {
        let mut app = App::default();
        app.form.name = "Al".to_string();
        app.form.gender = Some(Gender::Male);
        app.next_step();
        app.form.day = "5".to_string();
        app.form.month = "3".to_string();
        app.form.year = "1990".to_string();
        app.form.hour = "7".to_string();
        app.form.min = "9".to_string();
        app.form.place = "Lima".to_string();
        app.next_step();
        assert_eq!(app.current_step(), Step::Review);

        let text = rendered_text(&app);
        assert!(text.contains("05/03/1990"));
        assert!(text.contains("07:09"));
        assert!(text.contains("Lima"));
    }
}
