use crate::application::{App, AppMode};
use crate::domain::Field;
use crossterm::event::{KeyCode, KeyModifiers};

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        match app.mode {
            AppMode::Normal => Self::handle_normal_mode(app, key, modifiers),
            AppMode::Editing => Self::handle_editing_mode(app, key, modifiers),
            AppMode::Help => Self::handle_help_mode(app, key),
        }
    }

    fn handle_normal_mode(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) {
            match key {
                KeyCode::Char('n') => app.next_step(),
                KeyCode::Char('p') => app.prev_step(),
                KeyCode::Char('s') => {
                    app.submit();
                }
                KeyCode::Char('r') => app.reset(),
                KeyCode::Char('v') => Self::paste_clipboard(app),
                _ => {}
            }
            return;
        }

        if app.submitted {
            match key {
                KeyCode::Char('r') => app.reset(),
                KeyCode::F(1) | KeyCode::Char('?') => Self::open_help(app),
                _ => {}
            }
            return;
        }

        match key {
            KeyCode::Up | KeyCode::BackTab => app.focus_prev(),
            KeyCode::Down | KeyCode::Tab => app.focus_next(),
            KeyCode::Left => app.cycle_gender(false),
            KeyCode::Right => app.cycle_gender(true),
            KeyCode::PageDown => app.next_step(),
            KeyCode::PageUp => app.prev_step(),
            KeyCode::Enter => {
                if app.current_step().is_last() {
                    app.submit();
                } else {
                    app.start_editing();
                }
            }
            KeyCode::F(1) | KeyCode::Char('?') => Self::open_help(app),
            KeyCode::Char('q') => {
                // Will be handled by main loop
            }
            KeyCode::Esc => {
                app.status_message = None;
            }
            _ => {}
        }
    }

    fn open_help(app: &mut App) {
        app.mode = AppMode::Help;
        app.help_scroll = 0;
    }

    fn paste_clipboard(app: &mut App) {
        let text = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.get_text());
        match text {
            Ok(text) => {
                if app.focused_field() == Some(Field::Place) && !matches!(app.mode, AppMode::Editing) {
                    app.apply_place_suggestion(text.trim().to_string());
                } else {
                    app.paste_text(&text);
                }
            }
            Err(err) => {
                tracing::warn!("Clipboard unavailable: {err}");
                app.status_message = Some(format!("Clipboard unavailable: {err}"));
            }
        }
    }

    fn handle_editing_mode(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) {
            if key == KeyCode::Char('v') {
                Self::paste_clipboard(app);
            }
            return;
        }

        match key {
            KeyCode::Enter => app.finish_editing(),
            KeyCode::Esc => app.cancel_editing(),
            KeyCode::Backspace => app.delete_backward(),
            KeyCode::Delete => app.delete_forward(),
            KeyCode::Left => app.move_cursor_left(),
            KeyCode::Right => app.move_cursor_right(),
            KeyCode::Home => app.move_cursor_home(),
            KeyCode::End => app.move_cursor_end(),
            KeyCode::Char(c) => app.insert_char(c),
            _ => {}
        }
    }

    fn handle_help_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q') => {
                app.mode = AppMode::Normal;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if app.help_scroll > 0 {
                    app.help_scroll -= 1;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.help_scroll += 1;
            }
            KeyCode::PageUp => {
                app.help_scroll = app.help_scroll.saturating_sub(5);
            }
            KeyCode::PageDown => {
                app.help_scroll += 5;
            }
            KeyCode::Home => {
                app.help_scroll = 0;
            }
            _ => {}
        }
    }
}
