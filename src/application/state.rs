//! Application state management for the lead-capture form.
//!
//! This module ties the step controller, autosave, and submission together
//! and holds the UI state the terminal front end renders from.

use super::autosave::AutosaveTimer;
use super::controller::StepController;
use super::submission::{SubmissionHandler, SubmissionResult};
use crate::domain::{
    descriptor_for, missing_fields, validate_all, Field, FieldDescriptor, FormData, Gender, Step,
    ValidationReport,
};
use crate::infrastructure::{
    Clock, FormPersistence, MemoryStore, RestoreOutcome, SaveOutcome, Submitter, SystemClock,
    Unconfigured,
};
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;

/// Represents the current mode of the application.
///
/// The mode determines how key presses are interpreted and what is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Moving between fields and steps
    Normal,
    /// Typing into the focused field
    Editing,
    /// Help screen is displayed
    Help,
}

/// Main application state containing the answers and UI state.
///
/// # Examples
///
/// ```
/// use cosmicnav::application::App;
/// use cosmicnav::domain::Step;
///
/// let app = App::default();
/// assert_eq!(app.current_step(), Step::Personal);
/// assert!(app.form.is_empty());
/// ```
pub struct App {
    /// The answers given so far
    pub form: FormData,
    /// Current application mode
    pub mode: AppMode,
    /// Index of the focused field within the current step
    pub focused: usize,
    /// Input buffer while editing a field
    pub input: String,
    /// Cursor position within the input buffer, in characters
    pub cursor_position: usize,
    /// Temporary status message to display
    pub status_message: Option<String>,
    /// Inline validation messages
    pub errors: ValidationReport,
    /// Time of the last successful autosave
    pub last_saved: Option<DateTime<Utc>>,
    /// Set once the webhook has accepted the form
    pub submitted: bool,
    /// Scroll position in help text
    pub help_scroll: usize,
    controller: StepController,
    persistence: FormPersistence,
    submission: SubmissionHandler,
    clock: Box<dyn Clock>,
    autosave: AutosaveTimer,
    reset_grace: TimeDelta,
}

impl Default for App {
    fn default() -> Self {
        Self::new(
            FormPersistence::new(Box::new(MemoryStore::new())),
            Arc::new(Unconfigured),
            Box::new(SystemClock),
            TimeDelta::seconds(10),
            TimeDelta::milliseconds(500),
        )
    }
}

impl App {
    /// Creates the application and restores any saved progress.
    pub fn new(
        persistence: FormPersistence,
        submitter: Arc<dyn Submitter>,
        clock: Box<dyn Clock>,
        autosave_interval: TimeDelta,
        reset_grace: TimeDelta,
    ) -> Self {
        let now = clock.now();
        let mut app = Self {
            form: FormData::default(),
            mode: AppMode::Normal,
            focused: 0,
            input: String::new(),
            cursor_position: 0,
            status_message: None,
            errors: ValidationReport::default(),
            last_saved: None,
            submitted: false,
            help_scroll: 0,
            controller: StepController::default(),
            persistence,
            submission: SubmissionHandler::new(submitter),
            clock,
            autosave: AutosaveTimer::new(autosave_interval, now),
            reset_grace,
        };
        app.restore();
        app
    }

    fn restore(&mut self) {
        let now = self.clock.now();
        match self.persistence.restore(now) {
            RestoreOutcome::Restored(snapshot) => {
                self.form = snapshot.form;
                self.controller = StepController::new(snapshot.step);
                self.last_saved = snapshot.last_saved;
                self.status_message =
                    Some("Welcome back! Your progress has been restored.".to_string());
            }
            RestoreOutcome::Discarded => {
                self.form = FormData::default();
                self.controller = StepController::default();
                self.last_saved = None;
            }
            RestoreOutcome::Fresh | RestoreOutcome::Suppressed => {}
        }
    }

    pub fn current_step(&self) -> Step {
        self.controller.current()
    }

    pub fn persistence(&self) -> &FormPersistence {
        &self.persistence
    }

    pub fn is_submitting(&self) -> bool {
        self.submission.is_pending()
    }

    pub fn focused_descriptor(&self) -> Option<&'static FieldDescriptor> {
        self.current_step().fields().get(self.focused)
    }

    pub fn focused_field(&self) -> Option<Field> {
        self.focused_descriptor().map(|d| d.field)
    }

    pub fn focus_next(&mut self) {
        let count = self.current_step().fields().len();
        if count > 0 {
            self.focused = (self.focused + 1) % count;
        }
    }

    pub fn focus_prev(&mut self) {
        let count = self.current_step().fields().len();
        if count > 0 {
            self.focused = (self.focused + count - 1) % count;
        }
    }

    /// Starts editing the focused field. The gender selector cycles instead.
    pub fn start_editing(&mut self) {
        let Some(field) = self.focused_field() else {
            return;
        };
        if field == Field::Gender {
            self.cycle_gender(true);
            return;
        }
        self.mode = AppMode::Editing;
        self.input = self.form.value(field).to_string();
        self.cursor_position = self.input.chars().count();
        self.status_message = None;
    }

    /// Commits the input buffer to the focused field and moves focus down.
    pub fn finish_editing(&mut self) {
        let Some(field) = self.focused_field() else {
            self.cancel_editing();
            return;
        };
        let value = std::mem::take(&mut self.input);
        self.mode = AppMode::Normal;
        self.cursor_position = 0;
        self.set_field(field, value);

        if self.focused + 1 < self.current_step().fields().len() {
            self.focused += 1;
        }
    }

    /// Cancels editing without touching the field.
    pub fn cancel_editing(&mut self) {
        self.mode = AppMode::Normal;
        self.input.clear();
        self.cursor_position = 0;
    }

    fn byte_index(&self) -> usize {
        self.input
            .char_indices()
            .nth(self.cursor_position)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }

    /// Inserts a character at the cursor. Numeric fields only take ASCII digits.
    pub fn insert_char(&mut self, c: char) {
        let Some(field) = self.focused_field() else {
            return;
        };
        if c.is_control() || (field.is_numeric() && !c.is_ascii_digit()) {
            return;
        }
        let index = self.byte_index();
        self.input.insert(index, c);
        self.cursor_position += 1;
    }

    pub fn delete_backward(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            let index = self.byte_index();
            self.input.remove(index);
        }
    }

    pub fn delete_forward(&mut self) {
        if self.cursor_position < self.input.chars().count() {
            let index = self.byte_index();
            self.input.remove(index);
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.input.chars().count() {
            self.cursor_position += 1;
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_position = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_position = self.input.chars().count();
    }

    /// Pastes text into the focused field: at the cursor while editing,
    /// replacing the whole value otherwise.
    pub fn paste_text(&mut self, text: &str) {
        let Some(field) = self.focused_field() else {
            return;
        };
        if field == Field::Gender {
            return;
        }
        match self.mode {
            AppMode::Editing => {
                for c in text.chars() {
                    self.insert_char(c);
                }
            }
            AppMode::Normal => {
                let value: String = text
                    .chars()
                    .filter(|c| !c.is_control())
                    .filter(|c| !field.is_numeric() || c.is_ascii_digit())
                    .collect();
                self.set_field(field, value);
            }
            AppMode::Help => {}
        }
    }

    /// Overwrites the place with a formatted address from a lookup service.
    pub fn apply_place_suggestion(&mut self, formatted_address: String) {
        self.set_field(Field::Place, formatted_address);
    }

    /// Cycles the gender selection when the gender field has focus.
    pub fn cycle_gender(&mut self, forward: bool) {
        if self.focused_field() != Some(Field::Gender) {
            return;
        }
        let next = if forward {
            Gender::cycle_next(self.form.gender)
        } else {
            Gender::cycle_prev(self.form.gender)
        };
        self.form.gender = Some(next);
        self.revalidate(Field::Gender);
        self.save_now();
    }

    fn set_field(&mut self, field: Field, value: String) {
        self.form.set_value(field, value);
        self.revalidate(field);
        self.save_now();
    }

    /// Re-checks a field that is already showing an error.
    fn revalidate(&mut self, field: Field) {
        if self.errors.message_for(field).is_none() {
            return;
        }
        if let Some(descriptor) = descriptor_for(field) {
            match descriptor.check(&self.form) {
                Ok(()) => self.errors.remove(field),
                Err(message) => self.errors.insert(field, message),
            }
        }
    }

    /// Advances to the next step if the current one validates.
    pub fn next_step(&mut self) {
        if self.submitted {
            return;
        }
        let before = self.current_step();
        match self.controller.next(&self.form) {
            Ok(step) => {
                self.status_message = None;
                if step != before {
                    self.focused = 0;
                    self.save_now();
                }
            }
            Err(report) => {
                for descriptor in before.fields() {
                    self.errors.remove(descriptor.field);
                }
                self.errors.merge(report);

                let missing = missing_fields(before, &self.form);
                self.status_message = if missing.is_empty() {
                    None
                } else {
                    Some(format!("Please complete: {}", join_keys(&missing)))
                };
            }
        }
    }

    pub fn prev_step(&mut self) {
        if self.submitted {
            return;
        }
        let before = self.current_step();
        if self.controller.prev() != before {
            self.focused = 0;
            self.status_message = None;
            self.save_now();
        }
    }

    /// Sends the form from the review step. Returns true if a request was started.
    pub fn submit(&mut self) -> bool {
        if self.submitted || !self.current_step().is_last() || self.submission.is_pending() {
            return false;
        }

        let report = validate_all(&self.form);
        if !report.is_valid() {
            self.status_message = Some(format!(
                "Please review: {}",
                join_keys(&report.invalid_fields())
            ));
            self.errors = report;
            return false;
        }

        match self.submission.start(self.form.clone()) {
            Ok(()) => {
                tracing::info!("Submitting form");
                self.status_message = Some("Generating your chart...".to_string());
                true
            }
            Err(err) => {
                tracing::warn!("Submission not started: {err}");
                false
            }
        }
    }

    /// Applies the result of a finished submission, if any.
    pub fn poll_submission(&mut self) {
        if let Some(result) = self.submission.poll() {
            self.finish_submission(result);
        }
    }

    /// Blocks until the in-flight submission finishes and applies its result.
    pub fn wait_for_submission(&mut self) {
        if let Some(result) = self.submission.wait() {
            self.finish_submission(result);
        }
    }

    /// Returns true when the app may exit. Quitting is refused while a
    /// submission is in flight, since its result would be lost.
    pub fn request_quit(&mut self) -> bool {
        self.poll_submission();
        if self.submission.is_pending() {
            self.status_message =
                Some("Your chart is still being generated. Please wait.".to_string());
            return false;
        }
        true
    }

    fn finish_submission(&mut self, result: SubmissionResult) {
        match result {
            Ok(()) => {
                self.persistence.hold_guard();
                if let Err(err) = self.persistence.clear() {
                    tracing::warn!("Failed to clear saved form data: {err}");
                }
                self.submitted = true;
                self.last_saved = None;
                self.mode = AppMode::Normal;
                self.status_message = Some("Your cosmic chart is prepared!".to_string());
                tracing::info!("Submission accepted");
            }
            Err(err) => {
                tracing::error!("Submission error: {err}");
                self.status_message = Some("Something went wrong. Please try again.".to_string());
            }
        }
    }

    /// Discards all answers and saved progress and starts over at the first step.
    ///
    /// Autosave stays suppressed for the reset grace period afterwards. Ignored
    /// while a submission is in flight.
    pub fn reset(&mut self) {
        if self.submission.is_pending() {
            return;
        }
        let now = self.clock.now();
        self.persistence.hold_guard();
        if let Err(err) = self.persistence.clear() {
            tracing::warn!("Failed to clear saved form data: {err}");
        }

        self.form = FormData::default();
        self.controller.reset();
        self.submitted = false;
        self.errors.clear();
        self.last_saved = None;
        self.focused = 0;
        self.mode = AppMode::Normal;
        self.input.clear();
        self.cursor_position = 0;

        self.persistence.release_guard(now, self.reset_grace);
        self.status_message = Some("Form cleared! Ready for a new chart.".to_string());
    }

    /// Periodic housekeeping: guard expiry, submission results, interval autosave.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        self.persistence.tick(now);
        self.poll_submission();
        if self.autosave.poll(now) {
            self.autosave_at(now);
        }
    }

    fn save_now(&mut self) {
        let now = self.clock.now();
        self.autosave.restart(now);
        self.autosave_at(now);
    }

    fn autosave_at(&mut self, now: DateTime<Utc>) {
        match self.persistence.save(&self.form, self.current_step(), now) {
            Ok(SaveOutcome::Saved(at)) => self.last_saved = Some(at),
            Ok(SaveOutcome::SkippedEmpty | SaveOutcome::Suppressed) => {}
            Err(err) => {
                tracing::warn!("Autosave failed: {err}");
                self.status_message = Some(format!("Autosave failed: {err}"));
            }
        }
    }
}

fn join_keys(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|field| field.capitalized_key())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SubmissionError;
    use crate::infrastructure::{
        KeyValueStore, CURRENT_STEP_KEY, FORM_DATA_KEY, LAST_SAVED_KEY, STORAGE_KEYS,
    };
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone)]
    struct ManualClock(Rc<Cell<DateTime<Utc>>>);

    impl ManualClock {
        fn advance(&self, delta: TimeDelta) {
            self.0.set(self.0.get() + delta);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            self.0.get()
        }
    }

    /// Answers every submission with `status` (None meaning success).
    struct StubSubmitter {
        status: Option<u16>,
        calls: AtomicUsize,
    }

    impl Submitter for StubSubmitter {
        fn submit(&self, _form: &FormData) -> Result<(), SubmissionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.status {
                None => Ok(()),
                Some(status) => Err(SubmissionError::Rejected { status }),
            }
        }
    }

    fn build_app(store: MemoryStore, status: Option<u16>) -> (App, ManualClock, Arc<StubSubmitter>) {
        let clock = ManualClock(Rc::new(Cell::new(
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        )));
        let submitter = Arc::new(StubSubmitter {
            status,
            calls: AtomicUsize::new(0),
        });
        let app = App::new(
            FormPersistence::new(Box::new(store)),
            submitter.clone(),
            Box::new(clock.clone()),
            TimeDelta::seconds(10),
            TimeDelta::milliseconds(500),
        );
        (app, clock, submitter)
    }

    fn stored_keys(app: &App) -> Vec<&'static str> {
        STORAGE_KEYS
            .into_iter()
            .filter(|key| app.persistence().store().get(key).unwrap().is_some())
            .collect()
    }

    fn type_into_focused(app: &mut App, text: &str) {
        app.start_editing();
        app.input.clear();
        app.cursor_position = 0;
        for c in text.chars() {
            app.insert_char(c);
        }
        app.finish_editing();
    }

    fn fill_to_review(app: &mut App) {
        type_into_focused(app, "Al");
        app.cycle_gender(true);
        app.next_step();
        assert_eq!(app.current_step(), Step::BirthInfo);

        for value in ["31", "2", "2000", "10", "30", "X City"] {
            type_into_focused(app, value);
        }
        app.next_step();
        assert_eq!(app.current_step(), Step::Review);
    }

    #[test]
    fn test_app_default() {
        let app = App::default();
        assert_eq!(app.current_step(), Step::Personal);
        assert!(matches!(app.mode, AppMode::Normal));
        assert!(app.form.is_empty());
        assert!(app.status_message.is_none());
        assert!(!app.submitted);
        assert_eq!(app.focused_field(), Some(Field::Name));
    }

    #[test]
    fn test_restores_saved_progress_on_startup() {
        let mut store = MemoryStore::new();
        store
            .set(FORM_DATA_KEY, r#"{"name":"Selene","gender":"female","day":"3"}"#)
            .unwrap();
        store.set(CURRENT_STEP_KEY, "2").unwrap();
        store.set(LAST_SAVED_KEY, "2024-03-01T12:00:00+00:00").unwrap();

        let (app, _, _) = build_app(store, None);
        assert_eq!(app.current_step(), Step::BirthInfo);
        assert_eq!(app.form.name, "Selene");
        assert_eq!(app.form.gender, Some(Gender::Female));
        assert!(app.last_saved.is_some());
        assert_eq!(
            app.status_message.as_deref(),
            Some("Welcome back! Your progress has been restored.")
        );
    }

    #[test]
    fn test_corrupt_snapshot_starts_fresh() {
        let mut store = MemoryStore::new();
        store.set(FORM_DATA_KEY, "{{{").unwrap();
        store.set(CURRENT_STEP_KEY, "3").unwrap();

        let (app, _, _) = build_app(store, None);
        assert_eq!(app.current_step(), Step::Personal);
        assert!(app.form.is_empty());
        assert!(stored_keys(&app).is_empty());
    }

    #[test]
    fn test_next_blocked_lists_missing_fields() {
        let (mut app, _, _) = build_app(MemoryStore::new(), None);
        app.next_step();

        assert_eq!(app.current_step(), Step::Personal);
        assert_eq!(
            app.status_message.as_deref(),
            Some("Please complete: Name, Gender")
        );
        assert_eq!(app.errors.invalid_fields(), vec![Field::Name, Field::Gender]);
    }

    #[test]
    fn test_next_blocked_by_invalid_value_shows_inline_only() {
        let (mut app, _, _) = build_app(MemoryStore::new(), None);
        type_into_focused(&mut app, "A");
        app.cycle_gender(true);
        app.next_step();

        assert_eq!(app.current_step(), Step::Personal);
        assert!(app.status_message.is_none());
        assert_eq!(
            app.errors.message_for(Field::Name),
            Some("Name must be at least 2 characters")
        );
    }

    #[test]
    fn test_fixing_a_field_clears_its_error() {
        let (mut app, _, _) = build_app(MemoryStore::new(), None);
        app.next_step();
        assert!(app.errors.message_for(Field::Name).is_some());

        type_into_focused(&mut app, "Al");
        assert!(app.errors.message_for(Field::Name).is_none());
        assert!(app.errors.message_for(Field::Gender).is_some());
    }

    #[test]
    fn test_editing_commits_saves_and_moves_focus() {
        let (mut app, _, _) = build_app(MemoryStore::new(), None);
        type_into_focused(&mut app, "Al");

        assert_eq!(app.form.name, "Al");
        assert_eq!(app.focused_field(), Some(Field::Gender));
        assert!(matches!(app.mode, AppMode::Normal));
        assert_eq!(stored_keys(&app).len(), 3);
        assert!(app.last_saved.is_some());
    }

    #[test]
    fn test_cancel_editing_leaves_field_untouched() {
        let (mut app, _, _) = build_app(MemoryStore::new(), None);
        app.start_editing();
        app.insert_char('Z');
        app.cancel_editing();

        assert!(app.form.name.is_empty());
        assert!(app.input.is_empty());
        assert!(stored_keys(&app).is_empty());
    }

    #[test]
    fn test_cursor_editing_handles_multibyte_text() {
        let (mut app, _, _) = build_app(MemoryStore::new(), None);
        app.start_editing();
        for c in "Zoë".chars() {
            app.insert_char(c);
        }
        app.move_cursor_left();
        app.delete_backward();
        assert_eq!(app.input, "Zë");
        app.move_cursor_home();
        app.delete_forward();
        assert_eq!(app.input, "ë");
        app.move_cursor_end();
        assert_eq!(app.cursor_position, 1);
    }

    #[test]
    fn test_numeric_fields_reject_non_digits() {
        let (mut app, _, _) = build_app(MemoryStore::new(), None);
        type_into_focused(&mut app, "Al");
        app.cycle_gender(true);
        app.next_step();

        type_into_focused(&mut app, "1a2");
        assert_eq!(app.form.day, "12");
    }

    #[test]
    fn test_prev_from_first_step_is_noop() {
        let (mut app, _, _) = build_app(MemoryStore::new(), None);
        app.prev_step();
        assert_eq!(app.current_step(), Step::Personal);
    }

    #[test]
    fn test_step_change_is_saved_immediately() {
        let (mut app, _, _) = build_app(MemoryStore::new(), None);
        type_into_focused(&mut app, "Al");
        app.cycle_gender(true);
        app.next_step();

        let step = app.persistence().store().get(CURRENT_STEP_KEY).unwrap();
        assert_eq!(step.as_deref(), Some("2"));

        app.prev_step();
        let step = app.persistence().store().get(CURRENT_STEP_KEY).unwrap();
        assert_eq!(step.as_deref(), Some("1"));
    }

    #[test]
    fn test_interval_autosave_picks_up_changes() {
        let (mut app, clock, _) = build_app(MemoryStore::new(), None);
        app.form.place = "Quito".to_string();

        clock.advance(TimeDelta::seconds(9));
        app.tick();
        assert!(stored_keys(&app).is_empty());

        clock.advance(TimeDelta::seconds(1));
        app.tick();
        assert_eq!(stored_keys(&app).len(), 3);
    }

    #[test]
    fn test_interval_autosave_skips_empty_form() {
        let (mut app, clock, _) = build_app(MemoryStore::new(), None);
        clock.advance(TimeDelta::seconds(30));
        app.tick();
        assert!(stored_keys(&app).is_empty());
        assert!(app.last_saved.is_none());
    }

    #[test]
    fn test_successful_submission_clears_storage() {
        let (mut app, clock, submitter) = build_app(MemoryStore::new(), None);
        fill_to_review(&mut app);
        assert_eq!(stored_keys(&app).len(), 3);

        assert!(app.submit());
        assert!(app.is_submitting());
        app.wait_for_submission();

        assert!(app.submitted);
        assert!(!app.is_submitting());
        assert!(stored_keys(&app).is_empty());
        assert_eq!(
            app.status_message.as_deref(),
            Some("Your cosmic chart is prepared!")
        );
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 1);

        // The answers are still in memory, but autosave must not bring them back.
        clock.advance(TimeDelta::seconds(60));
        app.tick();
        assert!(stored_keys(&app).is_empty());

        app.reset();
        assert_eq!(app.current_step(), Step::Personal);
        assert!(app.form.is_empty());
        assert!(!app.submitted);
        assert!(stored_keys(&app).is_empty());
    }

    #[test]
    fn test_failed_submission_preserves_state() {
        let (mut app, _, _) = build_app(MemoryStore::new(), Some(502));
        fill_to_review(&mut app);
        let form_before = app.form.clone();

        assert!(app.submit());
        app.wait_for_submission();

        assert!(!app.submitted);
        assert_eq!(app.form, form_before);
        assert_eq!(app.current_step(), Step::Review);
        assert_eq!(stored_keys(&app).len(), 3);
        assert_eq!(
            app.status_message.as_deref(),
            Some("Something went wrong. Please try again.")
        );

        // Retry is allowed after a failure.
        assert!(app.submit());
    }

    #[test]
    fn test_submit_refused_while_pending() {
        let (mut app, _, submitter) = build_app(MemoryStore::new(), None);
        fill_to_review(&mut app);

        assert!(app.submit());
        assert!(!app.submit());
        app.wait_for_submission();
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_submit_only_from_review() {
        let (mut app, _, submitter) = build_app(MemoryStore::new(), None);
        assert!(!app.submit());
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_submit_revalidates_whole_form() {
        let (mut app, _, submitter) = build_app(MemoryStore::new(), None);
        fill_to_review(&mut app);
        app.form.name.clear();

        assert!(!app.submit());
        assert_eq!(app.errors.invalid_fields(), vec![Field::Name]);
        assert_eq!(app.status_message.as_deref(), Some("Please review: Name"));
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_reset_suppresses_autosave_during_grace() {
        let (mut app, clock, _) = build_app(MemoryStore::new(), None);
        type_into_focused(&mut app, "Al");
        assert_eq!(stored_keys(&app).len(), 3);

        app.reset();
        assert!(stored_keys(&app).is_empty());
        assert_eq!(
            app.status_message.as_deref(),
            Some("Form cleared! Ready for a new chart.")
        );

        clock.advance(TimeDelta::milliseconds(100));
        type_into_focused(&mut app, "Bo");
        assert!(stored_keys(&app).is_empty());

        clock.advance(TimeDelta::seconds(10));
        app.tick();
        assert_eq!(stored_keys(&app).len(), 3);
        assert_eq!(app.form.name, "Bo");
    }

    #[test]
    fn test_place_suggestion_overwrites_place() {
        let (mut app, _, _) = build_app(MemoryStore::new(), None);
        app.form.place = "Spr".to_string();
        app.apply_place_suggestion("Springfield, IL, USA".to_string());
        assert_eq!(app.form.place, "Springfield, IL, USA");
        assert_eq!(stored_keys(&app).len(), 3);
    }

    #[test]
    fn test_paste_into_numeric_field_keeps_digits() {
        let (mut app, _, _) = build_app(MemoryStore::new(), None);
        type_into_focused(&mut app, "Al");
        app.cycle_gender(true);
        app.next_step();

        app.paste_text("1 9\n");
        assert_eq!(app.form.day, "19");
    }

    #[test]
    fn test_gender_cycles_only_when_focused() {
        let (mut app, _, _) = build_app(MemoryStore::new(), None);
        app.cycle_gender(true);
        assert!(app.form.gender.is_none());

        app.focus_next();
        app.cycle_gender(true);
        assert_eq!(app.form.gender, Some(Gender::Male));
        app.cycle_gender(false);
        assert_eq!(app.form.gender, Some(Gender::Other));
    }

    #[test]
    fn test_focus_wraps_within_step() {
        let (mut app, _, _) = build_app(MemoryStore::new(), None);
        app.focus_prev();
        assert_eq!(app.focused_field(), Some(Field::Gender));
        app.focus_next();
        assert_eq!(app.focused_field(), Some(Field::Name));
    }

    /// Holds every submission until the test sends on the gate.
    struct HeldSubmitter {
        gate: std::sync::Mutex<std::sync::mpsc::Receiver<()>>,
    }

    impl Submitter for HeldSubmitter {
        fn submit(&self, _form: &FormData) -> Result<(), SubmissionError> {
            let gate = self.gate.lock().unwrap();
            let _ = gate.recv();
            Ok(())
        }
    }

    #[test]
    fn test_quit_refused_while_submitting() {
        let (gate_tx, gate_rx) = std::sync::mpsc::channel();
        let mut app = App::new(
            FormPersistence::new(Box::new(MemoryStore::new())),
            Arc::new(HeldSubmitter {
                gate: std::sync::Mutex::new(gate_rx),
            }),
            Box::new(SystemClock),
            TimeDelta::seconds(10),
            TimeDelta::milliseconds(500),
        );
        fill_to_review(&mut app);
        assert!(app.request_quit());

        assert!(app.submit());
        assert!(!app.request_quit());
        assert_eq!(
            app.status_message.as_deref(),
            Some("Your chart is still being generated. Please wait.")
        );
        assert_eq!(stored_keys(&app).len(), 3);

        gate_tx.send(()).unwrap();
        app.wait_for_submission();
        assert!(app.submitted);
        assert!(stored_keys(&app).is_empty());
        assert!(app.request_quit());
    }
}
