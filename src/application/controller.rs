//! Step sequencing for the multi-part form.

use crate::domain::{validate_step, FormData, Step, ValidationReport};

/// Tracks the current step and gates forward moves on validation.
///
/// Moving back is always allowed down to the first step. Moving forward from
/// the last step leaves it where it is; only a reset returns to the start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepController {
    current: Step,
}

impl StepController {
    pub fn new(initial: Step) -> Self {
        Self { current: initial }
    }

    pub fn current(&self) -> Step {
        self.current
    }

    /// Advances if the current step's fields pass; otherwise reports the failures and stays.
    pub fn next(&mut self, form: &FormData) -> Result<Step, ValidationReport> {
        let report = validate_step(self.current, form);
        if !report.is_valid() {
            return Err(report);
        }
        if let Some(next) = self.current.following() {
            self.current = next;
        }
        Ok(self.current)
    }

    pub fn prev(&mut self) -> Step {
        if let Some(prev) = self.current.preceding() {
            self.current = prev;
        }
        self.current
    }

    pub fn reset(&mut self) {
        self.current = Step::Personal;
    }
}
