//! Snapshot and restore of in-progress form answers.
//!
//! A snapshot lives under three fixed keys: the form answers as JSON, the
//! current step number, and an RFC 3339 timestamp of the last save. The
//! form-data key decides whether a snapshot exists at all.

use super::storage::KeyValueStore;
use crate::domain::{FormData, Step, StorageError, StorageResult};
use chrono::{DateTime, TimeDelta, Utc};

pub const FORM_DATA_KEY: &str = "astrology_form_data";
pub const CURRENT_STEP_KEY: &str = "astrology_current_step";
pub const LAST_SAVED_KEY: &str = "astrology_last_saved";

pub const STORAGE_KEYS: [&str; 3] = [FORM_DATA_KEY, CURRENT_STEP_KEY, LAST_SAVED_KEY];

/// The persisted tuple of answers, step and save time.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub form: FormData,
    pub step: Step,
    pub last_saved: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RestoreOutcome {
    /// Nothing was stored; start a fresh session.
    Fresh,
    Restored(Snapshot),
    /// The stored snapshot could not be read back and has been deleted.
    Discarded,
    /// A reset is in flight; storage was not consulted.
    Suppressed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(DateTime<Utc>),
    /// Every answer is empty, so nothing was written.
    SkippedEmpty,
    /// A reset is in flight; nothing was written.
    Suppressed,
}

/// Latch that keeps autosave and restore away from storage while a reset settles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResetGuard {
    #[default]
    Idle,
    /// Active until explicitly released.
    Held,
    /// Active until the given instant, then idle.
    Releasing { until: DateTime<Utc> },
}

impl ResetGuard {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        match *self {
            ResetGuard::Idle => false,
            ResetGuard::Held => true,
            ResetGuard::Releasing { until } => now < until,
        }
    }
}

enum ReadError {
    Storage(StorageError),
    Corrupt(String),
}

impl From<StorageError> for ReadError {
    fn from(err: StorageError) -> Self {
        ReadError::Storage(err)
    }
}

/// Reads, writes and clears form snapshots through an injected store.
pub struct FormPersistence {
    store: Box<dyn KeyValueStore>,
    guard: ResetGuard,
}

impl FormPersistence {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self {
            store,
            guard: ResetGuard::Idle,
        }
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn guard(&self) -> ResetGuard {
        self.guard
    }

    pub fn is_suppressed(&self, now: DateTime<Utc>) -> bool {
        self.guard.is_active(now)
    }

    /// Latches the guard until [`release_guard`](Self::release_guard) is called.
    pub fn hold_guard(&mut self) {
        tracing::debug!("Reset guard held");
        self.guard = ResetGuard::Held;
    }

    /// Lets the guard lapse once `grace` has passed from `now`.
    pub fn release_guard(&mut self, now: DateTime<Utc>, grace: TimeDelta) {
        tracing::debug!("Reset guard releasing in {}ms", grace.num_milliseconds());
        self.guard = ResetGuard::Releasing { until: now + grace };
    }

    /// Moves an expired guard back to idle. Returns true if it just lapsed.
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        match self.guard {
            ResetGuard::Releasing { until } if now >= until => {
                tracing::debug!("Reset guard released");
                self.guard = ResetGuard::Idle;
                true
            }
            _ => false,
        }
    }

    /// Reads the stored snapshot.
    ///
    /// A snapshot that fails to parse is deleted and reported as `Discarded`,
    /// which callers treat exactly like a fresh session.
    pub fn restore(&mut self, now: DateTime<Utc>) -> RestoreOutcome {
        if self.guard.is_active(now) {
            return RestoreOutcome::Suppressed;
        }

        match self.read_snapshot() {
            Ok(Some(snapshot)) => {
                tracing::info!("Restored snapshot at step {}", snapshot.step.number());
                RestoreOutcome::Restored(snapshot)
            }
            Ok(None) => RestoreOutcome::Fresh,
            Err(ReadError::Storage(err)) => {
                tracing::warn!("Could not read saved form data: {err}");
                RestoreOutcome::Fresh
            }
            Err(ReadError::Corrupt(reason)) => {
                tracing::warn!("Discarding saved form data: {reason}");
                if let Err(err) = self.clear() {
                    tracing::warn!("Failed to delete corrupt snapshot: {err}");
                }
                RestoreOutcome::Discarded
            }
        }
    }

    fn read_snapshot(&self) -> Result<Option<Snapshot>, ReadError> {
        let Some(form_json) = self.store.get(FORM_DATA_KEY)? else {
            return Ok(None);
        };

        let form: FormData = serde_json::from_str(&form_json)
            .map_err(|e| ReadError::Corrupt(format!("invalid form data: {e}")))?;

        let step = match self.store.get(CURRENT_STEP_KEY)? {
            Some(raw) => raw
                .trim()
                .parse::<u8>()
                .ok()
                .and_then(Step::from_number)
                .ok_or_else(|| ReadError::Corrupt(format!("invalid step: {raw:?}")))?,
            None => Step::default(),
        };

        let last_saved = match self.store.get(LAST_SAVED_KEY)? {
            Some(raw) => Some(
                DateTime::parse_from_rfc3339(&raw)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| ReadError::Corrupt(format!("invalid timestamp: {e}")))?,
            ),
            None => None,
        };

        Ok(Some(Snapshot {
            form,
            step,
            last_saved,
        }))
    }

    /// Writes a snapshot unless the guard is active or every answer is empty.
    pub fn save(
        &mut self,
        form: &FormData,
        step: Step,
        now: DateTime<Utc>,
    ) -> StorageResult<SaveOutcome> {
        if self.guard.is_active(now) {
            return Ok(SaveOutcome::Suppressed);
        }
        if form.is_empty() {
            return Ok(SaveOutcome::SkippedEmpty);
        }

        let json = serde_json::to_string(form)?;
        let step_number = step.number().to_string();
        let saved_at = now.to_rfc3339();
        self.store.set_all(&[
            (FORM_DATA_KEY, json.as_str()),
            (CURRENT_STEP_KEY, step_number.as_str()),
            (LAST_SAVED_KEY, saved_at.as_str()),
        ])?;
        tracing::debug!("Saved snapshot at step {}", step.number());
        Ok(SaveOutcome::Saved(now))
    }

    /// Removes all snapshot keys.
    pub fn clear(&mut self) -> StorageResult<()> {
        self.store.remove_all(&STORAGE_KEYS)?;
        tracing::info!("Cleared saved form data");
        Ok(())
    }
}
