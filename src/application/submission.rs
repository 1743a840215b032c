//! Background delivery of completed forms.
//!
//! A submission runs on its own worker thread and reports back over a channel.
//! The UI loop polls for the result, so all state changes still happen on the
//! main thread, one event at a time.

use crate::domain::{FormData, SubmissionError};
use crate::infrastructure::Submitter;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

pub type SubmissionResult = Result<(), SubmissionError>;

pub struct SubmissionHandler {
    submitter: Arc<dyn Submitter>,
    pending: Option<Receiver<SubmissionResult>>,
}

impl SubmissionHandler {
    pub fn new(submitter: Arc<dyn Submitter>) -> Self {
        Self {
            submitter,
            pending: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Starts sending `form`. Refused while an earlier submission is still in flight.
    pub fn start(&mut self, form: FormData) -> Result<(), SubmissionError> {
        if self.pending.is_some() {
            return Err(SubmissionError::AlreadyPending);
        }

        let (tx, rx) = mpsc::channel();
        let submitter = Arc::clone(&self.submitter);
        thread::spawn(move || {
            let result = submitter.submit(&form);
            // The receiver may be gone if the app quit mid-flight.
            let _ = tx.send(result);
        });

        self.pending = Some(rx);
        Ok(())
    }

    /// Returns the result if the in-flight submission has finished.
    pub fn poll(&mut self) -> Option<SubmissionResult> {
        let rx = self.pending.as_ref()?;
        match rx.try_recv() {
            Ok(result) => {
                self.pending = None;
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.pending = None;
                Some(Err(SubmissionError::WorkerLost))
            }
        }
    }

    /// Blocks until the in-flight submission finishes.
    pub fn wait(&mut self) -> Option<SubmissionResult> {
        let rx = self.pending.take()?;
        Some(rx.recv().unwrap_or(Err(SubmissionError::WorkerLost)))
    }
}
