use crate::domain::{FormData, SubmissionError};

/// Sends a completed form somewhere. Implementations must be callable from a worker thread.
pub trait Submitter: Send + Sync {
    fn submit(&self, form: &FormData) -> Result<(), SubmissionError>;
}

/// Stands in when no webhook is configured. Every submission fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unconfigured;

impl Submitter for Unconfigured {
    fn submit(&self, _form: &FormData) -> Result<(), SubmissionError> {
        Err(SubmissionError::MissingEndpoint)
    }
}

/// Posts the form as JSON to a webhook.
///
/// Requests have no timeout. A slow webhook is waited on until the
/// transport itself reports success or failure.
pub struct HttpSubmitter {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl HttpSubmitter {
    /// # Errors
    ///
    /// Returns [`SubmissionError::Transport`] if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, SubmissionError> {
        let client = reqwest::blocking::Client::builder().timeout(None).build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }
}

impl Submitter for HttpSubmitter {
    fn submit(&self, form: &FormData) -> Result<(), SubmissionError> {
        let response = self.client.post(&self.endpoint).json(form).send()?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(SubmissionError::Rejected {
                status: status.as_u16(),
            })
        }
    }
}
