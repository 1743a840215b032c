use thiserror::Error;

/// Failures of the key-value store backing autosave.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Failures of a form submission. All of them leave the form untouched.
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("no webhook endpoint is configured")]
    MissingEndpoint,
    #[error("endpoint rejected the submission with status {status}")]
    Rejected { status: u16 },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("a submission is already in flight")]
    AlreadyPending,
    #[error("submission worker stopped before reporting a result")]
    WorkerLost,
}

/// Failures while reading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

pub type StorageResult<T> = Result<T, StorageError>;
