//! Infrastructure layer providing external service integrations.
//!
//! This module contains the storage backends, snapshot persistence, the
//! webhook client, configuration loading and log setup.

pub mod clock;
pub mod config;
pub mod logging;
pub mod persistence;
pub mod storage;
pub mod submission;

pub use clock::*;
pub use config::*;
pub use logging::*;
pub use persistence::*;
pub use storage::*;
pub use submission::*;
