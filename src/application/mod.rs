//! Application layer managing state and business workflows.
//!
//! This module coordinates between the domain layer and presentation layer:
//! step sequencing, autosave scheduling, and background submission.

pub mod autosave;
pub mod controller;
pub mod state;
pub mod submission;

pub use autosave::*;
pub use controller::*;
pub use state::*;
pub use submission::*;
