//! Cosmic Navigator - Birth Chart Intake Library
//!
//! A three-step terminal form that collects birth details, autosaves progress
//! locally, and submits the finished answers to a webhook.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;
