//! stt - Simple time tracker
//!
//! A terminal time tracker: a registry of activities, a one-task-at-a-time
//! timer, an in-memory log of completed records, and text/CSV export.
//! Nothing is persisted between runs.

pub mod activity;
pub mod cli;
pub mod error;
pub mod export;
pub mod tracker;
pub mod ui;

pub use error::{Error, Result};
