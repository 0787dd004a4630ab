//! Terminal UI for the tracker: a two-pane layout over the activity
//! registry and the record log, with a timer banner while a task runs.

pub mod actions;
pub mod app;
pub mod editor;
pub mod view;

pub use app::run;
