//! Command-line entry for stt.
//!
//! The program is a single interactive screen, so the CLI surface is just
//! name, version and help.

use clap::Parser;

use crate::error::Result;
use crate::ui;

/// stt - Simple time tracker
///
/// Track what you spend your day on: pick an activity, let the timer run,
/// end it with an optional comment, and export the day's log as text or CSV.
#[derive(Parser, Debug)]
#[command(name = "stt")]
#[command(author, version, about, long_about = None)]
pub struct Cli {}

impl Cli {
    pub fn run(&self) -> Result<()> {
        ui::tracker::run()
    }
}
