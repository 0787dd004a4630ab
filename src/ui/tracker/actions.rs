//! Command handlers behind the UI key bindings.
//!
//! Each handler takes the `Tracker` state object, applies one user action and
//! returns an outcome message for the status line, so every binding can be
//! unit tested without a terminal.

use std::path::Path;

use chrono::{DateTime, Duration, Local};
use tracing::debug;

use crate::error::Result;
use crate::export::{self, ExportFormat};
use crate::tracker::{RecordId, TaskRecord, Tracker};

#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub changed: bool,
    pub message: String,
}

impl ActionOutcome {
    fn changed(message: String) -> Self {
        Self {
            changed: true,
            message,
        }
    }

    fn unchanged(message: String) -> Self {
        Self {
            changed: false,
            message,
        }
    }
}

pub fn start_activity(tracker: &mut Tracker, activity: &str) -> Result<ActionOutcome> {
    start_activity_at(tracker, activity, Local::now())
}

pub fn start_activity_at(
    tracker: &mut Tracker,
    activity: &str,
    now: DateTime<Local>,
) -> Result<ActionOutcome> {
    tracker.start_at(activity, now)?;
    debug!(activity, "started task");
    Ok(ActionOutcome::changed(format!("started {activity}")))
}

pub fn end_activity(tracker: &mut Tracker) -> Result<ActionOutcome> {
    end_activity_at(tracker, Local::now())
}

pub fn end_activity_at(tracker: &mut Tracker, now: DateTime<Local>) -> Result<ActionOutcome> {
    let record = tracker.end_at(now)?;
    debug!(activity = %record.activity, "ended task");
    Ok(ActionOutcome::changed(format!(
        "recorded {} ({})",
        record.activity,
        format_clock(record.ended_at - record.started_at)
    )))
}

pub fn update_comment(tracker: &mut Tracker, text: &str) -> Result<ActionOutcome> {
    tracker.set_comment(text)?;
    Ok(ActionOutcome::changed("comment updated".to_string()))
}

pub fn add_activity(tracker: &mut Tracker, name: &str) -> Result<ActionOutcome> {
    tracker.add_activity(name)?;
    debug!(name, "added activity");
    Ok(ActionOutcome::changed(format!("added {}", name.trim())))
}

pub fn remove_activity(tracker: &mut Tracker, name: &str) -> Result<ActionOutcome> {
    let removed = tracker.remove_activity(name)?;
    debug!(name, removed, "removed activity");
    let message = match removed {
        0 => format!("removed {name}"),
        1 => format!("removed {name} and 1 record"),
        count => format!("removed {name} and {count} records"),
    };
    Ok(ActionOutcome::changed(message))
}

pub fn set_activity_color(tracker: &mut Tracker, name: &str, color: &str) -> ActionOutcome {
    tracker.set_activity_color(name, color);
    ActionOutcome::changed(format!("color set for {name}"))
}

pub fn delete_records(tracker: &mut Tracker, ids: &[RecordId]) -> ActionOutcome {
    let removed = tracker.delete_records(ids);
    debug!(removed, "deleted records");
    match removed {
        0 => ActionOutcome::unchanged("no records deleted".to_string()),
        1 => ActionOutcome::changed("deleted 1 record".to_string()),
        count => ActionOutcome::changed(format!("deleted {count} records")),
    }
}

pub fn clear_records(tracker: &mut Tracker) -> ActionOutcome {
    let count = tracker.records().len();
    tracker.clear();
    debug!(count, "cleared records");
    ActionOutcome::changed(format!("cleared {count} records"))
}

pub fn export_records(
    tracker: &Tracker,
    format: ExportFormat,
    path: &Path,
) -> Result<ActionOutcome> {
    export::write_export(tracker, format, path)?;
    debug!(path = %path.display(), format = format.label(), "exported records");
    Ok(ActionOutcome::changed(format!(
        "exported {} records to {}",
        tracker.records().len(),
        path.display()
    )))
}

/// `HH:MM:SS`, counting whole days into the hour field.
pub fn format_clock(elapsed: Duration) -> String {
    let total = elapsed.num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Comment preview for record rows: first 20 characters plus `...`.
pub fn comment_preview(comment: &str) -> String {
    let chars: Vec<char> = comment.chars().collect();
    if chars.len() > 20 {
        let mut preview: String = chars[..20].iter().collect();
        preview.push_str("...");
        preview
    } else {
        comment.to_string()
    }
}

/// Suggested export filename, dated like `records-2025-03-14.txt`.
pub fn default_export_path(format: ExportFormat, today: DateTime<Local>) -> String {
    format!(
        "records-{}.{}",
        today.format("%Y-%m-%d"),
        format.extension()
    )
}

/// Display line for a completed record: activity, time range, preview.
pub fn record_line(record: &TaskRecord) -> String {
    format!(
        "{} | {} - {} | {}",
        record.activity,
        record.started_at.format("%H:%M:%S"),
        record.ended_at.format("%H:%M:%S"),
        comment_preview(&record.comment)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use chrono::TimeZone;

    fn at(hour: u32, min: u32, sec: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 3, 14, hour, min, sec).unwrap()
    }

    #[test]
    fn start_end_round_trip_reports_duration() {
        let mut tracker = Tracker::new();
        let outcome = start_activity_at(&mut tracker, "Study", at(10, 0, 0)).expect("start");
        assert_eq!(outcome.message, "started Study");

        update_comment(&mut tracker, "algorithms").expect("comment");
        let outcome = end_activity_at(&mut tracker, at(10, 0, 30)).expect("end");
        assert_eq!(outcome.message, "recorded Study (00:00:30)");
        assert_eq!(tracker.records()[0].comment, "algorithms");
    }

    #[test]
    fn double_start_surfaces_running_activity() {
        let mut tracker = Tracker::new();
        start_activity_at(&mut tracker, "Sleep", at(22, 0, 0)).expect("start");
        let err = start_activity_at(&mut tracker, "Study", at(22, 1, 0)).expect_err("blocked");
        assert!(matches!(err, Error::TaskAlreadyRunning(name) if name == "Sleep"));
    }

    #[test]
    fn remove_activity_message_counts_records() {
        let mut tracker = Tracker::new();
        for _ in 0..2 {
            start_activity_at(&mut tracker, "Study", at(9, 0, 0)).expect("start");
            end_activity_at(&mut tracker, at(9, 30, 0)).expect("end");
        }
        let outcome = remove_activity(&mut tracker, "Study").expect("remove");
        assert_eq!(outcome.message, "removed Study and 2 records");
    }

    #[test]
    fn delete_records_reports_noop() {
        let mut tracker = Tracker::new();
        let outcome = delete_records(&mut tracker, &[]);
        assert!(!outcome.changed);
        assert_eq!(outcome.message, "no records deleted");
    }

    #[test]
    fn export_blocked_while_running() {
        let mut tracker = Tracker::new();
        start_activity_at(&mut tracker, "Study", at(9, 0, 0)).expect("start");
        let err = export_records(&tracker, ExportFormat::Text, Path::new("out.txt"))
            .expect_err("blocked");
        assert!(matches!(err, Error::ExportBlocked));
    }

    #[test]
    fn clock_formats_long_durations() {
        assert_eq!(format_clock(Duration::seconds(0)), "00:00:00");
        assert_eq!(format_clock(Duration::seconds(59)), "00:00:59");
        assert_eq!(format_clock(Duration::seconds(3661)), "01:01:01");
        assert_eq!(format_clock(Duration::seconds(90061)), "25:01:01");
        assert_eq!(format_clock(Duration::seconds(-5)), "00:00:00");
    }

    #[test]
    fn comment_preview_truncates_at_twenty() {
        assert_eq!(comment_preview("short"), "short");
        assert_eq!(
            comment_preview("exactly twenty chars"),
            "exactly twenty chars"
        );
        assert_eq!(
            comment_preview("a comment that is definitely longer"),
            "a comment that is de..."
        );
    }

    #[test]
    fn default_export_path_is_dated() {
        let today = at(10, 0, 0);
        assert_eq!(
            default_export_path(ExportFormat::Text, today),
            "records-2025-03-14.txt"
        );
        assert_eq!(
            default_export_path(ExportFormat::Csv, today),
            "records-2025-03-14.csv"
        );
    }

    #[test]
    fn record_line_shows_range_and_preview() {
        let mut tracker = Tracker::new();
        start_activity_at(&mut tracker, "Study", at(8, 0, 0)).expect("start");
        update_comment(&mut tracker, "a comment that is definitely longer").expect("comment");
        end_activity_at(&mut tracker, at(8, 30, 0)).expect("end");
        assert_eq!(
            record_line(&tracker.records()[0]),
            "Study | 08:00:00 - 08:30:00 | a comment that is de..."
        );
    }
}
