//! Export of the record log to text and CSV.
//!
//! Rendering is pure over the record slice; timestamps are the ones fixed at
//! record creation, so exporting twice yields byte-identical output. File
//! export refuses to run while a task is in progress and creates no file for
//! an empty log.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Local};

use crate::error::{Error, Result};
use crate::tracker::{TaskRecord, Tracker};

/// Timestamp layout shared by both formats.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const CSV_HEADER: &str = "Activity,Start Time,End Time,Comment";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Text,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Text => "text",
            ExportFormat::Csv => "CSV",
        }
    }
}

/// Render the text format: one line per record,
/// `"activity",start,end,"comment"`.
pub fn render_text(records: &[TaskRecord]) -> String {
    let mut out = String::new();
    for record in records {
        out.push_str(&format!(
            "\"{}\",{},{},\"{}\"\n",
            record.activity,
            format_timestamp(record.started_at),
            format_timestamp(record.ended_at),
            record.comment,
        ));
    }
    out
}

/// Render the CSV format: header row, then one fully quoted row per record
/// with embedded quotes doubled. CRLF line endings.
pub fn render_csv(records: &[TaskRecord]) -> String {
    let mut out = String::new();
    out.push_str(CSV_HEADER);
    out.push_str("\r\n");
    for record in records {
        let fields = [
            record.activity.as_str(),
            &format_timestamp(record.started_at),
            &format_timestamp(record.ended_at),
            record.comment.as_str(),
        ];
        let row: Vec<String> = fields.iter().map(|field| csv_quote(field)).collect();
        out.push_str(&row.join(","));
        out.push_str("\r\n");
    }
    out
}

pub fn render(format: ExportFormat, records: &[TaskRecord]) -> String {
    match format {
        ExportFormat::Text => render_text(records),
        ExportFormat::Csv => render_csv(records),
    }
}

/// Export is only allowed in the Idle state and with a non-empty log.
/// Checked before any file is created.
pub fn ensure_exportable(tracker: &Tracker) -> Result<()> {
    if tracker.is_running() {
        return Err(Error::ExportBlocked);
    }
    if tracker.records().is_empty() {
        return Err(Error::EmptyLog);
    }
    Ok(())
}

/// Write the log to `path` in the given format.
pub fn write_export(tracker: &Tracker, format: ExportFormat, path: &Path) -> Result<()> {
    ensure_exportable(tracker)?;
    fs::write(path, render(format, tracker.records()))?;
    Ok(())
}

fn format_timestamp(value: DateTime<Local>) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

fn csv_quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::Tracker;
    use chrono::TimeZone;

    fn tracker_with_records() -> Tracker {
        let mut tracker = Tracker::new();
        let start = Local.with_ymd_and_hms(2025, 3, 14, 10, 0, 0).unwrap();
        let end = Local.with_ymd_and_hms(2025, 3, 14, 10, 30, 0).unwrap();
        tracker.start_at("Study", start).expect("start");
        tracker.set_comment("algorithms").expect("comment");
        tracker.end_at(end).expect("end");

        let start = Local.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap();
        let end = Local.with_ymd_and_hms(2025, 3, 14, 12, 45, 30).unwrap();
        tracker.start_at("Lunch", start).expect("start");
        tracker.end_at(end).expect("end");
        tracker
    }

    #[test]
    fn text_format_quotes_activity_and_comment() {
        let tracker = tracker_with_records();
        let text = render_text(tracker.records());
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("\"Study\",2025-03-14 10:00:00,2025-03-14 10:30:00,\"algorithms\"")
        );
        assert_eq!(
            lines.next(),
            Some("\"Lunch\",2025-03-14 12:00:00,2025-03-14 12:45:30,\"\"")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn csv_format_quotes_every_field() {
        let tracker = tracker_with_records();
        let csv = render_csv(tracker.records());
        let mut lines = csv.split("\r\n");
        assert_eq!(lines.next(), Some("Activity,Start Time,End Time,Comment"));
        assert_eq!(
            lines.next(),
            Some("\"Study\",\"2025-03-14 10:00:00\",\"2025-03-14 10:30:00\",\"algorithms\"")
        );
    }

    #[test]
    fn csv_doubles_embedded_quotes() {
        let mut tracker = Tracker::new();
        let start = Local.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap();
        let end = Local.with_ymd_and_hms(2025, 3, 14, 9, 10, 0).unwrap();
        tracker.start_at("Study", start).expect("start");
        tracker.set_comment("read \"TAOCP\" intro").expect("comment");
        tracker.end_at(end).expect("end");

        let csv = render_csv(tracker.records());
        assert!(csv.contains("\"read \"\"TAOCP\"\" intro\""));
    }

    #[test]
    fn rendering_is_deterministic() {
        let tracker = tracker_with_records();
        assert_eq!(
            render_text(tracker.records()),
            render_text(tracker.records())
        );
        assert_eq!(render_csv(tracker.records()), render_csv(tracker.records()));
    }

    #[test]
    fn export_requires_idle_state() {
        let mut tracker = tracker_with_records();
        tracker.start_at("Sleep", Local::now()).expect("start");
        assert!(matches!(
            ensure_exportable(&tracker),
            Err(Error::ExportBlocked)
        ));
    }

    #[test]
    fn export_requires_records() {
        let tracker = Tracker::new();
        assert!(matches!(ensure_exportable(&tracker), Err(Error::EmptyLog)));
    }
}
