use chrono::Local;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::activity::parse_hex_color;
use crate::tracker::TaskRecord;

use super::actions::{comment_preview, format_clock};
use super::app::{AppState, ConfirmKind, ConfirmState, HelpContext, Pane, StatusKind};
use super::editor::{ColorPicker, InputPrompt};

const ACTIVITY_NAME_WIDTH: usize = 18;
const HELP_KEY_WIDTH: usize = 12;
const COLOR_TEXT: Color = Color::Rgb(234, 236, 239);
const COLOR_MUTED: Color = Color::Rgb(160, 165, 172);
const COLOR_MUTED_DARK: Color = Color::Rgb(118, 124, 130);
const COLOR_INFO: Color = Color::Rgb(116, 198, 219);
const COLOR_WARNING: Color = Color::Rgb(244, 200, 98);
const COLOR_ERROR: Color = Color::Rgb(255, 107, 107);
const COLOR_SUCCESS: Color = Color::Rgb(126, 210, 146);
const COLOR_ACCENT: Color = Color::Rgb(122, 170, 255);
const COLOR_BORDER_FOCUS: Color = Color::Rgb(92, 126, 166);
const COLOR_BORDER_IDLE: Color = Color::Rgb(52, 56, 60);

pub fn render(frame: &mut Frame, app: &AppState) {
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(area);
    let banner = chunks[0];
    let main = chunks[1];
    let footer = chunks[2];

    render_banner(frame, app, banner);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)].as_ref())
        .split(main);
    render_activities(frame, app, panes[0]);
    render_records(frame, app, panes[1]);

    render_footer(frame, app, footer);

    if let Some(prompt) = app.prompt.as_ref() {
        render_prompt_modal(frame, area, prompt);
    }
    if let Some(picker) = app.color_picker.as_ref() {
        render_color_modal(frame, area, picker);
    }
    if let Some(confirm) = app.confirm.as_ref() {
        render_confirm_modal(frame, area, confirm);
    }
}

fn render_banner(frame: &mut Frame, app: &AppState, area: Rect) {
    let line = if let Some(task) = app.tracker.running() {
        let elapsed = app.tracker.elapsed().unwrap_or_else(chrono::Duration::zero);
        let mut spans = vec![
            Span::styled(
                format_clock(elapsed),
                Style::default()
                    .fg(COLOR_SUCCESS)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                task.activity.clone(),
                activity_style(app, &task.activity).add_modifier(Modifier::BOLD),
            ),
        ];
        if !task.comment.is_empty() {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                comment_preview(&task.comment),
                Style::default().fg(COLOR_MUTED),
            ));
        }
        Line::from(spans)
    } else {
        Line::from(vec![
            Span::styled("00:00:00", Style::default().fg(COLOR_MUTED_DARK)),
            Span::raw("  "),
            Span::styled(
                "no task running",
                Style::default().fg(COLOR_MUTED_DARK),
            ),
        ])
    };
    let widget = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(COLOR_BORDER_IDLE)),
    );
    frame.render_widget(widget, area);
}

fn render_activities(frame: &mut Frame, app: &AppState, area: Rect) {
    let content_width = area.width.saturating_sub(2) as usize;
    let focused = app.pane == Pane::Activities;
    let mut lines = Vec::new();

    let help_lines = if focused && app.help_context == HelpContext::List {
        build_help_lines(content_width)
    } else {
        Vec::new()
    };
    let help_reserved = if help_lines.is_empty() {
        0
    } else {
        help_lines.len() + 1
    };

    if app.tracker.registry().is_empty() {
        lines.push(Line::from(Span::styled(
            "No activities",
            Style::default().fg(COLOR_MUTED_DARK),
        )));
    } else {
        let list_height = area
            .height
            .saturating_sub(2)
            .saturating_sub(help_reserved as u16) as usize;
        let total = app.tracker.registry().len();
        let (start, end) = list_window(total, Some(app.activity_selected), list_height.max(1));
        let running = app.tracker.running().map(|task| task.activity.as_str());
        for (pos, activity) in app
            .tracker
            .registry()
            .iter()
            .enumerate()
            .take(end)
            .skip(start)
        {
            let selected = focused && pos == app.activity_selected;
            let marker = if running == Some(activity.name.as_str()) {
                ">"
            } else {
                " "
            };
            let name_width = ACTIVITY_NAME_WIDTH.min(content_width.saturating_sub(5));
            let mut spans = vec![
                Span::styled(marker.to_string(), Style::default().fg(COLOR_SUCCESS)),
                Span::raw(" "),
                Span::styled("  ".to_string(), swatch_style(&activity.color)),
                Span::raw(" "),
                Span::styled(
                    pad_text(&activity.name, name_width),
                    Style::default().fg(COLOR_TEXT),
                ),
            ];
            if selected {
                for span in &mut spans {
                    span.style = span.style.add_modifier(Modifier::REVERSED);
                }
            }
            lines.push(Line::from(spans));
        }
    }

    if !help_lines.is_empty() {
        lines.push(Line::from(""));
        lines.extend(help_lines);
    }

    let border = if focused {
        COLOR_BORDER_FOCUS
    } else {
        COLOR_BORDER_IDLE
    };
    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Activities ({})", app.tracker.registry().len()))
                .border_style(Style::default().fg(border)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}

fn render_records(frame: &mut Frame, app: &AppState, area: Rect) {
    let content_width = area.width.saturating_sub(2) as usize;
    let focused = app.pane == Pane::Records;
    let mut lines = Vec::new();

    let help_lines = if focused && app.help_context == HelpContext::List {
        build_help_lines(content_width)
    } else {
        Vec::new()
    };
    let help_reserved = if help_lines.is_empty() {
        0
    } else {
        help_lines.len() + 1
    };

    let records = app.tracker.records();
    if records.is_empty() {
        lines.push(Line::from(Span::styled(
            "No records yet",
            Style::default().fg(COLOR_MUTED_DARK),
        )));
    } else {
        let list_height = area
            .height
            .saturating_sub(2)
            .saturating_sub(help_reserved as u16) as usize;
        let (start, end) = list_window(
            records.len(),
            Some(app.record_selected),
            list_height.max(1),
        );
        for (pos, record) in records.iter().enumerate().take(end).skip(start) {
            let selected = focused && pos == app.record_selected;
            let marked = app.marked.contains(&record.id);
            lines.push(render_record_row(
                app,
                record,
                selected,
                marked,
                content_width,
            ));
        }
    }

    if !help_lines.is_empty() {
        lines.push(Line::from(""));
        lines.extend(help_lines);
    }

    let border = if focused {
        COLOR_BORDER_FOCUS
    } else {
        COLOR_BORDER_IDLE
    };
    let title = format!(
        "Records ({}) - {}",
        records.len(),
        Local::now().format("%Y-%m-%d")
    );
    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(border)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}

fn render_record_row(
    app: &AppState,
    record: &TaskRecord,
    selected: bool,
    marked: bool,
    width: usize,
) -> Line<'static> {
    let marker = if marked { "[x]" } else { "[ ]" };
    let marker_style = if marked {
        Style::default().fg(COLOR_SUCCESS)
    } else {
        Style::default().fg(COLOR_MUTED_DARK)
    };
    let name_width = ACTIVITY_NAME_WIDTH.min(width.saturating_sub(26));
    let range = format!(
        "{} - {}",
        record.started_at.format("%H:%M:%S"),
        record.ended_at.format("%H:%M:%S")
    );
    let used = 3 + 1 + name_width + 1 + range.len() + 2;
    let preview = truncate_text(&comment_preview(&record.comment), width.saturating_sub(used));

    let mut spans = vec![
        Span::styled(marker.to_string(), marker_style),
        Span::raw(" "),
        Span::styled(
            pad_text(&record.activity, name_width),
            activity_style(app, &record.activity),
        ),
        Span::raw(" "),
        Span::styled(range, Style::default().fg(COLOR_WARNING)),
        Span::raw("  "),
        Span::styled(preview, Style::default().fg(COLOR_MUTED)),
    ];
    if selected {
        for span in &mut spans {
            span.style = span.style.add_modifier(Modifier::REVERSED);
        }
    }
    Line::from(spans)
}

fn render_footer(frame: &mut Frame, app: &AppState, area: Rect) {
    let hint = app.footer_hint();
    let hint_span = Span::styled(hint, Style::default().fg(COLOR_INFO));
    let line = if let Some((status, kind)) = app.status_line() {
        let status_style = match kind {
            StatusKind::Error => Style::default()
                .fg(COLOR_ERROR)
                .add_modifier(Modifier::BOLD),
            StatusKind::Info => Style::default().fg(COLOR_WARNING),
        };
        Line::from(vec![
            hint_span,
            Span::raw("  |  "),
            Span::styled(status, status_style),
        ])
    } else {
        Line::from(hint_span)
    };
    let widget = Paragraph::new(line)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(COLOR_BORDER_FOCUS)),
        );
    frame.render_widget(widget, area);
}

fn render_prompt_modal(frame: &mut Frame, area: Rect, prompt: &InputPrompt) {
    let content_width = area.width.saturating_sub(8).min(56);
    let height = 7u16.min(area.height.saturating_sub(4));
    let modal = centered_rect(content_width, height, area);
    frame.render_widget(Clear, modal);

    let value_width = (content_width as usize).saturating_sub(2);
    let mut lines: Vec<Line<'static>> = Vec::new();
    lines.push(Line::from(value_with_caret_spans(
        prompt.value(),
        prompt.cursor(),
        value_width,
        Style::default().fg(COLOR_TEXT),
    )));
    lines.push(Line::from(""));
    if let Some(error) = prompt.error() {
        lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default()
                .fg(COLOR_ERROR)
                .add_modifier(Modifier::BOLD),
        )));
    } else {
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        "enter apply  ctrl+u clear  esc cancel",
        Style::default().fg(COLOR_MUTED_DARK),
    )));

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(prompt.title()))
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, modal);
}

fn render_color_modal(frame: &mut Frame, area: Rect, picker: &ColorPicker) {
    let content_width = 26u16.min(area.width.saturating_sub(6));
    let height = (picker.options().len() as u16 + 4).min(area.height.saturating_sub(4));
    let modal = centered_rect(content_width, height, area);
    frame.render_widget(Clear, modal);

    let mut lines: Vec<Line<'static>> = Vec::new();
    for (idx, (name, hex)) in picker.options().iter().enumerate() {
        let mut spans = vec![
            Span::styled("  ".to_string(), swatch_style(hex)),
            Span::raw(" "),
            Span::styled((*name).to_string(), Style::default().fg(COLOR_TEXT)),
        ];
        if idx == picker.selected_index() {
            for span in &mut spans {
                span.style = span.style.add_modifier(Modifier::REVERSED);
            }
        }
        lines.push(Line::from(spans));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "enter apply  esc cancel",
        Style::default().fg(COLOR_MUTED_DARK),
    )));

    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Color: {}", picker.activity())),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, modal);
}

fn render_confirm_modal(frame: &mut Frame, area: Rect, state: &ConfirmState) {
    let content_width = area.width.saturating_sub(8).min(56);
    let height = 7u16.min(area.height.saturating_sub(4));
    let modal = centered_rect(content_width, height, area);
    frame.render_widget(Clear, modal);

    let text_width = (content_width as usize).saturating_sub(2);
    let (title, message) = match &state.kind {
        ConfirmKind::DeleteActivity(name) => (
            "Delete Activity",
            format!("Delete {name} and all of its records?"),
        ),
        ConfirmKind::DeleteRecords(ids) => {
            let message = if ids.len() == 1 {
                "Delete the selected record?".to_string()
            } else {
                format!("Delete {} selected records?", ids.len())
            };
            ("Delete Records", message)
        }
        ConfirmKind::ClearRecords => ("Clear Records", "Delete every record?".to_string()),
        ConfirmKind::Quit => (
            "Quit",
            "A task is still running. Quit without recording it?".to_string(),
        ),
    };

    let lines = vec![
        Line::from(Span::styled(
            truncate_text(&message, text_width),
            Style::default()
                .fg(COLOR_WARNING)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "y/enter confirm  esc/n cancel",
            Style::default().fg(COLOR_MUTED_DARK),
        )),
    ];

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, modal);
}

fn build_help_lines(width: usize) -> Vec<Line<'static>> {
    vec![
        help_header("More commands"),
        help_line("j/k or up/down", "move selection", width),
        help_line("tab", "switch pane", width),
        help_line("enter/s", "start selected activity", width),
        help_line("e", "end the running task", width),
        help_line("c", "edit the running comment", width),
        help_line("a", "add activity", width),
        help_line("d", "delete activity or records", width),
        help_line("o", "pick activity color", width),
        help_line("space", "mark record", width),
        help_line("t", "export as text", width),
        help_line("x", "export as CSV", width),
        help_line("C", "clear all records", width),
        help_line("ctrl+d/u", "page down/up", width),
        help_line("q/esc", "quit", width),
        help_line("?", "hide help", width),
    ]
}

fn help_header(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default().fg(COLOR_INFO).add_modifier(Modifier::BOLD),
    ))
}

fn help_line(keys: &str, desc: &str, width: usize) -> Line<'static> {
    let key_text = pad_text(keys, HELP_KEY_WIDTH.min(width));
    let desc_width = width.saturating_sub(HELP_KEY_WIDTH + 1);
    let desc_text = truncate_text(desc, desc_width);
    Line::from(vec![
        Span::styled(
            key_text,
            Style::default()
                .fg(COLOR_ACCENT)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(desc_text, Style::default().fg(COLOR_MUTED)),
    ])
}

fn value_with_caret_spans(
    value: &str,
    cursor: usize,
    width: usize,
    style: Style,
) -> Vec<Span<'static>> {
    if width == 0 {
        return vec![Span::raw("")];
    }
    let chars: Vec<char> = value.chars().collect();
    let len = chars.len();
    let cursor = cursor.min(len);
    if len == 0 {
        return vec![Span::styled(
            " ".to_string(),
            style.add_modifier(Modifier::REVERSED),
        )];
    }

    let caret_at_end = cursor == len;
    let available = if caret_at_end {
        width.saturating_sub(1)
    } else {
        width
    };
    let mut start = 0usize;
    if len > available {
        if cursor > available {
            start = cursor.saturating_sub(available);
        }
        if start + available > len {
            start = len.saturating_sub(available);
        }
    }
    let end = (start + available).min(len);
    let window = &chars[start..end];

    if caret_at_end {
        let text: String = window.iter().collect();
        let mut spans = Vec::new();
        if !text.is_empty() {
            spans.push(Span::styled(text, style));
        }
        spans.push(Span::styled(
            " ".to_string(),
            style.add_modifier(Modifier::REVERSED),
        ));
        return spans;
    }

    let caret_index = cursor.saturating_sub(start);
    let before: String = window[..caret_index].iter().collect();
    let caret_char = window.get(caret_index).copied().unwrap_or(' ');
    let after: String = window[caret_index.saturating_add(1)..].iter().collect();

    let mut spans = Vec::new();
    if !before.is_empty() {
        spans.push(Span::styled(before, style));
    }
    spans.push(Span::styled(
        caret_char.to_string(),
        style.add_modifier(Modifier::REVERSED),
    ));
    if !after.is_empty() {
        spans.push(Span::styled(after, style));
    }
    spans
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn list_window(total: usize, selected: Option<usize>, height: usize) -> (usize, usize) {
    if total == 0 || height == 0 {
        return (0, 0);
    }
    if total <= height {
        return (0, total);
    }
    let selected = selected.unwrap_or(0);
    let mut start = selected.saturating_sub(height / 2);
    if start + height > total {
        start = total - height;
    }
    (start, start + height)
}

fn activity_style(app: &AppState, name: &str) -> Style {
    match app.tracker.registry().color_of(name).and_then(parse_hex_color) {
        Some((r, g, b)) => Style::default().fg(Color::Rgb(r, g, b)),
        None => Style::default().fg(COLOR_TEXT),
    }
}

fn swatch_style(hex: &str) -> Style {
    match parse_hex_color(hex) {
        Some((r, g, b)) => Style::default().bg(Color::Rgb(r, g, b)),
        None => Style::default().bg(COLOR_BORDER_IDLE),
    }
}

fn pad_text(value: &str, width: usize) -> String {
    let mut text = value.to_string();
    if text.len() > width {
        text = truncate_text(&text, width);
    }
    format!("{text:width$}")
}

fn truncate_text(value: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= max {
        return value.to_string();
    }
    if max <= 3 {
        return chars[..max].iter().collect();
    }
    let mut out: String = chars[..(max - 3)].iter().collect();
    out.push_str("...");
    out
}
