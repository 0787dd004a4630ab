use std::collections::HashSet;
use std::io;
use std::path::Path;
use std::time::Duration as StdDuration;

use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::activity::Activity;
use crate::error::Result;
use crate::export::{self, ExportFormat};
use crate::tracker::{RecordId, TaskRecord, Tracker};

use super::actions::{self, ActionOutcome};
use super::editor::{ColorPicker, InputPrompt, PickerAction, PromptAction, PromptKind};
use super::view;

const EVENT_POLL_MS: u64 = 150;

#[derive(Clone, Copy)]
pub(crate) enum StatusKind {
    Error,
    Info,
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pane {
    Activities,
    Records,
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum HelpContext {
    None,
    List,
}

pub(crate) enum ConfirmKind {
    DeleteActivity(String),
    DeleteRecords(Vec<RecordId>),
    ClearRecords,
    Quit,
}

pub(crate) struct ConfirmState {
    pub(crate) kind: ConfirmKind,
}

#[derive(Default, Clone, Copy)]
struct Viewport {
    width: u16,
    height: u16,
}

pub struct AppState {
    pub(crate) tracker: Tracker,
    pub(crate) pane: Pane,
    pub(crate) activity_selected: usize,
    pub(crate) record_selected: usize,
    pub(crate) marked: HashSet<RecordId>,
    pub(crate) prompt: Option<InputPrompt>,
    pub(crate) color_picker: Option<ColorPicker>,
    pub(crate) confirm: Option<ConfirmState>,
    pub(crate) help_context: HelpContext,
    pending_export: Option<ExportFormat>,
    status_message: Option<String>,
    info_message: Option<String>,
    viewport: Viewport,
    last_shown_second: Option<i64>,
}

impl AppState {
    fn new(tracker: Tracker) -> Self {
        Self {
            tracker,
            pane: Pane::Activities,
            activity_selected: 0,
            record_selected: 0,
            marked: HashSet::new(),
            prompt: None,
            color_picker: None,
            confirm: None,
            help_context: HelpContext::None,
            pending_export: None,
            status_message: None,
            info_message: None,
            viewport: Viewport::default(),
            last_shown_second: None,
        }
    }

    fn update_viewport(&mut self, width: u16, height: u16) {
        self.viewport = Viewport { width, height };
    }

    pub(crate) fn selected_activity(&self) -> Option<&Activity> {
        self.tracker.registry().get(self.activity_selected)
    }

    pub(crate) fn selected_record(&self) -> Option<&TaskRecord> {
        self.tracker.records().get(self.record_selected)
    }

    pub(crate) fn status_line(&self) -> Option<(String, StatusKind)> {
        if let Some(message) = self.status_message.as_ref() {
            return Some((message.clone(), StatusKind::Error));
        }
        if let Some(info) = self.info_message.as_ref() {
            return Some((info.clone(), StatusKind::Info));
        }
        None
    }

    pub(crate) fn footer_hint(&self) -> String {
        if self.confirm.is_some() {
            return "y/enter confirm  esc/n cancel".to_string();
        }
        if self.prompt.is_some() {
            return "type text  enter apply  ctrl+u clear  esc cancel".to_string();
        }
        if self.color_picker.is_some() {
            return "j/k move  enter apply  esc cancel".to_string();
        }
        match self.pane {
            Pane::Activities => {
                "enter start  e end  c comment  a add  d delete  o color  tab records  ? help  q quit"
                    .to_string()
            }
            Pane::Records => {
                "space mark  d delete  C clear  t/x export  tab activities  ? help  q quit"
                    .to_string()
            }
        }
    }

    pub(crate) fn toggle_help(&mut self, context: HelpContext) {
        self.help_context = if self.help_context == context {
            HelpContext::None
        } else {
            context
        };
    }

    fn set_error(&mut self, message: String) {
        self.status_message = Some(message);
        self.info_message = None;
    }

    fn set_info(&mut self, message: String) {
        self.info_message = Some(message);
        self.status_message = None;
    }

    fn apply_outcome(&mut self, outcome: ActionOutcome) {
        self.set_info(outcome.message);
        if outcome.changed {
            self.clamp_selections();
        }
    }

    fn clamp_selections(&mut self) {
        let activities = self.tracker.registry().len();
        if activities == 0 {
            self.activity_selected = 0;
        } else {
            self.activity_selected = self.activity_selected.min(activities - 1);
        }
        let records = self.tracker.records().len();
        if records == 0 {
            self.record_selected = 0;
        } else {
            self.record_selected = self.record_selected.min(records - 1);
        }
        let present: HashSet<RecordId> =
            self.tracker.records().iter().map(|record| record.id).collect();
        self.marked.retain(|id| present.contains(id));
    }

    fn move_selection(&mut self, delta: isize) {
        let len = match self.pane {
            Pane::Activities => self.tracker.registry().len(),
            Pane::Records => self.tracker.records().len(),
        };
        if len == 0 {
            return;
        }
        let current = match self.pane {
            Pane::Activities => self.activity_selected,
            Pane::Records => self.record_selected,
        };
        let max = len.saturating_sub(1);
        let next = (current as isize + delta).clamp(0, max as isize) as usize;
        match self.pane {
            Pane::Activities => self.activity_selected = next,
            Pane::Records => self.record_selected = next,
        }
    }

    fn list_jump(&self) -> isize {
        let height = self.viewport.height.saturating_sub(6);
        (height / 2).max(1) as isize
    }

    /// True when the running task's displayed second changed since the last
    /// draw, so the timer banner needs a redraw.
    fn tick(&mut self) -> bool {
        let second = self
            .tracker
            .elapsed_at(Local::now())
            .map(|elapsed| elapsed.num_seconds());
        match second {
            Some(second) => {
                if self.last_shown_second == Some(second) {
                    false
                } else {
                    self.last_shown_second = Some(second);
                    true
                }
            }
            None => {
                let was_running = self.last_shown_second.is_some();
                self.last_shown_second = None;
                was_running
            }
        }
    }
}

/// Run the tracker UI until the user quits.
pub fn run() -> Result<()> {
    let mut app = AppState::new(Tracker::new());
    run_terminal(&mut app)
}

fn run_terminal(app: &mut AppState) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let size = terminal.size()?;
    app.update_viewport(size.width, size.height);

    let result = run_loop(&mut terminal, app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut AppState) -> Result<()> {
    let mut dirty = true;
    loop {
        if dirty {
            terminal.draw(|frame| {
                app.update_viewport(frame.size().width, frame.size().height);
                view::render(frame, app);
            })?;
            dirty = false;
        }

        if event::poll(StdDuration::from_millis(EVENT_POLL_MS))? {
            match event::read()? {
                Event::Key(key) => {
                    if handle_key(app, key) {
                        break;
                    }
                    dirty = true;
                }
                Event::Resize(width, height) => {
                    app.update_viewport(width, height);
                    dirty = true;
                }
                _ => {}
            }
        }

        if app.tick() {
            dirty = true;
        }
    }
    Ok(())
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    if let Some(confirm) = app.confirm.take() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('c') | KeyCode::Enter => {
                return apply_confirm(app, confirm.kind);
            }
            KeyCode::Char('n') | KeyCode::Char('q') | KeyCode::Esc => {
                app.set_info("cancelled".to_string());
            }
            _ => {
                app.confirm = Some(confirm);
            }
        }
        return false;
    }

    if let Some(mut prompt) = app.prompt.take() {
        match prompt.handle_key(key) {
            PromptAction::None => {
                app.prompt = Some(prompt);
            }
            PromptAction::Cancel => {
                app.pending_export = None;
                app.set_info("cancelled".to_string());
            }
            PromptAction::Submit => submit_prompt(app, prompt),
        }
        return false;
    }

    if let Some(mut picker) = app.color_picker.take() {
        match picker.handle_key(key) {
            PickerAction::None => {
                app.color_picker = Some(picker);
            }
            PickerAction::Cancel => {
                app.set_info("cancelled".to_string());
            }
            PickerAction::Confirm => {
                let name = picker.activity().to_string();
                let outcome =
                    actions::set_activity_color(&mut app.tracker, &name, picker.selected_color());
                app.apply_outcome(outcome);
            }
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            if app.tracker.is_running() {
                app.confirm = Some(ConfirmState {
                    kind: ConfirmKind::Quit,
                });
                false
            } else {
                true
            }
        }
        KeyCode::Char('?') => {
            app.toggle_help(HelpContext::List);
            false
        }
        KeyCode::Tab | KeyCode::BackTab => {
            app.pane = match app.pane {
                Pane::Activities => Pane::Records,
                Pane::Records => Pane::Activities,
            };
            false
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.move_selection(app.list_jump());
            false
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.move_selection(-app.list_jump());
            false
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.move_selection(1);
            false
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.move_selection(-1);
            false
        }
        KeyCode::Enter | KeyCode::Char('s') => {
            if app.pane == Pane::Activities {
                start_selected(app);
            }
            false
        }
        KeyCode::Char('e') => {
            match actions::end_activity(&mut app.tracker) {
                Ok(outcome) => app.apply_outcome(outcome),
                Err(err) => app.set_error(err.to_string()),
            }
            false
        }
        KeyCode::Char('c') => {
            open_comment_prompt(app);
            false
        }
        KeyCode::Char('a') => {
            app.prompt = Some(InputPrompt::new(
                PromptKind::AddActivity,
                "Add Activity",
                String::new(),
            ));
            false
        }
        KeyCode::Char('d') => {
            open_delete_confirm(app);
            false
        }
        KeyCode::Char('o') => {
            open_color_picker(app);
            false
        }
        KeyCode::Char(' ') => {
            if app.pane == Pane::Records {
                let id = app.selected_record().map(|record| record.id);
                if let Some(id) = id {
                    if !app.marked.remove(&id) {
                        app.marked.insert(id);
                    }
                    app.move_selection(1);
                }
            }
            false
        }
        KeyCode::Char('t') => {
            open_export_prompt(app, ExportFormat::Text);
            false
        }
        KeyCode::Char('x') => {
            open_export_prompt(app, ExportFormat::Csv);
            false
        }
        KeyCode::Char('C') => {
            app.confirm = Some(ConfirmState {
                kind: ConfirmKind::ClearRecords,
            });
            false
        }
        _ => false,
    }
}

fn start_selected(app: &mut AppState) {
    let Some(name) = app.selected_activity().map(|activity| activity.name.clone()) else {
        app.set_error("no activity selected".to_string());
        return;
    };
    match actions::start_activity(&mut app.tracker, &name) {
        Ok(outcome) => app.apply_outcome(outcome),
        Err(err) => app.set_error(err.to_string()),
    }
}

fn open_comment_prompt(app: &mut AppState) {
    let Some(task) = app.tracker.running() else {
        app.set_error(crate::error::Error::NoActiveTask.to_string());
        return;
    };
    app.prompt = Some(InputPrompt::new(
        PromptKind::Comment,
        "Comment",
        task.comment.clone(),
    ));
}

fn open_delete_confirm(app: &mut AppState) {
    match app.pane {
        Pane::Activities => {
            let Some(name) = app.selected_activity().map(|activity| activity.name.clone())
            else {
                app.set_error("no activity selected".to_string());
                return;
            };
            app.confirm = Some(ConfirmState {
                kind: ConfirmKind::DeleteActivity(name),
            });
        }
        Pane::Records => {
            let ids: Vec<RecordId> = if app.marked.is_empty() {
                app.selected_record()
                    .map(|record| vec![record.id])
                    .unwrap_or_default()
            } else {
                let mut ids: Vec<RecordId> = app.marked.iter().copied().collect();
                ids.sort();
                ids
            };
            if ids.is_empty() {
                app.set_error("no record selected".to_string());
                return;
            }
            app.confirm = Some(ConfirmState {
                kind: ConfirmKind::DeleteRecords(ids),
            });
        }
    }
}

fn open_color_picker(app: &mut AppState) {
    let Some((name, color)) = app
        .selected_activity()
        .map(|activity| (activity.name.clone(), activity.color.clone()))
    else {
        app.set_error("no activity selected".to_string());
        return;
    };
    app.color_picker = Some(ColorPicker::new(name, &color));
}

fn open_export_prompt(app: &mut AppState, format: ExportFormat) {
    // Same precondition checks the export itself applies, surfaced before
    // the user types a path.
    if let Err(err) = export::ensure_exportable(&app.tracker) {
        app.set_error(err.to_string());
        return;
    }
    app.pending_export = Some(format);
    app.prompt = Some(InputPrompt::new(
        PromptKind::ExportPath,
        "Export Path",
        actions::default_export_path(format, Local::now()),
    ));
}

fn submit_prompt(app: &mut AppState, mut prompt: InputPrompt) {
    match prompt.kind() {
        PromptKind::AddActivity => {
            match actions::add_activity(&mut app.tracker, prompt.value()) {
                Ok(outcome) => {
                    app.activity_selected = app.tracker.registry().len().saturating_sub(1);
                    app.apply_outcome(outcome);
                }
                Err(err) => {
                    prompt.set_error(err.to_string());
                    app.prompt = Some(prompt);
                }
            }
        }
        PromptKind::Comment => match actions::update_comment(&mut app.tracker, prompt.value()) {
            Ok(outcome) => app.apply_outcome(outcome),
            Err(err) => {
                prompt.set_error(err.to_string());
                app.prompt = Some(prompt);
            }
        },
        PromptKind::ExportPath => {
            let path = prompt.value().trim().to_string();
            if path.is_empty() {
                prompt.set_error("enter a file name".to_string());
                app.prompt = Some(prompt);
                return;
            }
            let Some(format) = app.pending_export else {
                app.set_error("export was cancelled".to_string());
                return;
            };
            match actions::export_records(&app.tracker, format, Path::new(&path)) {
                Ok(outcome) => {
                    app.pending_export = None;
                    app.apply_outcome(outcome);
                }
                Err(err) => {
                    prompt.set_error(err.to_string());
                    app.prompt = Some(prompt);
                }
            }
        }
    }
}

fn apply_confirm(app: &mut AppState, kind: ConfirmKind) -> bool {
    match kind {
        ConfirmKind::DeleteActivity(name) => {
            match actions::remove_activity(&mut app.tracker, &name) {
                Ok(outcome) => app.apply_outcome(outcome),
                Err(err) => app.set_error(err.to_string()),
            }
            false
        }
        ConfirmKind::DeleteRecords(ids) => {
            let outcome = actions::delete_records(&mut app.tracker, &ids);
            app.apply_outcome(outcome);
            false
        }
        ConfirmKind::ClearRecords => {
            let outcome = actions::clear_records(&mut app.tracker);
            app.apply_outcome(outcome);
            false
        }
        ConfirmKind::Quit => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::DEFAULT_ACTIVITIES;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> AppState {
        let mut app = AppState::new(Tracker::new());
        app.update_viewport(100, 40);
        app
    }

    #[test]
    fn enter_starts_selected_activity() {
        let mut app = app();
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(
            app.tracker.running().map(|task| task.activity.as_str()),
            Some(DEFAULT_ACTIVITIES[0])
        );
    }

    #[test]
    fn second_start_keeps_timer_and_reports_error() {
        let mut app = app();
        handle_key(&mut app, key(KeyCode::Enter));
        handle_key(&mut app, key(KeyCode::Char('j')));
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(
            app.tracker.running().map(|task| task.activity.as_str()),
            Some(DEFAULT_ACTIVITIES[0])
        );
        assert!(matches!(app.status_line(), Some((_, StatusKind::Error))));
    }

    #[test]
    fn end_records_and_returns_to_idle() {
        let mut app = app();
        handle_key(&mut app, key(KeyCode::Enter));
        handle_key(&mut app, key(KeyCode::Char('e')));
        assert!(!app.tracker.is_running());
        assert_eq!(app.tracker.records().len(), 1);
    }

    #[test]
    fn comment_prompt_round_trip() {
        let mut app = app();
        handle_key(&mut app, key(KeyCode::Enter));
        handle_key(&mut app, key(KeyCode::Char('c')));
        assert!(app.prompt.is_some());
        for ch in "notes".chars() {
            handle_key(&mut app, key(KeyCode::Char(ch)));
        }
        handle_key(&mut app, key(KeyCode::Enter));
        assert!(app.prompt.is_none());
        assert_eq!(
            app.tracker.running().map(|task| task.comment.as_str()),
            Some("notes")
        );
    }

    #[test]
    fn comment_without_running_task_is_an_error() {
        let mut app = app();
        handle_key(&mut app, key(KeyCode::Char('c')));
        assert!(app.prompt.is_none());
        assert!(matches!(app.status_line(), Some((_, StatusKind::Error))));
    }

    #[test]
    fn add_activity_prompt_rejects_duplicate_inline() {
        let mut app = app();
        handle_key(&mut app, key(KeyCode::Char('a')));
        for ch in "Sleep".chars() {
            handle_key(&mut app, key(KeyCode::Char(ch)));
        }
        handle_key(&mut app, key(KeyCode::Enter));
        // prompt stays open with the error so the user can fix the name
        let prompt = app.prompt.as_ref().expect("prompt kept");
        assert!(prompt.error().is_some());
    }

    #[test]
    fn delete_activity_asks_for_confirmation() {
        let mut app = app();
        handle_key(&mut app, key(KeyCode::Char('d')));
        assert!(matches!(
            app.confirm.as_ref().map(|state| &state.kind),
            Some(ConfirmKind::DeleteActivity(_))
        ));
        handle_key(&mut app, key(KeyCode::Esc));
        assert!(app.confirm.is_none());
        assert_eq!(app.tracker.registry().len(), DEFAULT_ACTIVITIES.len());

        handle_key(&mut app, key(KeyCode::Char('d')));
        handle_key(&mut app, key(KeyCode::Char('y')));
        assert_eq!(app.tracker.registry().len(), DEFAULT_ACTIVITIES.len() - 1);
    }

    #[test]
    fn quit_while_running_needs_confirmation() {
        let mut app = app();
        handle_key(&mut app, key(KeyCode::Enter));
        assert!(!handle_key(&mut app, key(KeyCode::Char('q'))));
        assert!(matches!(
            app.confirm.as_ref().map(|state| &state.kind),
            Some(ConfirmKind::Quit)
        ));
        assert!(handle_key(&mut app, key(KeyCode::Char('y'))));
    }

    #[test]
    fn quit_when_idle_is_immediate() {
        let mut app = app();
        assert!(handle_key(&mut app, key(KeyCode::Char('q'))));
    }

    #[test]
    fn export_with_empty_log_never_opens_prompt() {
        let mut app = app();
        handle_key(&mut app, key(KeyCode::Char('t')));
        assert!(app.prompt.is_none());
        assert!(matches!(app.status_line(), Some((_, StatusKind::Error))));
    }

    #[test]
    fn export_while_running_is_blocked() {
        let mut app = app();
        handle_key(&mut app, key(KeyCode::Enter));
        handle_key(&mut app, key(KeyCode::Char('x')));
        assert!(app.prompt.is_none());
        assert!(matches!(app.status_line(), Some((_, StatusKind::Error))));
    }

    #[test]
    fn marked_records_are_deleted_together() {
        let mut app = app();
        for _ in 0..3 {
            handle_key(&mut app, key(KeyCode::Enter));
            handle_key(&mut app, key(KeyCode::Char('e')));
        }
        handle_key(&mut app, key(KeyCode::Tab));
        handle_key(&mut app, key(KeyCode::Char(' ')));
        handle_key(&mut app, key(KeyCode::Char(' ')));
        assert_eq!(app.marked.len(), 2);

        handle_key(&mut app, key(KeyCode::Char('d')));
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.tracker.records().len(), 1);
        assert!(app.marked.is_empty());
    }

    #[test]
    fn clear_confirm_empties_log() {
        let mut app = app();
        handle_key(&mut app, key(KeyCode::Enter));
        handle_key(&mut app, key(KeyCode::Char('e')));
        handle_key(&mut app, key(KeyCode::Char('C')));
        handle_key(&mut app, key(KeyCode::Char('y')));
        assert!(app.tracker.records().is_empty());
    }

    #[test]
    fn selection_clamps_after_removal() {
        let mut app = app();
        app.activity_selected = app.tracker.registry().len() - 1;
        let last = app
            .selected_activity()
            .map(|activity| activity.name.clone())
            .expect("activity");
        handle_key(&mut app, key(KeyCode::Char('d')));
        handle_key(&mut app, key(KeyCode::Char('y')));
        assert!(!app.tracker.registry().contains(&last));
        assert!(app.selected_activity().is_some());
    }

    #[test]
    fn color_picker_applies_palette_color() {
        let mut app = app();
        handle_key(&mut app, key(KeyCode::Char('o')));
        assert!(app.color_picker.is_some());
        handle_key(&mut app, key(KeyCode::Char('j')));
        handle_key(&mut app, key(KeyCode::Enter));
        assert!(app.color_picker.is_none());
        let color = app
            .tracker
            .registry()
            .color_of(DEFAULT_ACTIVITIES[0])
            .expect("color");
        assert_ne!(color, crate::activity::DEFAULT_COLOR);
    }

    #[test]
    fn tick_fires_once_per_second() {
        let mut app = app();
        assert!(!app.tick());
        handle_key(&mut app, key(KeyCode::Enter));
        assert!(app.tick());
        assert!(!app.tick());
        handle_key(&mut app, key(KeyCode::Char('e')));
        assert!(app.tick());
        assert!(!app.tick());
    }
}
