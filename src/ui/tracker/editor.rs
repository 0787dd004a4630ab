use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::activity::PALETTE;

/// What a single-line prompt is collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    AddActivity,
    Comment,
    ExportPath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAction {
    None,
    Cancel,
    Submit,
}

/// Single-line text input with a caret, used for activity names, comments
/// and export paths.
#[derive(Debug, Clone)]
pub struct InputPrompt {
    kind: PromptKind,
    title: &'static str,
    value: String,
    cursor: usize,
    error: Option<String>,
}

impl InputPrompt {
    pub fn new(kind: PromptKind, title: &'static str, initial: String) -> Self {
        let cursor = initial.chars().count();
        Self {
            kind,
            title,
            value: initial,
            cursor,
            error: None,
        }
    }

    pub fn kind(&self) -> PromptKind {
        self.kind
    }

    pub fn title(&self) -> &'static str {
        self.title
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, message: String) {
        self.error = Some(message);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PromptAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('u') {
            self.value.clear();
            self.cursor = 0;
            self.error = None;
            return PromptAction::None;
        }

        match key.code {
            KeyCode::Esc => return PromptAction::Cancel,
            KeyCode::Enter => return PromptAction::Submit,
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(self.value.chars().count());
            }
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.value.chars().count(),
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    let index = byte_index(&self.value, self.cursor - 1);
                    self.value.remove(index);
                    self.cursor -= 1;
                }
            }
            KeyCode::Delete => {
                if self.cursor < self.value.chars().count() {
                    let index = byte_index(&self.value, self.cursor);
                    self.value.remove(index);
                }
            }
            KeyCode::Char(ch) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    return PromptAction::None;
                }
                if !ch.is_control() {
                    let index = byte_index(&self.value, self.cursor);
                    self.value.insert(index, ch);
                    self.cursor += 1;
                }
            }
            _ => {}
        }

        self.error = None;
        PromptAction::None
    }
}

fn byte_index(value: &str, char_index: usize) -> usize {
    value
        .char_indices()
        .nth(char_index)
        .map(|(index, _)| index)
        .unwrap_or(value.len())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerAction {
    None,
    Cancel,
    Confirm,
}

/// Fixed-palette color picker for an activity.
#[derive(Debug, Clone)]
pub struct ColorPicker {
    activity: String,
    selected: usize,
}

impl ColorPicker {
    /// Picker positioned on `current` when it is a palette color.
    pub fn new(activity: String, current: &str) -> Self {
        let selected = PALETTE
            .iter()
            .position(|(_, hex)| *hex == current)
            .unwrap_or(0);
        Self { activity, selected }
    }

    pub fn activity(&self) -> &str {
        &self.activity
    }

    pub fn options(&self) -> &'static [(&'static str, &'static str)] {
        PALETTE
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_color(&self) -> &'static str {
        PALETTE[self.selected].1
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PickerAction {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => PickerAction::Cancel,
            KeyCode::Enter => PickerAction::Confirm,
            KeyCode::Char('j') | KeyCode::Down => {
                self.selected = (self.selected + 1).min(PALETTE.len() - 1);
                PickerAction::None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                PickerAction::None
            }
            _ => PickerAction::None,
        }
    }
}
