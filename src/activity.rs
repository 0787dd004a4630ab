//! Activity registry: user-defined categories of time use and their colors.
//!
//! Names are unique and case-sensitive. Insertion order is preserved so the
//! UI lists the default activities first and user additions after them.

use crate::error::{Error, Result};

/// Color assigned to every activity until the user picks another one.
pub const DEFAULT_COLOR: &str = "#4a90e2";

/// Palette offered by the color picker.
pub const PALETTE: &[(&str, &str)] = &[
    ("Blue", "#4a90e2"),
    ("Teal", "#2ab7a9"),
    ("Green", "#5cb85c"),
    ("Olive", "#9aa83a"),
    ("Yellow", "#f4c862"),
    ("Orange", "#f0883e"),
    ("Red", "#e05252"),
    ("Pink", "#d66ba0"),
    ("Purple", "#9b6bd6"),
    ("Slate", "#7a8699"),
    ("Brown", "#a07850"),
    ("Gray", "#909090"),
];

/// Activities every fresh session starts with.
pub const DEFAULT_ACTIVITIES: &[&str] = &[
    "Bath",
    "Breakfast",
    "Brush",
    "Chill",
    "Cycling",
    "Dinner",
    "Drop In",
    "Household Work",
    "Journal",
    "Knowledge",
    "Lunch",
    "Meditation",
    "Miscellaneous",
    "Nature's Call",
    "Sleep",
    "Study",
    "Time waste",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub name: String,
    pub color: String,
}

/// Ordered name -> color mapping.
#[derive(Debug, Clone)]
pub struct ActivityRegistry {
    entries: Vec<Activity>,
}

impl Default for ActivityRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ActivityRegistry {
    /// Empty registry, no seed activities.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Registry seeded with [`DEFAULT_ACTIVITIES`].
    pub fn with_defaults() -> Self {
        let entries = DEFAULT_ACTIVITIES
            .iter()
            .map(|name| Activity {
                name: (*name).to_string(),
                color: DEFAULT_COLOR.to_string(),
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Activity> {
        self.entries.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Activity> {
        self.entries.get(index)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name == name)
    }

    pub fn color_of(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.color.as_str())
    }

    /// Add an activity with the default color. The name is trimmed first.
    pub fn add(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::EmptyName);
        }
        if self.contains(name) {
            return Err(Error::DuplicateName(name.to_string()));
        }
        self.entries.push(Activity {
            name: name.to_string(),
            color: DEFAULT_COLOR.to_string(),
        });
        Ok(())
    }

    /// Remove an activity. Removing an absent name is a no-op; returns
    /// whether an entry was actually removed. The in-use check and the
    /// cascade over historical records live on `Tracker`, which owns both
    /// the registry and the log.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.name != name);
        self.entries.len() != before
    }

    /// Update an activity's color. Silently no-ops if the name is absent.
    pub fn set_color(&mut self, name: &str, color: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.name == name) {
            entry.color = color.to_string();
        }
    }
}

/// Parse `#rrggbb` into RGB components. Returns `None` for anything else.
pub fn parse_hex_color(value: &str) -> Option<(u8, u8, u8)> {
    let digits = value.strip_prefix('#')?;
    if digits.len() != 6 || !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
    let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
    let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
    Some((r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_seeded_in_order() {
        let registry = ActivityRegistry::with_defaults();
        assert_eq!(registry.len(), DEFAULT_ACTIVITIES.len());
        assert_eq!(registry.get(0).map(|entry| entry.name.as_str()), Some("Bath"));
        assert!(registry.contains("Time waste"));
        assert_eq!(registry.color_of("Study"), Some(DEFAULT_COLOR));
    }

    #[test]
    fn add_trims_and_rejects_empty() {
        let mut registry = ActivityRegistry::new();
        let err = registry.add("   ").expect_err("blank name");
        assert!(matches!(err, Error::EmptyName));

        registry.add("  Reading  ").expect("add");
        assert!(registry.contains("Reading"));
    }

    #[test]
    fn add_rejects_duplicates_including_defaults() {
        let mut registry = ActivityRegistry::with_defaults();
        let err = registry.add("Sleep").expect_err("duplicate");
        assert!(matches!(err, Error::DuplicateName(name) if name == "Sleep"));
    }

    #[test]
    fn names_are_case_sensitive() {
        let mut registry = ActivityRegistry::with_defaults();
        registry.add("sleep").expect("lowercase is a new name");
        assert!(registry.contains("Sleep"));
        assert!(registry.contains("sleep"));
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut registry = ActivityRegistry::with_defaults();
        assert!(!registry.remove("Nonexistent"));
        assert_eq!(registry.len(), DEFAULT_ACTIVITIES.len());
        assert!(registry.remove("Sleep"));
        assert!(!registry.contains("Sleep"));
    }

    #[test]
    fn set_color_updates_only_existing() {
        let mut registry = ActivityRegistry::with_defaults();
        registry.set_color("Study", "#e05252");
        assert_eq!(registry.color_of("Study"), Some("#e05252"));
        registry.set_color("Nonexistent", "#e05252");
        assert_eq!(registry.color_of("Nonexistent"), None);
    }

    #[test]
    fn hex_colors_parse() {
        assert_eq!(parse_hex_color("#4a90e2"), Some((0x4a, 0x90, 0xe2)));
        assert_eq!(parse_hex_color("4a90e2"), None);
        assert_eq!(parse_hex_color("#xyzxyz"), None);
        assert_eq!(parse_hex_color("#fff"), None);
    }

    #[test]
    fn palette_entries_are_valid_hex() {
        for (name, hex) in PALETTE {
            assert!(
                parse_hex_color(hex).is_some(),
                "palette color {name} is not valid hex"
            );
        }
    }
}
