//! The persisted document: settings plus named sections of candidate strings
//!
//! All structural edits go through methods here so the "at least one section"
//! invariant can't be broken from outside. The live model and the editor's
//! working copy share these operations.

use serde::Serialize;
use std::borrow::Cow;
use tracing::debug;

use crate::constants::{config, display};
use crate::error::{Error, Result};

/// Document-wide settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    #[serde(rename = "truncate_length")]
    display_length: usize,
}

impl Settings {
    /// Settings with a display length clamped into the valid range
    pub fn with_display_length(length: usize) -> Self {
        Self {
            display_length: length.clamp(display::MIN_LENGTH, display::MAX_LENGTH),
        }
    }

    pub fn display_length(&self) -> usize {
        self.display_length
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            display_length: display::DEFAULT_LENGTH,
        }
    }
}

/// A named, ordered group of candidate strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub name: String,
    pub strings: Vec<String>,
}

impl Section {
    pub fn new(name: impl Into<String>, strings: Vec<String>) -> Self {
        Self {
            name: name.into(),
            strings,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    settings: Settings,
    sections: Vec<Section>,
}

impl Default for Document {
    /// One "General" section holding the placeholder strings
    fn default() -> Self {
        let strings = config::PLACEHOLDER_STRINGS
            .iter()
            .map(|s| s.to_string())
            .collect();
        Self {
            settings: Settings::default(),
            sections: vec![Section::new(config::DEFAULT_SECTION, strings)],
        }
    }
}

impl Document {
    /// Build a document, adding an empty default section if `sections` is empty
    pub fn new(settings: Settings, mut sections: Vec<Section>) -> Self {
        if sections.is_empty() {
            sections.push(Section::new(config::DEFAULT_SECTION, Vec::new()));
        }
        Self { settings, sections }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Text as shown in lists, truncated to the configured display length
    pub fn display<'a>(&self, text: &'a str) -> Cow<'a, str> {
        truncate(text, self.settings.display_length)
    }

    // ==========================================================================
    // Sections
    // ==========================================================================

    /// Append an empty section, returning its index
    pub fn add_section(&mut self, name: &str) -> Result<usize> {
        let name = validate_name(name)?;
        self.sections.push(Section::new(name, Vec::new()));
        debug!(index = self.sections.len() - 1, "added section");
        Ok(self.sections.len() - 1)
    }

    pub fn rename_section(&mut self, index: usize, name: &str) -> Result<()> {
        let name = validate_name(name)?;
        let section = self.section_mut(index)?;
        section.name = name;
        Ok(())
    }

    /// Remove a section with all of its strings
    pub fn remove_section(&mut self, index: usize) -> Result<Section> {
        if self.sections.len() <= 1 {
            return Err(Error::invariant("cannot remove the last section"));
        }
        self.section_mut(index)?;
        Ok(self.sections.remove(index))
    }

    /// Move the section at `from` so it ends up at `to`; out-of-range is a no-op
    pub fn reorder_sections(&mut self, from: usize, to: usize) -> bool {
        let len = self.sections.len();
        if from >= len || to >= len || from == to {
            return false;
        }
        let section = self.sections.remove(from);
        self.sections.insert(to, section);
        true
    }

    // ==========================================================================
    // Strings
    // ==========================================================================

    /// Append a string to a section. All-whitespace text is ignored.
    pub fn add_string(&mut self, section: usize, text: &str) -> bool {
        if text.trim().is_empty() {
            debug!(section, "ignoring blank string");
            return false;
        }
        match self.sections.get_mut(section) {
            Some(section) => {
                section.strings.push(text.to_string());
                true
            }
            None => false,
        }
    }

    /// Replace the text of an existing string
    pub fn set_string(&mut self, section: usize, position: usize, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Err(Error::validation("string must not be blank"));
        }
        let slot = self
            .section_mut(section)?
            .strings
            .get_mut(position)
            .ok_or_else(|| Error::invariant(format!("no string at position {position}")))?;
        *slot = text.to_string();
        Ok(())
    }

    pub fn remove_string(&mut self, section: usize, position: usize) -> Option<String> {
        let strings = &mut self.sections.get_mut(section)?.strings;
        (position < strings.len()).then(|| strings.remove(position))
    }

    /// Move a string to the end of another section
    pub fn move_string(&mut self, position: usize, from: usize, to: usize) -> bool {
        if from == to || to >= self.sections.len() {
            return false;
        }
        match self.remove_string(from, position) {
            Some(text) => {
                self.sections[to].strings.push(text);
                true
            }
            None => false,
        }
    }

    /// Swap a string with its predecessor; the first item stays put
    pub fn move_up(&mut self, position: usize, section: usize) -> bool {
        match self.sections.get_mut(section) {
            Some(s) if position > 0 && position < s.strings.len() => {
                s.strings.swap(position, position - 1);
                true
            }
            _ => false,
        }
    }

    /// Swap a string with its successor; the last item stays put
    pub fn move_down(&mut self, position: usize, section: usize) -> bool {
        match self.sections.get_mut(section) {
            Some(s) if position + 1 < s.strings.len() => {
                s.strings.swap(position, position + 1);
                true
            }
            _ => false,
        }
    }

    // ==========================================================================
    // Settings
    // ==========================================================================

    /// Set the display length. Values below the minimum are rejected, values
    /// above the maximum are clamped. Returns the length actually stored.
    pub fn set_display_length(&mut self, length: i64) -> Result<usize> {
        if length < display::MIN_LENGTH as i64 {
            return Err(Error::validation(format!(
                "display length must be at least {}",
                display::MIN_LENGTH
            )));
        }
        let length = usize::try_from(length).unwrap_or(display::MAX_LENGTH);
        self.settings = Settings::with_display_length(length);
        Ok(self.settings.display_length)
    }

    fn section_mut(&mut self, index: usize) -> Result<&mut Section> {
        self.sections
            .get_mut(index)
            .ok_or_else(|| Error::invariant(format!("no section at index {index}")))
    }
}

fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("section name must not be empty"));
    }
    Ok(trimmed.to_string())
}

/// First `max_len` characters followed by an ellipsis, or the text unchanged
/// if it already fits
pub fn truncate(text: &str, max_len: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_len) {
        None => Cow::Borrowed(text),
        Some((cut, _)) => Cow::Owned(format!("{}{}", &text[..cut], display::ELLIPSIS)),
    }
}
