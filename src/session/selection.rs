//! Per-section selection flags, positionally aligned with each section's strings
//!
//! Flags are keyed by (section index, position), never by string content,
//! because strings may repeat. Entries are created lazily the first time a
//! section is touched and survive navigation between sections.

use std::collections::HashMap;
use tracing::{debug, warn};

use crate::config::Document;

#[derive(Debug, Default)]
pub struct SelectionCache {
    sections: HashMap<usize, Vec<bool>>,
}

impl SelectionCache {
    pub fn is_selected(&mut self, document: &Document, section: usize, position: usize) -> bool {
        self.flags(document, section)
            .and_then(|flags| flags.get(position).copied())
            .unwrap_or(false)
    }

    /// Flip one flag, returning its new value. Out-of-range positions are ignored.
    pub fn toggle(&mut self, document: &Document, section: usize, position: usize) -> bool {
        match self.flags(document, section).and_then(|flags| flags.get_mut(position)) {
            Some(flag) => {
                *flag = !*flag;
                *flag
            }
            None => false,
        }
    }

    /// Texts of every selected string: section order, then position order
    pub fn selected_texts<'d>(&self, document: &'d Document) -> Vec<&'d str> {
        document
            .sections()
            .iter()
            .enumerate()
            .filter_map(|(idx, section)| {
                self.sections
                    .get(&idx)
                    .filter(|flags| flags.len() == section.strings.len())
                    .map(|flags| (section, flags))
            })
            .flat_map(|(section, flags)| {
                section
                    .strings
                    .iter()
                    .zip(flags)
                    .filter(|(_, selected)| **selected)
                    .map(|(text, _)| text.as_str())
            })
            .collect()
    }

    pub fn total_selected_count(&self) -> usize {
        self.sections
            .values()
            .map(|flags| flags.iter().filter(|selected| **selected).count())
            .sum()
    }

    /// Drop every entry. Positional alignment can't be repaired after a
    /// structural change, so the whole cache goes.
    pub fn invalidate(&mut self) {
        debug!(sections = self.sections.len(), "invalidating selection cache");
        self.sections.clear();
    }

    /// Flags for a section, materialized as all-false on first access
    fn flags(&mut self, document: &Document, section: usize) -> Option<&mut Vec<bool>> {
        let len = document.section(section)?.strings.len();
        let flags = self
            .sections
            .entry(section)
            .or_insert_with(|| vec![false; len]);
        if flags.len() != len {
            warn!(section, cached = flags.len(), actual = len, "selection cache out of step with section, resetting it");
            *flags = vec![false; len];
        }
        Some(flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Section, Settings};

    fn document() -> Document {
        Document::new(
            Settings::default(),
            vec![
                Section::new("General", vec!["x".into(), "y".into(), "x".into()]),
                Section::new("Work", vec!["z".into()]),
                Section::new("Empty", Vec::new()),
            ],
        )
    }

    #[test]
    fn test_lazily_all_false() {
        let doc = document();
        let mut cache = SelectionCache::default();
        assert!(!cache.is_selected(&doc, 0, 0));
        assert!(!cache.is_selected(&doc, 0, 2));
        assert_eq!(cache.total_selected_count(), 0);
        assert!(cache.selected_texts(&doc).is_empty());
    }

    #[test]
    fn test_toggle_flips() {
        let doc = document();
        let mut cache = SelectionCache::default();
        assert!(cache.toggle(&doc, 0, 1));
        assert!(cache.is_selected(&doc, 0, 1));
        assert!(!cache.toggle(&doc, 0, 1));
        assert!(!cache.is_selected(&doc, 0, 1));
    }

    #[test]
    fn test_out_of_range_ignored() {
        let doc = document();
        let mut cache = SelectionCache::default();
        assert!(!cache.toggle(&doc, 0, 3));
        assert!(!cache.toggle(&doc, 9, 0));
        assert!(!cache.toggle(&doc, 2, 0));
        assert_eq!(cache.total_selected_count(), 0);
    }

    #[test]
    fn test_duplicates_tracked_by_position() {
        let doc = document();
        let mut cache = SelectionCache::default();
        cache.toggle(&doc, 0, 2);
        assert!(!cache.is_selected(&doc, 0, 0));
        assert!(cache.is_selected(&doc, 0, 2));
        assert_eq!(cache.selected_texts(&doc), ["x"]);
    }

    #[test]
    fn test_selected_texts_section_then_position_order() {
        let doc = document();
        let mut cache = SelectionCache::default();
        cache.toggle(&doc, 1, 0);
        cache.toggle(&doc, 0, 2);
        cache.toggle(&doc, 0, 0);
        assert_eq!(cache.selected_texts(&doc), ["x", "x", "z"]);
        assert_eq!(cache.total_selected_count(), 3);
    }

    #[test]
    fn test_invalidate_clears_everything() {
        let doc = document();
        let mut cache = SelectionCache::default();
        cache.toggle(&doc, 0, 0);
        cache.toggle(&doc, 1, 0);
        cache.invalidate();
        assert_eq!(cache.total_selected_count(), 0);
        assert!(!cache.is_selected(&doc, 0, 0));
    }

    #[test]
    fn test_length_mismatch_resets_section() {
        let doc = document();
        let mut cache = SelectionCache::default();
        cache.toggle(&doc, 0, 0);

        let mut changed = doc.clone();
        changed.add_string(0, "new");
        assert!(cache.selected_texts(&changed).is_empty());
        assert!(!cache.is_selected(&changed, 0, 0));
        assert_eq!(cache.total_selected_count(), 0);
    }
}
