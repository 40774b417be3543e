//! Section navigation, selection and composition of the pasted text

use tracing::{debug, info};

use super::model::SectionModel;
use super::selection::SelectionCache;
use crate::constants::compose;

#[derive(Debug, Default)]
pub struct PickerSession {
    current: usize,
    selection: SelectionCache,
}

impl PickerSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_section(&self) -> usize {
        self.current
    }

    /// Step through sections with wraparound. A single section never moves.
    pub fn navigate(&mut self, model: &SectionModel, delta: isize) -> usize {
        let count = model.section_count();
        if count > 1 {
            let count = count as isize;
            self.current = (self.current as isize + delta).rem_euclid(count) as usize;
            debug!(section = self.current, "navigated");
        }
        self.current
    }

    /// Whether `position` in the current section is selected
    pub fn is_selected(&mut self, model: &SectionModel, position: usize) -> bool {
        self.selection
            .is_selected(model.document(), self.current, position)
    }

    /// Toggle `position` in the current section, returning the new state
    pub fn toggle(&mut self, model: &SectionModel, position: usize) -> bool {
        self.selection.toggle(model.document(), self.current, position)
    }

    pub fn total_selected_count(&self) -> usize {
        self.selection.total_selected_count()
    }

    /// The composed text, or `None` when nothing is selected anywhere.
    /// Order is section then position, whichever section is on screen.
    pub fn confirm(&self, model: &SectionModel) -> Option<String> {
        let texts = self.selection.selected_texts(model.document());
        if texts.is_empty() {
            info!("Confirmed with nothing selected");
            return None;
        }
        info!(count = texts.len(), "Composed selection");
        Some(texts.join(compose::SEPARATOR))
    }

    /// Forget all selection state and return to the first section
    pub fn cancel(&mut self) {
        self.selection.invalidate();
        self.current = 0;
    }

    pub(super) fn selection_mut(&mut self) -> &mut SelectionCache {
        &mut self.selection
    }

    /// Keep the current index valid after the section list changed
    pub(super) fn clamp_current(&mut self, count: usize) {
        if self.current >= count {
            self.current = count.saturating_sub(1);
        }
    }
}
