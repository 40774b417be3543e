//! Picker session state machine
//!
//! `Session` ties together the live model, the picker's navigation and
//! selection, at most one edit session, and the modal stack that decides
//! whether losing focus should close the picker.

mod edit;
mod model;
mod picker;
mod selection;

pub use edit::EditSession;
pub use model::SectionModel;
pub use picker::PickerSession;

use tracing::{debug, info, warn};

use crate::config::DocumentStore;
use crate::error::{Error, Result};

pub struct Session {
    store: Box<dyn DocumentStore>,
    model: SectionModel,
    picker: PickerSession,
    editor: Option<EditSession>,
    modal_depth: usize,
}

impl Session {
    /// Load the document once and start with nothing selected
    pub fn new(store: Box<dyn DocumentStore>) -> Self {
        let model = SectionModel::new(store.load());
        Self {
            store,
            model,
            picker: PickerSession::new(),
            editor: None,
            modal_depth: 0,
        }
    }

    pub fn model(&self) -> &SectionModel {
        &self.model
    }

    // ==========================================================================
    // Picking
    // ==========================================================================

    pub fn current_section(&self) -> usize {
        self.picker.current_section()
    }

    pub fn navigate(&mut self, delta: isize) -> usize {
        self.picker.navigate(&self.model, delta)
    }

    pub fn is_selected(&mut self, position: usize) -> bool {
        self.picker.is_selected(&self.model, position)
    }

    pub fn toggle(&mut self, position: usize) -> bool {
        self.picker.toggle(&self.model, position)
    }

    pub fn total_selected_count(&self) -> usize {
        self.picker.total_selected_count()
    }

    /// Composed text, or `None` if nothing is selected
    pub fn confirm(&self) -> Option<String> {
        self.picker.confirm(&self.model)
    }

    /// Drop any in-flight edit and all selection state
    pub fn cancel(&mut self) {
        if self.editor.is_some() {
            // Only fails on a terminal session, which is never stored
            let _ = self.discard_editor();
        }
        self.picker.cancel();
        info!("Session cancelled");
    }

    // ==========================================================================
    // Editing
    // ==========================================================================

    pub fn editor(&self) -> Option<&EditSession> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut EditSession> {
        self.editor.as_mut()
    }

    pub fn open_editor(&mut self) -> Result<()> {
        if self.editor.is_some() {
            return Err(Error::invariant("an edit session is already open"));
        }
        self.editor = Some(EditSession::open(&self.model));
        self.push_modal();
        Ok(())
    }

    /// Commit the open edit session. On failure the session stays open.
    pub fn commit_editor(&mut self) -> Result<()> {
        let editor = self
            .editor
            .as_mut()
            .ok_or_else(|| Error::invariant("no edit session to commit"))?;
        editor.commit(
            &mut self.model,
            self.store.as_ref(),
            self.picker.selection_mut(),
        )?;
        self.picker.clamp_current(self.model.section_count());
        self.editor = None;
        self.pop_modal();
        Ok(())
    }

    pub fn discard_editor(&mut self) -> Result<()> {
        let mut editor = self
            .editor
            .take()
            .ok_or_else(|| Error::invariant("no edit session to discard"))?;
        editor.discard()?;
        self.pop_modal();
        Ok(())
    }

    // ==========================================================================
    // Modal stack
    // ==========================================================================

    pub fn push_modal(&mut self) {
        self.modal_depth += 1;
        debug!(depth = self.modal_depth, "modal opened");
    }

    pub fn pop_modal(&mut self) {
        match self.modal_depth.checked_sub(1) {
            Some(depth) => self.modal_depth = depth,
            None => warn!("modal stack underflow ignored"),
        }
        debug!(depth = self.modal_depth, "modal closed");
    }

    #[cfg(test)]
    pub fn modal_depth(&self) -> usize {
        self.modal_depth
    }

    /// Focus loss closes the picker only when no child surface is open
    pub fn closes_on_focus_loss(&self) -> bool {
        self.modal_depth == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Document, JsonFileStore, Section, Settings};
    use std::fs;

    fn session_with(doc: &Document) -> (tempfile::TempDir, Session) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("strings.json"));
        store.save(doc).unwrap();
        (dir, Session::new(Box::new(store)))
    }

    fn general_and_work() -> Document {
        Document::new(
            Settings::default(),
            vec![
                Section::new("General", vec!["x".into(), "y".into()]),
                Section::new("Work", vec!["z".into()]),
            ],
        )
    }

    #[test]
    fn test_scenario_select_across_sections() {
        let (_dir, mut session) = session_with(&general_and_work());
        session.toggle(1);
        session.navigate(1);
        session.toggle(0);
        assert_eq!(session.total_selected_count(), 2);
        assert_eq!(session.confirm().as_deref(), Some("y, z"));
    }

    #[test]
    fn test_commit_saves_and_clears_selection() {
        let (dir, mut session) = session_with(&general_and_work());
        session.navigate(1);
        session.toggle(0);

        session.open_editor().unwrap();
        assert!(!session.closes_on_focus_loss());
        let editor = session.editor_mut().unwrap();
        editor.remove_section(1).unwrap();
        editor.add_string(0, "fresh").unwrap();
        session.commit_editor().unwrap();

        assert!(session.editor().is_none());
        assert!(session.closes_on_focus_loss());
        assert_eq!(session.total_selected_count(), 0);
        assert_eq!(session.current_section(), 0);
        assert_eq!(session.model().sections()[0].strings, ["x", "y", "fresh"]);

        let reloaded = JsonFileStore::new(dir.path().join("strings.json"));
        assert_eq!(&reloaded.load(), session.model().document());
    }

    #[test]
    fn test_discard_keeps_selection_and_file() {
        let doc = general_and_work();
        let (dir, mut session) = session_with(&doc);
        let on_disk = fs::read_to_string(dir.path().join("strings.json")).unwrap();
        session.toggle(0);

        session.open_editor().unwrap();
        session.editor_mut().unwrap().add_section("Temp").unwrap();
        session.discard_editor().unwrap();

        assert_eq!(session.model().document(), &doc);
        assert_eq!(session.total_selected_count(), 1);
        assert_eq!(fs::read_to_string(dir.path().join("strings.json")).unwrap(), on_disk);
        assert_eq!(session.modal_depth(), 0);
    }

    #[test]
    fn test_failed_commit_keeps_editor_open() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();
        let store = JsonFileStore::new(blocker.join("strings.json"));
        let mut session = Session::new(Box::new(store));
        session.toggle(0);

        session.open_editor().unwrap();
        session.editor_mut().unwrap().add_string(0, "unsaved").unwrap();
        let result = session.commit_editor();

        assert!(matches!(result, Err(Error::Persistence { .. })));
        assert!(session.editor().is_some());
        assert_eq!(session.model().document(), &Document::default());
        assert_eq!(session.total_selected_count(), 1);
        assert!(!session.closes_on_focus_loss());
    }

    #[test]
    fn test_only_one_editor() {
        let (_dir, mut session) = session_with(&general_and_work());
        session.open_editor().unwrap();
        assert!(matches!(session.open_editor(), Err(Error::InvariantViolation(_))));
        assert_eq!(session.modal_depth(), 1);
    }

    #[test]
    fn test_commit_or_discard_without_editor() {
        let (_dir, mut session) = session_with(&general_and_work());
        assert!(matches!(session.commit_editor(), Err(Error::InvariantViolation(_))));
        assert!(matches!(session.discard_editor(), Err(Error::InvariantViolation(_))));
    }

    #[test]
    fn test_modal_stack_suppresses_focus_close() {
        let (_dir, mut session) = session_with(&general_and_work());
        assert!(session.closes_on_focus_loss());
        session.open_editor().unwrap();
        session.push_modal();
        session.pop_modal();
        assert!(!session.closes_on_focus_loss());
        session.discard_editor().unwrap();
        assert!(session.closes_on_focus_loss());
        session.pop_modal();
        assert_eq!(session.modal_depth(), 0);
    }

    #[test]
    fn test_cancel_discards_editor_and_selection() {
        let (_dir, mut session) = session_with(&general_and_work());
        session.toggle(0);
        session.open_editor().unwrap();
        session.editor_mut().unwrap().add_section("Gone").unwrap();
        session.cancel();

        assert!(session.editor().is_none());
        assert_eq!(session.total_selected_count(), 0);
        assert_eq!(session.model().section_count(), 2);
        assert!(session.closes_on_focus_loss());
    }
}
