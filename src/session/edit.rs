//! Edit session: an isolated working copy committed or discarded as a unit
//!
//! States: `Open` (entry, mutable) then exactly one of `Committed` or
//! `Discarded` (both terminal). Nothing outside the working copy changes
//! until `commit` succeeds.

use tracing::{info, warn};

use super::model::SectionModel;
use super::selection::SelectionCache;
use crate::config::{Document, DocumentStore};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    Open,
    Committed,
    Discarded,
}

#[derive(Debug)]
pub struct EditSession {
    state: EditState,
    working: Document,
}

impl EditSession {
    /// Deep-copy the live document into a fresh working copy
    pub fn open(model: &SectionModel) -> Self {
        info!("Opening edit session");
        Self {
            state: EditState::Open,
            working: model.document().clone(),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> EditState {
        self.state
    }

    pub fn working_copy(&self) -> &Document {
        &self.working
    }

    pub fn add_section(&mut self, name: &str) -> Result<usize> {
        self.working_mut()?.add_section(name)
    }

    pub fn rename_section(&mut self, index: usize, name: &str) -> Result<()> {
        self.working_mut()?.rename_section(index, name)
    }

    /// Remove a section. Callers obtain user confirmation first; this only mutates.
    pub fn remove_section(&mut self, index: usize) -> Result<()> {
        self.working_mut()?.remove_section(index).map(|_| ())
    }

    pub fn reorder_sections(&mut self, from: usize, to: usize) -> Result<bool> {
        Ok(self.working_mut()?.reorder_sections(from, to))
    }

    pub fn add_string(&mut self, section: usize, text: &str) -> Result<bool> {
        Ok(self.working_mut()?.add_string(section, text))
    }

    pub fn set_string(&mut self, section: usize, position: usize, text: &str) -> Result<()> {
        self.working_mut()?.set_string(section, position, text)
    }

    pub fn remove_string(&mut self, section: usize, position: usize) -> Result<Option<String>> {
        Ok(self.working_mut()?.remove_string(section, position))
    }

    pub fn move_string(&mut self, position: usize, from: usize, to: usize) -> Result<bool> {
        Ok(self.working_mut()?.move_string(position, from, to))
    }

    pub fn move_up(&mut self, position: usize, section: usize) -> Result<bool> {
        Ok(self.working_mut()?.move_up(position, section))
    }

    pub fn move_down(&mut self, position: usize, section: usize) -> Result<bool> {
        Ok(self.working_mut()?.move_down(position, section))
    }

    pub fn set_display_length(&mut self, length: i64) -> Result<usize> {
        self.working_mut()?.set_display_length(length)
    }

    /// Persist the working copy, swap it into the live model and drop all
    /// selection state. A failed save leaves the session `Open` and the live
    /// document untouched, so the user can retry or cancel.
    pub fn commit(
        &mut self,
        model: &mut SectionModel,
        store: &dyn DocumentStore,
        cache: &mut SelectionCache,
    ) -> Result<()> {
        self.ensure_open("commit")?;

        if let Err(e) = store.save(&self.working) {
            warn!(error = %e, "Edit commit failed to persist, live document unchanged");
            return Err(e);
        }

        model.replace(std::mem::take(&mut self.working));
        cache.invalidate();
        self.state = EditState::Committed;
        info!("Edit session committed");
        Ok(())
    }

    /// Drop the working copy with no side effects
    pub fn discard(&mut self) -> Result<()> {
        self.ensure_open("discard")?;
        self.state = EditState::Discarded;
        info!("Edit session discarded");
        Ok(())
    }

    fn working_mut(&mut self) -> Result<&mut Document> {
        self.ensure_open("edit")?;
        Ok(&mut self.working)
    }

    fn ensure_open(&self, action: &str) -> Result<()> {
        match self.state {
            EditState::Open => Ok(()),
            state => Err(Error::invariant(format!(
                "cannot {action} an edit session that is {state:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Section, Settings};
    use std::cell::RefCell;
    use std::path::PathBuf;

    /// In-memory store that can be told to fail
    #[derive(Default)]
    struct MemoryStore {
        saved: RefCell<Vec<Document>>,
        fail: bool,
    }

    impl DocumentStore for MemoryStore {
        fn load(&self) -> Document {
            self.saved.borrow().last().cloned().unwrap_or_default()
        }

        fn save(&self, document: &Document) -> Result<()> {
            if self.fail {
                return Err(Error::Persistence {
                    path: PathBuf::from("/readonly/strings.json"),
                    source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
                });
            }
            self.saved.borrow_mut().push(document.clone());
            Ok(())
        }
    }

    fn model() -> SectionModel {
        SectionModel::new(Document::new(
            Settings::default(),
            vec![
                Section::new("General", vec!["x".into(), "y".into()]),
                Section::new("Work", vec!["z".into()]),
            ],
        ))
    }

    #[test]
    fn test_discard_never_touches_live_document() {
        let model = model();
        let before = model.document().clone();

        let mut edit = EditSession::open(&model);
        edit.add_section("Scratch").unwrap();
        edit.add_string(0, "added").unwrap();
        edit.move_string(0, 0, 1).unwrap();
        edit.remove_section(1).unwrap();
        edit.set_display_length(4).unwrap();
        edit.rename_section(0, "Renamed").unwrap();
        assert_ne!(edit.working_copy(), model.document());

        edit.discard().unwrap();
        assert_eq!(edit.state(), EditState::Discarded);
        assert_eq!(model.document(), &before);
    }

    #[test]
    fn test_commit_replaces_persists_and_invalidates() {
        let mut model = model();
        let store = MemoryStore::default();
        let mut cache = SelectionCache::default();
        cache.toggle(model.document(), 0, 0);

        let mut edit = EditSession::open(&model);
        edit.add_string(1, "w").unwrap();
        edit.commit(&mut model, &store, &mut cache).unwrap();

        assert_eq!(edit.state(), EditState::Committed);
        assert_eq!(model.sections()[1].strings, ["z", "w"]);
        assert_eq!(store.saved.borrow().len(), 1);
        assert_eq!(&store.saved.borrow()[0], model.document());
        assert_eq!(cache.total_selected_count(), 0);
    }

    #[test]
    fn test_failed_save_keeps_session_open_and_live_unchanged() {
        let mut model = model();
        let before = model.document().clone();
        let store = MemoryStore {
            fail: true,
            ..Default::default()
        };
        let mut cache = SelectionCache::default();
        cache.toggle(model.document(), 0, 1);

        let mut edit = EditSession::open(&model);
        edit.add_string(0, "pending").unwrap();
        let result = edit.commit(&mut model, &store, &mut cache);

        assert!(matches!(result, Err(Error::Persistence { .. })));
        assert_eq!(edit.state(), EditState::Open);
        assert_eq!(model.document(), &before);
        assert_eq!(cache.total_selected_count(), 1);
        assert_eq!(edit.working_copy().sections()[0].strings, ["x", "y", "pending"]);
    }

    #[test]
    fn test_terminal_states_reject_everything() {
        let mut model = model();
        let store = MemoryStore::default();
        let mut cache = SelectionCache::default();

        let mut edit = EditSession::open(&model);
        edit.discard().unwrap();
        assert!(matches!(edit.discard(), Err(Error::InvariantViolation(_))));
        assert!(matches!(
            edit.commit(&mut model, &store, &mut cache),
            Err(Error::InvariantViolation(_))
        ));
        assert!(matches!(edit.add_string(0, "late"), Err(Error::InvariantViolation(_))));
        assert!(store.saved.borrow().is_empty());

        let mut edit = EditSession::open(&model);
        edit.commit(&mut model, &store, &mut cache).unwrap();
        assert!(matches!(edit.discard(), Err(Error::InvariantViolation(_))));
        assert!(matches!(
            edit.commit(&mut model, &store, &mut cache),
            Err(Error::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_remove_only_section_leaves_working_copy_unchanged() {
        let model = SectionModel::new(Document::default());
        let mut edit = EditSession::open(&model);
        let before = edit.working_copy().clone();

        assert!(matches!(edit.remove_section(0), Err(Error::InvariantViolation(_))));
        assert_eq!(edit.working_copy(), &before);
        assert_eq!(edit.state(), EditState::Open);
    }

    #[test]
    fn test_validation_leaves_working_copy_unchanged() {
        let model = model();
        let mut edit = EditSession::open(&model);
        let before = edit.working_copy().clone();

        assert!(matches!(edit.add_section(" "), Err(Error::Validation(_))));
        assert!(matches!(edit.rename_section(0, ""), Err(Error::Validation(_))));
        assert!(matches!(edit.set_display_length(0), Err(Error::Validation(_))));
        assert_eq!(edit.working_copy(), &before);
    }
}
