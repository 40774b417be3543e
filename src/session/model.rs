//! Live in-memory document for the running session

use std::borrow::Cow;
use tracing::info;

use crate::config::{Document, Section};

/// Owns the canonical document while the picker runs. Read access is free;
/// the only write path is a whole-document replace from a committed edit.
#[derive(Debug)]
pub struct SectionModel {
    document: Document,
}

impl SectionModel {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn sections(&self) -> &[Section] {
        self.document.sections()
    }

    pub fn section_count(&self) -> usize {
        self.document.section_count()
    }

    pub fn display<'a>(&self, text: &'a str) -> Cow<'a, str> {
        self.document.display(text)
    }

    /// Swap in a committed working copy
    pub(super) fn replace(&mut self, document: Document) {
        info!(sections = document.section_count(), "Replacing live document");
        self.document = document;
    }
}
