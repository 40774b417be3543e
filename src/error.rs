//! Error taxonomy for picker operations
//!
//! Parse and load failures never show up here: the store recovers from them
//! locally by falling back to the default document.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Rejected user input (blank name, invalid numeric setting).
    /// The document being mutated is left unchanged.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Programming-contract violation (removing the last section, acting on a
    /// finished edit session). Fatal to the operation, never to the process.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("failed to save document to {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A focus/clipboard collaborator failed or timed out. Always non-fatal.
    #[error("{tool} failed: {reason}")]
    ExternalTool { tool: &'static str, reason: String },
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation(message.into())
    }

    pub fn external(tool: &'static str, reason: impl Into<String>) -> Self {
        Self::ExternalTool {
            tool,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
