//! Error types for diagram processing
//!
//! This module defines the error type shared by the parsing and
//! synchronization pipeline.

use thiserror::Error;
use uuid::Uuid;

/// Errors produced by the diagram pipeline.
///
/// `Parse` is the only failure the parser itself raises (blank input);
/// everything else a malformed diagram can contain degrades to fewer
/// nodes/edges rather than an error.
#[derive(Error, Debug)]
pub enum DiagramError {
    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("Diagram {diagram_id} not found")]
    NotFound { diagram_id: Uuid },

    #[error("Diagram with identical content already exists: {diagram_id}")]
    AlreadyExists { diagram_id: Uuid },

    #[error("Store error: {source}")]
    Store {
        #[from]
        source: anyhow::Error,
    },
}

impl DiagramError {
    /// Create a new parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found(diagram_id: Uuid) -> Self {
        Self::NotFound { diagram_id }
    }

    /// Create a new duplicate-upload error
    pub fn already_exists(diagram_id: Uuid) -> Self {
        Self::AlreadyExists { diagram_id }
    }

    /// Returns true for parse failures
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}
