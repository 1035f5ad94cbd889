//! Error handling for DiagramKit
//!
//! Every recoverable condition in the entity core is surfaced as a value of
//! [`DiagramError`]:
//! - Validation failures (semantically invalid entities)
//! - Not-found ids on update/delete
//! - Missing dependencies (connector geometry without its shapes)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

use crate::types::EntityKind;

/// Main error type for the diagram entity core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiagramError {
    /// Entity failed one or more validation rules
    #[error("Validation failed for '{entity_id}': {}", errors.join("; "))]
    Validation {
        /// Id of the rejected entity (may be empty when the id itself is invalid).
        entity_id: String,
        /// Every violated rule, in rule order.
        errors: Vec<String>,
    },

    /// No entity with this id exists
    #[error("Entity not found: {id}")]
    NotFound {
        /// The id that was looked up.
        id: String,
    },

    /// An entity with this id already exists
    #[error("Duplicate entity id: {id}")]
    DuplicateId {
        /// The conflicting id.
        id: String,
    },

    /// Entity exists but has a different kind than the operation expects
    #[error("Entity '{id}' is not a {expected}")]
    KindMismatch {
        /// The entity id.
        id: String,
        /// The kind the operation required.
        expected: EntityKind,
    },

    /// A dependency needed to complete the operation is absent
    #[error("Missing dependency: {what}")]
    MissingDependency {
        /// Description of the absent dependency.
        what: String,
    },

    /// Document import/export problem
    #[error("Document error: {0}")]
    Document(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl DiagramError {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        DiagramError::Other(msg.into())
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        DiagramError::NotFound { id: id.into() }
    }

    pub fn validation(entity_id: impl Into<String>, errors: Vec<String>) -> Self {
        DiagramError::Validation {
            entity_id: entity_id.into(),
            errors,
        }
    }

    /// Check if this is a validation failure
    pub fn is_validation(&self) -> bool {
        matches!(self, DiagramError::Validation { .. })
    }

    /// Check if this is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, DiagramError::NotFound { .. })
    }

    /// Validation messages carried by this error, empty for other variants.
    pub fn messages(&self) -> &[String] {
        match self {
            DiagramError::Validation { errors, .. } => errors,
            _ => &[],
        }
    }
}

/// Result type using DiagramError
pub type Result<T> = std::result::Result<T, DiagramError>;
