use thiserror::Error;

use crate::value::ValueKind;

pub type NamespaceResult<T> = Result<T, NamespaceError>;

/// Errors raised by registry operations.
#[derive(Debug, Error, Clone)]
pub enum NamespaceError {
    #[error("Namespace collision at '{segment}' while creating {fqn}: slot holds {occupant}")]
    Collision {
        segment: String,
        fqn: String,
        occupant: ValueKind,
    },

    #[error("Namespace already exists: {fqn}")]
    AlreadyExists { fqn: String },

    #[error("Namespace not found: {fqn}")]
    NotFound { fqn: String },

    #[error("Cannot export '{name}' from {fqn}")]
    Export { name: String, fqn: String },

    #[error("Unresolved dependencies [{}]: {source}", .fqns.join(","))]
    Dependency {
        fqns: Vec<String>,
        #[source]
        source: Box<NamespaceError>,
    },

    #[error("Invalid namespace name '{fqn}': {reason}")]
    InvalidFqn { fqn: String, reason: String },

    #[error("Scheduler error: {0}")]
    Scheduler(String),
}

impl NamespaceError {
    pub fn invalid_fqn(fqn: impl Into<String>, reason: impl Into<String>) -> Self {
        NamespaceError::InvalidFqn {
            fqn: fqn.into(),
            reason: reason.into(),
        }
    }

    pub fn already_exists(fqn: impl ToString) -> Self {
        NamespaceError::AlreadyExists {
            fqn: fqn.to_string(),
        }
    }

    pub fn not_found(fqn: impl ToString) -> Self {
        NamespaceError::NotFound {
            fqn: fqn.to_string(),
        }
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, NamespaceError::AlreadyExists { .. })
    }
}
