//! Store error taxonomy.

use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by a passenger store.
///
/// A closed set: backends must map driver-level failures onto one of these
/// kinds rather than leaking their own error types. Anything a backend cannot
/// classify becomes [`RepositoryError::Unavailable`]; the reason string is
/// for logs, never for callers.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The operation targeted an identifier with no stored record.
    #[error("passenger {id} not found")]
    NotFound {
        /// The identifier that was addressed.
        id: Uuid,
    },

    /// A create collided with an existing identifier.
    #[error("passenger {id} already exists")]
    AlreadyExists {
        /// The colliding identifier.
        id: Uuid,
    },

    /// A durable transaction could not be serialized within the retry budget.
    #[error("transaction aborted after {attempts} conflicting attempts")]
    Conflict {
        /// Attempts made before giving up.
        attempts: u32,
    },

    /// Backend I/O failure or an unclassified driver error.
    #[error("repository unavailable: {reason}")]
    Unavailable {
        /// Backend detail, logged but never surfaced to callers.
        reason: String,
    },
}

impl RepositoryError {
    /// Wrap an arbitrary backend failure.
    pub fn unavailable(err: impl std::fmt::Display) -> Self {
        Self::Unavailable {
            reason: err.to_string(),
        }
    }
}
