//! Crate-wide error type.

use thiserror::Error;

/// Catch-all error for this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// A validation error raised while constructing a registry, a table, or
    /// an options record. Carries a human-readable message; no partial
    /// state is committed when this is returned.
    #[error("{0}")]
    General(String),
    /// Error that does not originate from this crate.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result alias used throughout construction-time fallible APIs.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build a [`Error::General`] from anything [`ToString`].
    pub fn general(msg: impl ToString) -> Self {
        Self::General(msg.to_string())
    }
}
