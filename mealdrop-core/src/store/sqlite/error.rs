//! Failures surfaced by the SQLite record store.

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::{error::DomainError, geocode::GeocodeError, validation::ValidationError};

/// Error raised by [`SqliteStore`](super::SqliteStore) operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to create the parent directory for the database file.
    #[error("failed to create parent directory {path}")]
    CreateDirectory {
        /// Directory that could not be created.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path}")]
    Open {
        /// Database location.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Applying connection pragmas failed.
    #[error("failed to configure SQLite connection")]
    Configure {
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Creating tables or indices failed.
    #[error("failed to create store schema")]
    Schema {
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// A domain rule rejected the operation.
    #[error(transparent)]
    Domain(#[from] DomainError),
    /// Input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Resolving an address failed.
    #[error(transparent)]
    Geocode(#[from] GeocodeError),
    /// Generic SQLite error while reading or writing records.
    #[error(transparent)]
    Database(#[from] rusqlite::Error),
}

impl StoreError {
    /// Domain rule that rejected the operation, if any.
    #[must_use]
    pub const fn domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(err) => Some(err),
            _ => None,
        }
    }
}
