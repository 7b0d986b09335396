//! Error types emitted by the mealdrop CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use mealdrop_core::{StoreError, ValidationError};
use mealdrop_data::geocoding::ProviderBuildError;
use thiserror::Error;

/// Errors emitted by the mealdrop CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A date argument was not in `YYYY-MM-DD` or RFC 3339 form.
    #[error("invalid {field} '{value}': expected YYYY-MM-DD or an RFC 3339 timestamp")]
    InvalidDate {
        /// Long flag name of the option.
        field: &'static str,
        /// Value as supplied.
        value: String,
    },
    /// Command input failed domain validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Opening the database failed.
    #[error("failed to open database {path}: {source}")]
    OpenStore {
        /// Database location.
        path: Utf8PathBuf,
        /// Underlying store failure.
        #[source]
        source: StoreError,
    },
    /// A store operation was rejected or failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Constructing the HTTP geocoder failed.
    #[error("failed to build geocoder for {base_url}: {source}")]
    BuildGeocoder {
        /// Configured service root.
        base_url: String,
        /// Construction failure.
        #[source]
        source: ProviderBuildError,
    },
    /// Serialising command output failed.
    #[error("failed to serialise command output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write command output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
