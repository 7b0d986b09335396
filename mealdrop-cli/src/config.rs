//! Layered service configuration shared by every subcommand.

use std::time::Duration;

use camino::Utf8PathBuf;
use clap::Parser;
use mealdrop_core::{Geocoder, SqliteStore};
use mealdrop_data::geocoding::{
    DEFAULT_BASE_URL, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, NominatimConfig, NominatimGeocoder,
};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{ARG_DATABASE, ARG_GEOCODER_TIMEOUT, ARG_GEOCODER_URL, ARG_USER_AGENT, CliError};

/// Database used when none is configured.
pub(crate) const DEFAULT_DATABASE: &str = "mealdrop.db";

/// Database and geocoder options, layered from CLI flags, configuration
/// files and environment variables.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(name = "mealdrop")]
#[ortho_config(prefix = "MEALDROP")]
pub(crate) struct ServiceArgs {
    /// Path to the SQLite database (default `mealdrop.db`).
    #[arg(long = ARG_DATABASE, value_name = "path", global = true)]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Base URL of a Nominatim-compatible geocoding service.
    #[arg(long = ARG_GEOCODER_URL, value_name = "url", global = true)]
    #[serde(default)]
    pub(crate) geocoder_url: Option<String>,
    /// Geocoder request timeout in seconds.
    #[arg(long = ARG_GEOCODER_TIMEOUT, value_name = "secs", global = true)]
    #[serde(default)]
    pub(crate) geocoder_timeout_secs: Option<u64>,
    /// User agent sent to the geocoding service.
    #[arg(long = ARG_USER_AGENT, value_name = "agent", global = true)]
    #[serde(default)]
    pub(crate) user_agent: Option<String>,
}

impl ServiceArgs {
    pub(crate) fn into_config(self) -> Result<ServiceConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        Ok(ServiceConfig::from(merged))
    }
}

/// Resolved service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ServiceConfig {
    /// SQLite database location.
    pub(crate) database: Utf8PathBuf,
    /// Settings for the HTTP geocoder.
    pub(crate) geocoder: NominatimConfig,
}

impl ServiceConfig {
    pub(crate) fn open_store(&self) -> Result<SqliteStore, CliError> {
        SqliteStore::open(&self.database).map_err(|source| CliError::OpenStore {
            path: self.database.clone(),
            source,
        })
    }
}

impl From<ServiceArgs> for ServiceConfig {
    fn from(args: ServiceArgs) -> Self {
        let database = args
            .database
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE));
        let timeout = args
            .geocoder_timeout_secs
            .map_or(DEFAULT_TIMEOUT, Duration::from_secs);
        let geocoder = NominatimConfig::new(
            args.geocoder_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
        )
        .with_timeout(timeout)
        .with_user_agent(
            args.user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned()),
        );
        Self { database, geocoder }
    }
}

/// Builds the geocoder used when a command needs an address resolved.
pub(crate) trait GeocoderBuilder {
    fn build(&self, config: &ServiceConfig) -> Result<Box<dyn Geocoder>, CliError>;
}

/// Builds a [`NominatimGeocoder`] from the service configuration.
pub(crate) struct NominatimBuilder;

impl GeocoderBuilder for NominatimBuilder {
    fn build(&self, config: &ServiceConfig) -> Result<Box<dyn Geocoder>, CliError> {
        let geocoder = NominatimGeocoder::with_config(config.geocoder.clone()).map_err(|source| {
            CliError::BuildGeocoder {
                base_url: config.geocoder.base_url.clone(),
                source,
            }
        })?;
        Ok(Box::new(geocoder))
    }
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<ServiceConfig, CliError> {
    let merged = ServiceArgs::merge_from_layers(layers).map_err(CliError::from)?;
    Ok(ServiceConfig::from(merged))
}
