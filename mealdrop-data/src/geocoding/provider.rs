//! `Geocoder` backed by a Nominatim-compatible HTTP service.

use std::time::Duration;

use geo::Coord;
use log::{debug, warn};
use mealdrop_core::{GeocodeError, Geocoder};
use reqwest::Client;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;

use super::nominatim::SearchResult;

/// Public OpenStreetMap Nominatim instance.
pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// User agent sent with every request. Nominatim rejects anonymous clients.
pub const DEFAULT_USER_AGENT: &str = "mealdrop-geocoder/0.1";

/// Request timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Error raised while constructing a [`NominatimGeocoder`].
#[derive(Debug, Error)]
pub enum ProviderBuildError {
    /// The base URL could not be parsed.
    #[error("invalid geocoder base URL '{url}'")]
    InvalidBaseUrl {
        /// URL as configured.
        url: String,
        /// Parse failure.
        #[source]
        source: url::ParseError,
    },
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime")]
    Runtime(#[source] std::io::Error),
}

/// Configuration for [`NominatimGeocoder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NominatimConfig {
    /// Service root, for example `"https://nominatim.openstreetmap.org"`.
    pub base_url: String,
    /// Connect and request timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl NominatimConfig {
    /// Configuration for the service at `base_url` with default settings.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Address lookup through the Nominatim search API.
///
/// The provider owns a `current_thread` Tokio runtime reused across calls.
/// Inside a multi-threaded runtime it blocks on the caller's handle through
/// [`tokio::task::block_in_place`]; inside a `current_thread` runtime it falls
/// back to its own runtime.
pub struct NominatimGeocoder {
    client: Client,
    config: NominatimConfig,
    search_url: Url,
    runtime: Runtime,
}

impl std::fmt::Debug for NominatimGeocoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NominatimGeocoder")
            .field("config", &self.config)
            .field("search_url", &self.search_url.as_str())
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish_non_exhaustive()
    }
}

impl NominatimGeocoder {
    /// Geocoder for `base_url` with default settings.
    ///
    /// # Errors
    /// Returns [`ProviderBuildError`] if the URL is invalid or the HTTP
    /// client or runtime cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(NominatimConfig::new(base_url))
    }

    /// Geocoder with explicit configuration.
    ///
    /// # Errors
    /// Returns [`ProviderBuildError`] if the URL is invalid or the HTTP
    /// client or runtime cannot be built.
    pub fn with_config(config: NominatimConfig) -> Result<Self, ProviderBuildError> {
        let search = format!("{}/search", config.base_url.trim_end_matches('/'));
        let search_url =
            Url::parse(&search).map_err(|source| ProviderBuildError::InvalidBaseUrl {
                url: config.base_url.clone(),
                source,
            })?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ProviderBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            search_url,
            runtime,
        })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &NominatimConfig {
        &self.config
    }

    fn search_url_for(&self, address: &str) -> Url {
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .append_pair("q", address)
            .append_pair("format", "json")
            .append_pair("limit", "1");
        url
    }

    async fn lookup_async(&self, address: &str) -> Result<Coord<f64>, GeocodeError> {
        let url = self.search_url_for(address);
        debug!("geocoding '{address}' via {url}");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;
        let results: Vec<SearchResult> =
            response.json().await.map_err(|err| GeocodeError::ParseError {
                message: err.to_string(),
            })?;

        let first = results.first().ok_or_else(|| GeocodeError::NotFound {
            address: address.to_owned(),
        })?;
        first.to_coord()
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &Url) -> GeocodeError {
        if error.is_timeout() {
            return GeocodeError::Timeout {
                url: url.to_string(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }
        if let Some(status) = error.status() {
            return GeocodeError::HttpError {
                url: url.to_string(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }
        GeocodeError::NetworkError {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

impl Geocoder for NominatimGeocoder {
    fn lookup(&self, address: &str) -> Result<Coord<f64>, GeocodeError> {
        if address.trim().is_empty() {
            return Err(GeocodeError::EmptyAddress);
        }

        let future = self.lookup_async(address);
        let result = match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        };
        if let Err(err) = &result {
            warn!("geocoding '{address}' failed: {err}");
        }
        result
    }
}
