use thiserror::Error;

/// Errors from [`crate::geocode::Geocoder::lookup`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    /// The address was blank.
    #[error("address must not be empty")]
    EmptyAddress,

    /// The service returned no match for the address.
    #[error("no coordinates found for address '{address}'")]
    NotFound {
        /// Address that was looked up.
        address: String,
    },

    /// The request could not reach the service.
    #[error("request to {url} failed: {message}")]
    NetworkError {
        /// Request URL.
        url: String,
        /// Transport error description.
        message: String,
    },

    /// The request exceeded its deadline.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Request URL.
        url: String,
        /// Configured timeout.
        timeout_secs: u64,
    },

    /// The service answered with a non-success status.
    #[error("request to {url} returned HTTP {status}: {message}")]
    HttpError {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error description.
        message: String,
    },

    /// The response body was not in the expected shape.
    #[error("failed to parse geocoding response: {message}")]
    ParseError {
        /// Parse failure description.
        message: String,
    },
}
