//! Error types for a notification attempt.

use thiserror::Error;

use crate::transport::HttpError;

/// Why a notification could not be delivered.
///
/// Hooks log these and carry on; they never reach the build runtime.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Neither the build nor the global configuration supplies a CI root URL.
    #[error("Jenkins Root URL not configured")]
    MissingRootUrl,

    /// No Dynatrace base URL is configured.
    #[error("Dynatrace Server URL not configured")]
    MissingBaseUrl,

    /// The expanded base URL does not form a valid events URL.
    #[error("Invalid Dynatrace events URL '{url}': {source}")]
    InvalidUrl {
        /// The rejected URL
        url: String,
        /// Parser diagnostic
        #[source]
        source: url::ParseError,
    },

    /// The payload could not be serialized.
    #[error("Failed to serialize event payload: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The API token contains characters not allowed in a header.
    #[error("API token is not a valid header value: {0}")]
    InvalidHeader(#[from] http::header::InvalidHeaderValue),

    /// The request could not be sent or no response was received.
    #[error(transparent)]
    Http(#[from] HttpError),
}
