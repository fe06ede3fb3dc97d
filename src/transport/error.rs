//! Error types for transport operations.

use thiserror::Error;

/// Error type for HTTP operations.
///
/// Describes what went wrong without dictating recovery strategy.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network connection failed.
    ///
    /// This includes DNS resolution failures, connection refused,
    /// and other network-level errors.
    #[error("Connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The server's certificate could not be verified.
    #[error("TLS peer verification failed: {0}")]
    TlsVerification(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Request timed out.
    ///
    /// The server did not respond within the configured timeout period.
    #[error("Request timed out")]
    Timeout,

    /// The provided URL is invalid.
    ///
    /// This typically indicates a configuration error rather than
    /// a transient failure.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Error building a secure client context.
///
/// Never fatal: the transport logs it and falls back to default trust.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The client certificate could not be loaded as key material.
    #[error("Couldn't load client certificate: {0}")]
    Identity(#[source] reqwest::Error),

    /// The TLS-enabled client could not be initialized.
    #[error("Couldn't initialize SSL context: {0}")]
    Build(#[source] reqwest::Error),
}
