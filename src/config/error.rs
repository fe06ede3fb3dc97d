//! Configuration errors.
//!
//! Variants returned from [`super::ValidatedConfig::from_raw`] end the
//! process with the configuration exit code. [`ConfigError::CertificateRead`]
//! is only logged: the notification goes out without a client certificate.

use std::path::PathBuf;

use thiserror::Error;

/// Why the command line and config file could not be turned into a
/// [`super::ValidatedConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The `--config` file is missing or unreadable.
    #[error("Cannot read config file '{}': {source}", path.display())]
    FileRead {
        /// Config file path
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML or has unknown keys.
    #[error("Invalid config file: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// `init` could not write the template.
    #[error("Cannot write config template to '{}': {source}", path.display())]
    FileWrite {
        /// Target path
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Build metadata is absent from both the CLI and the environment.
    #[error("Missing required field: {field}. {hint}")]
    MissingRequired {
        /// Field name, one of the [`field`] constants
        field: &'static str,
        /// Where the value can be supplied
        hint: &'static str,
    },

    /// A proxy URL could not be parsed.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The rejected value
        url: String,
        /// Parser diagnostic
        reason: String,
    },

    /// `--result` names no known build result.
    #[error(transparent)]
    InvalidBuildResult(#[from] crate::build::ParseBuildResultError),

    /// A `[credentials.<id>]` table is empty or contradictory.
    #[error("Invalid credentials '{id}': {reason}")]
    InvalidCredentials {
        /// Credentials identifier
        id: String,
        /// What is wrong with the entry
        reason: &'static str,
    },

    /// A `cert_pem` or `key_pem` file could not be read.
    #[error("Cannot read PEM file '{}' for credentials '{id}': {source}", path.display())]
    CertificateRead {
        /// Credentials identifier
        id: String,
        /// PEM file path
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Field names carried by [`ConfigError::MissingRequired`].
pub mod field {
    /// Full job name (`--job-name` / `JOB_NAME`)
    pub const JOB_NAME: &str = "job_name";
    /// Build number (`--build-number` / `BUILD_NUMBER`)
    pub const BUILD_NUMBER: &str = "build_number";
}

impl ConfigError {
    /// Shorthand for [`ConfigError::MissingRequired`].
    #[must_use]
    pub const fn missing(field: &'static str, hint: &'static str) -> Self {
        Self::MissingRequired { field, hint }
    }
}
