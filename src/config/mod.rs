//! Configuration layer for dynatrace-notify.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Two-level notifier settings ([`Settings`], [`EffectiveSettings`])
//! - Validated configuration ([`ValidatedConfig`])
//! - Configuration file generation ([`write_default_config`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Every notifier option exists twice:
//!
//! 1. **Per job** - command-line flags (`--url`, `--entity-id`, `--disable-in-progress`, ...)
//! 2. **Global** - the `[global]` table of the config file
//!
//! A per-job string wins when it is non-blank; a per-job boolean wins when it
//! was given at all, so `--disable-in-progress=false` overrides a global `true`.
//! The rule lives in [`Settings::effective`] and nowhere else.
//!
//! # Credentials
//!
//! `--api-token` (or `DT_API_TOKEN`) is a job-scoped secret registered under
//! the effective credentials id. Instance-scoped tokens and client
//! certificates come from `[credentials.<id>]` tables. The job scope is
//! searched first.
//!
//! # Build Metadata
//!
//! The build is described by `--job-name`, `--build-number` and friends,
//! which default to the variables Jenkins exports (`JOB_NAME`,
//! `BUILD_NUMBER`, `BUILD_DISPLAY_NAME`, `BUILD_URL`, `JENKINS_URL`).

mod cli;
pub mod defaults;
mod error;
mod settings;
mod toml;
mod validated;

#[cfg(test)]
mod toml_tests;
#[cfg(test)]
mod validated_tests;

pub use cli::{BuildArgs, Cli, Command, JobArgs};
pub use error::{ConfigError, field};
pub use settings::{EffectiveSettings, Flag, GlobalSettings, JobSettings, Settings, Text};
pub use toml::{CredentialsSection, ProxySection, TomlConfig, default_config_template};
pub use validated::{AppCredentials, CLI_CREDENTIALS_ID, ValidatedConfig, write_default_config};
