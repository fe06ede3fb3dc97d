//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.
//! Build metadata defaults to the variables a Jenkins build exports, so a
//! pipeline step can usually call `dynatrace-notify finish --result SUCCESS`
//! without further arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::defaults;
use super::settings::JobSettings;

/// dynatrace-notify: report CI build events to Dynatrace
///
/// Sends deployment events for successful builds and annotation events for
/// every other state to the Dynatrace events API.
#[derive(Debug, Parser)]
#[command(name = "dynatrace-notify")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Per-job notifier settings
    #[command(flatten)]
    pub job: JobArgs,

    /// Build metadata
    #[command(flatten)]
    pub build: BuildArgs,

    /// Path to configuration file with global defaults
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Test mode - log the event without sending it
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for dynatrace-notify
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Report that a build is starting (INPROGRESS)
    Start,

    /// Report the outcome of a completed build
    Finish {
        /// Build result: SUCCESS, UNSTABLE, FAILURE, ABORTED or NOT_BUILT
        #[arg(long)]
        result: String,
    },

    /// Report from a pipeline step; ABORTED is always reported as FAILED
    Step {
        /// Build result so far; omit while the build is running
        #[arg(long)]
        result: Option<String>,
    },

    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = defaults::CONFIG_FILE_NAME)]
        output: PathBuf,
    },
}

/// Per-job settings; each overrides the `[global]` default when given.
///
/// Boolean options accept `--flag`, `--flag=true` or `--flag=false`.
#[derive(Debug, Default, Args)]
pub struct JobArgs {
    /// Dynatrace base URL (e.g. `https://abc123.live.dynatrace.com`)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Credentials identifier for the API token or client certificate
    #[arg(long = "credentials-id", global = true)]
    pub credentials_id: Option<String>,

    /// API token, registered under the effective credentials identifier
    #[arg(
        long = "api-token",
        env = "DT_API_TOKEN",
        hide_env_values = true,
        global = true
    )]
    pub api_token: Option<String>,

    /// Monitored entity the events attach to
    #[arg(long = "entity-id", global = true)]
    pub entity_id: Option<String>,

    /// Build key template (e.g. `{{JOB_BASE_NAME}}-{{BUILD_NUMBER}}`)
    #[arg(long = "project-key", global = true)]
    pub project_key: Option<String>,

    /// Accept unverifiable SSL certificates
    #[arg(long = "ignore-unverified-ssl", global = true, num_args = 0..=1, default_missing_value = "true", require_equals = true)]
    pub ignore_unverified_ssl: Option<bool>,

    /// Append the build number to the default build key
    #[arg(long = "include-build-number", global = true, num_args = 0..=1, default_missing_value = "true", require_equals = true)]
    pub include_build_number: Option<bool>,

    /// Prefix the build key with the parent folder name
    #[arg(long = "prepend-parent-key", global = true, num_args = 0..=1, default_missing_value = "true", require_equals = true)]
    pub prepend_parent_key: Option<bool>,

    /// Skip in-progress notifications
    #[arg(long = "disable-in-progress", global = true, num_args = 0..=1, default_missing_value = "true", require_equals = true)]
    pub disable_in_progress: Option<bool>,

    /// Report UNSTABLE builds as SUCCESSFUL
    #[arg(long = "unstable-as-success", global = true, num_args = 0..=1, default_missing_value = "true", require_equals = true)]
    pub unstable_as_success: Option<bool>,

    /// Report nothing but successful builds
    #[arg(long = "only-report-success", global = true, num_args = 0..=1, default_missing_value = "true", require_equals = true)]
    pub only_report_success: Option<bool>,
}

/// Build metadata, defaulting to the Jenkins build environment.
#[derive(Debug, Default, Args)]
pub struct BuildArgs {
    /// Full job name, slash-separated for jobs in folders
    #[arg(long = "job-name", env = "JOB_NAME", global = true)]
    pub job_name: Option<String>,

    /// Build number
    #[arg(long = "build-number", env = "BUILD_NUMBER", global = true)]
    pub build_number: Option<u64>,

    /// Build display name, shown after the full job name (default: `#<number>`)
    #[arg(long = "display-name", env = "BUILD_DISPLAY_NAME", global = true)]
    pub display_name: Option<String>,

    /// Build description
    #[arg(long, global = true)]
    pub description: Option<String>,

    /// Link back to the build (default: derived from the root URL)
    #[arg(long = "run-url", env = "BUILD_URL", global = true)]
    pub run_url: Option<String>,

    /// Root URL of the CI system
    #[arg(long = "root-url", env = "JENKINS_URL", global = true)]
    pub root_url: Option<String>,
}

impl JobArgs {
    /// Returns the per-job settings level.
    #[must_use]
    pub fn to_settings(&self) -> JobSettings {
        JobSettings {
            url: self.url.clone(),
            credentials_id: self.credentials_id.clone(),
            ignore_unverified_ssl: self.ignore_unverified_ssl,
            entity_id: self.entity_id.clone(),
            include_build_number: self.include_build_number,
            project_key: self.project_key.clone(),
            prepend_parent_key: self.prepend_parent_key,
            disable_in_progress: self.disable_in_progress,
            unstable_as_success: self.unstable_as_success,
            only_report_success: self.only_report_success,
        }
    }
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Command::Init { .. })
    }
}
