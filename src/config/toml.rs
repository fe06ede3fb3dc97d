//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::ConfigError;
use super::settings::GlobalSettings;

/// Root configuration structure from TOML file.
///
/// All sections are optional; per-job values come from the command line.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Instance-wide defaults
    #[serde(default)]
    pub global: GlobalSettings,

    /// Instance-scoped credentials, keyed by identifier
    #[serde(default)]
    pub credentials: BTreeMap<String, CredentialsSection>,

    /// Upstream HTTP proxy
    pub proxy: Option<ProxySection>,
}

/// One `[credentials.<id>]` entry.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialsSection {
    /// Dynatrace API token
    pub token: Option<String>,

    /// PEM file with the client certificate chain (and the key, if `key_pem` is unset)
    pub cert_pem: Option<PathBuf>,

    /// PEM file with the client private key
    pub key_pem: Option<PathBuf>,
}

/// Upstream proxy configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProxySection {
    /// Proxy URL
    pub url: String,

    /// User name for proxy authentication
    pub username: Option<String>,

    /// Password for proxy authentication
    pub password: Option<String>,

    /// Hosts reached without the proxy
    #[serde(default)]
    pub no_proxy: Vec<String>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# dynatrace-notify Configuration File
#
# Values in [global] are defaults. Per-job command-line flags override them.

[global]
# Dynatrace base URL (here or via --url; events are skipped without one)
# Handlebars macros are expanded, e.g. "https://{{env.DT_TENANT}}.live.dynatrace.com"
# url = "https://abc123.live.dynatrace.com"

# Credentials identifier; see [credentials.<id>] below
# credentials_id = "dynatrace"

# Monitored entity the events attach to
# entity_id = "SERVICE-0123456789ABCDEF"

# Build key template (default: <job>[-<number>]-<root url>)
# Available variables: {{JOB_NAME}}, {{JOB_BASE_NAME}}, {{BUILD_NUMBER}},
# {{BUILD_DISPLAY_NAME}}, {{BUILD_RESULT}}, {{JENKINS_URL}}
# project_key = "{{JOB_BASE_NAME}}-{{BUILD_NUMBER}}"

# Root URL of the CI system, used when JENKINS_URL / --root-url is not set
# root_url = "https://jenkins.example.com/"

# Accept unverifiable SSL certificates
# ignore_unverified_ssl = false

# Append the build number to the default build key
# include_build_number = false

# Prefix the build key with the parent folder name
# prepend_parent_key = false

# Skip in-progress notifications
# disable_in_progress = false

# Report UNSTABLE builds as SUCCESSFUL
# unstable_as_success = false

# Report nothing but successful builds
# only_report_success = false

# [credentials.dynatrace]
# API token sent as "Authorization: Api-Token <token>"
# token = "dt0c01.XXXX"
# Client certificate for mutual TLS (used with ignore_unverified_ssl)
# cert_pem = "/etc/dynatrace/client.crt"
# key_pem = "/etc/dynatrace/client.key"

# [proxy]
# Defaults to HTTPS_PROXY / HTTP_PROXY and NO_PROXY from the environment
# url = "http://proxy.example.com:3128"
# username = "user"
# password = "secret"
# no_proxy = ["localhost", ".internal.example.com"]
"#
    .to_string()
}
