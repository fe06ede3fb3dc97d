//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::Path;

use url::Url;

use crate::build::{BuildResult, BuildSnapshot};
use crate::credentials::{ClientCertificate, InMemoryCredentials, LayeredCredentials, Secret};
use crate::notifier::Hook;
use crate::transport::ProxySettings;

use super::cli::{BuildArgs, Cli, Command};
use super::error::{ConfigError, field};
use super::settings::{Settings, Text};
use super::toml::{CredentialsSection, ProxySection, TomlConfig};

/// Credentials identifier used for `--api-token` when none is configured.
pub const CLI_CREDENTIALS_ID: &str = "cli-api-token";

/// Job-scoped store layered over the instance-scoped store.
pub type AppCredentials = LayeredCredentials<InMemoryCredentials, InMemoryCredentials>;

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// Lifecycle hook selected by the subcommand
    pub hook: Hook,

    /// The build being reported
    pub build: BuildSnapshot,

    /// Per-job settings layered over global defaults
    pub settings: Settings,

    /// Job-scoped credentials (from the CLI) over instance-scoped ones (from TOML)
    pub credentials: AppCredentials,

    /// Upstream proxies, from the config file or else the environment
    pub proxies: Vec<ProxySettings>,

    /// Dry-run mode (log the event without sending it)
    pub dry_run: bool,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let effective = self.settings.effective();
        let proxy_str = if self.proxies.is_empty() {
            "none".to_string()
        } else {
            self.proxies
                .iter()
                .map(|p| p.url.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };

        write!(
            f,
            "Config {{ hook: {:?}, build: {} #{}, url: {}, entity_id: {}, root_url: {}, \
             proxy: {}, dry_run: {} }}",
            self.hook,
            self.build.full_name(),
            self.build.number,
            effective.url.as_deref().unwrap_or("none"),
            effective.entity_id.as_deref().unwrap_or("none"),
            self.build
                .root_url
                .as_deref()
                .or(effective.root_url.as_deref())
                .unwrap_or("none"),
            proxy_str,
            self.dry_run,
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required build metadata is missing (`job_name`, `build_number`)
    /// - The build result or the proxy URL is invalid
    /// - A credentials entry is incomplete
    ///
    /// A missing Dynatrace URL or an unreadable certificate only affects the
    /// notification; the notifier logs those and the build carries on.
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let global = toml.map(|t| t.global.clone()).unwrap_or_default();
        let mut settings = Settings::new(cli.job.to_settings(), global);

        let (hook, result) = Self::resolve_hook(&cli.command)?;
        let mut build = Self::build_snapshot(&cli.build)?;
        if let Some(result) = result {
            build = build.with_result(result);
        }

        let job_credentials = Self::job_credentials(cli, &mut settings);
        let instance_credentials = Self::instance_credentials(toml)?;

        let proxies = match toml.and_then(|t| t.proxy.as_ref()) {
            Some(section) => vec![Self::proxy_from_section(section)?],
            None => ProxySettings::from_env(),
        };

        Ok(Self {
            hook,
            build,
            settings,
            credentials: LayeredCredentials::new(job_credentials, instance_credentials),
            proxies,
            dry_run: cli.dry_run,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = if let Some(ref path) = cli.config {
            Some(TomlConfig::load(path)?)
        } else {
            None
        };

        Self::from_raw(cli, toml.as_ref())
    }

    fn resolve_hook(command: &Command) -> Result<(Hook, Option<BuildResult>), ConfigError> {
        match command {
            Command::Start => Ok((Hook::BeforeRun, None)),
            Command::Finish { result } => Ok((Hook::AfterRun, Some(result.parse::<BuildResult>()?))),
            Command::Step { result } => {
                let result = result.as_deref().map(str::parse::<BuildResult>).transpose()?;
                Ok((Hook::Step, result))
            }
            // `init` never reaches validation; treat it like a bare step.
            Command::Init { .. } => Ok((Hook::Step, None)),
        }
    }

    fn build_snapshot(args: &BuildArgs) -> Result<BuildSnapshot, ConfigError> {
        let job_name = args
            .job_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| {
                ConfigError::missing(field::JOB_NAME, "Use --job-name or set JOB_NAME")
            })?;
        let number = args.build_number.ok_or_else(|| {
            ConfigError::missing(field::BUILD_NUMBER, "Use --build-number or set BUILD_NUMBER")
        })?;

        let mut build = BuildSnapshot::from_full_name(job_name, number);

        if let Some(display_name) = args.display_name.as_deref().filter(|s| !s.trim().is_empty()) {
            let full_display_name = format!("{} {}", build.full_name(), display_name.trim());
            build = build.with_display_name(full_display_name);
        }
        if let Some(description) = &args.description {
            build = build.with_description(description);
        }
        if let Some(run_url) = &args.run_url {
            build = build.with_run_url(run_url);
        }
        if let Some(root_url) = &args.root_url {
            build = build.with_root_url(root_url);
        }

        Ok(build)
    }

    /// Registers `--api-token` under the effective credentials id.
    ///
    /// Without an id anywhere, the token gets [`CLI_CREDENTIALS_ID`] and the
    /// job settings are pointed at it.
    fn job_credentials(cli: &Cli, settings: &mut Settings) -> InMemoryCredentials {
        let Some(token) = cli.job.api_token.as_deref().filter(|t| !t.trim().is_empty()) else {
            return InMemoryCredentials::new();
        };

        let id = match settings.text(Text::CredentialsId) {
            Some(id) => id.to_string(),
            None => {
                settings.job.credentials_id = Some(CLI_CREDENTIALS_ID.to_string());
                CLI_CREDENTIALS_ID.to_string()
            }
        };

        InMemoryCredentials::new().with_secret(id, Secret::new(token))
    }

    fn instance_credentials(toml: Option<&TomlConfig>) -> Result<InMemoryCredentials, ConfigError> {
        let mut store = InMemoryCredentials::new();
        let Some(toml) = toml else {
            return Ok(store);
        };

        for (id, section) in &toml.credentials {
            if section.token.is_none() && section.cert_pem.is_none() {
                return Err(ConfigError::InvalidCredentials {
                    id: id.clone(),
                    reason: "expected token or cert_pem",
                });
            }
            if let Some(token) = &section.token {
                store = store.with_secret(id.clone(), Secret::new(token.clone()));
            }
            match load_certificate(id, section) {
                Ok(Some(cert)) => store = store.with_certificate(id.clone(), cert),
                Ok(None) => {}
                Err(e @ ConfigError::CertificateRead { .. }) => {
                    tracing::warn!("Ignoring client certificate: {e}");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(store)
    }

    fn proxy_from_section(section: &ProxySection) -> Result<ProxySettings, ConfigError> {
        let url = Url::parse(&section.url).map_err(|e| ConfigError::InvalidUrl {
            url: section.url.clone(),
            reason: e.to_string(),
        })?;

        let mut proxy = ProxySettings::new(url).with_no_proxy(section.no_proxy.iter().cloned());
        if let Some(username) = &section.username {
            proxy = proxy.with_credentials(
                username.clone(),
                section.password.clone().unwrap_or_default(),
            );
        }

        Ok(proxy)
    }
}

/// Reads the client certificate of a credentials entry, if it has one.
fn load_certificate(
    id: &str,
    section: &CredentialsSection,
) -> Result<Option<ClientCertificate>, ConfigError> {
    let read = |path: &Path| {
        std::fs::read(path).map_err(|e| ConfigError::CertificateRead {
            id: id.to_string(),
            path: path.to_path_buf(),
            source: e,
        })
    };

    match (&section.cert_pem, &section.key_pem) {
        (Some(cert), Some(key)) => Ok(Some(ClientCertificate::from_parts(
            &read(cert)?,
            &read(key)?,
        ))),
        (Some(bundle), None) => Ok(Some(ClientCertificate::from_pem(read(bundle)?))),
        (None, Some(_)) => Err(ConfigError::InvalidCredentials {
            id: id.to_string(),
            reason: "key_pem requires cert_pem",
        }),
        (None, None) => Ok(None),
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}
