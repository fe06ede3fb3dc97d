//! Two-level notifier settings.
//!
//! Every option exists per job ([`JobSettings`], all fields optional) and
//! globally ([`GlobalSettings`], the defaults). [`Settings::effective`] is the
//! only place the precedence rule is applied:
//!
//! - a per-job string wins when it is non-blank
//! - a per-job boolean wins when it was explicitly set
//! - otherwise the global default applies

use serde::Deserialize;

use crate::state::StateMapper;

/// Per-job overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct JobSettings {
    /// Dynatrace base URL template
    pub url: Option<String>,
    /// Credentials identifier for the API token or client certificate
    pub credentials_id: Option<String>,
    /// Accept unverifiable server certificates
    pub ignore_unverified_ssl: Option<bool>,
    /// Monitored entity the events attach to
    pub entity_id: Option<String>,
    /// Append the build number to the default build key
    pub include_build_number: Option<bool>,
    /// Build key template
    pub project_key: Option<String>,
    /// Prefix the build key with the grandparent job name
    pub prepend_parent_key: Option<bool>,
    /// Skip in-progress notifications
    pub disable_in_progress: Option<bool>,
    /// Report UNSTABLE builds as SUCCESSFUL
    pub unstable_as_success: Option<bool>,
    /// Report nothing but successful builds
    pub only_report_success: Option<bool>,
}

/// Instance-wide defaults, read from the `[global]` table of the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[allow(clippy::struct_excessive_bools)]
pub struct GlobalSettings {
    /// Dynatrace base URL template
    pub url: Option<String>,
    /// Credentials identifier
    pub credentials_id: Option<String>,
    /// Accept unverifiable server certificates
    pub ignore_unverified_ssl: bool,
    /// Monitored entity the events attach to
    pub entity_id: Option<String>,
    /// Append the build number to the default build key
    pub include_build_number: bool,
    /// Build key template
    pub project_key: Option<String>,
    /// Prefix the build key with the grandparent job name
    pub prepend_parent_key: bool,
    /// Skip in-progress notifications
    pub disable_in_progress: bool,
    /// Report UNSTABLE builds as SUCCESSFUL
    pub unstable_as_success: bool,
    /// Report nothing but successful builds
    pub only_report_success: bool,
    /// Root URL of the CI system, used when the build does not supply one
    pub root_url: Option<String>,
}

/// A boolean option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    /// Accept unverifiable server certificates
    IgnoreUnverifiedSsl,
    /// Append the build number to the default build key
    IncludeBuildNumber,
    /// Prefix the build key with the grandparent job name
    PrependParentKey,
    /// Skip in-progress notifications
    DisableInProgress,
    /// Report UNSTABLE builds as SUCCESSFUL
    UnstableAsSuccess,
    /// Report nothing but successful builds
    OnlyReportSuccess,
}

/// A text option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Text {
    /// Dynatrace base URL template
    Url,
    /// Credentials identifier
    CredentialsId,
    /// Monitored entity id
    EntityId,
    /// Build key template
    ProjectKey,
}

/// Job overrides layered over global defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Per-job overrides
    pub job: JobSettings,
    /// Instance-wide defaults
    pub global: GlobalSettings,
}

impl Settings {
    /// Creates settings from both levels.
    #[must_use]
    pub const fn new(job: JobSettings, global: GlobalSettings) -> Self {
        Self { job, global }
    }

    /// Resolves a boolean option.
    #[must_use]
    pub fn flag(&self, flag: Flag) -> bool {
        let (job, global) = match flag {
            Flag::IgnoreUnverifiedSsl => {
                (self.job.ignore_unverified_ssl, self.global.ignore_unverified_ssl)
            }
            Flag::IncludeBuildNumber => {
                (self.job.include_build_number, self.global.include_build_number)
            }
            Flag::PrependParentKey => (self.job.prepend_parent_key, self.global.prepend_parent_key),
            Flag::DisableInProgress => {
                (self.job.disable_in_progress, self.global.disable_in_progress)
            }
            Flag::UnstableAsSuccess => {
                (self.job.unstable_as_success, self.global.unstable_as_success)
            }
            Flag::OnlyReportSuccess => {
                (self.job.only_report_success, self.global.only_report_success)
            }
        };

        job.unwrap_or(global)
    }

    /// Resolves a text option; blank values count as unset.
    #[must_use]
    pub fn text(&self, text: Text) -> Option<&str> {
        let (job, global) = match text {
            Text::Url => (&self.job.url, &self.global.url),
            Text::CredentialsId => (&self.job.credentials_id, &self.global.credentials_id),
            Text::EntityId => (&self.job.entity_id, &self.global.entity_id),
            Text::ProjectKey => (&self.job.project_key, &self.global.project_key),
        };
        let (job, global) = (job.as_deref(), global.as_deref());

        non_blank(job).or_else(|| non_blank(global))
    }

    /// Resolves every option once.
    ///
    /// The base URL loses one trailing `/`.
    #[must_use]
    pub fn effective(&self) -> EffectiveSettings {
        let owned = |t| self.text(t).map(str::to_string);

        EffectiveSettings {
            url: self
                .text(Text::Url)
                .map(|url| url.strip_suffix('/').unwrap_or(url).to_string()),
            credentials_id: owned(Text::CredentialsId),
            entity_id: owned(Text::EntityId),
            project_key: owned(Text::ProjectKey),
            ignore_unverified_ssl: self.flag(Flag::IgnoreUnverifiedSsl),
            include_build_number: self.flag(Flag::IncludeBuildNumber),
            prepend_parent_key: self.flag(Flag::PrependParentKey),
            disable_in_progress: self.flag(Flag::DisableInProgress),
            unstable_as_success: self.flag(Flag::UnstableAsSuccess),
            only_report_success: self.flag(Flag::OnlyReportSuccess),
            root_url: non_blank(self.global.root_url.as_deref()).map(str::to_string),
        }
    }
}

/// Settings resolved for one notification call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct EffectiveSettings {
    /// Base URL template, without trailing `/`
    pub url: Option<String>,
    /// Credentials identifier
    pub credentials_id: Option<String>,
    /// Monitored entity id
    pub entity_id: Option<String>,
    /// Build key template
    pub project_key: Option<String>,
    /// Accept unverifiable server certificates
    pub ignore_unverified_ssl: bool,
    /// Append the build number to the default build key
    pub include_build_number: bool,
    /// Prefix the build key with the grandparent job name
    pub prepend_parent_key: bool,
    /// Skip in-progress notifications
    pub disable_in_progress: bool,
    /// Report UNSTABLE builds as SUCCESSFUL
    pub unstable_as_success: bool,
    /// Report nothing but successful builds
    pub only_report_success: bool,
    /// Global CI root URL
    pub root_url: Option<String>,
}

impl EffectiveSettings {
    /// State mapping for a call path.
    ///
    /// `suppress_in_progress` is decided by the call path, not by the settings
    /// alone: the pipeline step path never suppresses.
    #[must_use]
    pub const fn state_mapper(&self, suppress_in_progress: bool) -> StateMapper {
        StateMapper {
            suppress_in_progress,
            unstable_as_success: self.unstable_as_success,
            only_report_success: self.only_report_success,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}
