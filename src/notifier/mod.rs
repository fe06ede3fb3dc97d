//! Orchestration of a single Dynatrace notification.
//!
//! [`Notifier`] composes the state mapping, build key, payload and transport
//! layers. Its hooks ([`Notifier::before_build`], [`Notifier::after_build`],
//! [`Notifier::report_step`]) absorb every failure into log output: a
//! notification is best-effort telemetry and never changes the outcome of the
//! build that triggered it.

mod error;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

use url::Url;

use crate::build::{BuildSnapshot, KeyBuilder};
use crate::config::defaults::EVENTS_PATH;
use crate::config::{EffectiveSettings, Settings};
use crate::credentials::{CredentialStore, Secret};
use crate::expand::{MacroExpander, or_fallback};
use crate::payload::PayloadBuilder;
use crate::state::{Decision, NotificationState};
use crate::transport::{
    HttpClient, HttpError, HttpRequest, HttpResponse, TlsOptions, TransportFactory,
};

pub use error::NotifyError;

/// Outcome of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationResult {
    /// True when Dynatrace accepted the event
    pub success: bool,
    /// Diagnostic text, the response body on failure
    pub message: Option<String>,
}

impl NotificationResult {
    /// An accepted notification.
    #[must_use]
    pub const fn success() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    /// A rejected notification with its diagnostic.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }

    /// Classifies a Dynatrace response: only `200 OK` counts as success.
    #[must_use]
    pub fn from_response(response: &HttpResponse) -> Self {
        if response.is_ok() {
            Self::success()
        } else {
            Self::failure(response.body_text())
        }
    }
}

/// The build lifecycle point a notification is sent from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    /// Before the build runs; reports `INPROGRESS`.
    BeforeRun,
    /// After a freestyle build completes.
    AfterRun,
    /// A pipeline step. Never suppresses, so an `ABORTED` build is reported
    /// as `FAILED` even when in-progress notifications are disabled.
    Step,
}

impl Hook {
    const fn suppresses_in_progress(self, settings: &EffectiveSettings) -> bool {
        match self {
            Self::BeforeRun | Self::AfterRun => settings.disable_in_progress,
            Self::Step => false,
        }
    }
}

/// Sends build lifecycle events to Dynatrace.
///
/// # Type Parameters
///
/// - `T`: Builds the HTTP client for each attempt
/// - `C`: Resolves API tokens and client certificates
/// - `E`: Expands the base URL and project key templates
#[derive(Debug)]
pub struct Notifier<T, C, E> {
    settings: Settings,
    transport: T,
    credentials: C,
    expander: E,
}

impl<T, C, E> Notifier<T, C, E>
where
    T: TransportFactory,
    C: CredentialStore,
    E: MacroExpander,
{
    /// Creates a notifier.
    pub const fn new(settings: Settings, transport: T, credentials: C, expander: E) -> Self {
        Self {
            settings,
            transport,
            credentials,
            expander,
        }
    }

    /// Returns the configured settings.
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Reports that `build` is starting.
    ///
    /// Returns `false` only if the build should be failed by the caller,
    /// which never happens for notification failures.
    pub async fn before_build(&self, build: &BuildSnapshot) -> bool {
        self.run_hook(Hook::BeforeRun, build).await
    }

    /// Reports the outcome of a completed build.
    pub async fn after_build(&self, build: &BuildSnapshot) -> bool {
        self.run_hook(Hook::AfterRun, build).await
    }

    /// Reports the outcome of a build from a pipeline step.
    pub async fn report_step(&self, build: &BuildSnapshot) -> bool {
        self.run_hook(Hook::Step, build).await
    }

    /// Runs one lifecycle hook. All failures are logged, never returned.
    pub async fn run_hook(&self, hook: Hook, build: &BuildSnapshot) -> bool {
        let settings = self.settings.effective();

        let Some(root_url) = resolve_root_url(build, &settings) else {
            tracing::error!("Cannot notify Dynatrace! (Jenkins Root URL not configured)");
            return true;
        };

        let result = match hook {
            Hook::BeforeRun => None,
            Hook::AfterRun | Hook::Step => build.result,
        };
        let mapper = settings.state_mapper(hook.suppresses_in_progress(&settings));
        let state = match mapper.decide(result) {
            Decision::Notify(state) => state,
            Decision::Skip(reason) => {
                tracing::debug!(?hook, ?reason, "Not notifying Dynatrace");
                return true;
            }
        };

        match self.deliver(build, state, &settings, root_url).await {
            Ok(outcome) if outcome.success => tracing::info!("Notified Dynatrace"),
            Ok(outcome) => tracing::warn!(
                "Failed to notify Dynatrace ({})",
                outcome.message.unwrap_or_default()
            ),
            Err(NotifyError::Http(HttpError::TlsVerification(e))) => tracing::error!(
                error = ?e,
                "TLS peer verification failed while notifying Dynatrace. Make sure the SSL \
                 certificate of your Dynatrace server is valid or check the 'Ignore \
                 unverifiable SSL certificate' setting (ignore_unverified_ssl) of this job."
            ),
            Err(e) => tracing::error!(error = ?e, "Caught error while notifying Dynatrace: {e}"),
        }

        true
    }

    /// Sends `state` for `build` and classifies the response.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] if no root URL or base URL is configured, the
    /// request cannot be built, or the transport fails.
    pub async fn notify(
        &self,
        build: &BuildSnapshot,
        state: NotificationState,
    ) -> Result<NotificationResult, NotifyError> {
        let settings = self.settings.effective();
        let root_url = resolve_root_url(build, &settings).ok_or(NotifyError::MissingRootUrl)?;

        self.deliver(build, state, &settings, root_url).await
    }

    /// Builds the event request without sending it.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] if the base URL is missing or invalid, or the
    /// payload cannot be serialized.
    pub fn build_request(
        &self,
        build: &BuildSnapshot,
        state: NotificationState,
        settings: &EffectiveSettings,
        root_url: &str,
    ) -> Result<HttpRequest, NotifyError> {
        let url = self.events_url(build, settings)?;

        let key = KeyBuilder::new(&self.expander)
            .with_project_key(settings.project_key.as_deref())
            .with_build_number(settings.include_build_number)
            .with_parent_key(settings.prepend_parent_key)
            .build(build, root_url);

        let entity_id = settings.entity_id.as_deref().unwrap_or_else(|| {
            tracing::warn!("No Dynatrace entity id configured, the event will not be attached");
            ""
        });

        let body = PayloadBuilder::new(build, &key, entity_id, root_url)
            .build(state)
            .to_json()?;

        let request = HttpRequest::post_json(url, body);
        match self.api_token(settings) {
            Some(token) => Ok(request.with_api_token(&token)?),
            None => Ok(request),
        }
    }

    async fn deliver(
        &self,
        build: &BuildSnapshot,
        state: NotificationState,
        settings: &EffectiveSettings,
        root_url: &str,
    ) -> Result<NotificationResult, NotifyError> {
        let request = self.build_request(build, state, settings, root_url)?;
        tracing::info!("Notifying Dynatrace at \"{}\"", request.url);
        tracing::debug!(body = request.body_text(), "Sending {state} event");

        let client = self
            .transport
            .client_for(&request.url, &self.tls_options(settings));
        let response = client.request(request).await?;

        Ok(NotificationResult::from_response(&response))
    }

    /// Returns `<expanded base URL>/api/v1/events`.
    fn events_url(
        &self,
        build: &BuildSnapshot,
        settings: &EffectiveSettings,
    ) -> Result<Url, NotifyError> {
        let template = settings.url.as_deref().ok_or(NotifyError::MissingBaseUrl)?;

        let base = or_fallback(
            self.expander.expand(build, template),
            "Unable to expand Dynatrace Server URL",
            || template.to_string(),
        );
        let url = format!("{}{EVENTS_PATH}", base.trim_end_matches('/'));

        Url::parse(&url).map_err(|source| NotifyError::InvalidUrl { url, source })
    }

    fn api_token(&self, settings: &EffectiveSettings) -> Option<Secret> {
        let id = settings.credentials_id.as_deref()?;
        let secret = self.credentials.resolve_secret(id);
        if secret.is_none() {
            tracing::warn!("No API token found for credentials id '{id}'");
        }
        secret
    }

    fn tls_options(&self, settings: &EffectiveSettings) -> TlsOptions {
        let identity = if settings.ignore_unverified_ssl {
            settings
                .credentials_id
                .as_deref()
                .and_then(|id| self.credentials.resolve_certificate(id))
        } else {
            None
        };

        TlsOptions {
            ignore_unverified: settings.ignore_unverified_ssl,
            identity,
        }
    }
}

/// The build's own root URL, else the global one.
fn resolve_root_url<'a>(build: &'a BuildSnapshot, settings: &'a EffectiveSettings) -> Option<&'a str> {
    build
        .root_url
        .as_deref()
        .filter(|url| !url.trim().is_empty())
        .or(settings.root_url.as_deref())
}
