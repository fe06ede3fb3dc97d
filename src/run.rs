//! Application execution logic.
//!
//! This module wires the validated configuration into a [`Notifier`] and
//! runs the selected lifecycle hook once.

use http::{HeaderMap, StatusCode};
use url::Url;

use dynatrace_notify::config::ValidatedConfig;
use dynatrace_notify::expand::HandlebarsExpander;
use dynatrace_notify::notifier::Notifier;
use dynatrace_notify::transport::{
    HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestTransport, TlsOptions,
    TransportFactory,
};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Runs the configured hook.
///
/// Returns the hook's verdict: `false` asks the caller to fail the build.
/// Notification failures are logged by the notifier and never fail the build.
pub async fn execute(config: ValidatedConfig) -> bool {
    let ValidatedConfig {
        hook,
        build,
        settings,
        credentials,
        proxies,
        dry_run,
        ..
    } = config;

    let expander = HandlebarsExpander::new().with_variables(unicode_env());

    if dry_run {
        tracing::info!("Dry-run mode enabled - the event will be logged but not sent");
        let notifier = Notifier::new(settings, DryRunTransport, credentials, expander);
        return notifier.run_hook(hook, &build).await;
    }

    let transport = ReqwestTransport::new().with_proxies(proxies);
    let notifier = Notifier::new(settings, transport, credentials, expander);
    notifier.run_hook(hook, &build).await
}

/// Process environment, skipping variables that are not valid Unicode.
fn unicode_env() -> impl Iterator<Item = (String, String)> {
    std::env::vars_os()
        .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
}

/// Transport that logs requests instead of sending them.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunTransport;

impl TransportFactory for DryRunTransport {
    type Client = DryRunClient;

    fn client_for(&self, target: &Url, tls: &TlsOptions) -> Self::Client {
        if tls.ignore_unverified && target.scheme() == "https" {
            tracing::debug!("Dry-run: server certificate would not be verified");
        }
        DryRunClient
    }
}

/// Client that logs each request and answers `200 OK`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunClient;

impl HttpClient for DryRunClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        tracing::info!("Dry-run: would {} {}", req.method, req.url);
        for line in req.redacted_headers() {
            tracing::debug!("Dry-run: {line}");
        }
        if let Some(body) = req.body_text() {
            tracing::info!("Dry-run: body {body}");
        }

        Ok(HttpResponse::new(StatusCode::OK, HeaderMap::new(), Vec::new()))
    }
}
