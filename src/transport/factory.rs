//! Per-attempt client construction.

use std::time::Duration;

use url::Url;

use crate::config::defaults;
use crate::credentials::ClientCertificate;

use super::{HttpClient, ProxySettings, ReqwestClient, TransportError};

/// TLS policy for one notification attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsOptions {
    /// Accept any server certificate chain (HTTPS targets only)
    pub ignore_unverified: bool,
    /// Client certificate for mutual TLS, used with the permissive policy
    pub identity: Option<ClientCertificate>,
}

/// Builds the HTTP client for a single notification attempt.
///
/// The client is owned by the attempt and dropped when it completes, so
/// connections never outlive the notification that opened them.
pub trait TransportFactory: Send + Sync {
    /// Client type produced by this factory.
    type Client: HttpClient;

    /// Returns a client configured for requests to `target`.
    fn client_for(&self, target: &Url, tls: &TlsOptions) -> Self::Client;
}

/// Builds [`ReqwestClient`]s with a socket timeout, TLS policy and proxy.
///
/// Failures building the permissive TLS context are logged and the client
/// falls back to default (strict) trust settings.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    timeout: Duration,
    proxies: Vec<ProxySettings>,
}

impl ReqwestTransport {
    /// Creates a transport with the default 60 second socket timeout and no proxies.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: defaults::socket_timeout(),
            proxies: Vec::new(),
        }
    }

    /// Sets the socket (read) timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Adds upstream proxies; the first one that applies to a target is used.
    #[must_use]
    pub fn with_proxies(mut self, proxies: impl IntoIterator<Item = ProxySettings>) -> Self {
        self.proxies.extend(proxies);
        self
    }

    /// Returns the configured socket timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the proxy used for `target`, if any.
    #[must_use]
    pub fn proxy_for(&self, target: &Url) -> Option<&ProxySettings> {
        self.proxies.iter().find(|p| p.applies_to(target))
    }

    /// Builds the reqwest client for `target`.
    #[must_use]
    pub fn build_client(&self, target: &Url, tls: &TlsOptions) -> reqwest::Client {
        if target.scheme() == "https" && tls.ignore_unverified {
            match self.permissive_client(target, tls) {
                Ok(client) => return client,
                Err(e) => {
                    tracing::warn!(
                        error = ?e,
                        "Couldn't establish SSL context, using default trust settings: {e}"
                    );
                }
            }
        }

        self.strict_client(target)
    }

    fn base_builder(&self, target: &Url) -> reqwest::ClientBuilder {
        let builder = reqwest::Client::builder().read_timeout(self.timeout);

        // Proxy selection is explicit; environment proxies are resolved by ProxySettings.
        let Some(proxy) = self.proxy_for(target) else {
            return builder.no_proxy();
        };

        match proxy.to_reqwest() {
            Ok(p) => {
                tracing::debug!("Using proxy {} for {}", proxy.url, target);
                builder.proxy(p)
            }
            Err(e) => {
                tracing::warn!("Ignoring proxy {}: {e}", proxy.url);
                builder.no_proxy()
            }
        }
    }

    fn permissive_client(
        &self,
        target: &Url,
        tls: &TlsOptions,
    ) -> Result<reqwest::Client, TransportError> {
        let mut builder = self.base_builder(target).danger_accept_invalid_certs(true);

        if let Some(cert) = &tls.identity {
            let identity =
                reqwest::Identity::from_pem(cert.pem()).map_err(TransportError::Identity)?;
            builder = builder.identity(identity);
        }

        builder.build().map_err(TransportError::Build)
    }

    fn strict_client(&self, target: &Url) -> reqwest::Client {
        self.base_builder(target).build().unwrap_or_else(|e| {
            tracing::warn!("Couldn't initialize HTTP client, using defaults: {e}");
            reqwest::Client::new()
        })
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportFactory for ReqwestTransport {
    type Client = ReqwestClient;

    fn client_for(&self, target: &Url, tls: &TlsOptions) -> Self::Client {
        ReqwestClient::from_client(self.build_client(target, tls))
    }
}
