//! Credential lookup for the Dynatrace API.
//!
//! The notifier only needs two things from a credential store: the API token
//! registered under an identifier, and optionally a client certificate for
//! mutual TLS. [`CredentialStore`] is that capability; [`LayeredCredentials`]
//! searches a job-scoped store before the instance-scoped one.

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

use std::collections::HashMap;
use std::fmt;

/// A secret value (API token). `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wraps a secret value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the secret value.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// PEM-encoded client certificate chain and private key.
///
/// `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCertificate {
    pem: Vec<u8>,
}

impl ClientCertificate {
    /// Creates a client certificate from a PEM bundle holding both the
    /// certificate chain and the private key.
    #[must_use]
    pub const fn from_pem(pem: Vec<u8>) -> Self {
        Self { pem }
    }

    /// Creates a client certificate from separate certificate and key PEM blocks.
    #[must_use]
    pub fn from_parts(cert_pem: &[u8], key_pem: &[u8]) -> Self {
        let mut pem = Vec::with_capacity(cert_pem.len() + key_pem.len() + 1);
        pem.extend_from_slice(cert_pem);
        if !pem.ends_with(b"\n") {
            pem.push(b'\n');
        }
        pem.extend_from_slice(key_pem);
        Self { pem }
    }

    /// Returns the PEM bundle.
    #[must_use]
    pub fn pem(&self) -> &[u8] {
        &self.pem
    }
}

impl fmt::Debug for ClientCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCertificate")
            .field("pem", &format_args!("{} bytes", self.pem.len()))
            .finish()
    }
}

/// Resolves credentials by identifier.
pub trait CredentialStore: Send + Sync {
    /// Returns the API token registered under `id`, if any.
    fn resolve_secret(&self, id: &str) -> Option<Secret>;

    /// Returns the client certificate registered under `id`, if any.
    fn resolve_certificate(&self, _id: &str) -> Option<ClientCertificate> {
        None
    }
}

impl<T: CredentialStore + ?Sized> CredentialStore for &T {
    fn resolve_secret(&self, id: &str) -> Option<Secret> {
        (**self).resolve_secret(id)
    }

    fn resolve_certificate(&self, id: &str) -> Option<ClientCertificate> {
        (**self).resolve_certificate(id)
    }
}

/// A credential store backed by in-memory maps.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentials {
    secrets: HashMap<String, Secret>,
    certificates: HashMap<String, ClientCertificate>,
}

impl InMemoryCredentials {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an API token.
    #[must_use]
    pub fn with_secret(mut self, id: impl Into<String>, secret: Secret) -> Self {
        self.secrets.insert(id.into(), secret);
        self
    }

    /// Registers a client certificate.
    #[must_use]
    pub fn with_certificate(mut self, id: impl Into<String>, cert: ClientCertificate) -> Self {
        self.certificates.insert(id.into(), cert);
        self
    }

    /// Returns true if the store holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty() && self.certificates.is_empty()
    }
}

impl CredentialStore for InMemoryCredentials {
    fn resolve_secret(&self, id: &str) -> Option<Secret> {
        self.secrets.get(id).cloned()
    }

    fn resolve_certificate(&self, id: &str) -> Option<ClientCertificate> {
        self.certificates.get(id).cloned()
    }
}

/// Searches a job-scoped store first, then an instance-scoped store.
#[derive(Debug, Clone, Default)]
pub struct LayeredCredentials<J, I> {
    job: J,
    instance: I,
}

impl<J, I> LayeredCredentials<J, I> {
    /// Creates a layered store.
    #[must_use]
    pub const fn new(job: J, instance: I) -> Self {
        Self { job, instance }
    }
}

impl<J: CredentialStore, I: CredentialStore> CredentialStore for LayeredCredentials<J, I> {
    fn resolve_secret(&self, id: &str) -> Option<Secret> {
        self.job
            .resolve_secret(id)
            .or_else(|| self.instance.resolve_secret(id))
    }

    fn resolve_certificate(&self, id: &str) -> Option<ClientCertificate> {
        self.job
            .resolve_certificate(id)
            .or_else(|| self.instance.resolve_certificate(id))
    }
}
