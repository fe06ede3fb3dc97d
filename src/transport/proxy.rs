//! Upstream HTTP proxy selection.

use url::Url;

/// An upstream proxy and the hosts that bypass it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySettings {
    /// Proxy URL (e.g. `http://proxy.corp:3128`)
    pub url: Url,
    /// User name for proxy basic authentication
    pub username: Option<String>,
    /// Password for proxy basic authentication
    pub password: Option<String>,
    /// Hosts reached directly
    pub no_proxy: Vec<String>,
    /// Target scheme this proxy serves; `None` serves every scheme
    pub scheme: Option<String>,
}

impl ProxySettings {
    /// Creates proxy settings without credentials or exclusions.
    #[must_use]
    pub const fn new(url: Url) -> Self {
        Self {
            url,
            username: None,
            password: None,
            no_proxy: Vec::new(),
            scheme: None,
        }
    }

    /// Sets basic authentication credentials.
    #[must_use]
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Restricts the proxy to targets with the given scheme.
    #[must_use]
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    /// Adds hosts that bypass the proxy.
    #[must_use]
    pub fn with_no_proxy<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.no_proxy.extend(hosts.into_iter().map(Into::into));
        self
    }

    /// Reads proxy settings from the process environment.
    ///
    /// See [`Self::from_lookup`].
    #[must_use]
    pub fn from_env() -> Vec<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads proxy settings through a variable lookup function.
    ///
    /// `HTTPS_PROXY` serves `https` targets and `HTTP_PROXY` serves `http`
    /// targets; lower-case names are honored too. Credentials embedded in a
    /// proxy URL are moved into [`Self::username`]/[`Self::password`].
    /// `NO_PROXY` is a comma-separated host list shared by both. Unparsable
    /// proxy URLs are ignored with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Vec<Self> {
        let read = |names: &[&str]| {
            names
                .iter()
                .filter_map(|name| lookup(name))
                .find(|value| !value.trim().is_empty())
        };

        let no_proxy: Vec<String> = read(&["NO_PROXY", "no_proxy"])
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|h| !h.is_empty())
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_default();

        [
            ("https", ["HTTPS_PROXY", "https_proxy"]),
            ("http", ["HTTP_PROXY", "http_proxy"]),
        ]
        .into_iter()
        .filter_map(|(scheme, names)| {
            let proxy = Self::parse_env_url(&read(&names)?)?;
            Some(proxy.with_scheme(scheme).with_no_proxy(no_proxy.iter().cloned()))
        })
        .collect()
    }

    fn parse_env_url(raw: &str) -> Option<Self> {
        let mut url = match Url::parse(raw.trim()) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Ignoring invalid proxy URL '{raw}': {e}");
                return None;
            }
        };

        if url.username().is_empty() {
            return Some(Self::new(url));
        }

        let username = url.username().to_string();
        let password = url.password().map(ToString::to_string);
        let _ = url.set_username("");
        let _ = url.set_password(None);

        let mut settings = Self::new(url);
        settings.username = Some(username);
        settings.password = password;
        Some(settings)
    }

    /// Returns true if requests to `target` should go through this proxy.
    ///
    /// The target's scheme must match [`Self::scheme`] when one is set. A
    /// no-proxy entry matches when it is `*`, equals the host, or is a
    /// domain suffix of it (`example.com` and `.example.com` both match
    /// `api.example.com`). Ports in entries are ignored.
    #[must_use]
    pub fn applies_to(&self, target: &Url) -> bool {
        if self.scheme.as_deref().is_some_and(|s| s != target.scheme()) {
            return false;
        }
        let Some(host) = target.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();

        !self.no_proxy.iter().any(|entry| {
            let entry = entry.trim().to_ascii_lowercase();
            let entry = entry.split(':').next().unwrap_or_default();
            if entry == "*" {
                return true;
            }
            let domain = entry.trim_start_matches('.');
            !domain.is_empty() && (host == domain || host.ends_with(&format!(".{domain}")))
        })
    }

    /// Converts the settings into a reqwest proxy with basic authentication.
    ///
    /// # Errors
    ///
    /// Returns an error if reqwest rejects the proxy URL.
    pub fn to_reqwest(&self) -> Result<reqwest::Proxy, reqwest::Error> {
        let proxy = reqwest::Proxy::all(self.url.as_str())?;
        Ok(match &self.username {
            Some(user) => proxy.basic_auth(user, self.password.as_deref().unwrap_or_default()),
            None => proxy,
        })
    }
}
