//! reqwest-backed [`HttpClient`].

use std::error::Error as StdError;

use super::{HttpClient, HttpError, HttpRequest, HttpResponse};

/// Sends requests through a `reqwest::Client` built for one attempt.
///
/// Timeout, TLS trust and proxy routing live on the wrapped client; see
/// [`super::ReqwestTransport`], which is the usual way to obtain one.
///
/// ```no_run
/// use dynatrace_notify::transport::{
///     HttpClient, HttpRequest, ReqwestTransport, TlsOptions, TransportFactory,
/// };
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let url = Url::parse("https://abc123.live.dynatrace.com/api/v1/events")?;
/// let client = ReqwestTransport::new().client_for(&url, &TlsOptions::default());
/// let response = client.request(HttpRequest::post_json(url, b"{}".to_vec())).await?;
/// println!("Status: {}", response.status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    inner: reqwest::Client,
}

impl ReqwestClient {
    /// Wraps a configured reqwest client.
    #[must_use]
    pub const fn from_client(client: reqwest::Client) -> Self {
        Self { inner: client }
    }
}

impl HttpClient for ReqwestClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = req;

        let mut builder = self.inner.request(method, url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(classify_error)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(classify_error)?;

        Ok(HttpResponse::new(status, headers, body.to_vec()))
    }
}

/// Maps a reqwest error onto [`HttpError`].
///
/// Certificate failures surface as connect errors in reqwest, so the source
/// chain is inspected before falling back to [`HttpError::Connection`].
fn classify_error(e: reqwest::Error) -> HttpError {
    if e.is_timeout() {
        HttpError::Timeout
    } else if e.is_builder() {
        HttpError::InvalidUrl(e.to_string())
    } else if is_certificate_error(&e) {
        HttpError::TlsVerification(Box::new(e))
    } else {
        HttpError::Connection(Box::new(e))
    }
}

/// Returns true if any error in the source chain reports an untrusted peer certificate.
pub(crate) fn is_certificate_error(error: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(error);
    while let Some(e) = current {
        let message = e.to_string().to_ascii_lowercase();
        if message.contains("certificate") || message.contains("unknownissuer") {
            return true;
        }
        current = e.source();
    }
    false
}
