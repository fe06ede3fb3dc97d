//! Request and response values exchanged with the events API.

use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use url::Url;

use crate::credentials::Secret;

use super::HttpError;

/// An outgoing request, independent of the client that sends it.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// HTTP method
    pub method: Method,
    /// Target URL
    pub url: Url,
    /// Headers; sensitive values are flagged via [`HeaderValue::set_sensitive`]
    pub headers: HeaderMap,
    /// Request body, if any
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Creates a request with no headers and no body.
    #[must_use]
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Creates an empty `POST` request.
    #[must_use]
    pub fn post(url: Url) -> Self {
        Self::new(Method::POST, url)
    }

    /// Creates a `POST` request carrying a JSON document.
    #[must_use]
    pub fn post_json(url: Url, json: Vec<u8>) -> Self {
        Self::post(url)
            .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .with_body(json)
    }

    /// Sets the request body.
    #[must_use]
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets a header, replacing any previous value.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets `Authorization: Api-Token <token>`, flagged as sensitive.
    ///
    /// # Errors
    ///
    /// Returns an error if the token contains characters not allowed in a
    /// header value.
    pub fn with_api_token(self, token: &Secret) -> Result<Self, http::header::InvalidHeaderValue> {
        let mut value = HeaderValue::from_str(&format!("Api-Token {}", token.expose()))?;
        value.set_sensitive(true);
        Ok(self.with_header(AUTHORIZATION, value))
    }

    /// Returns the body as UTF-8 text, if there is one and it is valid.
    #[must_use]
    pub fn body_text(&self) -> Option<&str> {
        self.body
            .as_deref()
            .and_then(|body| std::str::from_utf8(body).ok())
    }

    /// Renders the headers as `name: value` lines with sensitive values hidden.
    #[must_use]
    pub fn redacted_headers(&self) -> Vec<String> {
        self.headers
            .iter()
            .map(|(name, value)| {
                if value.is_sensitive() {
                    format!("{name}: <redacted>")
                } else {
                    format!("{name}: {}", value.to_str().unwrap_or("<binary>"))
                }
            })
            .collect()
    }
}

/// A fully buffered response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response.
    #[must_use]
    pub const fn new(status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Returns true for exactly `200 OK`, the only status the events API
    /// uses for an accepted event.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }

    /// Returns the body as text, replacing invalid UTF-8 sequences.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Sends one request and buffers the response.
///
/// Implemented by [`super::ReqwestClient`] in production and by recording
/// mocks in tests:
///
/// ```ignore
/// use dynatrace_notify::transport::{HttpClient, HttpError, HttpRequest, HttpResponse};
///
/// struct Accepting;
///
/// impl HttpClient for Accepting {
///     async fn request(&self, _req: HttpRequest) -> Result<HttpResponse, HttpError> {
///         Ok(HttpResponse::new(http::StatusCode::OK, http::HeaderMap::new(), Vec::new()))
///     }
/// }
/// ```
pub trait HttpClient: Send + Sync {
    /// Sends `req`.
    ///
    /// Any status code, including errors, is a successful exchange at this
    /// level; classification belongs to the caller.
    ///
    /// # Errors
    ///
    /// - [`HttpError::Connection`] when the server cannot be reached
    /// - [`HttpError::TlsVerification`] when the server certificate is not trusted
    /// - [`HttpError::Timeout`] when no response arrives in time
    /// - [`HttpError::InvalidUrl`] when the URL cannot be used
    fn request(
        &self,
        req: HttpRequest,
    ) -> impl std::future::Future<Output = Result<HttpResponse, HttpError>> + Send;
}
