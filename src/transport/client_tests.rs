//! Tests for `ReqwestClient` and error classification.

use std::error::Error;
use std::fmt;

use super::client::is_certificate_error;
use super::*;

/// Error with a configurable message and optional cause.
#[derive(Debug)]
struct ChainedError {
    message: &'static str,
    source: Option<Box<ChainedError>>,
}

impl ChainedError {
    fn new(message: &'static str) -> Self {
        Self {
            message,
            source: None,
        }
    }

    fn caused_by(mut self, source: Self) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for ChainedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message)
    }
}

impl Error for ChainedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_deref().map(|e| e as &(dyn Error + 'static))
    }
}

mod reqwest_client {
    use super::*;

    #[test]
    fn debug_format_is_readable() {
        let client = ReqwestClient::from_client(reqwest::Client::new());

        assert!(format!("{client:?}").contains("ReqwestClient"));
    }

    #[test]
    fn client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ReqwestClient>();
    }

    #[tokio::test]
    async fn refused_connection_is_a_connection_error() {
        let target = url::Url::parse("http://127.0.0.1:1/api/v1/events").unwrap();
        let client = ReqwestTransport::new().client_for(&target, &TlsOptions::default());

        let result = client.request(HttpRequest::post(target)).await;

        assert!(
            matches!(result, Err(HttpError::Connection(_))),
            "Expected connection error, got {result:?}"
        );
    }
}

mod certificate_errors {
    use super::*;

    #[test]
    fn detects_certificate_error_deep_in_chain() {
        let err = ChainedError::new("error sending request")
            .caused_by(ChainedError::new("client error (Connect)").caused_by(
                ChainedError::new("invalid peer certificate: UnknownIssuer"),
            ));

        assert!(is_certificate_error(&err));
    }

    #[test]
    fn plain_connection_error_is_not_a_certificate_error() {
        let err = ChainedError::new("error sending request")
            .caused_by(ChainedError::new("Connection refused (os error 111)"));

        assert!(!is_certificate_error(&err));
    }
}
