//! Transport layer for delivering events to Dynatrace.
//!
//! This module provides types and traits for:
//! - Building HTTP requests ([`HttpRequest`])
//! - Handling HTTP responses ([`HttpResponse`])
//! - Abstracting HTTP clients ([`HttpClient`])
//! - Production HTTP client implementation ([`ReqwestClient`])
//! - Per-attempt client construction with TLS and proxy policy
//!   ([`TransportFactory`], [`ReqwestTransport`], [`TlsOptions`])
//! - Upstream proxy selection ([`ProxySettings`])

mod client;
mod error;
mod factory;
mod http;
mod proxy;

#[cfg(test)]
mod client_tests;

pub use client::ReqwestClient;
pub use error::{HttpError, TransportError};
pub use factory::{ReqwestTransport, TlsOptions, TransportFactory};
pub use http::{HttpClient, HttpRequest, HttpResponse};
pub use proxy::ProxySettings;
