//! dynatrace-notify: CI build events for Dynatrace
//!
//! A library for reporting build lifecycle events (started, succeeded,
//! failed) to the Dynatrace events API.
//!
//! The pieces compose bottom-up:
//! - [`state`] maps a build result to the state reported (or to a skip)
//! - [`build`] describes the build and derives its key
//! - [`payload`] renders the JSON event body
//! - [`transport`] builds a client per attempt with TLS and proxy policy
//! - [`notifier`] ties them together behind the lifecycle hooks

pub mod build;
pub mod config;
pub mod credentials;
pub mod expand;
pub mod notifier;
pub mod payload;
pub mod state;
pub mod transport;

#[cfg(test)]
mod test_support;
