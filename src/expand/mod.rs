//! Macro expansion for build keys and server URLs.
//!
//! Templates such as the project key or the Dynatrace base URL may reference
//! build metadata. Expansion is a capability ([`MacroExpander`]) so that the
//! notifier does not depend on a particular template engine; the default
//! implementation uses Handlebars ([`HandlebarsExpander`]).
//!
//! Expansion failures never fail a notification. Call sites consume the
//! result through [`or_fallback`], which logs the error and substitutes a
//! deterministic value.

mod template;


use thiserror::Error;

use crate::build::BuildSnapshot;

pub use template::HandlebarsExpander;

/// Error type for macro expansion.
#[derive(Debug, Error)]
pub enum ExpansionError {
    /// The template could not be parsed.
    #[error("Malformed macro in '{template}': {reason}")]
    Malformed {
        /// The offending template
        template: String,
        /// Parser diagnostic
        reason: String,
    },

    /// The template parsed but could not be rendered (e.g. unknown variable).
    #[error("Cannot evaluate macro in '{template}': {reason}")]
    Evaluation {
        /// The offending template
        template: String,
        /// Renderer diagnostic
        reason: String,
    },
}

/// Substitutes build metadata into template strings.
pub trait MacroExpander: Send + Sync {
    /// Expands all macros in `template` against `build`.
    ///
    /// # Errors
    ///
    /// Returns [`ExpansionError`] if the template is malformed or references
    /// data that is not available.
    fn expand(&self, build: &BuildSnapshot, template: &str) -> Result<String, ExpansionError>;
}

impl<T: MacroExpander + ?Sized> MacroExpander for &T {
    fn expand(&self, build: &BuildSnapshot, template: &str) -> Result<String, ExpansionError> {
        (**self).expand(build, template)
    }
}

/// Returns the expanded value, or logs the failure and returns `fallback()`.
///
/// This is the single point where expansion errors are absorbed.
pub fn or_fallback<T>(
    result: Result<T, ExpansionError>,
    context: &str,
    fallback: impl FnOnce() -> T,
) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = ?e, "{context}: {e}");
            fallback()
        }
    }
}
