//! Handlebars-backed macro expansion.

use std::collections::BTreeMap;

use handlebars::{Handlebars, RenderErrorReason};
use serde::Serialize;

use crate::build::{BuildResult, BuildSnapshot};

use super::{ExpansionError, MacroExpander};

/// Expands `{{VARIABLE}}` macros using Handlebars.
///
/// Available variables mirror the usual CI environment names:
/// - `JOB_NAME`: full job name including folders
/// - `JOB_BASE_NAME`: short job name
/// - `BUILD_NUMBER`, `BUILD_DISPLAY_NAME`, `BUILD_RESULT` (empty while running)
/// - `JENKINS_URL`: CI root URL known to the build (empty if unknown)
/// - `env.<NAME>`: extra variables registered with [`Self::with_variable`]
///
/// Rendering is strict: referencing an unknown variable is an error, so a
/// typo falls back to the default value instead of silently producing an
/// empty key. Output is not HTML-escaped.
#[derive(Debug, Clone)]
pub struct HandlebarsExpander {
    registry: Handlebars<'static>,
    variables: BTreeMap<String, String>,
}

#[derive(Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct ExpansionContext<'a> {
    job_name: String,
    job_base_name: &'a str,
    build_number: u64,
    build_display_name: &'a str,
    build_result: &'static str,
    jenkins_url: &'a str,
    #[serde(rename = "env")]
    env: &'a BTreeMap<String, String>,
}

impl HandlebarsExpander {
    /// Creates an expander with no extra variables.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);

        Self {
            registry,
            variables: BTreeMap::new(),
        }
    }

    /// Registers an extra variable, available as `{{env.NAME}}`.
    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Registers every variable from an iterator (e.g. the process environment).
    #[must_use]
    pub fn with_variables<I, K, V>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.variables
            .extend(variables.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }
}

impl Default for HandlebarsExpander {
    fn default() -> Self {
        Self::new()
    }
}

impl MacroExpander for HandlebarsExpander {
    fn expand(&self, build: &BuildSnapshot, template: &str) -> Result<String, ExpansionError> {
        let context = ExpansionContext {
            job_name: build.full_name(),
            job_base_name: &build.job_name,
            build_number: build.number,
            build_display_name: &build.display_name,
            build_result: build.result.map_or("", BuildResult::as_str),
            jenkins_url: build.root_url.as_deref().unwrap_or_default(),
            env: &self.variables,
        };

        self.registry
            .render_template(template, &context)
            .map_err(|e| match e.reason() {
                RenderErrorReason::TemplateError(parse) => ExpansionError::Malformed {
                    template: template.to_string(),
                    reason: parse.to_string(),
                },
                _ => ExpansionError::Evaluation {
                    template: template.to_string(),
                    reason: e.to_string(),
                },
            })
    }
}
