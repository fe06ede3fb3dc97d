//! Build key derivation.

use std::fmt::Write as _;

use crate::expand::{MacroExpander, or_fallback};

use super::BuildSnapshot;

/// Derives the key that identifies a build to Dynatrace.
///
/// The key comes from an expandable project-key template when one is
/// configured, else from [`default_key`]. A failed expansion never fails the
/// notification: it is logged and the default key is used instead.
///
/// # Example
///
/// ```
/// use dynatrace_notify::build::{BuildSnapshot, KeyBuilder};
/// use dynatrace_notify::expand::HandlebarsExpander;
///
/// let expander = HandlebarsExpander::new();
/// let build = BuildSnapshot::new("app", 42);
/// let key = KeyBuilder::new(&expander)
///     .with_build_number(true)
///     .raw_key(&build, "http://ci.example.com");
///
/// assert_eq!(key, "app-42-http://ci.example.com");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct KeyBuilder<'a, E: ?Sized> {
    expander: &'a E,
    project_key: Option<&'a str>,
    include_build_number: bool,
    prepend_parent_key: bool,
}

impl<'a, E: MacroExpander + ?Sized> KeyBuilder<'a, E> {
    /// Creates a key builder with no template and all options disabled.
    #[must_use]
    pub const fn new(expander: &'a E) -> Self {
        Self {
            expander,
            project_key: None,
            include_build_number: false,
            prepend_parent_key: false,
        }
    }

    /// Sets the project-key template. Blank templates are ignored.
    #[must_use]
    pub fn with_project_key(mut self, template: Option<&'a str>) -> Self {
        self.project_key = template.filter(|t| !t.trim().is_empty());
        self
    }

    /// Includes the build number in the default key.
    #[must_use]
    pub const fn with_build_number(mut self, include: bool) -> Self {
        self.include_build_number = include;
        self
    }

    /// Prefixes the key with the full name of the job's enclosing folder.
    #[must_use]
    pub const fn with_parent_key(mut self, prepend: bool) -> Self {
        self.prepend_parent_key = prepend;
        self
    }

    /// Returns the key before escaping.
    #[must_use]
    pub fn raw_key(&self, build: &BuildSnapshot, root_url: &str) -> String {
        let mut key = String::new();

        if self.prepend_parent_key {
            if let Some(parent) = &build.parent_job_name {
                key.push_str(parent);
                key.push('-');
            }
        }

        let body = match self.project_key {
            Some(template) => or_fallback(
                self.expander.expand(build, template),
                "Cannot expand build key from parameter. Processing with default build key",
                || default_key(build, root_url, self.include_build_number),
            ),
            None => default_key(build, root_url, self.include_build_number),
        };
        key.push_str(&body);

        key
    }

    /// Returns the escaped key, safe for embedding in a string literal.
    #[must_use]
    pub fn build(&self, build: &BuildSnapshot, root_url: &str) -> String {
        escape_script(&self.raw_key(build, root_url))
    }
}

/// Returns the deterministic key `<job>[-<number>]-<root url>`.
#[must_use]
pub fn default_key(build: &BuildSnapshot, root_url: &str, include_build_number: bool) -> String {
    let mut key = build.job_name.clone();
    if include_build_number {
        let _ = write!(key, "-{}", build.number);
    }
    key.push('-');
    key.push_str(root_url);
    key
}

/// Escapes a string for a JavaScript string literal.
///
/// Quotes, backslashes and `/` get a backslash; control characters use
/// their short form where one exists and `\uXXXX` otherwise. Everything
/// outside ASCII is written as UTF-16 `\uXXXX` escapes.
#[must_use]
pub fn escape_script(input: &str) -> String {
    let mut out = String::with_capacity(input.len());

    for ch in input.chars() {
        match ch {
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '/' => out.push_str("\\/"),
            '\u{8}' => out.push_str("\\b"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\u{c}' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            c if u32::from(c) < 0x20 || u32::from(c) > 0x7f => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    let _ = write!(out, "\\u{unit:04X}");
                }
            }
            c => out.push(c),
        }
    }

    out
}
