//! Read-only view of a CI build and the identifiers derived from it.
//!
//! This module provides:
//! - The build outcome as reported by the CI runtime ([`BuildResult`])
//! - A snapshot of the build metadata a notification needs ([`BuildSnapshot`])
//! - The build key sent to Dynatrace ([`KeyBuilder`], [`escape_script`])

mod key;

#[cfg(test)]
mod key_tests;
#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub use key::{KeyBuilder, default_key, escape_script};

/// Final outcome of a build, as reported by the CI runtime.
///
/// A running build has no result yet; [`BuildSnapshot::result`] models
/// that as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildResult {
    /// The build completed without errors.
    Success,
    /// The build completed but some checks (typically tests) failed.
    Unstable,
    /// The build failed.
    Failure,
    /// The build was cancelled.
    Aborted,
    /// The build was never executed (e.g. skipped by an upstream gate).
    NotBuilt,
}

impl BuildResult {
    /// Every result, in severity order.
    pub const ALL: [Self; 5] = [
        Self::Success,
        Self::Unstable,
        Self::Failure,
        Self::Aborted,
        Self::NotBuilt,
    ];

    /// Returns the canonical upper-case name used by CI runtimes.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Unstable => "UNSTABLE",
            Self::Failure => "FAILURE",
            Self::Aborted => "ABORTED",
            Self::NotBuilt => "NOT_BUILT",
        }
    }
}

impl fmt::Display for BuildResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a build result string is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown build result '{0}': expected SUCCESS, UNSTABLE, FAILURE, ABORTED or NOT_BUILT")]
pub struct ParseBuildResultError(pub String);

impl FromStr for BuildResult {
    type Err = ParseBuildResultError;

    /// Parses a result name case-insensitively; `-` and `_` are interchangeable.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|result| result.as_str() == normalized)
            .ok_or_else(|| ParseBuildResultError(s.to_string()))
    }
}

/// Snapshot of the build metadata supplied by the CI runtime.
///
/// Constructed once per notification and never mutated by the notifier:
/// reporting a build must not change the build's own outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSnapshot {
    /// Build outcome, `None` while the build is still running
    pub result: Option<BuildResult>,
    /// Human-readable build name (e.g. `folder/app #42`)
    pub display_name: String,
    /// Free-text description set on the build, if any
    pub description: Option<String>,
    /// Build number within the job
    pub number: u64,
    /// Short name of the job (last path segment)
    pub job_name: String,
    /// Full name of the folder that contains the job, if any
    pub parent_job_name: Option<String>,
    /// Root URL of the CI system, as known to the build runtime
    pub root_url: Option<String>,
    /// Link back to this build, if the runtime provides one
    pub run_url: Option<String>,
}

impl BuildSnapshot {
    /// Creates a snapshot for a running build of a top-level job.
    ///
    /// The display name defaults to `<job> #<number>`.
    #[must_use]
    pub fn new(job_name: impl Into<String>, number: u64) -> Self {
        let job_name = job_name.into();
        Self {
            result: None,
            display_name: format!("{job_name} #{number}"),
            description: None,
            number,
            job_name,
            parent_job_name: None,
            root_url: None,
            run_url: None,
        }
    }

    /// Creates a snapshot from a slash-separated full job name.
    ///
    /// `folder/team/app` yields job `app` inside folder `folder/team`.
    /// Empty segments are ignored.
    #[must_use]
    pub fn from_full_name(full_name: &str, number: u64) -> Self {
        let segments: Vec<&str> = full_name.split('/').filter(|s| !s.is_empty()).collect();

        match segments.split_last() {
            Some((name, [])) => Self::new(*name, number),
            Some((name, parents)) => {
                let mut snapshot = Self::new(*name, number).with_parent(parents.join("/"));
                snapshot.display_name = format!("{} #{number}", snapshot.full_name());
                snapshot
            }
            None => Self::new(full_name, number),
        }
    }

    /// Sets the build result.
    #[must_use]
    pub const fn with_result(mut self, result: BuildResult) -> Self {
        self.result = Some(result);
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Sets the build description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the full name of the enclosing folder.
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_job_name = Some(parent.into());
        self
    }

    /// Sets the CI root URL known to the build runtime.
    #[must_use]
    pub fn with_root_url(mut self, root_url: impl Into<String>) -> Self {
        self.root_url = Some(root_url.into());
        self
    }

    /// Sets the link back to this build.
    #[must_use]
    pub fn with_run_url(mut self, run_url: impl Into<String>) -> Self {
        self.run_url = Some(run_url.into());
        self
    }

    /// Returns the job's full name including its folders.
    #[must_use]
    pub fn full_name(&self) -> String {
        match &self.parent_job_name {
            Some(parent) => format!("{parent}/{}", self.job_name),
            None => self.job_name.clone(),
        }
    }

    /// Returns the non-blank description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
    }

    /// Returns the link back to this build.
    ///
    /// Falls back to the conventional `<root>job/<a>/job/<b>/<number>/`
    /// layout when the runtime did not supply one.
    #[must_use]
    pub fn run_url(&self, root_url: &str) -> String {
        if let Some(url) = self.run_url.as_deref().filter(|u| !u.trim().is_empty()) {
            return url.to_string();
        }

        let mut url = root_url.to_string();
        if !url.ends_with('/') {
            url.push('/');
        }
        for segment in self.full_name().split('/') {
            url.push_str("job/");
            url.push_str(segment);
            url.push('/');
        }
        url.push_str(&self.number.to_string());
        url.push('/');
        url
    }
}
