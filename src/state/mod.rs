//! Mapping from build results to Dynatrace notification states.
//!
//! The mapping is a fixed rule table evaluated top to bottom; the first
//! matching rule wins. A [`Decision::Skip`] means no request is sent and the
//! caller still treats the notification as successful.

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

use std::fmt;

use crate::build::BuildResult;

/// State communicated to Dynatrace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationState {
    /// Build finished successfully (or unstable, when remapped).
    Successful,
    /// Build finished with any other reportable outcome.
    Failed,
    /// Build is still running.
    InProgress,
}

impl NotificationState {
    /// Returns the wire name used in event texts.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Successful => "SUCCESSFUL",
            Self::Failed => "FAILED",
            Self::InProgress => "INPROGRESS",
        }
    }
}

impl fmt::Display for NotificationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a notification was not sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Running build, and in-progress notifications are suppressed.
    InProgressSuppressed,
    /// Non-successful build, and only successes are reported.
    OnlySuccessReported,
    /// Aborted build on the call path that suppresses in-progress events.
    Aborted,
    /// The build was never executed.
    NotBuilt,
}

/// Outcome of the state mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Send a notification with this state.
    Notify(NotificationState),
    /// Send nothing.
    Skip(SkipReason),
}

/// Configuration flags that influence the state mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct StateMapper {
    /// Skip running builds (and aborted ones on the suppressing call path)
    pub suppress_in_progress: bool,
    /// Report UNSTABLE builds as SUCCESSFUL
    pub unstable_as_success: bool,
    /// Report nothing but SUCCESS
    pub only_report_success: bool,
}

impl StateMapper {
    /// Maps a build result to a decision.
    ///
    /// Rules, first match wins:
    /// 1. running and suppressed → skip
    /// 2. running → `INPROGRESS`
    /// 3. `SUCCESS` → `SUCCESSFUL`
    /// 4. only successes reported → skip
    /// 5. `UNSTABLE` reported as success → `SUCCESSFUL`
    /// 6. `ABORTED` and suppressed → skip
    /// 7. `NOT_BUILT` → skip
    /// 8. anything else → `FAILED`
    #[must_use]
    pub fn decide(&self, result: Option<BuildResult>) -> Decision {
        let Some(result) = result else {
            return if self.suppress_in_progress {
                Decision::Skip(SkipReason::InProgressSuppressed)
            } else {
                Decision::Notify(NotificationState::InProgress)
            };
        };

        match result {
            BuildResult::Success => Decision::Notify(NotificationState::Successful),
            _ if self.only_report_success => Decision::Skip(SkipReason::OnlySuccessReported),
            BuildResult::Unstable if self.unstable_as_success => {
                tracing::info!("UNSTABLE reported to Dynatrace as SUCCESSFUL");
                Decision::Notify(NotificationState::Successful)
            }
            BuildResult::Aborted if self.suppress_in_progress => {
                tracing::info!("ABORTED");
                Decision::Skip(SkipReason::Aborted)
            }
            BuildResult::NotBuilt => {
                tracing::info!("NOT BUILT");
                Decision::Skip(SkipReason::NotBuilt)
            }
            BuildResult::Unstable | BuildResult::Failure | BuildResult::Aborted => {
                Decision::Notify(NotificationState::Failed)
            }
        }
    }
}
