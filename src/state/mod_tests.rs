//! Tests for the state mapping rule table.

use super::*;
use crate::build::BuildResult;
use crate::test_support::LogCapture;

fn mapper(suppress: bool, unstable_as_success: bool, only_success: bool) -> StateMapper {
    StateMapper {
        suppress_in_progress: suppress,
        unstable_as_success,
        only_report_success: only_success,
    }
}

/// Reference implementation of the rule table, written as plain conditions.
fn expected(
    result: Option<BuildResult>,
    suppress: bool,
    unstable_as_success: bool,
    only_success: bool,
) -> Decision {
    use BuildResult as R;
    use Decision::{Notify, Skip};
    use NotificationState as S;

    match result {
        None if suppress => Skip(SkipReason::InProgressSuppressed),
        None => Notify(S::InProgress),
        Some(R::Success) => Notify(S::Successful),
        Some(_) if only_success => Skip(SkipReason::OnlySuccessReported),
        Some(R::Unstable) if unstable_as_success => Notify(S::Successful),
        Some(R::Aborted) if suppress => Skip(SkipReason::Aborted),
        Some(R::NotBuilt) => Skip(SkipReason::NotBuilt),
        Some(_) => Notify(S::Failed),
    }
}

mod rule_table {
    use super::*;

    #[test]
    fn every_result_and_flag_combination_matches_the_table() {
        let results = std::iter::once(None).chain(BuildResult::ALL.into_iter().map(Some));

        for result in results {
            for bits in 0u8..8 {
                let (suppress, unstable, only) = (bits & 1 != 0, bits & 2 != 0, bits & 4 != 0);

                assert_eq!(
                    mapper(suppress, unstable, only).decide(result),
                    expected(result, suppress, unstable, only),
                    "result={result:?} suppress={suppress} unstable={unstable} only={only}"
                );
            }
        }
    }

    #[test]
    fn running_build_is_in_progress() {
        assert_eq!(
            StateMapper::default().decide(None),
            Decision::Notify(NotificationState::InProgress)
        );
    }

    #[test]
    fn running_build_is_skipped_when_suppressed() {
        assert_eq!(
            mapper(true, false, false).decide(None),
            Decision::Skip(SkipReason::InProgressSuppressed)
        );
    }

    #[test]
    fn success_wins_over_only_success_flag() {
        assert_eq!(
            mapper(false, false, true).decide(Some(BuildResult::Success)),
            Decision::Notify(NotificationState::Successful)
        );
    }

    #[test]
    fn only_success_flag_wins_over_unstable_remap() {
        assert_eq!(
            mapper(false, true, true).decide(Some(BuildResult::Unstable)),
            Decision::Skip(SkipReason::OnlySuccessReported)
        );
    }

    #[test]
    fn unstable_is_failed_by_default() {
        assert_eq!(
            StateMapper::default().decide(Some(BuildResult::Unstable)),
            Decision::Notify(NotificationState::Failed)
        );
    }

    #[test]
    fn aborted_is_failed_unless_suppressed() {
        assert_eq!(
            StateMapper::default().decide(Some(BuildResult::Aborted)),
            Decision::Notify(NotificationState::Failed)
        );
        assert_eq!(
            mapper(true, false, false).decide(Some(BuildResult::Aborted)),
            Decision::Skip(SkipReason::Aborted)
        );
    }

    #[test]
    fn not_built_is_always_skipped() {
        for bits in 0u8..4 {
            let decision = mapper(bits & 1 != 0, bits & 2 != 0, false).decide(Some(BuildResult::NotBuilt));
            assert_eq!(decision, Decision::Skip(SkipReason::NotBuilt));
        }
    }
}

mod logging {
    use super::*;

    #[test]
    fn unstable_remap_is_logged() {
        let capture = LogCapture::new();
        let _guard = capture.install();

        let _ = mapper(false, true, false).decide(Some(BuildResult::Unstable));

        assert!(capture.contents().contains("UNSTABLE reported to Dynatrace as SUCCESSFUL"));
    }

    #[test]
    fn not_built_skip_is_logged() {
        let capture = LogCapture::new();
        let _guard = capture.install();

        let _ = StateMapper::default().decide(Some(BuildResult::NotBuilt));

        assert!(capture.contents().contains("NOT BUILT"));
    }
}

mod notification_state {
    use super::*;

    #[test]
    fn wire_names() {
        assert_eq!(NotificationState::Successful.as_str(), "SUCCESSFUL");
        assert_eq!(NotificationState::Failed.as_str(), "FAILED");
        assert_eq!(NotificationState::InProgress.to_string(), "INPROGRESS");
    }
}
