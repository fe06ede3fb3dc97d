//! Tests for build key derivation.

use super::*;
use crate::expand::{ExpansionError, HandlebarsExpander, MacroExpander};
use crate::test_support::LogCapture;

const ROOT: &str = "http://ci.example.com";

/// Expander that fails every expansion.
struct FailingExpander;

impl MacroExpander for FailingExpander {
    fn expand(&self, _build: &BuildSnapshot, template: &str) -> Result<String, ExpansionError> {
        Err(ExpansionError::Malformed {
            template: template.to_string(),
            reason: "unterminated macro".to_string(),
        })
    }
}

fn build() -> BuildSnapshot {
    BuildSnapshot::new("app", 42)
}

mod default_build_key {
    use super::*;

    #[test]
    fn includes_build_number_when_enabled() {
        let expander = HandlebarsExpander::new();

        let key = KeyBuilder::new(&expander)
            .with_build_number(true)
            .raw_key(&build(), ROOT);

        assert_eq!(key, "app-42-http://ci.example.com");
    }

    #[test]
    fn omits_build_number_by_default() {
        let expander = HandlebarsExpander::new();

        let key = KeyBuilder::new(&expander).raw_key(&build(), ROOT);

        assert_eq!(key, "app-http://ci.example.com");
    }

    #[test]
    fn free_function_matches_builder() {
        assert_eq!(default_key(&build(), ROOT, true), "app-42-http://ci.example.com");
    }

    #[test]
    fn blank_template_uses_default_key() {
        let expander = FailingExpander;

        let key = KeyBuilder::new(&expander)
            .with_project_key(Some("  "))
            .raw_key(&build(), ROOT);

        assert_eq!(key, "app-http://ci.example.com");
    }
}

mod project_key_template {
    use super::*;

    #[test]
    fn expanded_template_replaces_default_key() {
        let expander = HandlebarsExpander::new();

        let key = KeyBuilder::new(&expander)
            .with_project_key(Some("{{JOB_BASE_NAME}}-release-{{BUILD_NUMBER}}"))
            .with_build_number(true)
            .raw_key(&build(), ROOT);

        assert_eq!(key, "app-release-42");
    }

    #[test]
    fn failed_expansion_falls_back_to_default_key() {
        let capture = LogCapture::new();
        let _guard = capture.install();
        let expander = FailingExpander;

        let builder = KeyBuilder::new(&expander)
            .with_project_key(Some("${BROKEN"))
            .with_build_number(true);
        let key = builder.raw_key(&build(), ROOT);

        assert_eq!(key, default_key(&build(), ROOT, true));
        let logs = capture.contents();
        assert!(logs.contains("WARN"));
        assert!(logs.contains("Processing with default build key"));
    }
}

mod parent_prefix {
    use super::*;

    #[test]
    fn prepends_folder_name_when_enabled() {
        let expander = HandlebarsExpander::new();
        let build = BuildSnapshot::from_full_name("org/team/app", 42);

        let key = KeyBuilder::new(&expander)
            .with_parent_key(true)
            .raw_key(&build, ROOT);

        assert_eq!(key, "org/team-app-http://ci.example.com");
    }

    #[test]
    fn top_level_job_gets_no_prefix() {
        let expander = HandlebarsExpander::new();

        let key = KeyBuilder::new(&expander)
            .with_parent_key(true)
            .raw_key(&build(), ROOT);

        assert_eq!(key, "app-http://ci.example.com");
    }

    #[test]
    fn prefix_is_kept_on_expansion_failure() {
        let expander = FailingExpander;
        let build = BuildSnapshot::from_full_name("team/app", 42);

        let key = KeyBuilder::new(&expander)
            .with_parent_key(true)
            .with_project_key(Some("{{oops"))
            .raw_key(&build, ROOT);

        assert_eq!(key, "team-app-http://ci.example.com");
    }

    #[test]
    fn prefix_applies_to_expanded_template() {
        let expander = HandlebarsExpander::new();
        let build = BuildSnapshot::from_full_name("team/app", 42);

        let key = KeyBuilder::new(&expander)
            .with_parent_key(true)
            .with_project_key(Some("v{{BUILD_NUMBER}}"))
            .raw_key(&build, ROOT);

        assert_eq!(key, "team-v42");
    }
}

mod escaping {
    use super::*;

    #[test]
    fn build_escapes_the_raw_key() {
        let expander = HandlebarsExpander::new();
        let builder = KeyBuilder::new(&expander).with_build_number(true);

        let key = builder.build(&build(), ROOT);

        assert_eq!(key, r"app-42-http:\/\/ci.example.com");
        assert_eq!(key, escape_script(&builder.raw_key(&build(), ROOT)));
    }

    #[test]
    fn escapes_quotes_and_backslashes() {
        assert_eq!(escape_script(r#"a"b'c\d"#), r#"a\"b\'c\\d"#);
    }

    #[test]
    fn escapes_control_characters() {
        assert_eq!(escape_script("a\nb\tc\rd"), r"a\nb\tc\rd");
        assert_eq!(escape_script("\u{1}"), r"\u0001");
    }

    #[test]
    fn escapes_non_ascii_as_utf16_units() {
        assert_eq!(escape_script("\u{e9}"), r"\u00E9");
        assert_eq!(escape_script("\u{1f600}"), r"\uD83D\uDE00");
    }

    #[test]
    fn plain_ascii_is_untouched() {
        assert_eq!(escape_script("app-42 build_1.0"), "app-42 build_1.0");
    }
}
