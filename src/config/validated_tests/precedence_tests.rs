//! Tests for CLI-over-TOML precedence.

use crate::config::{Flag, Text};

use super::*;

const GLOBAL: &str = r#"
    [global]
    url = "https://global.live.dynatrace.com/"
    credentials_id = "global-creds"
    entity_id = "GLOBAL-ENTITY"
    project_key = "{{JOB_BASE_NAME}}"
    root_url = "https://ci.example.com/"
    disable_in_progress = true
    unstable_as_success = true
"#;

#[test]
fn cli_text_overrides_global() {
    let cli = build_cli(&[
        "start",
        "--url",
        "https://job.live.dynatrace.com",
        "--entity-id",
        "JOB-ENTITY",
    ]);
    let toml = toml(GLOBAL);

    let config = ValidatedConfig::from_raw(&cli, Some(&toml)).unwrap();

    assert_eq!(
        config.settings.text(Text::Url),
        Some("https://job.live.dynatrace.com")
    );
    assert_eq!(config.settings.text(Text::EntityId), Some("JOB-ENTITY"));
    assert_eq!(config.settings.text(Text::ProjectKey), Some("{{JOB_BASE_NAME}}"));
}

#[test]
fn global_applies_when_cli_is_silent() {
    let cli = build_cli(&["start"]);
    let toml = toml(GLOBAL);

    let config = ValidatedConfig::from_raw(&cli, Some(&toml)).unwrap();
    let effective = config.settings.effective();

    assert_eq!(
        effective.url.as_deref(),
        Some("https://global.live.dynatrace.com")
    );
    assert_eq!(effective.credentials_id.as_deref(), Some("global-creds"));
    assert_eq!(effective.root_url.as_deref(), Some("https://ci.example.com/"));
    assert!(effective.disable_in_progress);
    assert!(effective.unstable_as_success);
}

#[test]
fn explicit_false_flag_overrides_global_true() {
    let cli = build_cli(&["start", "--disable-in-progress=false"]);
    let toml = toml(GLOBAL);

    let config = ValidatedConfig::from_raw(&cli, Some(&toml)).unwrap();

    assert!(!config.settings.flag(Flag::DisableInProgress));
    assert!(config.settings.flag(Flag::UnstableAsSuccess));
}

#[test]
fn bare_flag_overrides_global_false() {
    let cli = build_cli(&["start", "--only-report-success"]);
    let toml = toml(GLOBAL);

    let config = ValidatedConfig::from_raw(&cli, Some(&toml)).unwrap();

    assert!(config.settings.flag(Flag::OnlyReportSuccess));
}

#[test]
fn blank_cli_text_falls_back_to_global() {
    let cli = build_cli(&["start", "--entity-id", ""]);
    let toml = toml(GLOBAL);

    let config = ValidatedConfig::from_raw(&cli, Some(&toml)).unwrap();

    assert_eq!(config.settings.text(Text::EntityId), Some("GLOBAL-ENTITY"));
}
