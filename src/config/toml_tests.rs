//! Tests for TOML configuration parsing.

use std::path::Path;

use super::toml::{TomlConfig, default_config_template};

mod parsing {
    use super::*;

    #[test]
    fn parse_empty_config() {
        let config = TomlConfig::parse("").unwrap();

        assert_eq!(config.global, crate::config::GlobalSettings::default());
        assert!(config.credentials.is_empty());
        assert!(config.proxy.is_none());
    }

    #[test]
    fn parse_global_section() {
        let toml = r#"
            [global]
            url = "https://abc123.live.dynatrace.com/"
            credentials_id = "dt"
            entity_id = "SERVICE-1"
            project_key = "{{JOB_BASE_NAME}}"
            root_url = "https://ci.example.com/"
            ignore_unverified_ssl = true
            include_build_number = true
            prepend_parent_key = true
            disable_in_progress = true
            unstable_as_success = true
            only_report_success = true
        "#;

        let global = TomlConfig::parse(toml).unwrap().global;

        assert_eq!(global.url.as_deref(), Some("https://abc123.live.dynatrace.com/"));
        assert_eq!(global.credentials_id.as_deref(), Some("dt"));
        assert_eq!(global.entity_id.as_deref(), Some("SERVICE-1"));
        assert_eq!(global.project_key.as_deref(), Some("{{JOB_BASE_NAME}}"));
        assert_eq!(global.root_url.as_deref(), Some("https://ci.example.com/"));
        assert!(global.ignore_unverified_ssl);
        assert!(global.include_build_number);
        assert!(global.prepend_parent_key);
        assert!(global.disable_in_progress);
        assert!(global.unstable_as_success);
        assert!(global.only_report_success);
    }

    #[test]
    fn omitted_flags_default_to_false() {
        let global = TomlConfig::parse("[global]\nurl = \"https://dt\"")
            .unwrap()
            .global;

        assert!(!global.ignore_unverified_ssl);
        assert!(!global.disable_in_progress);
    }

    #[test]
    fn parse_credentials_sections() {
        let toml = r#"
            [credentials.token-only]
            token = "dt0c01.abc"

            [credentials.mtls]
            cert_pem = "/etc/dt/client.crt"
            key_pem = "/etc/dt/client.key"
        "#;

        let config = TomlConfig::parse(toml).unwrap();

        assert_eq!(config.credentials.len(), 2);
        assert_eq!(
            config.credentials["token-only"].token.as_deref(),
            Some("dt0c01.abc")
        );
        let mtls = &config.credentials["mtls"];
        assert_eq!(mtls.token, None);
        assert_eq!(mtls.cert_pem.as_deref(), Some(Path::new("/etc/dt/client.crt")));
        assert_eq!(mtls.key_pem.as_deref(), Some(Path::new("/etc/dt/client.key")));
    }

    #[test]
    fn parse_proxy_section() {
        let toml = r#"
            [proxy]
            url = "http://proxy:3128"
            username = "bob"
            password = "pw"
            no_proxy = ["localhost", ".internal"]
        "#;

        let proxy = TomlConfig::parse(toml).unwrap().proxy.unwrap();

        assert_eq!(proxy.url, "http://proxy:3128");
        assert_eq!(proxy.username.as_deref(), Some("bob"));
        assert_eq!(proxy.password.as_deref(), Some("pw"));
        assert_eq!(proxy.no_proxy, vec!["localhost", ".internal"]);
    }
}

mod errors {
    use super::*;
    use crate::config::ConfigError;

    #[test]
    fn unknown_global_field_is_rejected() {
        let result = TomlConfig::parse("[global]\nurl_typo = \"x\"");

        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn unknown_section_is_rejected() {
        let result = TomlConfig::parse("[server]\nurl = \"x\"");

        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn wrong_type_is_rejected() {
        let result = TomlConfig::parse("[global]\ndisable_in_progress = \"yes\"");

        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn proxy_without_url_is_rejected() {
        let result = TomlConfig::parse("[proxy]\nusername = \"bob\"");

        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn missing_file_is_read_error() {
        let result = TomlConfig::load(Path::new("/nonexistent/dynatrace-notify.toml"));

        assert!(matches!(result, Err(ConfigError::FileRead { .. })));
    }
}

mod template {
    use super::*;

    #[test]
    fn default_template_parses() {
        let config = TomlConfig::parse(&default_config_template()).unwrap();

        assert_eq!(config.global.url, None);
        assert!(config.credentials.is_empty());
        assert!(config.proxy.is_none());
    }

    #[test]
    fn default_template_documents_every_section() {
        let template = default_config_template();

        assert!(template.contains("[global]"));
        assert!(template.contains("[credentials.dynatrace]"));
        assert!(template.contains("[proxy]"));
        assert!(template.contains("only_report_success"));
    }
}
