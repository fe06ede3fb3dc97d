//! Dynatrace event payloads.
//!
//! A successful build is reported as a deployment event; every other state
//! becomes an annotation event. Both shapes attach to a single monitored
//! entity and carry a link back to the build.

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

use serde::Serialize;

use crate::build::BuildSnapshot;
use crate::state::NotificationState;

/// Maximum width of free-text fields.
pub const MAX_FIELD_LENGTH: usize = 255;

/// Maximum width of URL fields.
pub const MAX_URL_FIELD_LENGTH: usize = 450;

/// Value of the `source` field on every event.
pub const EVENT_SOURCE: &str = "jenkins";

/// Shortens `text` to at most `max_width` characters.
///
/// Longer strings are cut to `max_width - 3` characters followed by `...`.
///
/// # Panics
///
/// Panics if `max_width` is less than 4.
#[must_use]
pub fn abbreviate(text: &str, max_width: usize) -> String {
    assert!(max_width >= 4, "Minimum abbreviation width is 4");

    if text.chars().count() <= max_width {
        return text.to_string();
    }

    let mut short: String = text.chars().take(max_width - 3).collect();
    short.push_str("...");
    short
}

/// Returns the build's description, or a synthesized one when it is blank.
#[must_use]
pub fn describe_build(build: &BuildSnapshot, state: NotificationState, root_url: &str) -> String {
    if let Some(description) = build.description() {
        return description.to_string();
    }

    match state {
        NotificationState::InProgress => format!("building on {root_url}"),
        NotificationState::Successful | NotificationState::Failed => {
            format!("built by {root_url}")
        }
    }
}

/// Entities an event is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachRules {
    /// Dynatrace entity identifiers
    pub entity_ids: Vec<String>,
}

/// Custom properties of a deployment event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentProperties {
    /// Build description
    pub description: String,
}

/// Custom properties of an annotation event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationProperties {
    /// Build description
    pub description: String,
    /// Link back to the build
    pub ci_back_link: String,
}

/// `CUSTOM_DEPLOYMENT` event body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentEvent {
    pub deployment_name: String,
    pub deployment_version: String,
    pub attach_rules: AttachRules,
    pub custom_properties: DeploymentProperties,
    pub ci_back_link: String,
    pub source: &'static str,
}

/// `CUSTOM_ANNOTATION` event body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationEvent {
    pub annotation_type: String,
    pub annotation_description: String,
    pub attach_rules: AttachRules,
    pub custom_properties: AnnotationProperties,
    pub source: &'static str,
}

/// An event accepted by the Dynatrace events API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "eventType")]
pub enum EventPayload {
    /// Marks a successful release.
    #[serde(rename = "CUSTOM_DEPLOYMENT")]
    Deployment(DeploymentEvent),
    /// Marks any other lifecycle note.
    #[serde(rename = "CUSTOM_ANNOTATION")]
    Annotation(AnnotationEvent),
}

impl EventPayload {
    /// Returns the `eventType` discriminator.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::Deployment(_) => "CUSTOM_DEPLOYMENT",
            Self::Annotation(_) => "CUSTOM_ANNOTATION",
        }
    }

    /// Serializes the payload as UTF-8 JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// Builds the event payload for one notification.
#[derive(Debug, Clone, Copy)]
pub struct PayloadBuilder<'a> {
    build: &'a BuildSnapshot,
    build_key: &'a str,
    entity_id: &'a str,
    root_url: &'a str,
}

impl<'a> PayloadBuilder<'a> {
    /// Creates a payload builder.
    ///
    /// `build_key` is the already escaped key; `root_url` is the effective
    /// CI root URL used for descriptions and the fallback back-link.
    #[must_use]
    pub const fn new(
        build: &'a BuildSnapshot,
        build_key: &'a str,
        entity_id: &'a str,
        root_url: &'a str,
    ) -> Self {
        Self {
            build,
            build_key,
            entity_id,
            root_url,
        }
    }

    /// Builds the payload for `state`.
    #[must_use]
    pub fn build(&self, state: NotificationState) -> EventPayload {
        let display_name = abbreviate(&self.build.display_name, MAX_FIELD_LENGTH);
        let key = abbreviate(self.build_key, MAX_FIELD_LENGTH);
        let description = abbreviate(
            &describe_build(self.build, state, self.root_url),
            MAX_FIELD_LENGTH,
        );
        let back_link = abbreviate(&self.build.run_url(self.root_url), MAX_URL_FIELD_LENGTH);
        let attach_rules = AttachRules {
            entity_ids: vec![self.entity_id.to_string()],
        };

        match state {
            NotificationState::Successful => EventPayload::Deployment(DeploymentEvent {
                deployment_name: format!("{state} - {display_name}"),
                deployment_version: key,
                attach_rules,
                custom_properties: DeploymentProperties { description },
                ci_back_link: back_link,
                source: EVENT_SOURCE,
            }),
            NotificationState::Failed | NotificationState::InProgress => {
                EventPayload::Annotation(AnnotationEvent {
                    annotation_type: format!("{state} Jenkins Job"),
                    annotation_description: format!("{state} - {display_name} {key}"),
                    attach_rules,
                    custom_properties: AnnotationProperties {
                        description,
                        ci_back_link: back_link,
                    },
                    source: EVENT_SOURCE,
                })
            }
        }
    }
}
