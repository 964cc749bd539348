//! Controller configuration.
//!
//! Every field has a default, and the defaults reproduce the stock portfolio
//! page: the DOM hooks it ships with, an 8px gap under the sticky header, the
//! observer settings for section highlight and reveal, and the contact form
//! copy. A JSON file only needs to name what it changes:
//!
//! ```json
//! { "contact": { "owner_email": "me@folio.dev" }, "scroll": { "header_gap": 12 } }
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::observer::{ObserverOptions, RootMargin};

// =============================================================================
// SECTIONS
// =============================================================================

/// Selectors for every element the controller looks up at mount.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub header: String,
    pub nav_toggle: String,
    pub nav: String,
    pub nav_links: String,
    pub anchors: String,
    pub sections: String,
    pub reveal: String,
    pub progress: String,
    pub year: String,
    pub form: String,
    pub status: String,
    /// Looked up inside the form.
    pub submit: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            header: ".site-header".into(),
            nav_toggle: "#nav-toggle".into(),
            nav: "#primary-nav".into(),
            nav_links: ".nav-link".into(),
            anchors: r##"a[href^="#"]"##.into(),
            sections: "main section[id]".into(),
            reveal: ".reveal".into(),
            progress: "#scroll-progress".into(),
            year: "#current-year".into(),
            form: "#contact-form".into(),
            status: "#form-status".into(),
            submit: r#"button[type="submit"]"#.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    pub open_class: String,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            open_class: "open".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Extra space kept between the sticky header and the scroll target.
    pub header_gap: f32,
    /// Animate anchor scrolling.
    pub smooth: bool,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            header_gap: 8.0,
            smooth: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub active_class: String,
    pub observer: ObserverOptions,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            active_class: "active".into(),
            observer: ObserverOptions::new(0.5, margin("-20% 0px -30% 0px")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub revealed_class: String,
    /// Delay added per position within a group.
    pub stagger_ms: u32,
    /// Elements per stagger cycle.
    pub stagger_group: usize,
    pub observer: ObserverOptions,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            revealed_class: "in-view".into(),
            stagger_ms: 60,
            stagger_group: 6,
            observer: ObserverOptions::new(0.2, margin("0px 0px -5% 0px")),
        }
    }
}

/// Contact form fields and status copy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    /// Address offered when the relay gives no usable message.
    pub owner_email: String,
    /// Overrides the generated owner-email fallback.
    pub fallback_message: Option<String>,
    pub email_field: String,
    pub reply_to_field: String,
    pub file_origin_message: String,
    pub sending_message: String,
    pub sending_label: String,
    pub success_message: String,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            owner_email: "hello@example.com".into(),
            fallback_message: None,
            email_field: "email".into(),
            reply_to_field: "_replyto".into(),
            file_origin_message: "Form cannot send from file://. Run the site on localhost \
                (for example: python -m http.server 5500) and try again."
                .into(),
            sending_message: "Sending message...".into(),
            sending_label: "Sending...".into(),
            success_message:
                "Message sent successfully. Check your inbox for new contact emails.".into(),
        }
    }
}

impl ContactConfig {
    /// Status shown when a failure carries no message of its own.
    pub fn fallback(&self) -> String {
        match &self.fallback_message {
            Some(message) => message.clone(),
            None => format!(
                "Could not send right now. Please email me directly at {}.",
                self.owner_email
            ),
        }
    }
}

// =============================================================================
// ROOT
// =============================================================================

/// Full controller configuration.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub selectors: SelectorConfig,
    pub nav: NavConfig,
    pub scroll: ScrollConfig,
    pub highlight: HighlightConfig,
    pub reveal: RevealConfig,
    pub contact: ContactConfig,
}

impl ControllerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }
}

fn margin(src: &str) -> RootMargin {
    RootMargin::parse(src).unwrap_or_default()
}
