//! Error types for folio-interact
//!
//! User-facing failures (relay rejections, `file:` origin) are turned into
//! status messages by the contact binding and never surface here. These types
//! cover the places where the caller has to decide: configuration loading,
//! selector parsing, and relay transport.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for folio-interact operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration could not be loaded
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// A selector string could not be parsed
    #[error("Selector error: {0}")]
    Selector(#[from] SelectorError),

    /// The relay request failed before a response arrived
    #[error("Relay error: {0}")]
    Relay(#[from] RelayError),

    /// Terminal or filesystem I/O
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Errors raised while loading a [`ControllerConfig`](crate::config::ControllerConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid root margin `{0}`")]
    RootMargin(String),
}

/// Errors raised by the selector parser.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("invalid selector `{selector}`: {reason}")]
    Invalid { selector: String, reason: String },
}

/// Errors raised by a [`RelayTransport`](crate::relay::RelayTransport).
///
/// The display text is what the contact form shows to the visitor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// The request never produced a response (DNS, TLS, connection reset).
    #[error("{0}")]
    Network(String),

    /// The form action could not be resolved into a URL.
    #[error("{0}")]
    InvalidAction(String),
}

impl RelayError {
    /// Message suitable for the status line, empty when the transport gave none.
    pub fn message(&self) -> &str {
        match self {
            RelayError::Network(msg) | RelayError::InvalidAction(msg) => msg.trim(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_error_message_is_display() {
        let err = RelayError::Network("Failed to fetch".to_string());
        assert_eq!(err.to_string(), "Failed to fetch");
        assert_eq!(err.message(), "Failed to fetch");
        assert_eq!(RelayError::Network("   ".into()).message(), "");
    }

    #[test]
    fn test_wrapping() {
        let err: Error = SelectorError::Invalid {
            selector: "a[".into(),
            reason: "EndOfInput".into(),
        }
        .into();
        assert_eq!(err.to_string(), "Selector error: invalid selector `a[`: EndOfInput");
    }
}
