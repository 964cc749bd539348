//! Form relay protocol.
//!
//! A relay service accepts a form-encoded POST and forwards it by email. It
//! answers with JSON carrying an optional `success` flag and an optional
//! `message`. Some relays report failure inside a 200 response, so callers
//! must check both the HTTP status and the parsed reply.
//!
//! - [`FormData`] - ordered field list sent as the request body
//! - [`RelayResponse`] / [`RelayReply`] - raw response and its lenient parse
//! - [`RelayTransport`] - the network seam; [`HttpRelay`] is the real one

mod http;

use serde_json::Value;
use url::Url;

use crate::error::RelayError;

pub use http::HttpRelay;

// =============================================================================
// FORM DATA
// =============================================================================

/// Ordered multimap of form fields (the `FormData` browser type).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormData {
    entries: Vec<(String, String)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// First value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Add a value without touching existing ones.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Replace every value under `name` with a single one.
    ///
    /// The replacement keeps the position of the first existing entry; a new
    /// name is appended at the end.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();

        match self.entries.iter().position(|(key, _)| *key == name) {
            Some(first) => {
                self.entries[first].1 = value;
                let mut index = 0;
                self.entries.retain(|(key, _)| {
                    let keep = index <= first || *key != name;
                    index += 1;
                    keep
                });
            }
            None => self.entries.push((name, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

// =============================================================================
// RESPONSE
// =============================================================================

/// What came back from the relay, before interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayResponse {
    pub status: u16,
    pub body: String,
}

impl RelayResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// `response.ok`: status in 200..=299.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The fields of a relay reply the form cares about.
///
/// Parsing never fails: a body that is not a JSON object yields the empty
/// reply, which says nothing about success either way.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RelayReply {
    /// `Some(false)` only for an explicit `false` or `"false"`.
    pub success: Option<bool>,
    pub message: Option<String>,
}

impl RelayReply {
    pub fn parse(body: &str) -> Self {
        let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) else {
            return Self::default();
        };

        let success = match map.get("success") {
            Some(Value::Bool(flag)) => Some(*flag),
            Some(Value::String(s)) if s == "false" => Some(false),
            Some(Value::String(s)) if s == "true" => Some(true),
            _ => None,
        };

        let message = match map.get("message") {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            // Falsy scalars carry nothing worth showing
            Some(Value::Number(n)) if n.as_f64() != Some(0.0) => Some(n.to_string()),
            Some(Value::Bool(true)) => Some("true".to_string()),
            _ => None,
        };

        Self { success, message }
    }

    /// Did the relay explicitly say the message was not sent?
    pub fn signals_failure(&self) -> bool {
        self.success == Some(false)
    }
}

/// Outcome of one submission once the response has been interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    Delivered,
    /// Rejected, with the relay's own message when it gave one.
    Rejected(Option<String>),
}

impl RelayOutcome {
    /// Failure when the status is not 2xx or the reply says `success: false`.
    pub fn from_response(response: &RelayResponse) -> Self {
        let reply = RelayReply::parse(&response.body);
        if !response.is_success() || reply.signals_failure() {
            RelayOutcome::Rejected(reply.message)
        } else {
            RelayOutcome::Delivered
        }
    }
}

// =============================================================================
// TRANSPORT
// =============================================================================

/// Sends a form to a relay endpoint.
///
/// Implementations make exactly one attempt and return HTTP error statuses as
/// responses; only failures that produced no response are errors.
pub trait RelayTransport {
    fn post_form(&self, url: &Url, data: &FormData) -> Result<RelayResponse, RelayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_data_set_replaces_in_place() {
        let mut data: FormData = [("name", "Ada"), ("tag", "a"), ("email", "x"), ("tag", "b")]
            .into_iter()
            .collect();

        data.set("tag", "c");
        let pairs: Vec<_> = data.iter().collect();
        assert_eq!(pairs, vec![("name", "Ada"), ("tag", "c"), ("email", "x")]);

        data.set("_replyto", "ada@example.com");
        assert_eq!(data.get("_replyto"), Some("ada@example.com"));
        assert_eq!(data.len(), 4);
    }

    #[test]
    fn test_reply_parse_lenient() {
        assert_eq!(RelayReply::parse("<html>502</html>"), RelayReply::default());
        assert_eq!(RelayReply::parse(""), RelayReply::default());
        assert_eq!(RelayReply::parse("[1,2]"), RelayReply::default());

        let reply = RelayReply::parse(r#"{"success": "false", "message": "Invalid email"}"#);
        assert_eq!(reply.success, Some(false));
        assert_eq!(reply.message.as_deref(), Some("Invalid email"));

        let reply = RelayReply::parse(r#"{"success": true, "message": "  "}"#);
        assert_eq!(reply.success, Some(true));
        assert_eq!(reply.message, None);
    }

    #[test]
    fn test_reply_scalar_messages() {
        let reply = RelayReply::parse(r#"{"success": false, "message": 429}"#);
        assert_eq!(reply.message.as_deref(), Some("429"));

        let reply = RelayReply::parse(r#"{"success": false, "message": 1.5}"#);
        assert_eq!(reply.message.as_deref(), Some("1.5"));

        let reply = RelayReply::parse(r#"{"success": false, "message": true}"#);
        assert_eq!(reply.message.as_deref(), Some("true"));

        for falsy in ["0", "false", "null", "[]", "{}"] {
            let body = format!(r#"{{"success": false, "message": {}}}"#, falsy);
            assert_eq!(RelayReply::parse(&body).message, None, "message {}", falsy);
        }

        let response = RelayResponse::new(400, r#"{"message": 503}"#);
        assert_eq!(
            RelayOutcome::from_response(&response),
            RelayOutcome::Rejected(Some("503".to_string()))
        );
    }

    #[test]
    fn test_outcome_dual_check() {
        let ok = RelayResponse::new(200, r#"{"success": "true"}"#);
        assert_eq!(RelayOutcome::from_response(&ok), RelayOutcome::Delivered);

        let silent = RelayResponse::new(200, "not json");
        assert_eq!(RelayOutcome::from_response(&silent), RelayOutcome::Delivered);

        let in_body = RelayResponse::new(200, r#"{"success": false, "message": "Invalid email"}"#);
        assert_eq!(
            RelayOutcome::from_response(&in_body),
            RelayOutcome::Rejected(Some("Invalid email".to_string()))
        );

        let server = RelayResponse::new(500, "oops");
        assert_eq!(RelayOutcome::from_response(&server), RelayOutcome::Rejected(None));
    }
}
