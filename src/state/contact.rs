//! Contact form submission through a form relay.
//!
//! A submission runs in two phases so the in-flight window is visible to the
//! host:
//!
//! 1. [`ContactForm::begin`] checks the origin, snapshots the form, disables
//!    the submit button and shows the pending status.
//! 2. [`ContactForm::complete`] interprets the relay's answer, writes the
//!    final status and always restores the button.
//!
//! [`ContactForm::submit`] runs both around a blocking [`RelayTransport`].
//!
//! # Example
//!
//! ```ignore
//! if let SubmitPhase::Pending(ticket) = form.begin(&mut page) {
//!     let result = ticket.send(&transport);
//!     form.complete(&mut page, result);
//! }
//! ```

use log::{debug, info};
use url::Url;

use crate::config::{ContactConfig, SelectorConfig};
use crate::dom::Page;
use crate::error::RelayError;
use crate::relay::{FormData, RelayOutcome, RelayResponse, RelayTransport};
use crate::types::ElementId;

use super::{FormStatus, StatusTone};

// =============================================================================
// PHASES
// =============================================================================

/// A snapshot ready to be posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionTicket {
    target: Result<Url, RelayError>,
    data: FormData,
}

impl SubmissionTicket {
    /// Resolved form action, or why it could not be resolved.
    pub fn target(&self) -> Result<&Url, &RelayError> {
        self.target.as_ref()
    }

    pub fn data(&self) -> &FormData {
        &self.data
    }

    /// Post the snapshot. An unresolvable action fails without a request.
    pub fn send(&self, transport: &dyn RelayTransport) -> Result<RelayResponse, RelayError> {
        let url = self.target.as_ref().map_err(|err| err.clone())?;
        transport.post_form(url, &self.data)
    }
}

/// What [`ContactForm::begin`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitPhase {
    /// The page origin cannot send; the status explains why.
    Blocked(FormStatus),
    /// A submission is already in flight; nothing changed.
    Busy,
    /// The form is locked and waiting for [`ContactForm::complete`].
    Pending(SubmissionTicket),
}

// =============================================================================
// BINDING
// =============================================================================

#[derive(Debug)]
pub struct ContactForm {
    form: ElementId,
    status: ElementId,
    submit: Option<ElementId>,
    config: ContactConfig,
    /// Submit label captured at `begin`, present while in flight.
    in_flight: Option<String>,
    last_status: Option<FormStatus>,
}

impl ContactForm {
    /// `None` unless both the form and its status element exist.
    pub fn bind(page: &dyn Page, selectors: &SelectorConfig, config: &ContactConfig) -> Option<Self> {
        let form = page.query_selector(&selectors.form);
        let status = page.query_selector(&selectors.status);
        let (Some(form), Some(status)) = (form, status) else {
            debug!(
                "event=binding_skipped binding=contact form_found={} status_found={}",
                form.is_some(),
                status.is_some()
            );
            return None;
        };

        Some(Self {
            form,
            status,
            submit: page.query_selector_within(form, &selectors.submit),
            config: config.clone(),
            in_flight: None,
            last_status: None,
        })
    }

    pub fn form(&self) -> ElementId {
        self.form
    }

    pub fn submit_button(&self) -> Option<ElementId> {
        self.submit
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn last_status(&self) -> Option<&FormStatus> {
        self.last_status.as_ref()
    }

    /// Start a submission.
    pub fn begin(&mut self, page: &mut dyn Page) -> SubmitPhase {
        if self.is_in_flight() {
            debug!("event=contact_submit_ignored reason=in_flight");
            return SubmitPhase::Busy;
        }

        if page.location().scheme() == "file" {
            info!("event=contact_submit_blocked reason=file_origin");
            let status = FormStatus::new(self.config.file_origin_message.clone(), StatusTone::Error);
            self.show(page, status.clone());
            return SubmitPhase::Blocked(status);
        }

        let mut data = page.form_data(self.form);
        let sender = data
            .get(&self.config.email_field)
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .map(str::to_string);
        if let Some(sender) = sender {
            data.set(self.config.reply_to_field.clone(), sender);
        }

        let label = match self.submit {
            Some(button) => {
                let label = page.text(button);
                page.set_disabled(button, true);
                page.set_text(button, &self.config.sending_label);
                label
            }
            None => String::new(),
        };
        self.in_flight = Some(label);

        self.show(
            page,
            FormStatus::new(self.config.sending_message.clone(), StatusTone::Pending),
        );

        let target = self.action_url(page);
        match &target {
            Ok(url) => info!("event=contact_submit_begin target={} fields={}", url, data.len()),
            Err(_) => info!("event=contact_submit_begin target=invalid"),
        }
        SubmitPhase::Pending(SubmissionTicket { target, data })
    }

    /// Finish the in-flight submission with the relay's answer.
    ///
    /// Returns `None` when nothing was in flight.
    pub fn complete(
        &mut self,
        page: &mut dyn Page,
        result: Result<RelayResponse, RelayError>,
    ) -> Option<FormStatus> {
        let label = self.in_flight.take()?;

        let outcome = match result {
            Ok(response) => {
                debug!("event=contact_relay_status status={}", response.status);
                RelayOutcome::from_response(&response)
            }
            Err(err) => {
                let message = err.message();
                RelayOutcome::Rejected((!message.is_empty()).then(|| message.to_string()))
            }
        };

        let status = match outcome {
            RelayOutcome::Delivered => {
                page.reset_form(self.form);
                FormStatus::new(self.config.success_message.clone(), StatusTone::Success)
            }
            RelayOutcome::Rejected(message) => FormStatus::new(
                message.unwrap_or_else(|| self.config.fallback()),
                StatusTone::Error,
            ),
        };
        info!(
            "event=contact_submit_complete delivered={}",
            status.tone == StatusTone::Success
        );
        self.show(page, status.clone());

        if let Some(button) = self.submit {
            page.set_disabled(button, false);
            page.set_text(button, &label);
        }
        Some(status)
    }

    /// Run both phases with `transport`. Returns the final status, or `None`
    /// when a submission was already in flight.
    pub fn submit(&mut self, page: &mut dyn Page, transport: &dyn RelayTransport) -> Option<FormStatus> {
        match self.begin(page) {
            SubmitPhase::Blocked(status) => Some(status),
            SubmitPhase::Busy => None,
            SubmitPhase::Pending(ticket) => {
                let result = ticket.send(transport);
                self.complete(page, result)
            }
        }
    }

    /// `form.action`: the attribute resolved against the page location, or
    /// the location itself when the attribute is absent or empty.
    fn action_url(&self, page: &dyn Page) -> Result<Url, RelayError> {
        let location = page.location();
        match page.attribute(self.form, "action") {
            Some(action) if !action.trim().is_empty() => location
                .join(action.trim())
                .map_err(|_| RelayError::InvalidAction(format!("Invalid form action \"{}\".", action))),
            _ => Ok(location.clone()),
        }
    }

    fn show(&mut self, page: &mut dyn Page, status: FormStatus) {
        page.set_text(self.status, &status.text);
        page.set_style(self.status, "color", &status.tone.color().to_hex());
        self.last_status = Some(status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ElementSpec, HeadlessPage};
    use std::cell::RefCell;

    /// Replays canned results and records every request.
    struct Scripted {
        reply: Result<RelayResponse, RelayError>,
        calls: RefCell<Vec<(Url, FormData)>>,
    }

    impl Scripted {
        fn new(reply: Result<RelayResponse, RelayError>) -> Self {
            Self {
                reply,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl RelayTransport for Scripted {
        fn post_form(&self, url: &Url, data: &FormData) -> Result<RelayResponse, RelayError> {
            self.calls.borrow_mut().push((url.clone(), data.clone()));
            self.reply.clone()
        }
    }

    /// Contact section with `email` typed into the (initially empty) field.
    fn page(location: &str, email: &str) -> HeadlessPage {
        let mut page = HeadlessPage::builder(
            ElementSpec::new("section")
                .child(
                    ElementSpec::new("form")
                        .id("contact-form")
                        .attr("action", "https://relay.example/ajax/me@folio.dev")
                        .child(ElementSpec::new("input").attr("name", "name").value("Ada"))
                        .child(ElementSpec::new("input").attr("name", "email").value(""))
                        .child(ElementSpec::new("textarea").attr("name", "message").value("Hi"))
                        .child(
                            ElementSpec::new("button")
                                .attr("type", "submit")
                                .text("Send Message"),
                        ),
                )
                .child(ElementSpec::new("p").id("form-status")),
        )
        .location(location)
        .build()
        .unwrap();
        let field = page.query_selector(r#"input[name="email"]"#).unwrap();
        page.set_value(field, email);
        page
    }

    fn bind(page: &HeadlessPage) -> ContactForm {
        ContactForm::bind(page, &SelectorConfig::default(), &ContactConfig::default()).unwrap()
    }

    fn status_of(page: &HeadlessPage) -> (String, Option<String>) {
        let el = page.element_by_id("form-status").unwrap();
        (page.text(el), page.style(el, "color"))
    }

    #[test]
    fn test_begin_locks_form_and_snapshots() {
        let mut p = page("http://localhost:5500/", "  ada@example.com ");
        let mut form = bind(&p);
        let button = form.submit_button().unwrap();

        let SubmitPhase::Pending(ticket) = form.begin(&mut p) else {
            panic!("expected pending submission");
        };
        assert_eq!(
            ticket.target().unwrap().as_str(),
            "https://relay.example/ajax/me@folio.dev"
        );
        assert_eq!(ticket.data().get("_replyto"), Some("ada@example.com"));
        assert_eq!(ticket.data().get("message"), Some("Hi"));

        assert!(p.is_disabled(button));
        assert_eq!(p.text(button), "Sending...");
        assert_eq!(
            status_of(&p),
            ("Sending message...".to_string(), Some("#1d4ed8".to_string()))
        );

        // Second submit while in flight is ignored
        assert_eq!(form.begin(&mut p), SubmitPhase::Busy);
    }

    #[test]
    fn test_blank_email_adds_no_reply_to() {
        let mut p = page("http://localhost/", "   ");
        let mut form = bind(&p);
        let SubmitPhase::Pending(ticket) = form.begin(&mut p) else {
            panic!("expected pending submission");
        };
        assert_eq!(ticket.data().get("_replyto"), None);
    }

    #[test]
    fn test_success_resets_and_restores() {
        let mut p = page("https://folio.dev/", "ada@example.com");
        let mut form = bind(&p);
        let transport = Scripted::new(Ok(RelayResponse::new(200, r#"{"success":"true"}"#)));

        let status = form.submit(&mut p, &transport).unwrap();
        assert_eq!(status.tone, StatusTone::Success);
        assert_eq!(
            status_of(&p).1.as_deref(),
            Some("#166534")
        );

        let email = p.query_selector(r#"input[name="email"]"#).unwrap();
        assert_eq!(p.value(email), Some(""));
        let button = form.submit_button().unwrap();
        assert!(!p.is_disabled(button));
        assert_eq!(p.text(button), "Send Message");
        assert_eq!(transport.calls.borrow().len(), 1);
    }

    #[test]
    fn test_failure_inside_ok_response() {
        let mut p = page("https://folio.dev/", "ada@example.com");
        let mut form = bind(&p);
        let transport = Scripted::new(Ok(RelayResponse::new(
            200,
            r#"{"success": false, "message": "Invalid email"}"#,
        )));

        form.submit(&mut p, &transport);
        assert_eq!(
            status_of(&p),
            ("Invalid email".to_string(), Some("#b91c1c".to_string()))
        );
        let button = form.submit_button().unwrap();
        assert!(!p.is_disabled(button));
        assert_eq!(p.text(button), "Send Message");

        // Fields are kept on failure
        let email = p.query_selector(r#"input[name="email"]"#).unwrap();
        assert_eq!(p.value(email), Some("ada@example.com"));
    }

    #[test]
    fn test_server_error_uses_fallback() {
        let mut p = page("https://folio.dev/", "");
        let mut form = bind(&p);
        let transport = Scripted::new(Ok(RelayResponse::new(500, "<html>boom</html>")));

        let status = form.submit(&mut p, &transport).unwrap();
        assert_eq!(status.text, ContactConfig::default().fallback());
        assert_eq!(status.tone, StatusTone::Error);
    }

    #[test]
    fn test_network_error_message() {
        let mut p = page("https://folio.dev/", "");
        let mut form = bind(&p);

        let transport = Scripted::new(Err(RelayError::Network("Failed to fetch".into())));
        assert_eq!(form.submit(&mut p, &transport).unwrap().text, "Failed to fetch");

        let transport = Scripted::new(Err(RelayError::Network(String::new())));
        assert_eq!(
            form.submit(&mut p, &transport).unwrap().text,
            ContactConfig::default().fallback()
        );
    }

    #[test]
    fn test_file_origin_blocks_without_request() {
        let mut p = page("file:///home/ada/site/index.html", "ada@example.com");
        let mut form = bind(&p);
        let transport = Scripted::new(Ok(RelayResponse::new(200, "{}")));

        let status = form.submit(&mut p, &transport).unwrap();
        assert!(status.text.starts_with("Form cannot send from file://"));
        assert_eq!(status.tone, StatusTone::Error);
        assert!(transport.calls.borrow().is_empty());
        assert!(!form.is_in_flight());
        assert!(!p.is_disabled(form.submit_button().unwrap()));
    }

    #[test]
    fn test_missing_action_posts_to_location() {
        let mut p = page("https://folio.dev/contact", "");
        let form_el = p.element_by_id("contact-form").unwrap();
        p.set_attribute(form_el, "action", "");
        let mut form = bind(&p);

        let SubmitPhase::Pending(ticket) = form.begin(&mut p) else {
            panic!("expected pending submission");
        };
        assert_eq!(ticket.target().unwrap().as_str(), "https://folio.dev/contact");
    }

    #[test]
    fn test_complete_without_begin_is_noop() {
        let mut p = page("https://folio.dev/", "");
        let mut form = bind(&p);
        assert!(form.complete(&mut p, Ok(RelayResponse::new(200, "{}"))).is_none());
        assert!(form.last_status().is_none());
    }
}
