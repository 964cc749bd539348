//! HTTP transport backed by `ureq`.

use log::debug;
use url::Url;

use super::{FormData, RelayResponse, RelayTransport};
use crate::error::RelayError;

/// Blocking relay client.
///
/// One POST per call, no retries, no timeout beyond what the OS imposes.
/// Non-2xx statuses come back as responses so the caller can read the
/// relay's JSON error message.
pub struct HttpRelay {
    agent: ureq::Agent,
    user_agent: String,
}

impl HttpRelay {
    pub fn new() -> Self {
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build();
        Self {
            agent: config.into(),
            user_agent: format!("folio-interact/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for HttpRelay {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayTransport for HttpRelay {
    fn post_form(&self, url: &Url, data: &FormData) -> Result<RelayResponse, RelayError> {
        debug!("event=relay_post url={} fields={}", url, data.len());

        let mut response = self
            .agent
            .post(url.as_str())
            .header("Accept", "application/json")
            .header("User-Agent", &self.user_agent)
            .send_form(data.iter())
            .map_err(|err| RelayError::Network(err.to_string()))?;

        let status = response.status().as_u16();
        // An unreadable body is treated like an unparsable one
        let body = response.body_mut().read_to_string().unwrap_or_default();

        debug!("event=relay_response status={} bytes={}", status, body.len());
        Ok(RelayResponse { status, body })
    }
}
