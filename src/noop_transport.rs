use crate::payload::NotificationPayload;
use crate::transport::{TransportError, WebhookResponse, WebhookTransport};
use std::sync::Mutex;
use std::time::Duration;

/// A transport that drops every payload and answers `204 No Content`.
///
/// Useful for measuring the overhead of formatting and routing without any
/// network I/O.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTransport;

impl WebhookTransport for NoopTransport {
    fn post(
        &self,
        _url: &str,
        _payload: &NotificationPayload,
        _timeout: Duration,
    ) -> Result<WebhookResponse, TransportError> {
        Ok(WebhookResponse {
            status: 204,
            body: String::new(),
        })
    }
}

/// A transport that keeps every `(url, payload)` it is handed in memory.
///
/// With [`RecordingTransport::failing`] each post is still recorded but
/// reported as a failed request.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(String, NotificationPayload)>>,
    fail: bool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        RecordingTransport {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Everything posted so far, oldest first.
    pub fn sent(&self) -> Vec<(String, NotificationPayload)> {
        match self.sent.lock() {
            Ok(sent) => sent.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn count(&self) -> usize {
        self.sent().len()
    }
}

impl WebhookTransport for RecordingTransport {
    fn post(
        &self,
        url: &str,
        payload: &NotificationPayload,
        _timeout: Duration,
    ) -> Result<WebhookResponse, TransportError> {
        let mut sent = match self.sent.lock() {
            Ok(sent) => sent,
            Err(poisoned) => poisoned.into_inner(),
        };
        sent.push((url.to_string(), payload.clone()));

        if self.fail {
            Err(TransportError::Request("simulated connection failure".into()))
        } else {
            Ok(WebhookResponse {
                status: 204,
                body: String::new(),
            })
        }
    }
}
