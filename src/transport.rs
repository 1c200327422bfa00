use crate::payload::NotificationPayload;
use std::error::Error;
use std::time::Duration;

/// Blocking delivery of a payload to a webhook URL.
///
/// Implementations perform exactly one POST with a JSON body per call and
/// return on the caller's thread.
pub trait WebhookTransport: Send + Sync {
    /// POST `payload` to `url`.
    ///
    /// **Returns**
    /// - `Ok(response)` whenever the endpoint answered, whatever the
    ///   status code.
    /// - `Err(..)` if no response was obtained (connection error, timeout,
    ///   serialization error).
    fn post(
        &self,
        url: &str,
        payload: &NotificationPayload,
        timeout: Duration,
    ) -> Result<WebhookResponse, TransportError>;
}

/// What the webhook endpoint answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookResponse {
    pub status: u16,
    pub body: String,
}

impl WebhookResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Error type returned by [`WebhookTransport::post`].
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("webhook request timed out after {0:?}")]
    Timeout(Duration),

    #[error("webhook request failed: {0}")]
    Request(#[source] Box<dyn Error + Send + Sync>),

    #[error("webhook worker thread panicked")]
    WorkerPanicked,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_range_is_2xx() {
        let ok = WebhookResponse { status: 204, body: String::new() };
        let limited = WebhookResponse { status: 429, body: String::new() };
        assert!(ok.is_success());
        assert!(!limited.is_success());
    }
}
