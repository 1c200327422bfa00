use crate::guard::{mark_thread, DispatchGuard};
use crate::payload::NotificationPayload;
use crate::transport::{TransportError, WebhookResponse, WebhookTransport};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::thread;
use std::time::Duration;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// HTTP implementation of [`WebhookTransport`] using `reqwest`.
///
/// Each post runs on a scoped worker thread that drives its own
/// single-threaded Tokio runtime, and is joined before returning. The caller
/// blocks for the whole request without ever nesting a runtime inside its
/// own. Every thread involved in the request is marked as dispatching, so
/// events emitted by the HTTP stack are never turned into notifications.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReqwestTransport;

impl ReqwestTransport {
    pub fn new() -> Self {
        ReqwestTransport
    }
}

impl WebhookTransport for ReqwestTransport {
    fn post(
        &self,
        url: &str,
        payload: &NotificationPayload,
        timeout: Duration,
    ) -> Result<WebhookResponse, TransportError> {
        let body = serde_json::to_vec(payload).map_err(|e| TransportError::Request(Box::new(e)))?;

        thread::scope(|scope| {
            scope
                .spawn(|| {
                    let _guard = DispatchGuard::enter();
                    let runtime = tokio::runtime::Builder::new_current_thread()
                        .enable_all()
                        .on_thread_start(mark_thread)
                        .build()
                        .map_err(|e| TransportError::Request(Box::new(e)))?;
                    runtime.block_on(send(url, body, timeout))
                })
                .join()
                .unwrap_or(Err(TransportError::WorkerPanicked))
        })
    }
}

async fn send(url: &str, body: Vec<u8>, timeout: Duration) -> Result<WebhookResponse, TransportError> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| classify(e, timeout))?;

    let response = client
        .post(url)
        .header(CONTENT_TYPE, "application/json")
        .body(body)
        .send()
        .await
        .map_err(|e| classify(e, timeout))?;

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_else(|_| "<no body>".to_string());
    Ok(WebhookResponse { status, body })
}

// The URL is stripped because its path is the webhook token.
fn classify(err: reqwest::Error, timeout: Duration) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(timeout)
    } else {
        TransportError::Request(Box::new(err.without_url()))
    }
}
