use crate::destination::ConfigSource;
use crate::guard::DispatchGuard;
use crate::payload::{truncate, PayloadBuilder};
use crate::record::LogRecord;
use crate::severity::StyleTable;
use crate::transport::{TransportError, WebhookResponse, WebhookTransport};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Request timeout used unless [`Dispatcher::with_timeout`] overrides it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest response body excerpt written to delivery warnings.
const LOGGED_BODY_LIMIT: usize = 200;

/// Outcome of [`Dispatcher::handle`]. Callers are free to ignore it.
#[derive(Debug)]
pub enum Dispatch {
    /// No destination is configured for the record's level.
    Skipped,
    /// The endpoint answered; the status may still be an error.
    Sent(WebhookResponse),
    /// The request did not complete. The notification is dropped.
    Failed(TransportError),
}

impl Dispatch {
    pub fn response(&self) -> Option<&WebhookResponse> {
        match self {
            Dispatch::Sent(response) => Some(response),
            _ => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Dispatch::Skipped)
    }
}

/// Resolves, formats and delivers one record at a time on the caller's
/// thread. Holds no per-record state.
pub struct Dispatcher {
    builder: PayloadBuilder,
    config: Arc<dyn ConfigSource>,
    transport: Arc<dyn WebhookTransport>,
    timeout: Duration,
}

impl Dispatcher {
    /// Create a dispatcher with the default style table and timeout.
    ///
    /// **Parameters**
    /// - `config`: source of a fresh [`crate::destination::DestinationConfig`]
    ///   for every record.
    /// - `transport`: performs the actual POST.
    pub fn new(config: Arc<dyn ConfigSource>, transport: Arc<dyn WebhookTransport>) -> Self {
        Dispatcher {
            builder: PayloadBuilder::default(),
            config,
            transport,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Environment-configured dispatcher posting over HTTP.
    #[cfg(feature = "reqwest-transport")]
    pub fn from_env() -> Self {
        use crate::config::LiveConfig;
        use crate::http::ReqwestTransport;

        Dispatcher::new(Arc::new(LiveConfig::from_env()), Arc::new(ReqwestTransport::new()))
    }

    pub fn with_styles(mut self, styles: StyleTable) -> Self {
        self.builder = PayloadBuilder::new(styles);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn styles(&self) -> &StyleTable {
        self.builder.styles()
    }

    /// Deliver `record` to the webhook configured for its level.
    ///
    /// Performs at most one POST. When no destination resolves, nothing is
    /// built or sent. Transport failures and error statuses are logged and
    /// returned, never propagated. Logs name only the webhook host, since the
    /// path carries the webhook token.
    ///
    /// The calling thread is marked as dispatching for the duration, so
    /// [`crate::layer::WebhookLayer`] ignores anything logged meanwhile.
    pub fn handle(&self, record: &LogRecord) -> Dispatch {
        let _guard = DispatchGuard::enter();
        let level = self.builder.styles().name_of(record.severity);
        let snapshot = self.config.snapshot();
        let url = match snapshot.resolve(&level) {
            Some(url) => url,
            None => {
                debug!(level = %level, "no webhook configured, skipping");
                return Dispatch::Skipped;
            }
        };

        let payload = self.builder.build(record);
        match self.transport.post(url, &payload, self.timeout) {
            Ok(response) => {
                if !response.is_success() {
                    warn!(
                        host = redact(url),
                        status = response.status,
                        body = %truncate(&response.body, LOGGED_BODY_LIMIT),
                        "webhook returned non-success status"
                    );
                }
                Dispatch::Sent(response)
            }
            Err(e) => {
                warn!(host = redact(url), error = %e, "failed to deliver webhook notification");
                Dispatch::Failed(e)
            }
        }
    }
}

/// Host (and port) of `url`. The path, query and userinfo are dropped since
/// they hold the webhook credentials.
fn redact(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    authority.rsplit_once('@').map_or(authority, |(_, host)| host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WebhookSettings;
    use crate::destination::DestinationConfig;
    use crate::env::{EnvSettings, WEBHOOK_URL_ENV};
    use crate::noop_transport::RecordingTransport;
    use crate::payload::NotificationPayload;
    use crate::severity::{Severity, SeverityStyle};
    use std::io;
    use std::sync::Mutex;

    const SECRET_URL: &str = "https://discord.com/api/webhooks/1234/s3cr3t-t0ken?wait=true";

    /// Answers every post with a fixed status and body.
    struct StatusTransport(u16, String);

    impl WebhookTransport for StatusTransport {
        fn post(
            &self,
            _url: &str,
            _payload: &NotificationPayload,
            _timeout: Duration,
        ) -> Result<WebhookResponse, TransportError> {
            Ok(WebhookResponse {
                status: self.0,
                body: self.1.clone(),
            })
        }
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    fn logged_while<F: FnOnce()>(f: F) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        captured.text()
    }

    fn dispatcher(config: DestinationConfig, transport: Arc<RecordingTransport>) -> Dispatcher {
        Dispatcher::new(Arc::new(config), transport)
    }

    #[test]
    fn no_destination_means_no_request() {
        let transport = Arc::new(RecordingTransport::new());
        let dispatch = dispatcher(DestinationConfig::default(), transport.clone())
            .handle(&LogRecord::new(Severity::CRITICAL, "down"));
        assert!(dispatch.is_skipped());
        assert_eq!(transport.count(), 0);
    }

    #[test]
    fn posts_once_to_level_url() {
        let transport = Arc::new(RecordingTransport::new());
        let config = DestinationConfig::new(
            WebhookSettings::default()
                .with_level_url("ERROR", "https://errors")
                .with_level_url("DEFAULT", "https://default"),
            EnvSettings::default(),
        );
        let dispatcher = dispatcher(config, transport.clone());

        let dispatch = dispatcher.handle(&LogRecord::new(Severity::ERROR, "boom"));
        assert_eq!(dispatch.response().map(|r| r.status), Some(204));
        dispatcher.handle(&LogRecord::new(Severity::SUCCESS, "deployed"));

        let sent = transport.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0, "https://errors");
        assert!(sent[0].1.embeds[0].title.contains("boom"));
        assert_eq!(sent[1].0, "https://default");
    }

    #[test]
    fn transport_failure_is_swallowed() {
        let transport = Arc::new(RecordingTransport::failing());
        let config = DestinationConfig::new(
            WebhookSettings::default(),
            EnvSettings::from_vars(WEBHOOK_URL_ENV, [("WEBHOOK_URL", "https://env")]),
        );
        let dispatch = dispatcher(config, transport.clone())
            .handle(&LogRecord::new(Severity::WARNING, "careful"));
        assert!(matches!(dispatch, Dispatch::Failed(TransportError::Request(_))));
        assert!(dispatch.response().is_none());
        assert_eq!(transport.count(), 1);
    }

    #[test]
    fn custom_styles_drive_routing_names() {
        let transport = Arc::new(RecordingTransport::new());
        let config = DestinationConfig::new(
            WebhookSettings::default().with_level_url("AUDIT", "https://audit"),
            EnvSettings::default(),
        );
        let styles = StyleTable::default()
            .register(Severity::new(45), SeverityStyle::new("AUDIT", 0x123456, "🧾"));
        let dispatcher = dispatcher(config, transport.clone()).with_styles(styles);

        dispatcher.handle(&LogRecord::new(Severity::new(45), "login from new device"));
        dispatcher.handle(&LogRecord::new(Severity::ERROR, "unrouted"));

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1.embeds[0].color, 0x123456);
    }

    #[test]
    fn redact_keeps_only_the_host() {
        assert_eq!(redact(SECRET_URL), "discord.com");
        assert_eq!(redact("http://user:pw@127.0.0.1:8080/hook"), "127.0.0.1:8080");
        assert_eq!(redact("hooks.example.com"), "hooks.example.com");
    }

    #[test]
    fn warnings_do_not_leak_webhook_token() {
        let config = DestinationConfig::new(WebhookSettings::default().with_url(SECRET_URL), EnvSettings::default());
        let long_body = "x".repeat(5000);

        let rejected = Dispatcher::new(Arc::new(config.clone()), Arc::new(StatusTransport(500, long_body.clone())));
        let output = logged_while(|| {
            rejected.handle(&LogRecord::new(Severity::ERROR, "boom"));
        });
        assert!(output.contains("webhook returned non-success status"));
        assert!(output.contains("discord.com"));
        assert!(!output.contains("s3cr3t-t0ken"));
        assert!(!output.contains(&long_body));

        let unreachable = dispatcher(config, Arc::new(RecordingTransport::failing()));
        let output = logged_while(|| {
            unreachable.handle(&LogRecord::new(Severity::ERROR, "boom"));
        });
        assert!(output.contains("failed to deliver webhook notification"));
        assert!(!output.contains("s3cr3t-t0ken"));
        assert!(!output.contains("/api/webhooks"));
    }

    #[test]
    fn handle_marks_the_thread_while_posting() {
        struct Observe(Mutex<Option<bool>>);

        impl WebhookTransport for Observe {
            fn post(
                &self,
                _url: &str,
                _payload: &NotificationPayload,
                _timeout: Duration,
            ) -> Result<WebhookResponse, TransportError> {
                *self.0.lock().unwrap() = Some(crate::guard::is_dispatching());
                Ok(WebhookResponse { status: 204, body: String::new() })
            }
        }

        let transport = Arc::new(Observe(Mutex::new(None)));
        let config = DestinationConfig::new(WebhookSettings::default().with_url("https://chat"), EnvSettings::default());
        Dispatcher::new(Arc::new(config), transport.clone()).handle(&LogRecord::new(Severity::ERROR, "boom"));

        assert_eq!(*transport.0.lock().unwrap(), Some(true));
        assert!(!crate::guard::is_dispatching());
    }
}
