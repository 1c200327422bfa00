use crate::dispatch::{Dispatch, Dispatcher};
use crate::guard;
use crate::record::{ExceptionInfo, LogRecord};
use crate::severity::{Severity, StyleTable};
use std::error::Error;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

const OWN_TARGET: &str = env!("CARGO_CRATE_NAME");

/// `tracing_subscriber` layer that turns events into [`LogRecord`]s and
/// hands them to a [`Dispatcher`] inline, on the emitting thread.
///
/// The level of an event can be overridden with a `severity` field holding
/// either a number or a registered level name, which is how the custom
/// VERBOSE/SUCCESS/ACTION/CRITICAL levels are expressed. Other recognized
/// fields are `status_code`, `user` and the first error value.
///
/// Events emitted by this crate, or on a thread that is busy delivering a
/// notification, are never forwarded.
pub struct WebhookLayer {
    dispatcher: Arc<Dispatcher>,
    min_severity: Severity,
    /// Total events seen by the layer (before filtering by severity).
    pub total_events: Arc<AtomicU64>,
    /// Events that produced a webhook request that got an answer.
    pub dispatched_events: Arc<AtomicU64>,
    /// Events whose webhook request did not complete.
    pub failed_events: Arc<AtomicU64>,
}

impl WebhookLayer {
    /// Create a layer forwarding events at or above `min_severity`.
    pub fn new(dispatcher: Arc<Dispatcher>, min_severity: Severity) -> Self {
        WebhookLayer {
            dispatcher,
            min_severity,
            total_events: Arc::new(AtomicU64::new(0)),
            dispatched_events: Arc::new(AtomicU64::new(0)),
            failed_events: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl<S> Layer<S> for WebhookLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event, _ctx: Context<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);

        let meta = event.metadata();
        if guard::is_dispatching() || is_own_target(meta.target()) {
            return;
        }

        let mut visitor = FieldVisitor::new(self.dispatcher.styles());
        event.record(&mut visitor);

        let severity = visitor
            .severity
            .unwrap_or_else(|| Severity::from(*meta.level()));
        if severity < self.min_severity {
            return;
        }

        let record = LogRecord {
            severity,
            message: visitor.message.unwrap_or_default(),
            logger: Some(meta.target().to_string()),
            module: meta.module_path().map(|s| s.to_string()),
            file: meta.file().map(|s| s.to_string()),
            line: meta.line(),
            exception: visitor.exception,
            status_code: visitor.status_code,
            user: visitor.user,
        };

        match self.dispatcher.handle(&record) {
            Dispatch::Sent(_) => {
                self.dispatched_events.fetch_add(1, Ordering::Relaxed);
            }
            Dispatch::Failed(_) => {
                self.failed_events.fetch_add(1, Ordering::Relaxed);
            }
            Dispatch::Skipped => {}
        }
    }
}

fn is_own_target(target: &str) -> bool {
    target
        .strip_prefix(OWN_TARGET)
        .map_or(false, |rest| rest.is_empty() || rest.starts_with("::"))
}

/// Collects the fields of a single event that map onto [`LogRecord`].
pub struct FieldVisitor<'a> {
    styles: &'a StyleTable,
    pub message: Option<String>,
    pub severity: Option<Severity>,
    pub status_code: Option<u16>,
    pub user: Option<String>,
    pub exception: Option<ExceptionInfo>,
}

impl<'a> FieldVisitor<'a> {
    pub fn new(styles: &'a StyleTable) -> Self {
        FieldVisitor {
            styles,
            message: None,
            severity: None,
            status_code: None,
            user: None,
            exception: None,
        }
    }

    fn record_number(&mut self, field: &Field, value: i128) {
        match field.name() {
            "severity" => self.severity = u8::try_from(value).ok().map(Severity::new),
            "status_code" => self.status_code = u16::try_from(value).ok(),
            "user" => self.user = Some(value.to_string()),
            _ => {}
        }
    }
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = Some(value.to_string()),
            "severity" => self.severity = self.styles.parse(value),
            "status_code" => self.status_code = value.trim().parse().ok(),
            "user" => self.user = Some(value.to_string()),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_number(field, value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record_number(field, value.into());
    }

    fn record_error(&mut self, _field: &Field, value: &(dyn Error + 'static)) {
        if self.exception.is_none() {
            self.exception = Some(ExceptionInfo::from_error(value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "message" => self.message = Some(format!("{:?}", value)),
            "user" => self.user = Some(format!("{:?}", value)),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WebhookSettings;
    use crate::destination::DestinationConfig;
    use crate::env::EnvSettings;
    use crate::noop_transport::RecordingTransport;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::Registry;

    fn setup(min_severity: Severity) -> (Arc<RecordingTransport>, WebhookLayer) {
        let transport = Arc::new(RecordingTransport::new());
        let config = DestinationConfig::new(
            WebhookSettings::default()
                .with_level_url("CRITICAL", "https://pager")
                .with_url("https://chat"),
            EnvSettings::default(),
        );
        let dispatcher = Arc::new(Dispatcher::new(Arc::new(config), transport.clone()));
        (transport, WebhookLayer::new(dispatcher, min_severity))
    }

    fn field<'p>(payload: &'p crate::payload::NotificationPayload, name: &str) -> &'p str {
        let embed = &payload.embeds[0];
        embed
            .fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
            .unwrap()
    }

    #[test]
    fn forwards_events_above_threshold() {
        let (transport, layer) = setup(Severity::WARNING);
        let dispatched = layer.dispatched_events.clone();
        let total = layer.total_events.clone();
        let subscriber = Registry::default().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "checkout", "below threshold");
            tracing::error!(
                target: "checkout",
                status_code = 502u16,
                user = "alice",
                "upstream failed\nretry budget exhausted"
            );
        });

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(total.load(Ordering::Relaxed), 2);
        assert_eq!(dispatched.load(Ordering::Relaxed), 1);

        let (url, payload) = &sent[0];
        assert_eq!(url, "https://chat");
        let embed = &payload.embeds[0];
        assert!(embed.title.contains("upstream failed"));
        assert_eq!(embed.description.as_deref(), Some("retry budget exhausted"));
        assert_eq!(field(payload, "Status"), "**502**");
        assert_eq!(field(payload, "User"), "alice");
        assert_eq!(field(payload, "Level"), "ERROR");
        assert_eq!(field(payload, "Scope"), "checkout");
        assert!(field(payload, "Filename").starts_with("src"));
    }

    #[test]
    fn severity_field_overrides_level() {
        let (transport, layer) = setup(Severity::INFO);
        let subscriber = Registry::default().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::error!(target: "billing", severity = "CRITICAL", "database unreachable");
            tracing::info!(target: "billing", severity = 25u8, "deploy finished");
        });

        let sent = transport.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0, "https://pager");
        assert_eq!(field(&sent[0].1, "Level"), "CRITICAL");
        assert_eq!(field(&sent[1].1, "Level"), "SUCCESS");
    }

    #[test]
    fn error_values_become_exceptions() {
        let (transport, layer) = setup(Severity::WARNING);
        let subscriber = Registry::default().with(layer);
        let err = "abc".parse::<i32>().unwrap_err();

        tracing::subscriber::with_default(subscriber, || {
            tracing::error!(target: "forms", error = &err as &(dyn Error + 'static), "bad input");
        });

        let sent = transport.sent();
        let description = sent[0].1.embeds[0].description.clone().unwrap();
        assert!(description.contains("EXCEPTION"));
        assert!(description.contains("ParseIntError"));
    }

    #[test]
    fn failures_are_counted_not_raised() {
        let transport = Arc::new(RecordingTransport::failing());
        let config = DestinationConfig::new(
            WebhookSettings::default().with_url("https://chat"),
            EnvSettings::default(),
        );
        let dispatcher = Arc::new(Dispatcher::new(Arc::new(config), transport.clone()));
        let layer = WebhookLayer::new(dispatcher, Severity::WARNING);
        let failed = layer.failed_events.clone();
        let subscriber = Registry::default().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(target: "jobs", "first");
            tracing::warn!(target: "jobs", "second");
        });

        assert_eq!(transport.count(), 2);
        assert_eq!(failed.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn own_events_are_not_forwarded() {
        let (transport, layer) = setup(Severity::DEBUG);
        let total = layer.total_events.clone();
        let subscriber = Registry::default().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(target: "tracing_webhook_sink::dispatch", "webhook returned non-success status");
            tracing::error!(target: "tracing_webhook_sink::http", "connection reset");
            tracing::error!("emitted from this crate's own tests");
        });

        assert_eq!(total.load(Ordering::Relaxed), 3);
        assert_eq!(transport.count(), 0);
    }

    /// Logs an error from inside every post, the way an HTTP client does.
    struct ChattyTransport(AtomicU64);

    impl crate::transport::WebhookTransport for ChattyTransport {
        fn post(
            &self,
            _url: &str,
            _payload: &crate::payload::NotificationPayload,
            _timeout: std::time::Duration,
        ) -> Result<crate::transport::WebhookResponse, crate::transport::TransportError> {
            self.0.fetch_add(1, Ordering::Relaxed);
            tracing::error!(target: "hyper::client", "connection closed before message completed");
            Ok(crate::transport::WebhookResponse {
                status: 204,
                body: String::new(),
            })
        }
    }

    #[test]
    fn events_logged_during_delivery_are_not_forwarded() {
        let transport = Arc::new(ChattyTransport(AtomicU64::new(0)));
        let config = DestinationConfig::new(
            WebhookSettings::default().with_url("https://chat"),
            EnvSettings::default(),
        );
        let dispatcher = Arc::new(Dispatcher::new(Arc::new(config), transport.clone()));
        let layer = WebhookLayer::new(dispatcher, Severity::DEBUG);
        let dispatched = layer.dispatched_events.clone();
        let subscriber = Registry::default().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::error!(target: "checkout", "payment declined");
        });

        assert_eq!(transport.0.load(Ordering::Relaxed), 1);
        assert_eq!(dispatched.load(Ordering::Relaxed), 1);
    }
}
