use std::sync::Arc;
use std::time::Duration;

use tracing::{error, warn};
use tracing_webhook_sink::http::ReqwestTransport;
use tracing_webhook_sink::init::{init_tracing_with_config, LayerConfig};
use tracing_webhook_sink::{action, Dispatcher, LiveConfig, Severity, WebhookSettings};

/// Routes levels to different channels using a TOML file:
///
/// ```toml
/// [WEBHOOK_URLS]
/// ERROR = "https://discord.com/api/webhooks/.../errors"
/// ACTION = "https://discord.com/api/webhooks/.../ops"
/// DEFAULT = "https://discord.com/api/webhooks/.../general"
/// ```
///
/// Pass the file path as the first argument (defaults to `webhooks.toml`).
fn main() {
    let path = std::env::args().nth(1).unwrap_or_else(|| "webhooks.toml".to_string());
    let settings = match WebhookSettings::from_toml_file(&path) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", e);
            return;
        }
    };

    let live = Arc::new(LiveConfig::new(settings, tracing_webhook_sink::env::WEBHOOK_URL_ENV));
    let dispatcher = Dispatcher::new(live.clone(), Arc::new(ReqwestTransport::new()))
        .with_timeout(Duration::from_secs(5));

    let config = LayerConfig {
        min_severity: Severity::WARNING,
        enable_stdout: true,
    };
    if let Err(e) = init_tracing_with_config(Arc::new(dispatcher), config) {
        eprintln!("failed to install subscriber: {}", e);
        return;
    }

    warn!("cache hit ratio below 50%");
    action!(user = "ops-bot", "scaling worker pool to 12 replicas");
    error!(status_code = 503u16, "payment provider unavailable");

    // Later changes to the configuration store apply to the next event.
    live.store(WebhookSettings::default());
    error!("not delivered: no webhook configured any more");
}
