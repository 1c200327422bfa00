use std::sync::Arc;
use std::time::Instant;

use tracing::error;
use tracing_webhook_sink::init::{init_tracing_with_config, LayerConfig};
use tracing_webhook_sink::noop_transport::NoopTransport;
use tracing_webhook_sink::{Dispatcher, Severity, WebhookSettings};

fn main() {
    let config = tracing_webhook_sink::LiveConfig::new(
        WebhookSettings::default().with_url("https://example.invalid/webhook"),
        "UNUSED_WEBHOOK_URL",
    );
    let dispatcher = Arc::new(Dispatcher::new(Arc::new(config), Arc::new(NoopTransport)));

    let layer_config = LayerConfig {
        min_severity: Severity::ERROR,
        enable_stdout: false,
    };
    if let Err(e) = init_tracing_with_config(dispatcher, layer_config) {
        eprintln!("failed to install subscriber: {}", e);
        return;
    }

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        error!(iteration = i, "noop load test error\nwith a second line");
    }

    let elapsed = start.elapsed();
    println!("noop transport: formatted and routed {} events in {:?} (~{:.0} ev/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
}
