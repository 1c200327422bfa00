use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_webhook_sink::init::init_tracing;
use tracing_webhook_sink::{critical, success, Dispatcher};

/// Posts a few events to the webhook named by `WEBHOOK_URL` (and optionally
/// `WEBHOOK_URL_ERROR`, `WEBHOOK_URL_SUCCESS`, ...). Without those variables
/// nothing is sent and the events only show up on stdout.
fn main() {
    let dispatcher = Arc::new(Dispatcher::from_env());
    if let Err(e) = init_tracing(dispatcher) {
        eprintln!("failed to install subscriber: {}", e);
        return;
    }

    info!("starting service");

    warn!(user = "alice", "password reset requested twice in a minute");
    success!("deployment v1.4.2 finished");

    let err = "12a".parse::<u32>().unwrap_err();
    error!(
        status_code = 400u16,
        error = &err as &(dyn std::error::Error + 'static),
        "rejected order quantity\nraw input: \"12a\""
    );

    critical!("primary database unreachable");
}
