use crate::dispatch::Dispatcher;
use crate::layer::WebhookLayer;
use crate::severity::Severity;
use std::sync::Arc;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Configuration of the webhook layer.
///
/// **Fields**
/// - `min_severity`: events below this severity are never dispatched.
/// - `enable_stdout`: if `true`, a `tracing_subscriber::fmt::Layer` is
///   added next to [`WebhookLayer`] so events are also printed to the
///   console.
#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub min_severity: Severity,
    pub enable_stdout: bool,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            min_severity: Severity::WARNING,
            enable_stdout: true,
        }
    }
}

/// Install a global `tracing` subscriber that forwards events to
/// `dispatcher`.
///
/// **Parameters**
/// - `dispatcher`: [`Dispatcher`] resolving and delivering each record.
/// - `config`: [`LayerConfig`] controlling filtering and console output.
///
/// **Returns**
/// - `Err(..)` if a global default subscriber was already installed.
pub fn init_tracing_with_config(
    dispatcher: Arc<Dispatcher>,
    config: LayerConfig,
) -> Result<(), SetGlobalDefaultError> {
    let layer = WebhookLayer::new(dispatcher, config.min_severity);

    // Both variants are built separately because the layered subscriber
    // types differ.
    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)
    }
}

/// Initialize tracing with [`LayerConfig::default`]: WARNING and above
/// go to the webhook, everything is echoed to stdout.
pub fn init_tracing(dispatcher: Arc<Dispatcher>) -> Result<(), SetGlobalDefaultError> {
    init_tracing_with_config(dispatcher, LayerConfig::default())
}
