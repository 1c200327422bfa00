//! Destination resolution.
//!
//! Lookup order, first non-empty hit wins:
//! 1. configuration store per-level map (exact level name, then `DEFAULT`)
//! 2. configuration store single URL
//! 3. environment `<BASE>_<LEVEL>`
//! 4. environment `<BASE>`
//!
//! Nothing found means "do not send", not an error.

use crate::config::{WebhookSettings, DEFAULT_KEY};
use crate::env::EnvSettings;

/// Point-in-time view of both configuration layers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestinationConfig {
    pub settings: WebhookSettings,
    pub env: EnvSettings,
}

impl DestinationConfig {
    pub fn new(settings: WebhookSettings, env: EnvSettings) -> Self {
        DestinationConfig { settings, env }
    }

    /// Webhook URL for the level named `level`, if any is configured.
    pub fn resolve(&self, level: &str) -> Option<&str> {
        let urls = self.settings.webhook_urls.as_ref();
        urls.and_then(|map| non_empty(map.get(level)))
            .or_else(|| urls.and_then(|map| non_empty(map.get(DEFAULT_KEY))))
            .or_else(|| non_empty(self.settings.webhook_url.as_ref()))
            .or_else(|| non_empty(self.env.per_level.get(level)))
            .or_else(|| non_empty(self.env.base.as_ref()))
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|url| !url.trim().is_empty())
}

/// Supplies a fresh [`DestinationConfig`] for every dispatch.
pub trait ConfigSource: Send + Sync {
    fn snapshot(&self) -> DestinationConfig;
}

/// A fixed snapshot, handy for tests and static setups.
impl ConfigSource for DestinationConfig {
    fn snapshot(&self) -> DestinationConfig {
        self.clone()
    }
}
