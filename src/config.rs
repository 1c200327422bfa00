//! Configuration-store layer of webhook destinations.
//!
//! [`WebhookSettings`] is the structured counterpart of the `WEBHOOK_URL` /
//! `WEBHOOK_URLS` settings. It can be loaded from TOML through `figment` or
//! built in code, and is published through [`LiveConfig`] so updates are
//! visible to the very next dispatch.

use crate::destination::{ConfigSource, DestinationConfig};
use crate::env::{EnvSettings, WEBHOOK_URL_ENV};
use arc_swap::ArcSwap;
use figment::providers::{Format, Toml};
use figment::Figment;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Key of the catch-all entry in [`WebhookSettings::webhook_urls`].
pub const DEFAULT_KEY: &str = "DEFAULT";

/// Webhook URLs supplied by the application's configuration store.
///
/// ```toml
/// WEBHOOK_URL = "https://chat.example/webhooks/all"
///
/// [WEBHOOK_URLS]
/// ERROR = "https://chat.example/webhooks/errors"
/// DEFAULT = "https://chat.example/webhooks/default"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WebhookSettings {
    /// Single URL used for every level.
    #[serde(rename = "WEBHOOK_URL", alias = "webhook_url", default)]
    pub webhook_url: Option<String>,
    /// Per-level URLs keyed by level name, plus an optional `DEFAULT`.
    #[serde(rename = "WEBHOOK_URLS", alias = "webhook_urls", default)]
    pub webhook_urls: Option<BTreeMap<String, String>>,
}

impl WebhookSettings {
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }

    /// Add a per-level entry; use [`DEFAULT_KEY`] for the catch-all.
    pub fn with_level_url(mut self, level: impl Into<String>, url: impl Into<String>) -> Self {
        self.webhook_urls
            .get_or_insert_with(BTreeMap::new)
            .insert(level.into(), url.into());
        self
    }

    /// Load settings from a TOML file. A missing file yields empty settings.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_figment(Figment::new().merge(Toml::file(path.as_ref())))
    }

    /// Extract settings from an arbitrary figment, e.g. one the host
    /// application already assembles for its own configuration.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        Ok(figment.extract()?)
    }
}

/// Error type returned when loading [`WebhookSettings`].
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid webhook configuration: {0}")]
    Invalid(#[from] figment::Error),
}

/// Live configuration: hot-swappable settings plus the process environment.
///
/// Every [`ConfigSource::snapshot`] re-reads both layers, so changing the
/// settings or the environment at runtime takes effect immediately.
#[derive(Debug, Clone)]
pub struct LiveConfig {
    settings: Arc<ArcSwap<WebhookSettings>>,
    env_base: String,
}

impl LiveConfig {
    pub fn new(settings: WebhookSettings, env_base: impl Into<String>) -> Self {
        LiveConfig {
            settings: Arc::new(ArcSwap::from_pointee(settings)),
            env_base: env_base.into(),
        }
    }

    /// Environment-only configuration using [`WEBHOOK_URL_ENV`].
    pub fn from_env() -> Self {
        Self::new(WebhookSettings::default(), WEBHOOK_URL_ENV)
    }

    /// Replace the configuration-store layer.
    pub fn store(&self, settings: WebhookSettings) {
        self.settings.store(Arc::new(settings));
    }

    pub fn settings(&self) -> Arc<WebhookSettings> {
        self.settings.load_full()
    }

    pub fn env_base(&self) -> &str {
        &self.env_base
    }
}

impl ConfigSource for LiveConfig {
    fn snapshot(&self) -> DestinationConfig {
        DestinationConfig {
            settings: (*self.settings.load_full()).clone(),
            env: EnvSettings::from_env(&self.env_base),
        }
    }
}
