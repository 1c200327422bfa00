//! Environment variables used by this crate as the lowest-priority
//! source of webhook URLs.
//!
//! Per-level overrides are named `<BASE>_<LEVEL>`, where `LEVEL` is the
//! canonical upper-case name from the style table, e.g.
//! `WEBHOOK_URL_ERROR` or `WEBHOOK_URL_SUCCESS`.

use std::collections::BTreeMap;

/// Default base variable holding the blanket webhook URL.
pub const WEBHOOK_URL_ENV: &str = "WEBHOOK_URL";

/// Environment layer of a destination snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSettings {
    /// Value of the base variable.
    pub base: Option<String>,
    /// Per-level values keyed by level name (the `<LEVEL>` suffix).
    pub per_level: BTreeMap<String, String>,
}

impl EnvSettings {
    /// Read the current process environment. Variables that are not valid
    /// unicode are skipped.
    pub fn from_env(base_var: &str) -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)));
        Self::from_vars(base_var, vars)
    }

    /// Build the layer from an explicit list of variables.
    pub fn from_vars<I, K, V>(base_var: &str, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let prefix = format!("{}_", base_var);
        let mut settings = EnvSettings::default();
        for (key, value) in vars {
            let key = key.as_ref();
            if key == base_var {
                settings.base = Some(value.into());
            } else if let Some(level) = key.strip_prefix(&prefix) {
                if !level.is_empty() {
                    settings.per_level.insert(level.to_string(), value.into());
                }
            }
        }
        settings
    }
}
