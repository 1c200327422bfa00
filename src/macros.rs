//! Event macros for the levels `tracing` has no macro for.
//!
//! Each macro emits a regular `tracing` event at the closest built-in level
//! and tags it with a `severity` field, which [`crate::layer::WebhookLayer`]
//! uses instead of the built-in level. Field and format arguments work as
//! with `tracing::info!`; a `target:` prefix is not supported.

/// Emit an event at the custom `VERBOSE` level (recorded as `DEBUG`).
#[macro_export]
macro_rules! verbose {
    ($($arg:tt)+) => {
        ::tracing::event!(::tracing::Level::DEBUG, severity = $crate::severity::VERBOSE_LOG_LEVEL, $($arg)+)
    };
}

/// Emit an event at the custom `SUCCESS` level (recorded as `INFO`).
#[macro_export]
macro_rules! success {
    ($($arg:tt)+) => {
        ::tracing::event!(::tracing::Level::INFO, severity = $crate::severity::SUCCESS_LOG_LEVEL, $($arg)+)
    };
}

/// Emit an event at the custom `ACTION` level (recorded as `WARN`).
#[macro_export]
macro_rules! action {
    ($($arg:tt)+) => {
        ::tracing::event!(::tracing::Level::WARN, severity = $crate::severity::ACTION_LOG_LEVEL, $($arg)+)
    };
}

/// Emit an event at `CRITICAL` (recorded as `ERROR`).
#[macro_export]
macro_rules! critical {
    ($($arg:tt)+) => {
        ::tracing::event!(::tracing::Level::ERROR, severity = $crate::severity::CRITICAL_LOG_LEVEL, $($arg)+)
    };
}
