pub mod severity;
pub mod record;
pub mod payload;
pub mod env;
pub mod config;
pub mod destination;
pub mod transport;
pub mod guard;
pub mod dispatch;
pub mod layer;
pub mod macros;

#[cfg(feature = "reqwest-transport")]
pub mod http;

pub mod init;
pub mod noop_transport;

pub use config::{LiveConfig, WebhookSettings};
pub use destination::{ConfigSource, DestinationConfig};
pub use dispatch::{Dispatch, Dispatcher};
pub use layer::WebhookLayer;
pub use payload::{truncate, NotificationPayload, PayloadBuilder};
pub use record::{ExceptionInfo, LogRecord};
pub use severity::{Severity, SeverityStyle, StyleTable};
