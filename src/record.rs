use crate::severity::Severity;
use std::error::Error;

/// Normalized log record handed to the payload builder and dispatcher.
///
/// Every attribute beyond severity and message is optional; absent values
/// render as `None` in the notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub severity: Severity,
    pub message: String,
    /// Logger name, shown as the notification scope.
    pub logger: Option<String>,
    pub module: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub exception: Option<ExceptionInfo>,
    pub status_code: Option<u16>,
    pub user: Option<String>,
}

impl LogRecord {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        LogRecord {
            severity,
            message: message.into(),
            logger: None,
            module: None,
            file: None,
            line: None,
            exception: None,
            status_code: None,
            user: None,
        }
    }

    pub fn with_logger(mut self, logger: impl Into<String>) -> Self {
        self.logger = Some(logger.into());
        self
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_location(mut self, file: impl Into<String>, line: Option<u32>) -> Self {
        self.file = Some(file.into());
        self.line = line;
        self
    }

    pub fn with_exception(mut self, exception: ExceptionInfo) -> Self {
        self.exception = Some(exception);
        self
    }

    pub fn with_status_code(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }
}

/// Error attached to a record: type name, message and optional traceback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionInfo {
    pub type_name: String,
    pub message: String,
    pub traceback: Option<String>,
}

impl ExceptionInfo {
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        ExceptionInfo {
            type_name: type_name.into(),
            message: message.into(),
            traceback: None,
        }
    }

    pub fn with_traceback(mut self, traceback: impl Into<String>) -> Self {
        self.traceback = Some(traceback.into());
        self
    }

    /// Capture an error value.
    ///
    /// The type name is the leading identifier of the `Debug` output
    /// (`Os { .. }` → `Os`, `ParseIntError { .. }` → `ParseIntError`),
    /// falling back to `Error`. The `source()` chain becomes the traceback.
    pub fn from_error(err: &(dyn Error + 'static)) -> Self {
        let debug = format!("{:?}", err);
        let type_name: String = debug
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == ':')
            .collect();
        let type_name = if type_name.is_empty() {
            "Error".to_string()
        } else {
            type_name
        };

        let mut causes = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            causes.push(format!("Caused by: {}", cause));
            source = cause.source();
        }

        ExceptionInfo {
            type_name,
            message: err.to_string(),
            traceback: if causes.is_empty() {
                None
            } else {
                Some(causes.join("\n"))
            },
        }
    }
}
