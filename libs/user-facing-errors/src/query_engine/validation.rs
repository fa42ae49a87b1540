use crate::ErrorFormat;
use thiserror::Error;

/// A rejected client call. The message is fully rendered in the requested [`ErrorFormat`] and
/// is the whole contract: there is no machine-readable error code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
    format: ErrorFormat,
}

impl ValidationError {
    pub fn new(message: impl Into<String>, format: ErrorFormat) -> Self {
        ValidationError {
            message: message.into(),
            format,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn format(&self) -> ErrorFormat {
        self.format
    }
}
