//! Notification error types.

use thiserror::Error;

/// Errors from notification delivery.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The HTTP request never completed (DNS, connect, timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider answered with a non-success status.
    #[error("{channel} API returned {status}: {body}")]
    Api {
        channel: &'static str,
        status: u16,
        body: String,
    },

    /// The outbox payload could not be parsed.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// The row's channel has no configured sender.
    #[error("Channel not configured: {0}")]
    ChannelNotConfigured(String),

    /// Database access from the worker failed.
    #[error(transparent)]
    Db(#[from] frantoio_db::DbError),
}

impl NotifyError {
    /// Whether a retry can plausibly succeed.
    ///
    /// Client errors (4xx) mean the request itself is wrong and will
    /// fail identically forever; everything else is worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            NotifyError::Transport(_) => true,
            NotifyError::Api { status, .. } => *status >= 500 || *status == 429,
            NotifyError::InvalidPayload(_) => false,
            NotifyError::ChannelNotConfigured(_) => false,
            NotifyError::Db(_) => true,
        }
    }
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        NotifyError::Transport(err.to_string())
    }
}

/// Result type for notification operations.
pub type NotifyResult<T> = Result<T, NotifyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transience_classification() {
        assert!(NotifyError::Transport("timeout".into()).is_transient());
        assert!(NotifyError::Api { channel: "email", status: 503, body: String::new() }.is_transient());
        assert!(NotifyError::Api { channel: "email", status: 429, body: String::new() }.is_transient());
        assert!(!NotifyError::Api { channel: "email", status: 401, body: String::new() }.is_transient());
        assert!(!NotifyError::InvalidPayload("bad json".into()).is_transient());
    }
}
