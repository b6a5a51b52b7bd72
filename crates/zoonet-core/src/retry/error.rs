//! Fetch failure taxonomy for retry classification.

use std::time::Duration;
use thiserror::Error;

/// Failure of a single logical fetch. Carries enough to distinguish timeout,
/// transport error, transient status, and terminal status, so callers and
/// tests can tell why a request failed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The per-attempt timeout fired before the call completed.
    #[error("request timed out after {after:?}")]
    Timeout { after: Duration },

    /// Network-level failure (connection refused, DNS, reset, etc.).
    #[error("transport error: {message}")]
    Transport { message: String },

    /// Server explicitly signaled transience (502, 503, 504).
    #[error("transient server error: HTTP {0}")]
    TransientStatus(u16),

    /// Any other non-success status. Retrying cannot fix these.
    #[error("HTTP {0}")]
    TerminalStatus(u16),

    /// Response body was not parseable as the expected structured data.
    #[error("decode error: {message}")]
    Decode { message: String },
}

impl FetchError {
    pub fn transport(message: impl Into<String>) -> Self {
        FetchError::Transport {
            message: message.into(),
        }
    }

    /// True for failures likely to succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FetchError::Timeout { .. }
                | FetchError::Transport { .. }
                | FetchError::TransientStatus(_)
        )
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Decode {
            message: e.to_string(),
        }
    }
}
