//! Classify attempt results into success / transient / terminal.
//!
//! Shared by the retry loop so every caller agrees on which failures are
//! worth another attempt. The transient set is exactly what the zoo API
//! signals while its backend spins up: 502, 503, 504.

use super::error::FetchError;
use crate::transport::TransportResponse;

/// Outcome of one attempt, after classification.
#[derive(Debug)]
pub enum AttemptOutcome {
    /// Successful response; return it, no further attempts.
    Success(TransportResponse),
    /// Worth retrying if budget remains.
    Transient(FetchError),
    /// Retrying cannot fix this; propagate immediately.
    Terminal(FetchError),
}

/// Classify an HTTP status code. `None` means success (2xx).
pub fn classify_status(status: u16) -> Option<FetchError> {
    match status {
        200..=299 => None,
        502 | 503 | 504 => Some(FetchError::TransientStatus(status)),
        _ => Some(FetchError::TerminalStatus(status)),
    }
}

/// Classify the raw result of one transport call.
pub fn classify(result: Result<TransportResponse, FetchError>) -> AttemptOutcome {
    match result {
        Ok(resp) => match classify_status(resp.status) {
            None => AttemptOutcome::Success(resp),
            Some(err) if err.is_transient() => AttemptOutcome::Transient(err),
            Some(err) => AttemptOutcome::Terminal(err),
        },
        Err(err) if err.is_transient() => AttemptOutcome::Transient(err),
        Err(err) => AttemptOutcome::Terminal(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn success_statuses_pass() {
        assert!(classify_status(200).is_none());
        assert!(classify_status(204).is_none());
    }

    #[test]
    fn gateway_statuses_transient() {
        for s in [502u16, 503, 504] {
            assert!(matches!(
                classify_status(s),
                Some(FetchError::TransientStatus(code)) if code == s
            ));
        }
    }

    #[test]
    fn other_statuses_terminal() {
        for s in [301u16, 400, 403, 404, 500, 501] {
            assert!(matches!(
                classify_status(s),
                Some(FetchError::TerminalStatus(code)) if code == s
            ));
        }
    }

    #[test]
    fn timeout_and_transport_are_transient() {
        let timeout = FetchError::Timeout {
            after: Duration::from_secs(12),
        };
        assert!(matches!(
            classify(Err(timeout)),
            AttemptOutcome::Transient(FetchError::Timeout { .. })
        ));
        assert!(matches!(
            classify(Err(FetchError::transport("connection refused"))),
            AttemptOutcome::Transient(FetchError::Transport { .. })
        ));
    }

    #[test]
    fn decode_is_terminal() {
        let err = FetchError::Decode {
            message: "bad json".into(),
        };
        assert!(matches!(classify(Err(err)), AttemptOutcome::Terminal(_)));
    }
}
