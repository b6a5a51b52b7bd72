//! The "perform one network call" primitive.
//!
//! `Transport` is the seam the retry loop and the proxy are generic over;
//! tests script it, production uses libcurl. The curl implementation runs
//! each blocking transfer under `spawn_blocking` so callers stay async.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::request::{Method, RequestDescriptor};
use crate::retry::FetchError;

/// Shared cancellation flag for one in-flight transfer. The async side holds
/// a [`CancelOnDrop`] guard tied to the fetch future; the blocking side polls
/// `is_cancelled` (curl does so from its progress callback) and aborts.
#[derive(Debug, Clone, Default)]
pub struct AbortToken(Arc<AtomicBool>);

impl AbortToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Guard that cancels this token when dropped. A fetch future dropped by
    /// the per-attempt timeout tears its transfer down instead of leaving it
    /// running in the blocking pool alongside the next attempt.
    pub fn cancel_on_drop(&self) -> CancelOnDrop {
        CancelOnDrop(self.clone())
    }
}

pub struct CancelOnDrop(AbortToken);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

/// Raw response from one network call: status plus the bits the cache and
/// callers need to serve it again.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

/// One network call. Implementations report completed HTTP exchanges as
/// `Ok` regardless of status; `Err` is reserved for the call not completing
/// (timeout, transport-level failure).
pub trait Transport: Send + Sync {
    fn fetch(
        &self,
        req: &RequestDescriptor,
    ) -> impl Future<Output = Result<TransportResponse, FetchError>> + Send;
}

/// libcurl-backed transport. Each fetch builds a fresh `Easy` handle inside
/// `spawn_blocking`; handles are cheap and per-call handles avoid sharing
/// non-`Send` state across tasks.
#[derive(Debug, Clone)]
pub struct CurlTransport {
    connect_timeout: Duration,
    /// Whole-transfer cap at the curl level. Callers running under a
    /// per-attempt retry budget should set this to that budget via
    /// `with_transfer_timeout` so curl enforces the same deadline.
    transfer_timeout: Duration,
}

impl Default for CurlTransport {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            transfer_timeout: Duration::from_secs(30),
        }
    }
}

impl CurlTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transfer_timeout(mut self, timeout: Duration) -> Self {
        self.transfer_timeout = timeout;
        self
    }

    fn perform(
        url: String,
        method: Method,
        range: Option<String>,
        connect_timeout: Duration,
        transfer_timeout: Duration,
        abort: AbortToken,
    ) -> Result<TransportResponse, FetchError> {
        let mut easy = curl::easy::Easy::new();
        easy.url(&url).map_err(curl_error(transfer_timeout))?;
        easy.progress(true).map_err(curl_error(transfer_timeout))?;
        easy.progress_function(move |_, _, _, _| !abort.is_cancelled())
            .map_err(curl_error(transfer_timeout))?;
        match method {
            Method::Get => easy.get(true),
            Method::Head => easy.nobody(true),
            other => easy.custom_request(other.as_str()),
        }
        .map_err(curl_error(transfer_timeout))?;
        easy.follow_location(true)
            .map_err(curl_error(transfer_timeout))?;
        easy.connect_timeout(connect_timeout)
            .map_err(curl_error(transfer_timeout))?;
        easy.timeout(transfer_timeout)
            .map_err(curl_error(transfer_timeout))?;
        if let Some(range) = &range {
            let mut list = curl::easy::List::new();
            list.append(&format!("Range: {}", range))
                .map_err(curl_error(transfer_timeout))?;
            easy.http_headers(list).map_err(curl_error(transfer_timeout))?;
        }

        let mut body: Vec<u8> = Vec::new();
        let mut header_lines: Vec<String> = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer
                .header_function(|data| {
                    if let Ok(s) = std::str::from_utf8(data) {
                        header_lines.push(s.trim_end().to_string());
                    }
                    true
                })
                .map_err(curl_error(transfer_timeout))?;
            transfer
                .write_function(|data| {
                    body.extend_from_slice(data);
                    Ok(data.len())
                })
                .map_err(curl_error(transfer_timeout))?;
            transfer.perform().map_err(curl_error(transfer_timeout))?;
        }

        let status = easy
            .response_code()
            .map_err(curl_error(transfer_timeout))? as u16;
        let content_type = header_value(&header_lines, "content-type");

        Ok(TransportResponse {
            status,
            content_type,
            body,
        })
    }
}

impl Transport for CurlTransport {
    async fn fetch(&self, req: &RequestDescriptor) -> Result<TransportResponse, FetchError> {
        let url = req.url.to_string();
        let method = req.method;
        let range = req.range.clone();
        let connect_timeout = self.connect_timeout;
        let transfer_timeout = self.transfer_timeout;

        let abort = AbortToken::new();
        let _guard = abort.cancel_on_drop();
        tokio::task::spawn_blocking(move || {
            Self::perform(url, method, range, connect_timeout, transfer_timeout, abort)
        })
        .await
        .map_err(|e| FetchError::transport(format!("fetch task failed: {e}")))?
    }
}

/// Map a curl error into the fetch taxonomy. Curl-level timeouts become
/// `Timeout`; a progress-callback abort means the attempt's future is
/// already gone; everything else is a transport failure.
fn curl_error(transfer_timeout: Duration) -> impl Fn(curl::Error) -> FetchError {
    move |e| {
        if e.is_operation_timedout() {
            FetchError::Timeout {
                after: transfer_timeout,
            }
        } else if e.is_aborted_by_callback() {
            FetchError::transport("transfer aborted")
        } else {
            FetchError::transport(e.to_string())
        }
    }
}

/// Find a header value by case-insensitive name in raw `Name: value` lines.
fn header_value(lines: &[String], name: &str) -> Option<String> {
    lines.iter().find_map(|line| {
        let (k, v) = line.split_once(':')?;
        if k.trim().eq_ignore_ascii_case(name) {
            Some(v.trim().to_string())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_value_is_case_insensitive() {
        let lines = vec![
            "HTTP/1.1 200 OK".to_string(),
            "Content-Type: application/json".to_string(),
            "Cache-Control: no-store".to_string(),
        ];
        assert_eq!(
            header_value(&lines, "content-type").as_deref(),
            Some("application/json")
        );
        assert_eq!(header_value(&lines, "etag"), None);
    }

    #[test]
    fn cancel_on_drop_cancels_the_token() {
        let token = AbortToken::new();
        assert!(!token.is_cancelled());
        {
            let _guard = token.cancel_on_drop();
            assert!(!token.is_cancelled());
        }
        assert!(token.is_cancelled());
    }

    #[test]
    fn success_statuses() {
        let ok = TransportResponse {
            status: 204,
            content_type: None,
            body: Vec::new(),
        };
        assert!(ok.is_success());
        let not_found = TransportResponse {
            status: 404,
            content_type: None,
            body: Vec::new(),
        };
        assert!(!not_found.is_success());
    }
}
