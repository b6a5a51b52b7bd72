//! Retry loop: run attempts until success, terminal failure, or exhaustion.

use std::time::Duration;

use super::backoff;
use super::classify::{classify, AttemptOutcome};
use super::error::FetchError;
use super::policy::RetryPolicy;
use crate::request::RequestDescriptor;
use crate::transport::{Transport, TransportResponse};

/// Performs one logical network operation with bounded resilience: up to
/// `max_retries + 1` strictly sequential attempts, each under its own
/// timeout, with exponential backoff between transient failures.
#[derive(Debug, Clone)]
pub struct RetryingFetcher<T: Transport> {
    transport: T,
}

impl<T: Transport> RetryingFetcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run `req` under `policy`. Success and terminal failures return
    /// immediately; transient failures are retried until the budget runs
    /// out, at which point the last one is surfaced.
    pub async fn execute(
        &self,
        req: &RequestDescriptor,
        policy: &RetryPolicy,
    ) -> Result<TransportResponse, FetchError> {
        for attempt in 0..=policy.max_retries {
            let outcome = self.attempt(req, policy.per_attempt_timeout).await;
            match outcome {
                AttemptOutcome::Success(resp) => {
                    if attempt > 0 {
                        tracing::debug!(url = %req.url, attempt, "fetch succeeded after retry");
                    }
                    return Ok(resp);
                }
                AttemptOutcome::Terminal(err) => {
                    tracing::debug!(url = %req.url, attempt, %err, "terminal failure, not retrying");
                    return Err(err);
                }
                AttemptOutcome::Transient(err) => {
                    if attempt == policy.max_retries {
                        tracing::warn!(
                            url = %req.url,
                            attempts = policy.max_attempts(),
                            %err,
                            "retry budget exhausted"
                        );
                        return Err(err);
                    }
                    let delay = backoff::delay_for(attempt, policy.initial_backoff);
                    tracing::debug!(url = %req.url, attempt, ?delay, %err, "transient failure, backing off");
                    tokio::time::sleep(delay).await;
                }
            }
        }
        // The loop always returns from the final attempt's arms.
        unreachable!("retry loop exited without an outcome")
    }

    /// One attempt under its own timeout guard. The guard is scoped to this
    /// call: dropping the timeout future on completion cancels it, so it can
    /// never fire into a later attempt.
    async fn attempt(&self, req: &RequestDescriptor, timeout: Duration) -> AttemptOutcome {
        match tokio::time::timeout(timeout, self.transport.fetch(req)).await {
            Ok(result) => classify(result),
            Err(_elapsed) => AttemptOutcome::Transient(FetchError::Timeout { after: timeout }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::AbortToken;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use url::Url;

    /// Scripted transport: pops the next status (or failure) per call and
    /// counts attempts.
    struct ScriptedTransport {
        calls: AtomicU32,
        script: Vec<Step>,
    }

    enum Step {
        Status(u16),
        Hang,
        ConnectionRefused,
    }

    impl ScriptedTransport {
        fn new(script: Vec<Step>) -> Self {
            Self {
                calls: AtomicU32::new(0),
                script,
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Transport for ScriptedTransport {
        async fn fetch(&self, _req: &RequestDescriptor) -> Result<TransportResponse, FetchError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
            let step = self.script.get(n).unwrap_or(self.script.last().unwrap());
            match step {
                Step::Status(code) => Ok(TransportResponse {
                    status: *code,
                    content_type: None,
                    body: b"{}".to_vec(),
                }),
                Step::Hang => {
                    std::future::pending::<()>().await;
                    unreachable!()
                }
                Step::ConnectionRefused => Err(FetchError::transport("connection refused")),
            }
        }
    }

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            initial_backoff: Duration::from_millis(1),
            per_attempt_timeout: Duration::from_millis(20),
        }
    }

    fn req() -> RequestDescriptor {
        RequestDescriptor::get(Url::parse("http://localhost:3000/api/animals").unwrap())
    }

    #[tokio::test]
    async fn succeeds_on_fourth_attempt_after_503s() {
        let transport = ScriptedTransport::new(vec![
            Step::Status(503),
            Step::Status(503),
            Step::Status(503),
            Step::Status(200),
        ]);
        let fetcher = RetryingFetcher::new(transport);
        let start = std::time::Instant::now();
        let resp = fetcher.execute(&req(), &fast_policy(4)).await.unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(fetcher.transport().calls(), 4);
        // Three backoffs at 1ms, 2ms, 4ms.
        assert!(start.elapsed() >= Duration::from_millis(7));
    }

    #[tokio::test]
    async fn always_timing_out_fails_after_all_attempts() {
        let transport = ScriptedTransport::new(vec![Step::Hang]);
        let fetcher = RetryingFetcher::new(transport);
        let err = fetcher.execute(&req(), &fast_policy(2)).await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout { .. }));
        assert_eq!(fetcher.transport().calls(), 3);
    }

    #[tokio::test]
    async fn terminal_status_is_not_retried() {
        let transport = ScriptedTransport::new(vec![Step::Status(404)]);
        let fetcher = RetryingFetcher::new(transport);
        let err = fetcher.execute(&req(), &fast_policy(4)).await.unwrap_err();
        assert!(matches!(err, FetchError::TerminalStatus(404)));
        assert_eq!(fetcher.transport().calls(), 1);
    }

    #[tokio::test]
    async fn exhaustion_surfaces_last_transient_failure() {
        let transport = ScriptedTransport::new(vec![
            Step::ConnectionRefused,
            Step::Status(502),
            Step::Status(504),
        ]);
        let fetcher = RetryingFetcher::new(transport);
        let err = fetcher.execute(&req(), &fast_policy(2)).await.unwrap_err();
        assert!(matches!(err, FetchError::TransientStatus(504)));
        assert_eq!(fetcher.transport().calls(), 3);
    }

    #[tokio::test]
    async fn success_on_first_attempt_makes_exactly_one_call() {
        let transport = ScriptedTransport::new(vec![Step::Status(200)]);
        let fetcher = RetryingFetcher::new(transport);
        fetcher.execute(&req(), &fast_policy(5)).await.unwrap();
        assert_eq!(fetcher.transport().calls(), 1);
    }

    /// Transport shaped like `CurlTransport`: the transfer runs under
    /// `spawn_blocking` and polls an [`AbortToken`] whose guard is tied to
    /// the fetch future, so a dropped attempt tears its transfer down.
    /// Tracks how many transfers are in flight at once.
    struct BlockingTransport {
        in_flight: Arc<AtomicU32>,
        max_in_flight: Arc<AtomicU32>,
    }

    impl BlockingTransport {
        fn new() -> Self {
            Self {
                in_flight: Arc::new(AtomicU32::new(0)),
                max_in_flight: Arc::new(AtomicU32::new(0)),
            }
        }
    }

    impl Transport for BlockingTransport {
        async fn fetch(&self, _req: &RequestDescriptor) -> Result<TransportResponse, FetchError> {
            let in_flight = Arc::clone(&self.in_flight);
            let max_in_flight = Arc::clone(&self.max_in_flight);
            let abort = AbortToken::new();
            let _guard = abort.cancel_on_drop();
            let task: tokio::task::JoinHandle<Result<TransportResponse, FetchError>> =
                tokio::task::spawn_blocking(move || {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    max_in_flight.fetch_max(now, Ordering::SeqCst);
                    // Poll the token the way curl's progress callback does.
                    for _ in 0..200 {
                        if abort.is_cancelled() {
                            break;
                        }
                        std::thread::sleep(Duration::from_millis(1));
                    }
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    Err(FetchError::transport("transfer aborted"))
                });
            task.await
                .map_err(|e| FetchError::transport(format!("fetch task failed: {e}")))?
        }
    }

    #[tokio::test]
    async fn timed_out_attempts_never_overlap_the_next_one() {
        let policy = RetryPolicy {
            max_retries: 3,
            initial_backoff: Duration::from_millis(10),
            per_attempt_timeout: Duration::from_millis(20),
        };
        let fetcher = RetryingFetcher::new(BlockingTransport::new());
        let err = fetcher.execute(&req(), &policy).await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout { .. }));
        // Strictly sequential attempts: a timed-out transfer is torn down
        // before the next attempt starts.
        assert_eq!(
            fetcher.transport().max_in_flight.load(Ordering::SeqCst),
            1
        );
    }

    #[tokio::test]
    async fn transient_then_terminal_stops_immediately() {
        let transport =
            ScriptedTransport::new(vec![Step::Status(503), Step::Status(403), Step::Status(200)]);
        let fetcher = RetryingFetcher::new(transport);
        let err = fetcher.execute(&req(), &fast_policy(4)).await.unwrap_err();
        assert!(matches!(err, FetchError::TerminalStatus(403)));
        assert_eq!(fetcher.transport().calls(), 2);
    }
}
