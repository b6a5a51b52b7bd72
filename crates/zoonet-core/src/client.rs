//! Named API operations against the zoo backend.
//!
//! Thin wrappers over [`RetryingFetcher`]: the client decides which endpoint
//! to hit and how to decode the body, the fetcher decides how many times and
//! how long to try. The backend is a free-tier host that sleeps when idle,
//! hence `wake` before anything else on startup.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::notify::Notifier;
use crate::request::RequestDescriptor;
use crate::retry::{FetchError, RetryPolicy, RetryingFetcher};
use crate::transport::Transport;

/// One animal record as served by `GET /api/animals`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Animal {
    pub id: i64,
    pub name: String,
    pub species: String,
    /// Exhibit status ("Open"/"Closed"); older records may omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Client for the zoo API. Holds the origin, a retrying fetcher, and the
/// fixed policy for the named operations; does no retrying of its own.
pub struct ApiClient<T: Transport> {
    origin: Url,
    fetcher: RetryingFetcher<T>,
    policy: RetryPolicy,
    notifier: Option<Arc<dyn Notifier>>,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(origin: Url, transport: T) -> Self {
        Self {
            origin,
            fetcher: RetryingFetcher::new(transport),
            policy: RetryPolicy::api(),
            notifier: None,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Hit the liveness endpoint until the backend answers; body discarded.
    /// Call once on startup to spin up a sleeping server.
    pub async fn wake(&self) -> Result<(), FetchError> {
        match self.fetch_path("/ping").await {
            Ok(_) => {
                self.notify_success("zoo API is awake");
                Ok(())
            }
            Err(err) => {
                self.notify_error(&format!("zoo API unreachable: {err}"));
                Err(err)
            }
        }
    }

    /// Fetch and decode the full animal listing.
    pub async fn list_animals(&self) -> Result<Vec<Animal>, FetchError> {
        let resp = self.fetch_path("/api/animals").await?;
        let animals = serde_json::from_slice(&resp.body)?;
        Ok(animals)
    }

    /// Fetch a single animal by id. A missing id surfaces as
    /// `FetchError::TerminalStatus(404)`.
    pub async fn animal(&self, id: i64) -> Result<Animal, FetchError> {
        let resp = self.fetch_path(&format!("/api/animals/{id}")).await?;
        let animal = serde_json::from_slice(&resp.body)?;
        Ok(animal)
    }

    async fn fetch_path(
        &self,
        path: &str,
    ) -> Result<crate::transport::TransportResponse, FetchError> {
        let url = self
            .origin
            .join(path)
            .map_err(|e| FetchError::transport(format!("bad request path {path:?}: {e}")))?;
        let req = RequestDescriptor::get(url);
        self.fetcher.execute(&req, &self.policy).await
    }

    fn notify_success(&self, message: &str) {
        if let Some(n) = &self.notifier {
            n.on_success(message);
        }
    }

    fn notify_error(&self, message: &str) {
        if let Some(n) = &self.notifier {
            n.on_error(message);
        }
    }
}
