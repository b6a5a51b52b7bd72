//! Offline-first request interception.
//!
//! The proxy classifies every outbound request once and applies exactly one
//! strategy: leave it alone (dynamic API traffic must never be served
//! stale), network-first with a cached shell fallback (navigations), or
//! cache-first (static assets). Classification lives in `classify`, the
//! strategies in `run`.

mod classify;
mod run;

use thiserror::Error;
use url::Url;

use crate::cache::{CacheStore, StoredResponse};
use crate::request::RequestDescriptor;
use crate::transport::{Transport, TransportResponse};

pub use classify::ProxyDecision;

/// Constructor-time proxy configuration; not mutable at runtime.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// The origin the proxy fronts; cross-origin requests pass through.
    pub origin: Url,
    /// Path prefixes that always go to the network (e.g. `/api/`).
    pub dynamic_prefixes: Vec<String>,
    /// Health-check path, also never cached.
    pub liveness_path: String,
    /// Shell key served when an offline navigation misses the network.
    pub shell_fallback: String,
    /// Paths pre-populated into the cache by `install`.
    pub precache_paths: Vec<String>,
}

/// Proxy failure surfaced to the end caller.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Network failed and no cached copy (or fallback) exists.
    #[error("resource unavailable: network failed and nothing cached")]
    Unavailable,
    /// The cache store itself failed; distinct from simply being offline.
    #[error("cache store error: {0}")]
    Store(#[from] anyhow::Error),
}

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServedFrom {
    Network,
    Cache,
    Fallback,
}

/// A response the proxy resolved, tagged with its source.
#[derive(Debug, Clone)]
pub struct ProxyResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    pub served_from: ServedFrom,
}

impl ProxyResponse {
    fn from_network(resp: TransportResponse) -> Self {
        ProxyResponse {
            status: resp.status,
            content_type: resp.content_type,
            body: resp.body,
            served_from: ServedFrom::Network,
        }
    }

    fn from_store(resp: StoredResponse, served_from: ServedFrom) -> Self {
        ProxyResponse {
            status: resp.status,
            content_type: resp.content_type,
            body: resp.body,
            served_from,
        }
    }
}

/// Result of handling one request.
#[derive(Debug)]
pub enum ProxyOutcome {
    /// The proxy declined; send this through the normal client path.
    PassThrough,
    Served(ProxyResponse),
}

/// The decision engine: classifies requests and runs strategies over the
/// cache store and a pass-through transport.
pub struct InterceptProxy<T: Transport> {
    config: ProxyConfig,
    store: CacheStore,
    transport: T,
}

impl<T: Transport> InterceptProxy<T> {
    pub fn new(config: ProxyConfig, store: CacheStore, transport: T) -> Self {
        Self {
            config,
            store,
            transport,
        }
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Classify `req` without running a strategy.
    pub fn classify(&self, req: &RequestDescriptor) -> ProxyDecision {
        classify::classify(&self.config, req)
    }

    /// Handle one request: classify, then run the chosen strategy to
    /// completion. Every path ends in an outcome or a `ProxyError`; none
    /// leaves the request unresolved.
    pub async fn handle(&self, req: &RequestDescriptor) -> Result<ProxyOutcome, ProxyError> {
        match self.classify(req) {
            ProxyDecision::PassThrough => Ok(ProxyOutcome::PassThrough),
            ProxyDecision::NetworkFirstWithFallback => {
                self.network_first(req).await.map(ProxyOutcome::Served)
            }
            ProxyDecision::CacheFirstThenNetwork => {
                self.cache_first(req).await.map(ProxyOutcome::Served)
            }
        }
    }

    /// Install step: pre-warm the current generation with the shell assets.
    /// Fails loudly if any asset cannot be fetched.
    pub async fn install(&self) -> Result<(), ProxyError> {
        let keys = self
            .config
            .precache_paths
            .iter()
            .map(|path| self.shell_request(path))
            .collect::<Result<Vec<_>, _>>()?;
        self.store.populate(&self.transport, &keys).await?;
        Ok(())
    }

    /// Activate step: drop every generation other than the current one.
    pub async fn activate(&self) -> Result<u64, ProxyError> {
        let dropped = self
            .store
            .drop_generations_except(self.store.generation())
            .await?;
        Ok(dropped)
    }

    pub(crate) fn shell_request(&self, path: &str) -> Result<RequestDescriptor, ProxyError> {
        let url = self
            .config
            .origin
            .join(path)
            .map_err(|e| ProxyError::Store(anyhow::anyhow!("bad shell path {path:?}: {e}")))?;
        Ok(RequestDescriptor::get(url))
    }
}
