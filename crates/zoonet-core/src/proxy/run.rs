//! Strategy execution: network-first navigations, cache-first assets.

use super::{InterceptProxy, ProxyError, ProxyResponse, ServedFrom};
use crate::request::RequestDescriptor;
use crate::transport::{Transport, TransportResponse};

impl<T: Transport> InterceptProxy<T> {
    /// One network attempt, no retrying. Any completed response is served
    /// live; on failure the cached shell fallback is the answer, and an
    /// empty cache means the resource is simply unavailable.
    /// Navigations are never written to the cache.
    pub(super) async fn network_first(
        &self,
        req: &RequestDescriptor,
    ) -> Result<ProxyResponse, ProxyError> {
        match self.transport.fetch(req).await {
            Ok(resp) => Ok(ProxyResponse::from_network(resp)),
            Err(err) => {
                tracing::debug!(url = %req.url, %err, "navigation fetch failed, trying shell fallback");
                let fallback = self.shell_request(&self.config.shell_fallback)?;
                match self.store.lookup(&fallback).await? {
                    Some(stored) => Ok(ProxyResponse::from_store(stored, ServedFrom::Fallback)),
                    None => Err(ProxyError::Unavailable),
                }
            }
        }
    }

    /// Cached copy first; a miss costs one network fetch. Only responses the
    /// persist predicate accepts are remembered for next time.
    pub(super) async fn cache_first(
        &self,
        req: &RequestDescriptor,
    ) -> Result<ProxyResponse, ProxyError> {
        if let Some(stored) = self.store.lookup(req).await? {
            return Ok(ProxyResponse::from_store(stored, ServedFrom::Cache));
        }

        let resp = match self.transport.fetch(req).await {
            Ok(resp) => resp,
            Err(err) => {
                tracing::debug!(url = %req.url, %err, "asset fetch failed with cold cache");
                return Err(ProxyError::Unavailable);
            }
        };

        if self.persistable(req, &resp) {
            // The response is served either way; a broken cache write only
            // costs the next request a network trip.
            if let Err(err) = self.store.store(req, &resp).await {
                tracing::warn!(url = %req.url, %err, "failed to cache asset");
            }
        }
        Ok(ProxyResponse::from_network(resp))
    }

    /// True only for same-origin, status-200, non-range responses. Partial
    /// and error responses must never be cached as complete resources.
    fn persistable(&self, req: &RequestDescriptor, resp: &TransportResponse) -> bool {
        req.same_origin(&self.config.origin) && resp.status == 200 && !req.has_range()
    }
}
