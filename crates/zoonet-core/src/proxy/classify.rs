//! Request classification: one decision per request, first match wins.

use super::ProxyConfig;
use crate::request::RequestDescriptor;

/// Strategy chosen for a request. Computed once, never revisited mid-flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyDecision {
    /// Not intercepted; the normal client/network path applies.
    PassThrough,
    /// Navigations: live page when online, cached shell when not.
    NetworkFirstWithFallback,
    /// Static assets: cached copy wins, network fills misses.
    CacheFirstThenNetwork,
}

/// Evaluated in order: non-GET, cross-origin, and dynamic API/liveness
/// paths all pass through (API data must never be silently served stale);
/// then navigations go network-first and everything else is a static asset.
pub fn classify(config: &ProxyConfig, req: &RequestDescriptor) -> ProxyDecision {
    if !req.method.is_get() {
        return ProxyDecision::PassThrough;
    }
    if !req.same_origin(&config.origin) {
        return ProxyDecision::PassThrough;
    }
    let path = req.url.path();
    if path == config.liveness_path
        || config
            .dynamic_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    {
        return ProxyDecision::PassThrough;
    }
    if req.is_navigation {
        return ProxyDecision::NetworkFirstWithFallback;
    }
    ProxyDecision::CacheFirstThenNetwork
}
