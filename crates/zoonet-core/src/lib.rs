//! zoonet core: resilient network access for the NTC Zoo catalog.
//!
//! Two cooperating pieces: a retrying HTTP client (`retry` + `client`) that
//! decides how many times and how long to try reaching the network, and an
//! offline-first caching proxy (`proxy` + `cache`) that decides whether the
//! network is consulted at all and what gets remembered for next time.

pub mod config;
pub mod logging;

pub mod cache;
pub mod client;
pub mod notify;
pub mod proxy;
pub mod request;
pub mod retry;
pub mod transport;
