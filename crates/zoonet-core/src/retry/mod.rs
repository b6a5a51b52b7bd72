//! Retry and backoff policy.
//!
//! This module encapsulates failure classification (timeouts, transport
//! errors, transient vs terminal statuses) and exponential backoff so the
//! API client and any other caller share one consistent policy.

pub mod backoff;
mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_status, AttemptOutcome};
pub use error::FetchError;
pub use policy::RetryPolicy;
pub use run::RetryingFetcher;
