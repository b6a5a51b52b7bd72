//! Persistent request→response cache (SQLite via sqlx).
//!
//! Entries live under a named generation (the cache version tag). Lookups
//! only ever see the current generation; rotating the tag and dropping the
//! others is the sole eviction mechanism. Connection and migration live in
//! `db`, entry operations in `store`.

mod db;
mod store;
#[cfg(test)]
mod tests;

pub use db::CacheStore;

/// A response as remembered by the cache, ready to serve again.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// Per-generation entry count, for status reporting.
#[derive(Debug, Clone)]
pub struct GenerationStats {
    pub generation: String,
    pub entries: i64,
}
