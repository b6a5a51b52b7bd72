//! Tests for the cache store (in-memory DB, scripted transport for populate).

use std::sync::atomic::{AtomicU32, Ordering};

use url::Url;

use crate::cache::CacheStore;
use crate::request::RequestDescriptor;
use crate::retry::FetchError;
use crate::transport::{Transport, TransportResponse};

fn req(path: &str) -> RequestDescriptor {
    RequestDescriptor::get(Url::parse("http://localhost:3000").unwrap().join(path).unwrap())
}

fn resp(status: u16, body: &[u8]) -> TransportResponse {
    TransportResponse {
        status,
        content_type: Some("text/plain".into()),
        body: body.to_vec(),
    }
}

/// Succeeds for every path except the ones listed, which fail transport-level.
struct FlakyTransport {
    failing_paths: Vec<&'static str>,
    calls: AtomicU32,
}

impl FlakyTransport {
    fn new(failing_paths: Vec<&'static str>) -> Self {
        Self {
            failing_paths,
            calls: AtomicU32::new(0),
        }
    }
}

impl Transport for FlakyTransport {
    async fn fetch(&self, req: &RequestDescriptor) -> Result<TransportResponse, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_paths.contains(&req.url.path()) {
            return Err(FetchError::transport("connection refused"));
        }
        Ok(resp(200, b"asset bytes"))
    }
}

#[tokio::test]
async fn store_then_lookup_roundtrip() {
    let store = CacheStore::open_memory("v1").await.unwrap();
    let r = req("/styles.css");
    assert!(store.lookup(&r).await.unwrap().is_none());

    store.store(&r, &resp(200, b"body { color: green }")).await.unwrap();
    let hit = store.lookup(&r).await.unwrap().unwrap();
    assert_eq!(hit.status, 200);
    assert_eq!(hit.body, b"body { color: green }");
    assert_eq!(hit.content_type.as_deref(), Some("text/plain"));
}

#[tokio::test]
async fn lookup_never_sees_other_generations() {
    let v1 = CacheStore::open_memory("v1").await.unwrap();
    v1.store(&req("/zoo.js"), &resp(200, b"old")).await.unwrap();

    let v2 = v1.with_generation("v2");
    assert!(v2.lookup(&req("/zoo.js")).await.unwrap().is_none());

    // The old generation still answers through its own handle.
    assert!(v1.lookup(&req("/zoo.js")).await.unwrap().is_some());
}

#[tokio::test]
async fn store_overwrites_per_key() {
    let store = CacheStore::open_memory("v1").await.unwrap();
    let r = req("/index.html");
    store.store(&r, &resp(200, b"first")).await.unwrap();
    store.store(&r, &resp(200, b"second")).await.unwrap();
    let hit = store.lookup(&r).await.unwrap().unwrap();
    assert_eq!(hit.body, b"second");
}

#[tokio::test]
async fn drop_generations_except_removes_stale_entries() {
    let v1 = CacheStore::open_memory("v1").await.unwrap();
    v1.store(&req("/zoo.js"), &resp(200, b"old")).await.unwrap();
    let v2 = v1.with_generation("v2");
    v2.store(&req("/zoo.js"), &resp(200, b"new")).await.unwrap();

    let dropped = v2.drop_generations_except("v2").await.unwrap();
    assert_eq!(dropped, 1);

    assert!(v1.lookup(&req("/zoo.js")).await.unwrap().is_none());
    assert_eq!(
        v2.lookup(&req("/zoo.js")).await.unwrap().unwrap().body,
        b"new"
    );
}

#[tokio::test]
async fn populate_stores_every_key() {
    let store = CacheStore::open_memory("v1").await.unwrap();
    let transport = FlakyTransport::new(vec![]);
    let keys = vec![req("/index.html"), req("/styles.css"), req("/zoo.js")];

    store.populate(&transport, &keys).await.unwrap();
    for key in &keys {
        assert!(store.lookup(key).await.unwrap().is_some());
    }
}

#[tokio::test]
async fn populate_is_all_or_nothing() {
    let store = CacheStore::open_memory("v1").await.unwrap();
    let transport = FlakyTransport::new(vec!["/styles.css"]);
    let keys = vec![req("/index.html"), req("/styles.css"), req("/zoo.js")];

    assert!(store.populate(&transport, &keys).await.is_err());
    // Nothing was written, not even the key that fetched fine.
    for key in &keys {
        assert!(store.lookup(key).await.unwrap().is_none());
    }
}

#[tokio::test]
async fn populate_write_failure_leaves_no_partial_generation() {
    let store = CacheStore::open_memory("v1").await.unwrap();
    let transport = FlakyTransport::new(vec![]);
    let keys = vec![req("/index.html"), req("/styles.css"), req("/zoo.js")];

    // Make every write fail after the fetches have all succeeded.
    sqlx::query("PRAGMA query_only = ON")
        .execute(&store.pool)
        .await
        .unwrap();
    assert!(store.populate(&transport, &keys).await.is_err());

    sqlx::query("PRAGMA query_only = OFF")
        .execute(&store.pool)
        .await
        .unwrap();
    // Loud failure, no partial cache: the transaction left nothing behind.
    for key in &keys {
        assert!(store.lookup(key).await.unwrap().is_none());
    }
}

#[tokio::test]
async fn stats_counts_per_generation() {
    let v1 = CacheStore::open_memory("v1").await.unwrap();
    v1.store(&req("/a"), &resp(200, b"a")).await.unwrap();
    v1.store(&req("/b"), &resp(200, b"b")).await.unwrap();
    let v2 = v1.with_generation("v2");
    v2.store(&req("/a"), &resp(200, b"a")).await.unwrap();

    let stats = v2.stats().await.unwrap();
    assert_eq!(stats.len(), 2);
    // Current generation sorts first.
    assert_eq!(stats[0].generation, "v2");
    assert_eq!(stats[0].entries, 1);
    assert_eq!(stats[1].generation, "v1");
    assert_eq!(stats[1].entries, 2);
}

#[tokio::test]
async fn on_disk_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.db");

    {
        let store = CacheStore::open_at(&path, "v1").await.unwrap();
        store.store(&req("/icon-192.png"), &resp(200, b"png")).await.unwrap();
    }

    let reopened = CacheStore::open_at(&path, "v1").await.unwrap();
    let hit = reopened.lookup(&req("/icon-192.png")).await.unwrap().unwrap();
    assert_eq!(hit.body, b"png");
}
