//! SQLite-backed cache store: connection, migration, and open helpers.

use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Percent-encode a path for a sqlite:// URI so spaces and special chars
/// don't break parsing.
fn path_to_sqlite_uri(path: &Path) -> String {
    let s = path.to_string_lossy();
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '%' => out.push_str("%25"),
            ' ' => out.push_str("%20"),
            '#' => out.push_str("%23"),
            '?' => out.push_str("%3F"),
            '&' => out.push_str("%26"),
            c => out.push(c),
        }
    }
    format!("sqlite://{}", out)
}

/// Handle to the cache database, bound to one generation name.
///
/// The database file lives under the XDG state directory:
/// `~/.local/state/zoonet/cache.db`. Handles are cheap to clone and safe to
/// share; concurrent writes interleave last-write-wins per key.
#[derive(Clone)]
pub struct CacheStore {
    pub(crate) pool: Pool<Sqlite>,
    pub(crate) generation: String,
}

impl CacheStore {
    /// Open (or create) the default cache database bound to `generation`.
    /// Idempotent: opening an existing generation yields the same store.
    pub async fn open_generation(generation: &str) -> Result<Self> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("zoonet")?;
        let state_dir = xdg_dirs.get_state_home().join("zoonet");
        let db_path = state_dir.join("cache.db");

        tokio::fs::create_dir_all(&state_dir).await?;

        let uri = path_to_sqlite_uri(&db_path) + "?mode=rwc";
        Self::connect(&uri, generation).await
    }

    /// Open (or create) the database at a specific path. Intended for tests
    /// so the store can live in a temp directory.
    pub async fn open_at(path: impl AsRef<Path>, generation: &str) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let uri = path_to_sqlite_uri(path) + "?mode=rwc";
        Self::connect(&uri, generation).await
    }

    /// In-memory store for tests.
    pub async fn open_memory(generation: &str) -> Result<Self> {
        Self::connect("sqlite::memory:", generation).await
    }

    async fn connect(uri: &str, generation: &str) -> Result<Self> {
        // A `:memory:` database exists per connection; the pool must stay at
        // one or each connection would see its own empty store.
        let max_connections = if uri.contains(":memory:") { 1 } else { 8 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(uri)
            .await?;
        let store = CacheStore {
            pool,
            generation: generation.to_string(),
        };
        store.migrate().await?;
        Ok(store)
    }

    /// Name of the generation this handle reads and writes.
    pub fn generation(&self) -> &str {
        &self.generation
    }

    /// Same database, different generation. Used on version bumps: rebind to
    /// the new tag, repopulate, then drop the others.
    pub fn with_generation(&self, generation: &str) -> Self {
        CacheStore {
            pool: self.pool.clone(),
            generation: generation.to_string(),
        }
    }

    async fn migrate(&self) -> Result<()> {
        // One table keyed by (generation, method, url). The generation column
        // is what makes whole-generation eviction a single DELETE.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS cache_entries (
                generation TEXT NOT NULL,
                method TEXT NOT NULL,
                url TEXT NOT NULL,
                status INTEGER NOT NULL,
                content_type TEXT,
                body BLOB NOT NULL,
                stored_at INTEGER NOT NULL,
                PRIMARY KEY (generation, method, url)
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Current time as Unix seconds (for the `stored_at` column).
pub(crate) fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
