//! Cache entry operations: lookup, store, bulk pre-warm, generation eviction.

use anyhow::{Context, Result};
use sqlx::Row;

use super::db::{unix_timestamp, CacheStore};
use super::{GenerationStats, StoredResponse};
use crate::request::RequestDescriptor;
use crate::transport::{Transport, TransportResponse};

const INSERT_ENTRY_SQL: &str = "INSERT OR REPLACE INTO cache_entries \
     (generation, method, url, status, content_type, body, stored_at) \
     VALUES (?, ?, ?, ?, ?, ?, ?)";

impl CacheStore {
    /// Look `req` up in the current generation. Stale generations are never
    /// searched. A miss is `None`, not an error.
    pub async fn lookup(&self, req: &RequestDescriptor) -> Result<Option<StoredResponse>> {
        let row = sqlx::query(
            "SELECT status, content_type, body FROM cache_entries \
             WHERE generation = ? AND method = ? AND url = ?",
        )
        .bind(&self.generation)
        .bind(req.method.as_str())
        .bind(req.url.as_str())
        .fetch_optional(&self.pool)
        .await
        .context("cache lookup failed")?;

        Ok(row.map(|row| StoredResponse {
            status: row.get::<i64, _>("status") as u16,
            content_type: row.get("content_type"),
            body: row.get("body"),
        }))
    }

    /// Persist `resp` for `req` under the current generation. The caller
    /// decides eligibility; the store overwrites blindly (last write wins).
    pub async fn store(&self, req: &RequestDescriptor, resp: &TransportResponse) -> Result<()> {
        sqlx::query(INSERT_ENTRY_SQL)
            .bind(&self.generation)
            .bind(req.method.as_str())
            .bind(req.url.as_str())
            .bind(resp.status as i64)
            .bind(&resp.content_type)
            .bind(&resp.body)
            .bind(unix_timestamp())
            .execute(&self.pool)
            .await
            .with_context(|| format!("cache store failed for {}", req.cache_key()))?;
        Ok(())
    }

    /// Pre-warm the current generation: fetch every key, then store them all
    /// in one transaction.
    ///
    /// All-or-nothing both ways: any fetch failure or non-2xx response
    /// aborts the operation before anything is written, and a failed write
    /// rolls back every other write. A missing shell asset must be a loud
    /// failure, not a silent partial cache.
    pub async fn populate<T: Transport>(
        &self,
        transport: &T,
        keys: &[RequestDescriptor],
    ) -> Result<()> {
        let mut fetched: Vec<(&RequestDescriptor, TransportResponse)> =
            Vec::with_capacity(keys.len());
        for req in keys {
            let resp = transport
                .fetch(req)
                .await
                .with_context(|| format!("pre-cache fetch failed for {}", req.cache_key()))?;
            if !resp.is_success() {
                anyhow::bail!(
                    "pre-cache fetch for {} returned HTTP {}",
                    req.cache_key(),
                    resp.status
                );
            }
            fetched.push((req, resp));
        }

        let mut tx = self.pool.begin().await.context("pre-cache write failed")?;
        let stored_at = unix_timestamp();
        for (req, resp) in &fetched {
            sqlx::query(INSERT_ENTRY_SQL)
                .bind(&self.generation)
                .bind(req.method.as_str())
                .bind(req.url.as_str())
                .bind(resp.status as i64)
                .bind(&resp.content_type)
                .bind(&resp.body)
                .bind(stored_at)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("pre-cache write failed for {}", req.cache_key()))?;
        }
        tx.commit().await.context("pre-cache commit failed")?;
        tracing::info!(
            generation = %self.generation,
            entries = fetched.len(),
            "pre-cached shell assets"
        );
        Ok(())
    }

    /// Delete every generation except `current`; returns the number of rows
    /// removed. This is the entire eviction policy.
    pub async fn drop_generations_except(&self, current: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM cache_entries WHERE generation != ?")
            .bind(current)
            .execute(&self.pool)
            .await
            .context("generation cleanup failed")?;
        let dropped = result.rows_affected();
        if dropped > 0 {
            tracing::info!(current, dropped, "dropped stale cache generations");
        }
        Ok(dropped)
    }

    /// Entry counts per generation, current first.
    pub async fn stats(&self) -> Result<Vec<GenerationStats>> {
        let rows = sqlx::query(
            "SELECT generation, COUNT(*) AS entries FROM cache_entries \
             GROUP BY generation ORDER BY generation = ? DESC, generation",
        )
        .bind(&self.generation)
        .fetch_all(&self.pool)
        .await
        .context("cache stats query failed")?;

        Ok(rows
            .into_iter()
            .map(|row| GenerationStats {
                generation: row.get("generation"),
                entries: row.get("entries"),
            })
            .collect())
    }
}
