//! Verdict history store.
//!
//! Rows are appended after every successful classification and pruned to the
//! most recent `limit` in the same transaction. Writes are serialized through
//! one async mutex; reads go straight to the pool. Every committed write bumps a
//! `watch` counter so live views can re-query.

use std::path::Path;

use futures::stream::{self, Stream};
use log::{debug, info};
use sqlx::SqlitePool;
use tokio::sync::{watch, Mutex};

use super::models::{CheckSource, HistoryRecord, HISTORY_COLUMNS};
use super::pool::{init_db_pool_with_path, DbPool, IN_MEMORY_DB};
use super::run_migrations;
use crate::classifier::ClassificationVerdict;
use crate::config::DuplicatePolicy;
use crate::error_handling::DatabaseError;
use crate::scan::FeatureRecord;
use crate::utils::now_millis;

/// SQLite-backed history of verdicts, keyed by canonical URL string.
pub struct HistoryStore {
    pool: DbPool,
    write_lock: Mutex<()>,
    changes: watch::Sender<u64>,
    duplicate_policy: DuplicatePolicy,
}

impl HistoryStore {
    /// Opens (creating if needed) the store at `path` and applies migrations.
    pub async fn open(path: &Path, duplicate_policy: DuplicatePolicy) -> Result<Self, DatabaseError> {
        let pool = init_db_pool_with_path(path).await?;
        let store = Self::from_pool(pool, duplicate_policy).await?;
        info!("History store opened at {}", path.display());
        Ok(store)
    }

    /// Opens a private in-memory store.
    pub async fn in_memory(duplicate_policy: DuplicatePolicy) -> Result<Self, DatabaseError> {
        Self::open(Path::new(IN_MEMORY_DB), duplicate_policy).await
    }

    /// Wraps an existing pool, applying migrations.
    pub async fn from_pool(pool: DbPool, duplicate_policy: DuplicatePolicy) -> Result<Self, DatabaseError> {
        run_migrations(pool.as_ref()).await?;
        let (changes, _) = watch::channel(0);
        Ok(Self {
            pool,
            write_lock: Mutex::new(()),
            changes,
            duplicate_policy,
        })
    }

    /// Closes the pool. Later operations fail with a pool-closed error.
    pub async fn close(&self) {
        self.pool.close().await;
        debug!("History store closed");
    }

    /// Most recently checked record for `url`, if any.
    pub async fn lookup(&self, url: &str) -> Result<Option<HistoryRecord>, DatabaseError> {
        let row = sqlx::query(&format!(
            "SELECT {HISTORY_COLUMNS} FROM link_history
             WHERE url = ?
             ORDER BY checked_at DESC, id DESC
             LIMIT 1"
        ))
        .bind(url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.as_ref().map(HistoryRecord::from_row).transpose()
    }

    /// Appends a verdict for `features.url`, then keeps only the `limit` most
    /// recent rows.
    ///
    /// Insert, optional duplicate removal and pruning commit as one
    /// transaction.
    pub async fn record_success(
        &self,
        verdict: &ClassificationVerdict,
        features: &FeatureRecord,
        source: CheckSource,
        limit: u32,
    ) -> Result<HistoryRecord, DatabaseError> {
        let _guard = self.write_lock.lock().await;
        let checked_at = now_millis();
        let mut tx = self.pool.begin().await?;

        if self.duplicate_policy == DuplicatePolicy::ReplaceExisting {
            let replaced = sqlx::query("DELETE FROM link_history WHERE url = ?")
                .bind(&features.url)
                .execute(&mut *tx)
                .await?
                .rows_affected();
            if replaced > 0 {
                debug!("Replaced {replaced} earlier verdict(s) for {}", features.url);
            }
        }

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO link_history (
                url, domain, is_phishing, confidence, prediction, reason, checked_at, source
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id",
        )
        .bind(&features.url)
        .bind(&features.domain)
        .bind(verdict.is_phishing)
        .bind(verdict.confidence)
        .bind(verdict.label.as_ref())
        .bind(&verdict.reason)
        .bind(checked_at)
        .bind(source.as_ref())
        .fetch_one(&mut *tx)
        .await?;

        let pruned = prune_in(&mut tx, limit).await?;
        tx.commit().await?;
        self.notify();

        debug!(
            "Saved verdict #{id} for {} (domain: {:?}, pruned {pruned})",
            features.url, features.domain
        );

        Ok(HistoryRecord {
            id,
            url: features.url.clone(),
            domain: features.domain.clone(),
            is_phishing: verdict.is_phishing,
            confidence: verdict.confidence,
            prediction: verdict.label,
            reason: verdict.reason.clone(),
            checked_at,
            source,
        })
    }

    /// Keeps only the `limit` most recently checked rows. Returns the number removed.
    pub async fn prune(&self, limit: u32) -> Result<u64, DatabaseError> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.pool.begin().await?;
        let pruned = prune_in(&mut tx, limit).await?;
        tx.commit().await?;
        if pruned > 0 {
            self.notify();
        }
        Ok(pruned)
    }

    /// Removes every row. Returns the number removed.
    pub async fn clear(&self) -> Result<u64, DatabaseError> {
        let _guard = self.write_lock.lock().await;
        let removed = sqlx::query("DELETE FROM link_history")
            .execute(self.pool.as_ref())
            .await?
            .rows_affected();
        self.notify();
        info!("History cleared ({removed} rows)");
        Ok(removed)
    }

    /// Removes the row with `id`. Returns whether a row existed.
    pub async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        let _guard = self.write_lock.lock().await;
        let removed = sqlx::query("DELETE FROM link_history WHERE id = ?")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?
            .rows_affected();
        if removed > 0 {
            self.notify();
            info!("Deleted history row {id}");
        }
        Ok(removed > 0)
    }

    /// Number of stored rows.
    pub async fn count(&self) -> Result<i64, DatabaseError> {
        let n = sqlx::query_scalar("SELECT COUNT(*) FROM link_history")
            .fetch_one(self.pool.as_ref())
            .await?;
        Ok(n)
    }

    /// Snapshot of the `limit` most recent rows, newest first.
    pub async fn recent(&self, limit: u32) -> Result<Vec<HistoryRecord>, DatabaseError> {
        select_snapshot(&self.pool, Some(limit)).await
    }

    /// Snapshot of every row, newest first.
    pub async fn all(&self) -> Result<Vec<HistoryRecord>, DatabaseError> {
        select_snapshot(&self.pool, None).await
    }

    /// Live view of the `limit` most recent rows.
    ///
    /// Yields the current snapshot at once, then a fresh snapshot after each
    /// committed write. Bursts of writes may be coalesced into one snapshot.
    /// Dropping the stream unsubscribes; the stream ends when the store is
    /// dropped.
    pub fn recent_links(
        &self,
        limit: u32,
    ) -> impl Stream<Item = Result<Vec<HistoryRecord>, DatabaseError>> + Send + 'static {
        self.watch_snapshots(Some(limit))
    }

    /// Live view of every row; see `recent_links`.
    pub fn all_links(
        &self,
    ) -> impl Stream<Item = Result<Vec<HistoryRecord>, DatabaseError>> + Send + 'static {
        self.watch_snapshots(None)
    }

    fn watch_snapshots(
        &self,
        limit: Option<u32>,
    ) -> impl Stream<Item = Result<Vec<HistoryRecord>, DatabaseError>> + Send + 'static {
        let pool = DbPool::clone(&self.pool);
        let rx = self.changes.subscribe();
        stream::unfold((pool, rx, true), move |(pool, mut rx, first)| async move {
            if !first && rx.changed().await.is_err() {
                return None;
            }
            let snapshot = select_snapshot(&pool, limit).await;
            Some((snapshot, (pool, rx, false)))
        })
    }

    fn notify(&self) {
        self.changes.send_modify(|generation| *generation = generation.wrapping_add(1));
    }
}

async fn prune_in(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    limit: u32,
) -> Result<u64, DatabaseError> {
    let pruned = sqlx::query(
        "DELETE FROM link_history WHERE id NOT IN (
            SELECT id FROM link_history ORDER BY checked_at DESC, id DESC LIMIT ?
        )",
    )
    .bind(i64::from(limit))
    .execute(&mut **tx)
    .await?
    .rows_affected();
    Ok(pruned)
}

async fn select_snapshot(
    pool: &SqlitePool,
    limit: Option<u32>,
) -> Result<Vec<HistoryRecord>, DatabaseError> {
    // LIMIT -1 means no limit in SQLite
    let limit = limit.map_or(-1, i64::from);
    let rows = sqlx::query(&format!(
        "SELECT {HISTORY_COLUMNS} FROM link_history
         ORDER BY checked_at DESC, id DESC
         LIMIT ?"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter().map(HistoryRecord::from_row).collect()
}
