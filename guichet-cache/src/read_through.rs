//! Read-through cache with stale-while-revalidate and single-flight refresh.
//!
//! One cache entry per process: the last successful full-table snapshot, its
//! refresh time, and a refresh gate. All dashboard reads go through here.
//!
//! The entry moves through four states:
//!
//! - `Empty`: no successful fetch yet. Reads block on a refresh and surface
//!   its error.
//! - `Fresh`: snapshot younger than the TTL. Reads return it directly with
//!   no upstream traffic.
//! - `Stale`: snapshot older than the TTL but not invalidated. Reads return
//!   the stale snapshot immediately and revalidate in the background.
//! - `Invalidated`: a confirmed write or restore superseded the snapshot.
//!   The records are kept (they back the failure path) but the next read
//!   must block on a synchronous refresh so the writer sees their own edit.
//!
//! A failed refresh never regresses the entry: whatever snapshot exists
//! keeps being served, and the failure is only surfaced when there is no
//! snapshot at all. Availability wins over freshness on the read path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use guichet_core::{Record, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

use crate::fetcher::TableFetcher;

/// A complete table snapshot, shared between concurrent readers. Snapshots
/// are replaced wholesale on refresh, never mutated in place.
pub type Snapshot = Arc<Vec<Record>>;

// ============================================================================
// STATE
// ============================================================================

/// Observable state of the cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheState {
    Empty,
    Fresh,
    Stale,
    Invalidated,
}

/// Snapshot of the entry's state for health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub state: CacheState,
    /// Record count of the current snapshot, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<usize>,
    /// Seconds since the last successful refresh. Absent while empty or
    /// invalidated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_seconds: Option<u64>,
}

struct Slot {
    records: Option<Snapshot>,
    /// `None` while empty, and forced back to `None` by [`TableCache::invalidate`].
    refreshed_at: Option<Instant>,
    /// Bumped on every successful refresh; lets callers that waited on the
    /// refresh gate detect that someone else already did the work.
    generation: u64,
}

struct Inner<F> {
    fetcher: F,
    ttl: Duration,
    slot: RwLock<Slot>,
    /// Serializes refreshes so at most one upstream fetch runs at a time.
    refresh_gate: Mutex<()>,
    /// Advisory flag for the stale path: a refresh is currently fetching.
    refreshing: AtomicBool,
}

/// Clears the advisory flag when the fetch section exits, on every path.
struct RefreshFlag<'a>(&'a AtomicBool);

impl<'a> RefreshFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for RefreshFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// ============================================================================
// CACHE
// ============================================================================

/// Single-entry read-through cache over a [`TableFetcher`].
///
/// Cloning is cheap and shares the entry; the HTTP layer keeps one clone per
/// request handler.
pub struct TableCache<F> {
    inner: Arc<Inner<F>>,
}

impl<F> Clone for TableCache<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F> TableCache<F>
where
    F: TableFetcher + 'static,
{
    /// Create an empty cache entry around `fetcher`.
    pub fn new(fetcher: F, ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                fetcher,
                ttl,
                slot: RwLock::new(Slot {
                    records: None,
                    refreshed_at: None,
                    generation: 0,
                }),
                refresh_gate: Mutex::new(()),
                refreshing: AtomicBool::new(false),
            }),
        }
    }

    /// Serve the freshest acceptable snapshot.
    ///
    /// - `force` always refreshes synchronously and surfaces the outcome.
    /// - A fresh snapshot is returned without upstream traffic.
    /// - A stale snapshot is returned immediately while a background
    ///   revalidation runs; the caller never waits on it.
    /// - With nothing acceptable to fall back on (empty, or invalidated by a
    ///   write), the read blocks on a refresh.
    pub async fn read(&self, force: bool) -> Result<Snapshot> {
        if force {
            return self.refresh().await;
        }

        let (records, refreshed_at) = {
            let slot = self.inner.slot.read().await;
            (slot.records.clone(), slot.refreshed_at)
        };

        match (records, refreshed_at) {
            (Some(snapshot), Some(at)) if at.elapsed() < self.inner.ttl => Ok(snapshot),
            (Some(snapshot), Some(_)) => {
                self.spawn_revalidation();
                Ok(snapshot)
            }
            _ => self.refresh().await,
        }
    }

    /// Refresh the snapshot from upstream, collapsing concurrent attempts.
    ///
    /// Callers that arrive while a refresh is running wait on the gate; if
    /// the winning refresh succeeded in the meantime they adopt its snapshot
    /// instead of issuing a duplicate upstream fetch.
    ///
    /// On failure the previous snapshot, however stale, is returned as a
    /// degraded success; the error only propagates when no snapshot exists.
    pub async fn refresh(&self) -> Result<Snapshot> {
        let entry_generation = self.inner.slot.read().await.generation;
        let _gate = self.inner.refresh_gate.lock().await;

        {
            let slot = self.inner.slot.read().await;
            if slot.generation != entry_generation {
                if let Some(snapshot) = &slot.records {
                    tracing::debug!("refresh collapsed into an already completed one");
                    return Ok(snapshot.clone());
                }
            }
        }

        let _flag = RefreshFlag::raise(&self.inner.refreshing);
        let started = Instant::now();

        match self.inner.fetcher.list_all().await {
            Ok(records) => {
                let snapshot: Snapshot = Arc::new(records);
                let mut slot = self.inner.slot.write().await;
                slot.records = Some(snapshot.clone());
                slot.refreshed_at = Some(Instant::now());
                slot.generation += 1;
                tracing::info!(
                    records = snapshot.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "table snapshot refreshed"
                );
                Ok(snapshot)
            }
            Err(err) => {
                let slot = self.inner.slot.read().await;
                match &slot.records {
                    Some(snapshot) => {
                        tracing::warn!(error = %err, "refresh failed, serving previous snapshot");
                        Ok(snapshot.clone())
                    }
                    None => {
                        tracing::error!(error = %err, "refresh failed with no snapshot to fall back on");
                        Err(err)
                    }
                }
            }
        }
    }

    /// Mark the snapshot as superseded after a confirmed write or restore.
    ///
    /// The records stay in place so a later failed refresh still has a
    /// fallback, but the next read is forced through a synchronous refresh.
    pub async fn invalidate(&self) {
        let mut slot = self.inner.slot.write().await;
        slot.refreshed_at = None;
        tracing::debug!("cache invalidated");
    }

    /// Current state of the entry.
    pub async fn state(&self) -> CacheState {
        let slot = self.inner.slot.read().await;
        self.classify(&slot)
    }

    /// State summary for health reporting.
    pub async fn status(&self) -> CacheStatus {
        let slot = self.inner.slot.read().await;
        CacheStatus {
            state: self.classify(&slot),
            records: slot.records.as_ref().map(|r| r.len()),
            age_seconds: slot.refreshed_at.map(|at| at.elapsed().as_secs()),
        }
    }

    fn classify(&self, slot: &Slot) -> CacheState {
        match (&slot.records, slot.refreshed_at) {
            (None, _) => CacheState::Empty,
            (Some(_), None) => CacheState::Invalidated,
            (Some(_), Some(at)) if at.elapsed() < self.inner.ttl => CacheState::Fresh,
            (Some(_), Some(_)) => CacheState::Stale,
        }
    }

    fn spawn_revalidation(&self) {
        if self.inner.refreshing.load(Ordering::Acquire) {
            return;
        }
        let cache = self.clone();
        tokio::spawn(async move {
            if let Err(err) = cache.refresh().await {
                tracing::warn!(error = %err, "background revalidation failed");
            }
        });
    }
}
