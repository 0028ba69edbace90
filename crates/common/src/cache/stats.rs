//! Store statistics
//!
//! Counters are kept with relaxed atomics; snapshots are approximate under
//! concurrency, which is fine for health reporting.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Snapshot of store activity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Live entries at snapshot time (may include not-yet-purged expired ones)
    pub size: usize,

    /// Reads that found a live value
    pub hits: u64,

    /// Reads that found nothing or an expired value
    pub misses: u64,

    /// Successful writes
    pub writes: u64,

    /// Entries dropped because their TTL elapsed
    pub expirations: u64,

    /// Successful atomic take operations
    pub takes: u64,
}

impl StoreStats {
    /// Calculate hit rate (hits / total reads)
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Thread-safe counters shared by clones of a store.
#[derive(Debug, Clone, Default)]
pub(crate) struct MetricsCollector {
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
    writes: Arc<AtomicU64>,
    expirations: Arc<AtomicU64>,
    takes: Arc<AtomicU64>,
}

impl MetricsCollector {
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_expiration(&self) {
        self.expirations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_take(&self) {
        self.takes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, size: usize) -> StoreStats {
        StoreStats {
            size,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            takes: self.takes.load(Ordering::Relaxed),
        }
    }
}
