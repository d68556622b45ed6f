//! Cache counters for diagnostics.
//!
//! [`CacheMetrics`] is a plain snapshot returned by
//! [`SessionCache::metrics`](crate::SessionCache::metrics). The live
//! counters are relaxed atomics: they are only ever read as statistics,
//! never used to order other memory operations.

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of a session cache's counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheMetrics {
    /// Total `lookup()` calls.
    pub lookups: u64,
    /// Lookups that found the calling thread's state already in place.
    pub slot_hits: u64,
    /// Effect records created.
    pub records_created: u64,
    /// Frame states created.
    pub states_created: u64,
    /// Session starts reported to the cache.
    pub session_starts: u64,
    /// Frame states cleared by [`InvalidationPolicy::ClearOnSessionStart`](crate::InvalidationPolicy::ClearOnSessionStart).
    pub session_clears: u64,
    /// Effect records currently held by the cache's map.
    pub live_records: u64,
    /// Threads currently holding a slot table in the cache.
    pub live_threads: u64,
}

impl CacheMetrics {
    /// Lookups that had to create a frame state.
    pub fn slot_misses(&self) -> u64 {
        self.lookups.saturating_sub(self.slot_hits)
    }
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub(crate) lookups: AtomicU64,
    pub(crate) slot_hits: AtomicU64,
    pub(crate) records_created: AtomicU64,
    pub(crate) states_created: AtomicU64,
    pub(crate) session_starts: AtomicU64,
    pub(crate) session_clears: AtomicU64,
}

impl Counters {
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, live_records: usize, live_threads: usize) -> CacheMetrics {
        CacheMetrics {
            lookups: self.lookups.load(Ordering::Relaxed),
            slot_hits: self.slot_hits.load(Ordering::Relaxed),
            records_created: self.records_created.load(Ordering::Relaxed),
            states_created: self.states_created.load(Ordering::Relaxed),
            session_starts: self.session_starts.load(Ordering::Relaxed),
            session_clears: self.session_clears.load(Ordering::Relaxed),
            live_records: live_records as u64,
            live_threads: live_threads as u64,
        }
    }
}
