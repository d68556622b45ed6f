//! Session-scoped owner of effect records, per-thread slot tables and
//! the lookup entry point.
//!
//! [`SessionCache`] owns the `EffectId -> EffectRecord` map shared by all
//! render threads of one session, and one slot table per render thread,
//! keyed by the thread's identity. Whatever pool thread a render job
//! lands on, its lookups reach that thread's own frame states.
//!
//! # Locking
//!
//! The record map sits behind a single `Mutex` that is held only for the
//! get-or-insert of a record. The slot directory (thread identity to
//! table) is locked only the first time a thread meets the cache; after
//! that the thread finds its table through a thread-local handle. Each
//! table carries its own lock, which only its owning thread takes, so it
//! is never contended.
//!
//! # Teardown
//!
//! Dropping the cache drops every slot table, and with them every frame
//! state, then releases the cache's own reference on every record.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use indexmap::map::Entry;
use indexmap::IndexMap;
use parking_lot::lock_api::ArcMutexGuard;
use parking_lot::{Mutex, RawMutex};
use plume_core::{CacheInstanceId, ConfigError, EffectId, Particle, SessionStatus};

use crate::config::{CacheConfig, InvalidationPolicy};
use crate::guard::FrameGuard;
use crate::metrics::{CacheMetrics, Counters};
use crate::record::{EffectRecord, SharedEffectRecord};
use crate::slots::{self, SlotDirectory, SlotTable, ThreadSlots};
use crate::state::FrameState;

/// Per-session cache of incremental particle state.
///
/// Shared across render threads (typically through `Arc`). Any thread
/// calls [`lookup`](Self::lookup) for every effect frame it renders and
/// gets back its own state for that effect, created on first use.
pub struct SessionCache<P> {
    id: CacheInstanceId,
    config: CacheConfig,
    records: Mutex<IndexMap<EffectId, SharedEffectRecord>>,
    threads: Mutex<SlotDirectory<P>>,
    status: Mutex<Option<SessionStatus>>,
    session_epoch: AtomicU64,
    counters: Counters,
}

// Compile-time assertion: SessionCache must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<SessionCache<i32>>();
};

impl<P: Particle> SessionCache<P> {
    /// Create an empty cache after validating `config`.
    pub fn new(config: CacheConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let id = CacheInstanceId::next();
        tracing::debug!(
            cache = %id,
            invalidation = ?config.invalidation,
            "session cache created"
        );
        Ok(Self {
            id,
            records: Mutex::new(IndexMap::with_capacity(config.expected_effects)),
            config,
            threads: Mutex::new(SlotDirectory::new()),
            status: Mutex::new(None),
            session_epoch: AtomicU64::new(0),
            counters: Counters::default(),
        })
    }

    /// Return the calling thread's state for `effect`, creating the
    /// effect record, the thread's slot table and the state on first use.
    ///
    /// Repeated lookups of the same effect from the same thread return
    /// the same state, holding whatever the simulation algorithm last
    /// wrote to it. Other threads get their own state for the effect.
    /// Under [`InvalidationPolicy::ClearOnSessionStart`] a state last seen
    /// before the latest session start is cleared first.
    ///
    /// # Panics
    ///
    /// Panics if the calling thread still holds a [`FrameGuard`] from
    /// this cache.
    pub fn lookup(&self, effect: EffectId) -> FrameGuard<'_, P> {
        Counters::bump(&self.counters.lookups);
        let epoch = self.session_epoch.load(Ordering::Acquire);
        let mut slots = self.borrow_slots(self.local_table());
        let thread = slots.slot;

        let index = match slots.states.get_index_of(&effect) {
            Some(index) => {
                Counters::bump(&self.counters.slot_hits);
                index
            }
            None => {
                let record = self.acquire_record(effect);
                Counters::bump(&self.counters.states_created);
                tracing::trace!(effect = effect.0, thread = thread.0, "frame state created");
                let state = FrameState::new(
                    record,
                    self.config.rng_seed,
                    self.config.particle_capacity,
                    epoch,
                );
                slots.states.insert_full(effect, state).0
            }
        };

        let state = &mut slots.states[index];
        if state.session_epoch() != epoch {
            if self.config.invalidation == InvalidationPolicy::ClearOnSessionStart {
                state.clear();
                Counters::bump(&self.counters.session_clears);
                tracing::trace!(
                    effect = effect.0,
                    thread = thread.0,
                    epoch,
                    "stale frame state cleared on new session"
                );
            }
            state.set_session_epoch(epoch);
        }
        FrameGuard::new(slots, index)
    }

    /// Clear every frame state of the calling thread.
    ///
    /// For a thread that knows all of its progress is stale, e.g. after
    /// jumping backwards in the timeline of every effect at once.
    ///
    /// # Panics
    ///
    /// Panics if the calling thread still holds a [`FrameGuard`] from
    /// this cache.
    pub fn clear_thread(&self) {
        if let Some(table) = self.existing_local_table() {
            self.borrow_slots(table).clear_all();
        }
    }

    /// Effects the calling thread holds state for, in first-lookup order.
    ///
    /// # Panics
    ///
    /// Panics if the calling thread still holds a [`FrameGuard`] from
    /// this cache.
    pub fn local_effects(&self) -> Vec<EffectId> {
        match self.existing_local_table() {
            Some(table) => self.borrow_slots(table).states.keys().copied().collect(),
            None => Vec::new(),
        }
    }

    /// Drop the calling thread's slot table and every state in it.
    ///
    /// For a worker that leaves the render pool before the session ends.
    /// A later lookup from the same thread starts from empty states.
    /// Returns `false` if the thread had no table.
    pub fn release_thread(&self) -> bool {
        slots::forget_table(self.id);
        let owner = thread::current().id();
        let removed = self.threads.lock().remove(owner);
        match removed {
            Some(table) => {
                tracing::trace!(cache = %self.id, owner = ?owner, "thread slots detached");
                drop(table);
                true
            }
            None => false,
        }
    }

    /// The calling thread's table, registering the thread on first use.
    fn local_table(&self) -> SlotTable<P> {
        if let Some(table) = slots::cached_table(self.id) {
            return table;
        }
        let owner = thread::current().id();
        let (table, created) = self.threads.lock().get_or_insert(owner);
        if created {
            tracing::trace!(
                cache = %self.id,
                thread = table.lock().slot.0,
                owner = ?owner,
                "thread slots created"
            );
        }
        slots::remember_table(self.id, &table);
        table
    }

    /// The calling thread's table, if it has one.
    fn existing_local_table(&self) -> Option<SlotTable<P>> {
        slots::cached_table(self.id).or_else(|| self.threads.lock().get(thread::current().id()))
    }

    fn borrow_slots(&self, table: SlotTable<P>) -> ArcMutexGuard<RawMutex, ThreadSlots<P>> {
        match table.try_lock_arc() {
            Some(slots) => slots,
            None => panic!(
                "frame state of this thread is already borrowed from cache {}; \
                 drop the previous FrameGuard first",
                self.id
            ),
        }
    }

    /// Get or create the record for `effect` and take a reference on it.
    fn acquire_record(&self, effect: EffectId) -> SharedEffectRecord {
        let (record, created) = {
            let mut records = self.records.lock();
            match records.entry(effect) {
                Entry::Occupied(entry) => (Arc::clone(entry.get()), false),
                Entry::Vacant(entry) => {
                    let shared = entry.insert(EffectRecord::new(effect).into_shared());
                    (Arc::clone(shared), true)
                }
            }
        };
        if created {
            Counters::bump(&self.counters.records_created);
            tracing::trace!(cache = %self.id, effect = effect.0, "effect record created");
        }
        record
    }
}

impl<P> SessionCache<P> {
    /// Record the status of the session this cache now serves.
    ///
    /// Does not touch existing frame states unless the cache was built
    /// with [`InvalidationPolicy::ClearOnSessionStart`], in which case each
    /// state is cleared lazily on its next lookup.
    pub fn on_session_start(&self, status: SessionStatus) {
        let previous = self.status.lock().replace(status);
        let epoch = self.session_epoch.fetch_add(1, Ordering::AcqRel) + 1;
        Counters::bump(&self.counters.session_starts);
        tracing::debug!(
            cache = %self.id,
            status = status.0,
            previous = ?previous.map(|s| s.0),
            epoch,
            "render session started"
        );
    }

    /// Status passed to the latest [`on_session_start`](Self::on_session_start),
    /// or `None` if no session has started yet.
    pub fn session_status(&self) -> Option<SessionStatus> {
        *self.status.lock()
    }

    /// Number of session starts seen so far.
    pub fn session_epoch(&self) -> u64 {
        self.session_epoch.load(Ordering::Acquire)
    }

    /// This cache's process-unique id.
    pub fn id(&self) -> CacheInstanceId {
        self.id
    }

    /// The configuration the cache was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Number of effects seen by any thread.
    pub fn effect_count(&self) -> usize {
        self.records.lock().len()
    }

    /// Number of threads holding a slot table in this cache.
    pub fn thread_count(&self) -> usize {
        self.threads.lock().len()
    }

    /// Whether any thread has looked up `effect`.
    pub fn contains_effect(&self, effect: EffectId) -> bool {
        self.records.lock().contains_key(&effect)
    }

    /// Effects in first-seen order.
    pub fn effect_ids(&self) -> Vec<EffectId> {
        self.records.lock().keys().copied().collect()
    }

    /// Current reference count on `effect`'s record: one for this cache
    /// plus one per live frame state bound to it.
    pub fn ref_count(&self, effect: EffectId) -> Option<usize> {
        self.records.lock().get(&effect).map(Arc::strong_count)
    }

    /// A new reference to `effect`'s record, if it exists.
    ///
    /// The returned handle counts towards [`ref_count`](Self::ref_count)
    /// until dropped.
    pub fn record(&self, effect: EffectId) -> Option<SharedEffectRecord> {
        self.records.lock().get(&effect).cloned()
    }

    /// Snapshot of the cache's counters.
    pub fn metrics(&self) -> CacheMetrics {
        self.counters.snapshot(self.effect_count(), self.thread_count())
    }
}

impl<P> Drop for SessionCache<P> {
    fn drop(&mut self) {
        let threads = self.threads.get_mut();
        let thread_count = threads.len();
        threads.clear();

        let records = self.records.get_mut();
        let still_bound = records
            .values()
            .filter(|record| Arc::strong_count(*record) > 1)
            .count();
        tracing::debug!(
            cache = %self.id,
            threads = thread_count,
            released = records.len(),
            still_bound,
            "session cache dropped"
        );
        records.clear();
    }
}
