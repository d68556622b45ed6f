//! Per-thread slot tables.
//!
//! Every render thread that looks up an effect in a
//! [`SessionCache`](crate::SessionCache) gets exactly one [`ThreadSlots`]
//! table in that cache, keyed by its [`ThreadId`]. The cache's
//! [`SlotDirectory`] holds the only strong reference to each table, so
//! tables and their frame states are dropped together with the cache.
//!
//! Each thread also keeps a weak handle to its own tables in a
//! thread-local list keyed by [`CacheInstanceId`]. Lookups go through
//! that list and only fall back to the directory (and its lock) the
//! first time a thread meets a cache.

use std::any::Any;
use std::cell::RefCell;
use std::sync::{Arc, Weak};
use std::thread::ThreadId;

use indexmap::IndexMap;
use parking_lot::Mutex;
use plume_core::{CacheInstanceId, EffectId, Particle, ThreadSlotId};
use smallvec::SmallVec;

use crate::state::FrameState;

/// One render thread's frame states within one cache, keyed by effect.
pub(crate) struct ThreadSlots<P> {
    pub(crate) slot: ThreadSlotId,
    pub(crate) owner: ThreadId,
    pub(crate) states: IndexMap<EffectId, FrameState<P>>,
}

/// Shared handle to a slot table. Only its owning thread ever locks it
/// while the cache is alive, so the lock is never contended.
pub(crate) type SlotTable<P> = Arc<Mutex<ThreadSlots<P>>>;

// Compile-time assertion: a slot table can live inside a shared cache.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<SlotTable<i32>>();
};

impl<P> ThreadSlots<P> {
    pub(crate) fn new(slot: ThreadSlotId, owner: ThreadId) -> Self {
        Self {
            slot,
            owner,
            states: IndexMap::new(),
        }
    }
}

impl<P: Particle> ThreadSlots<P> {
    pub(crate) fn clear_all(&mut self) {
        for state in self.states.values_mut() {
            state.clear();
        }
    }
}

impl<P> Drop for ThreadSlots<P> {
    fn drop(&mut self) {
        tracing::trace!(
            thread = self.slot.0,
            owner = ?self.owner,
            states = self.states.len(),
            "thread slots released"
        );
    }
}

/// Thread identity to slot table, owned by one cache.
pub(crate) struct SlotDirectory<P> {
    tables: IndexMap<ThreadId, SlotTable<P>>,
    next_slot: u64,
}

impl<P> SlotDirectory<P> {
    pub(crate) fn new() -> Self {
        Self {
            tables: IndexMap::new(),
            next_slot: 0,
        }
    }

    /// The table of `owner`, creating it on first use. The flag is `true`
    /// if the table was created by this call.
    pub(crate) fn get_or_insert(&mut self, owner: ThreadId) -> (SlotTable<P>, bool) {
        if let Some(table) = self.tables.get(&owner) {
            return (Arc::clone(table), false);
        }
        let slot = ThreadSlotId(self.next_slot);
        self.next_slot += 1;
        let table = Arc::new(Mutex::new(ThreadSlots::new(slot, owner)));
        self.tables.insert(owner, Arc::clone(&table));
        (table, true)
    }

    pub(crate) fn get(&self, owner: ThreadId) -> Option<SlotTable<P>> {
        self.tables.get(&owner).cloned()
    }

    pub(crate) fn remove(&mut self, owner: ThreadId) -> Option<SlotTable<P>> {
        self.tables.shift_remove(&owner)
    }

    pub(crate) fn len(&self) -> usize {
        self.tables.len()
    }

    pub(crate) fn clear(&mut self) {
        self.tables.clear();
    }
}

type ErasedTable = Weak<dyn Any + Send + Sync>;

thread_local! {
    /// Weak handles to this thread's slot tables, one per cache it has
    /// looked up an effect in.
    static LOCAL_TABLES: RefCell<SmallVec<[(CacheInstanceId, ErasedTable); 4]>> =
        RefCell::new(SmallVec::new());
}

/// This thread's table in cache `cache`, if it was remembered and the
/// cache still owns it.
pub(crate) fn cached_table<P: Particle>(cache: CacheInstanceId) -> Option<SlotTable<P>> {
    LOCAL_TABLES
        .try_with(|tables| {
            let tables = tables.borrow();
            let erased = tables
                .iter()
                .find(|(id, _)| *id == cache)
                .and_then(|(_, weak)| weak.upgrade());
            erased.and_then(|table| table.downcast::<Mutex<ThreadSlots<P>>>().ok())
        })
        .ok()
        .flatten()
}

/// Remember `table` as this thread's table in cache `cache`, pruning
/// handles to tables whose cache is gone.
pub(crate) fn remember_table<P: Particle>(cache: CacheInstanceId, table: &SlotTable<P>) {
    let erased: Arc<dyn Any + Send + Sync> = table.clone();
    let weak = Arc::downgrade(&erased);
    // During thread teardown the list may already be gone; lookups then
    // fall back to the directory.
    let _ = LOCAL_TABLES.try_with(|tables| {
        let mut tables = tables.borrow_mut();
        tables.retain(|(id, known)| *id != cache && known.strong_count() > 0);
        tables.push((cache, weak));
    });
}

/// Drop this thread's handle for cache `cache`.
pub(crate) fn forget_table(cache: CacheInstanceId) {
    let _ = LOCAL_TABLES.try_with(|tables| {
        tables.borrow_mut().retain(|(id, _)| *id != cache);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::EffectRecord;
    use std::thread;

    fn insert_state(slots: &mut ThreadSlots<i32>, id: u64) {
        let record = EffectRecord::new(EffectId(id)).into_shared();
        slots
            .states
            .insert(EffectId(id), FrameState::new(record, 0, 0, 0));
    }

    // ── SlotDirectory ───────────────────────────────────────

    #[test]
    fn directory_returns_same_table_for_same_thread() {
        let mut directory = SlotDirectory::<i32>::new();
        let owner = thread::current().id();

        let (first, created) = directory.get_or_insert(owner);
        assert!(created);
        let (second, created) = directory.get_or_insert(owner);
        assert!(!created);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(directory.len(), 1);
        assert_eq!(first.lock().owner, owner);
    }

    #[test]
    fn directory_assigns_sequential_slots() {
        let mut directory = SlotDirectory::<i32>::new();
        let here = thread::current().id();
        let there = thread::spawn(|| thread::current().id()).join().unwrap();

        let (a, _) = directory.get_or_insert(here);
        let (b, _) = directory.get_or_insert(there);
        assert_eq!(a.lock().slot, ThreadSlotId(0));
        assert_eq!(b.lock().slot, ThreadSlotId(1));
    }

    #[test]
    fn slots_not_reused_after_remove() {
        let mut directory = SlotDirectory::<i32>::new();
        let owner = thread::current().id();
        directory.get_or_insert(owner);
        assert!(directory.remove(owner).is_some());
        assert!(directory.get(owner).is_none());

        let (table, created) = directory.get_or_insert(owner);
        assert!(created);
        assert_eq!(table.lock().slot, ThreadSlotId(1));
    }

    #[test]
    fn slot_ids_continue_past_u32_range() {
        let mut directory = SlotDirectory::<i32>::new();
        directory.next_slot = u64::from(u32::MAX);
        let here = thread::current().id();
        let there = thread::spawn(|| thread::current().id()).join().unwrap();

        let (a, _) = directory.get_or_insert(here);
        let (b, _) = directory.get_or_insert(there);
        assert_eq!(a.lock().slot, ThreadSlotId(u64::from(u32::MAX)));
        assert_eq!(b.lock().slot, ThreadSlotId(u64::from(u32::MAX) + 1));
        assert_ne!(b.lock().slot, ThreadSlotId(0));
    }

    #[test]
    fn clearing_directory_releases_records() {
        let mut directory = SlotDirectory::<i32>::new();
        let (table, _) = directory.get_or_insert(thread::current().id());
        insert_state(&mut table.lock(), 1);
        let weak = Arc::downgrade(table.lock().states[0].effect());
        drop(table);

        assert!(weak.upgrade().is_some());
        directory.clear();
        assert!(weak.upgrade().is_none());
    }

    // ── ThreadSlots ─────────────────────────────────────────

    #[test]
    fn clear_all_resets_every_state() {
        let mut slots = ThreadSlots::new(ThreadSlotId(0), thread::current().id());
        insert_state(&mut slots, 1);
        insert_state(&mut slots, 2);
        for state in slots.states.values_mut() {
            state.frame = 4;
            state.particles.push(3);
        }
        slots.clear_all();
        for state in slots.states.values() {
            assert!(!state.has_computed_frame());
            assert!(state.particles.is_empty());
        }
    }

    // ── Thread-local handles ────────────────────────────────

    #[test]
    fn remembered_table_is_found_again() {
        let cache = CacheInstanceId::next();
        let mut directory = SlotDirectory::<i32>::new();
        let (table, _) = directory.get_or_insert(thread::current().id());

        assert!(cached_table::<i32>(cache).is_none());
        remember_table(cache, &table);
        let found = cached_table::<i32>(cache).unwrap();
        assert!(Arc::ptr_eq(&found, &table));

        forget_table(cache);
        assert!(cached_table::<i32>(cache).is_none());
    }

    #[test]
    fn handle_does_not_keep_table_alive() {
        let cache = CacheInstanceId::next();
        let mut directory = SlotDirectory::<i32>::new();
        let (table, _) = directory.get_or_insert(thread::current().id());
        remember_table(cache, &table);
        drop(table);

        directory.clear();
        assert!(cached_table::<i32>(cache).is_none());
    }

    #[test]
    fn handles_are_per_thread() {
        let cache = CacheInstanceId::next();
        let mut directory = SlotDirectory::<i32>::new();
        let (table, _) = directory.get_or_insert(thread::current().id());
        remember_table(cache, &table);

        let seen_elsewhere = thread::spawn(move || cached_table::<i32>(cache).is_some())
            .join()
            .unwrap();
        assert!(!seen_elsewhere);
        forget_table(cache);
    }
}
