//! Mutable handle to the calling thread's frame state.

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

use parking_lot::lock_api::ArcMutexGuard;
use parking_lot::RawMutex;
use plume_core::ThreadSlotId;

use crate::cache::SessionCache;
use crate::slots::ThreadSlots;
use crate::state::FrameState;

/// Exclusive access to one thread's [`FrameState`] for one effect.
///
/// Returned by [`SessionCache::lookup`]. Dereferences to the state. While
/// a handle is alive the calling thread's whole slot table is borrowed,
/// so a thread holds at most one handle per cache at a time; drop it
/// before looking up the next effect. The handle borrows the cache and
/// cannot outlive it.
pub struct FrameGuard<'c, P> {
    slots: ArcMutexGuard<RawMutex, ThreadSlots<P>>,
    index: usize,
    _cache: PhantomData<&'c SessionCache<P>>,
}

impl<'c, P> FrameGuard<'c, P> {
    pub(crate) fn new(slots: ArcMutexGuard<RawMutex, ThreadSlots<P>>, index: usize) -> Self {
        Self {
            slots,
            index,
            _cache: PhantomData,
        }
    }

    /// Slot id of the thread this state belongs to.
    pub fn thread_id(&self) -> ThreadSlotId {
        self.slots.slot
    }
}

impl<P> Deref for FrameGuard<'_, P> {
    type Target = FrameState<P>;

    fn deref(&self) -> &FrameState<P> {
        &self.slots.states[self.index]
    }
}

impl<P> DerefMut for FrameGuard<'_, P> {
    fn deref_mut(&mut self) -> &mut FrameState<P> {
        &mut self.slots.states[self.index]
    }
}

impl<P> fmt::Debug for FrameGuard<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameGuard")
            .field("thread", &self.slots.slot)
            .field("state", &**self)
            .finish()
    }
}
