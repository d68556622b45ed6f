//! Strongly-typed identifiers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one particle-effect instance.
///
/// Supplied by the compositing layer. Unique per effect instance within a
/// render session and never reused while the effect is alive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectId(pub u64);

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EffectId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Identifies one render thread's slot table within a single cache.
///
/// Assigned sequentially by the cache the first time a thread looks up
/// an effect in it. Only meaningful together with the owning cache's
/// [`CacheInstanceId`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThreadSlotId(pub u64);

impl fmt::Display for ThreadSlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ThreadSlotId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Render status reported when a render session starts.
///
/// Opaque to the cache: it is recorded for diagnostics and compared only
/// for equality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionStatus(pub i32);

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for SessionStatus {
    fn from(v: i32) -> Self {
        Self(v)
    }
}

/// Routing key for a render session.
///
/// Used by the session registry to hand out one cache per render; the
/// cache itself never sees it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderId(pub u64);

impl fmt::Display for RenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RenderId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Counter for unique [`CacheInstanceId`] allocation.
static CACHE_INSTANCE_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique per-instance identifier for a session cache.
///
/// Allocated from a monotonic atomic counter via [`CacheInstanceId::next`].
/// Render threads remember their slot table per cache under this id, so
/// a cache from a previous session living at the same address is never
/// mistaken for the current one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheInstanceId(u64);

impl CacheInstanceId {
    /// Allocate a fresh, unique instance ID. Thread-safe.
    pub fn next() -> Self {
        Self(CACHE_INSTANCE_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for CacheInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
