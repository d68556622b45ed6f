//! Shared per-effect record.
//!
//! [`EffectRecord`] carries no simulation data. It anchors the identity
//! and lifetime of one effect across every thread that renders it, and
//! is shared through `Arc`: one strong reference for the owning cache's
//! map entry plus one per bound [`FrameState`](crate::FrameState).

use std::sync::Arc;

use plume_core::EffectId;

/// Identity record for one particle effect, shared across render threads.
#[derive(Debug, PartialEq, Eq)]
pub struct EffectRecord {
    id: EffectId,
}

/// Shared handle to an [`EffectRecord`].
///
/// Cloning acquires a reference and dropping releases it; the record is
/// freed when the count reaches zero.
pub type SharedEffectRecord = Arc<EffectRecord>;

// Compile-time assertion: EffectRecord must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<EffectRecord>();
};

impl EffectRecord {
    pub(crate) fn new(id: EffectId) -> Self {
        Self { id }
    }

    /// The effect this record stands for.
    pub fn id(&self) -> EffectId {
        self.id
    }

    pub(crate) fn into_shared(self) -> SharedEffectRecord {
        Arc::new(self)
    }
}

impl Drop for EffectRecord {
    fn drop(&mut self) {
        tracing::trace!(effect = self.id.0, "effect record released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_preserved() {
        let record = EffectRecord::new(EffectId(11));
        assert_eq!(record.id(), EffectId(11));
    }

    #[test]
    fn freed_when_last_reference_drops() {
        let shared = EffectRecord::new(EffectId(1)).into_shared();
        let second = Arc::clone(&shared);
        let weak = Arc::downgrade(&shared);
        assert_eq!(Arc::strong_count(&shared), 2);

        drop(shared);
        assert!(weak.upgrade().is_some());

        drop(second);
        assert!(weak.upgrade().is_none());
    }
}
