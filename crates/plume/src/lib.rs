//! Plume: per-thread incremental particle state caching for frame renderers.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Plume sub-crates. For most users, adding `plume` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use plume::prelude::*;
//!
//! // One cache per render, shared by all of its render threads.
//! let cache: SessionCache<i32> = SessionCache::new(CacheConfig::default()).unwrap();
//! cache.on_session_start(SessionStatus(0));
//!
//! // First lookup on this thread creates a fresh, uncomputed state.
//! let mut state = cache.lookup(EffectId(7));
//! assert!(!state.has_computed_frame());
//! assert_eq!(state.max_trail, -1);
//!
//! // The simulation writes its progress back into the state...
//! state.particles.extend([3, 1, 4]);
//! state.frame = 10;
//! state.calculated = true;
//! assert_eq!(state.recompute_max_trail(), 4);
//! drop(state);
//!
//! // ...and any later job on this thread finds it again.
//! assert_eq!(cache.lookup(EffectId(7)).frame, 10);
//!
//! // The cache and the bound state each hold the effect's record.
//! assert_eq!(cache.ref_count(EffectId(7)), Some(2));
//! let record = cache.record(EffectId(7)).unwrap();
//! drop(cache);
//! assert_eq!(std::sync::Arc::strong_count(&record), 1);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `plume-core` | IDs, the `Particle` trait, frame sentinel, config errors |
//! | [`cache`] | `plume-cache` | Session cache, frame guards, frame states |
//! | [`session`] | `plume-session` | Per-render cache registry |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core identifiers and traits (`plume-core`).
///
/// Contains [`types::EffectId`], [`types::ThreadSlotId`],
/// [`types::SessionStatus`], the [`types::Particle`] trait and the
/// [`types::UNCOMPUTED_FRAME`] sentinel.
pub use plume_core as types;

/// The per-thread, per-effect cache (`plume-cache`).
///
/// [`cache::SessionCache`] owns the shared effect records and every
/// thread's [`cache::FrameState`]s, handed out through
/// [`cache::FrameGuard`].
pub use plume_cache as cache;

/// Per-render cache routing (`plume-session`).
///
/// [`session::SessionRegistry`] creates one cache per render on demand
/// and forwards session-start notifications to it.
pub use plume_session as session;

/// Common imports for typical Plume usage.
///
/// ```rust
/// use plume::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use plume_core::{ConfigError, EffectId, Particle, RenderId, SessionStatus, ThreadSlotId};

    // Cache
    pub use plume_cache::{
        CacheConfig, CacheMetrics, FrameGuard, FrameState, InvalidationPolicy, SessionCache,
    };

    // Sessions
    pub use plume_session::{SessionError, SessionRegistry};
}
