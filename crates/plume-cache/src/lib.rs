//! Per-thread, per-effect cache of incremental particle simulation state.
//!
//! Each render thread keeps the last frame it simulated for every
//! particle effect it touched, so advancing to the next requested frame
//! is an incremental update instead of a full resimulation from the
//! effect's first frame.
//!
//! # Architecture
//!
//! ```text
//! SessionCache (one per render session, shared via Arc)
//! ├── Mutex<IndexMap<EffectId, Arc<EffectRecord>>>     shared, brief locks
//! └── Mutex<SlotDirectory>                             locked on a thread's first lookup
//!     └── ThreadId ──► ThreadSlots (one per render thread)
//!         └── IndexMap<EffectId, FrameState>           reached only by its thread
//!             └── FrameState ──holds──► Arc<EffectRecord>
//! ```
//!
//! # Thread identity
//!
//! [`SessionCache::lookup`] resolves the calling thread itself. The first
//! lookup from a thread registers a slot table for it under its
//! [`ThreadId`](std::thread::ThreadId); the thread then keeps a weak
//! handle to that table in thread-local storage, so later lookups reach
//! it without touching any shared lock. A render framework that hands
//! frame jobs to pool threads therefore gets, on every job, the state the
//! same pool thread left behind.
//!
//! # Record lifetime
//!
//! The cache's map entry and every bound frame state each hold one
//! strong reference on the effect's [`EffectRecord`]. The cache owns all
//! slot tables, so dropping it drops every frame state and then its own
//! record references; a frame state can never outlive the record it
//! points back to.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod config;
pub mod guard;
pub mod metrics;
pub mod record;
mod slots;
pub mod state;

// Public re-exports for the primary API surface.
pub use cache::SessionCache;
pub use config::{CacheConfig, InvalidationPolicy};
pub use metrics::CacheMetrics;
pub use guard::FrameGuard;
pub use record::{EffectRecord, SharedEffectRecord};
pub use state::FrameState;
