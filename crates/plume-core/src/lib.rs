//! Core types and traits for the Plume particle frame cache.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the identifiers shared across the workspace (effects, thread slots,
//! render sessions), the [`Particle`] seam through which the cache sees
//! simulation data, the frame-number sentinel, and configuration errors.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod frame;
pub mod id;
pub mod particle;

pub use error::ConfigError;
pub use frame::{is_computed_frame, UNCOMPUTED_FRAME};
pub use id::{CacheInstanceId, EffectId, RenderId, SessionStatus, ThreadSlotId};
pub use particle::Particle;
