//! Render-session routing for Plume caches.
//!
//! The cache itself knows nothing about which render a thread belongs
//! to. [`SessionRegistry`] is the adapter a render framework uses to get
//! "the" cache for a given [`RenderId`](plume_core::RenderId): created on
//! first request, notified when the render's session starts, and
//! dropped when the render ends and the last thread lets go of it.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod registry;

pub use error::SessionError;
pub use registry::SessionRegistry;
