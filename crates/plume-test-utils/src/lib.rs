//! Test utilities for Plume development.
//!
//! Provides a [`TrailParticle`] fixture, a small deterministic
//! [`ToySimulator`] standing in for a real particle algorithm, and
//! [`run_render_threads`] / [`run_job_pool`] for driving a cache from
//! several render threads at once.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod simulator;
pub mod threads;

pub use simulator::{AdvanceReport, ToySimulator, TrailParticle};
pub use threads::{run_job_pool, run_render_threads, JobOutcome, ThreadOutcome};
