//! Benchmark profiles for the Plume particle frame cache.
//!
//! - [`reference_cache`]: cache configured like a typical shot render
//! - [`reference_simulator`]: smoke-like effect, 8 spawns per frame
//! - [`warm_effects`]: give the calling thread `effects` computed states

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use plume_cache::{CacheConfig, SessionCache};
use plume_core::EffectId;
use plume_test_utils::{ToySimulator, TrailParticle};

/// Cache sized for 64 effects with 256 particles reserved per state.
pub fn reference_cache(seed: u64) -> SessionCache<TrailParticle> {
    SessionCache::new(CacheConfig {
        rng_seed: seed,
        particle_capacity: 256,
        expected_effects: 64,
        ..CacheConfig::default()
    })
    .expect("reference config is valid")
}

/// Simulator with 8 spawns per frame, 30-frame lifetime and 8-deep trails.
pub fn reference_simulator() -> ToySimulator {
    ToySimulator {
        start_frame: 0,
        spawn_per_frame: 8,
        lifetime: 30,
        max_trail: 8,
    }
}

/// Simulate `effects` effects to `frame` on the calling thread.
pub fn warm_effects(cache: &SessionCache<TrailParticle>, effects: u64, frame: i32) {
    let sim = reference_simulator();
    for id in 0..effects {
        sim.advance(&mut cache.lookup(EffectId(id)), frame);
    }
}
