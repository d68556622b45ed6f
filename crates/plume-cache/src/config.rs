//! Cache configuration and validation.

use plume_core::ConfigError;

/// What a cache does with frame states left over from an earlier session.
///
/// A state that was last looked up before the most recent
/// [`on_session_start`](crate::SessionCache::on_session_start) may hold
/// particles from an unrelated render. Whether continuing from them is
/// correct depends on the simulation algorithm, so the choice is
/// configurable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InvalidationPolicy {
    /// Never clear automatically. The algorithm calls
    /// [`FrameState::clear`](crate::FrameState::clear) itself when it
    /// detects a discontinuity.
    #[default]
    Manual,
    /// Clear a state on its first lookup after a session start.
    ClearOnSessionStart,
}

/// Configuration for a [`SessionCache`](crate::SessionCache).
///
/// Validated at construction; immutable afterwards.
#[derive(Clone, Debug)]
pub struct CacheConfig {
    /// Seed for the fresh random stream of every frame state, and the
    /// stream a state returns to on `clear()`. Default: 0.
    pub rng_seed: u64,
    /// Particles reserved up front in each new frame state. Default: 0.
    pub particle_capacity: usize,
    /// Effect count the shared map is pre-sized for. Default: 16.
    pub expected_effects: usize,
    /// Handling of states carried over from an earlier session.
    /// Default: [`InvalidationPolicy::Manual`].
    pub invalidation: InvalidationPolicy,
}

impl CacheConfig {
    /// Upper bound on [`particle_capacity`](Self::particle_capacity).
    pub const MAX_PARTICLE_CAPACITY: usize = 1 << 24;

    /// Upper bound on [`expected_effects`](Self::expected_effects).
    pub const MAX_EXPECTED_EFFECTS: usize = 1 << 20;

    /// Default pre-sizing of the effect map.
    pub const DEFAULT_EXPECTED_EFFECTS: usize = 16;

    /// Check the configuration's bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_capacity > Self::MAX_PARTICLE_CAPACITY {
            return Err(ConfigError::ParticleCapacityTooLarge {
                requested: self.particle_capacity,
                max: Self::MAX_PARTICLE_CAPACITY,
            });
        }
        if self.expected_effects > Self::MAX_EXPECTED_EFFECTS {
            return Err(ConfigError::ExpectedEffectsTooLarge {
                requested: self.expected_effects,
                max: Self::MAX_EXPECTED_EFFECTS,
            });
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            rng_seed: 0,
            particle_capacity: 0,
            expected_effects: Self::DEFAULT_EXPECTED_EFFECTS,
            invalidation: InvalidationPolicy::Manual,
        }
    }
}
