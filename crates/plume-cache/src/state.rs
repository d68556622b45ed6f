//! Thread-confined simulation snapshot for one (effect, thread) pair.
//!
//! [`FrameState`] is what the simulation algorithm reads and mutates in
//! place between frames. The cache only creates, clears and drops it;
//! the meaning of every public field belongs to the algorithm.

use std::fmt;

use plume_core::{is_computed_frame, EffectId, Particle, UNCOMPUTED_FRAME};
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::record::SharedEffectRecord;

/// Last simulated frame of one effect, as produced by one render thread.
///
/// Holds a strong reference on its effect's record for its whole life;
/// [`clear`](Self::clear) resets the simulation fields in place and
/// leaves that reference alone.
pub struct FrameState<P> {
    /// Last frame fully computed on this thread, or [`UNCOMPUTED_FRAME`].
    pub frame: i32,
    /// Live particles in spawn order.
    pub particles: Vec<P>,
    /// Random stream owned by the simulation algorithm.
    pub random: ChaCha8Rng,
    /// Whether `particles` reflects a fully computed frame.
    pub calculated: bool,
    /// Largest particle trail as of the last
    /// [`recompute_max_trail`](Self::recompute_max_trail), `-1` for none.
    pub max_trail: i32,
    /// Running particle count maintained by the simulation algorithm.
    pub total_particles: u64,
    effect: SharedEffectRecord,
    seed: u64,
    session_epoch: u64,
}

impl<P: Particle> FrameState<P> {
    pub(crate) fn new(
        effect: SharedEffectRecord,
        seed: u64,
        particle_capacity: usize,
        session_epoch: u64,
    ) -> Self {
        Self {
            frame: UNCOMPUTED_FRAME,
            particles: Vec::with_capacity(particle_capacity),
            random: ChaCha8Rng::seed_from_u64(seed),
            calculated: false,
            max_trail: -1,
            total_particles: 0,
            effect,
            seed,
            session_epoch,
        }
    }

    /// Discard all simulation progress, returning to the freshly created
    /// state without releasing the effect record.
    ///
    /// Particle storage keeps its allocation.
    pub fn clear(&mut self) {
        self.frame = UNCOMPUTED_FRAME;
        self.particles.clear();
        self.random = ChaCha8Rng::seed_from_u64(self.seed);
        self.calculated = false;
        self.max_trail = -1;
        self.total_particles = 0;
    }

    /// Recompute [`max_trail`](Self::max_trail) from the current particles
    /// and return it. O(particle count).
    ///
    /// Advisory: the value goes stale as soon as particles change and the
    /// cache never refreshes it on its own.
    pub fn recompute_max_trail(&mut self) -> i32 {
        self.max_trail = self
            .particles
            .iter()
            .map(Particle::trail)
            .fold(-1, i32::max);
        self.max_trail
    }
}

impl<P> FrameState<P> {
    /// Whether any frame has been computed since creation or the last clear.
    pub fn has_computed_frame(&self) -> bool {
        is_computed_frame(self.frame)
    }

    /// The effect this state belongs to.
    pub fn effect_id(&self) -> EffectId {
        self.effect.id()
    }

    /// The shared record this state is bound to.
    pub fn effect(&self) -> &SharedEffectRecord {
        &self.effect
    }

    /// Seed of the fresh random stream.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub(crate) fn session_epoch(&self) -> u64 {
        self.session_epoch
    }

    pub(crate) fn set_session_epoch(&mut self, epoch: u64) {
        self.session_epoch = epoch;
    }
}

impl<P> fmt::Debug for FrameState<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameState")
            .field("effect", &self.effect.id())
            .field("frame", &self.frame)
            .field("particles", &self.particles.len())
            .field("calculated", &self.calculated)
            .field("max_trail", &self.max_trail)
            .field("total_particles", &self.total_particles)
            .finish_non_exhaustive()
    }
}
