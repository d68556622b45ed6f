//! A minimal incremental particle simulation driving [`FrameState`].
//!
//! Particles spawn at the origin with a random velocity, move once per
//! frame, remember up to `max_trail` past positions and die after
//! `lifetime` frames. Every random draw comes from the state's own
//! stream, so advancing incrementally from frame M to N yields exactly
//! the particles a from-scratch run to N would.

use plume_cache::FrameState;
use plume_core::Particle;
use rand_chacha::rand_core::RngCore;
use rand_chacha::ChaCha8Rng;
use smallvec::SmallVec;

/// Particle with a bounded position history.
#[derive(Clone, Debug, PartialEq)]
pub struct TrailParticle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub age: u32,
    pub history: SmallVec<[(f32, f32); 8]>,
}

impl Particle for TrailParticle {
    fn trail(&self) -> i32 {
        self.history.len() as i32
    }
}

/// What one [`ToySimulator::advance`] call had to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdvanceReport {
    /// Frames simulated by this call.
    pub steps: u32,
    /// Whether the state was reset and simulated from the start frame.
    pub restarted: bool,
}

/// Reference simulation algorithm used by tests and benchmarks.
#[derive(Clone, Debug)]
pub struct ToySimulator {
    pub start_frame: i32,
    pub spawn_per_frame: usize,
    pub lifetime: u32,
    pub max_trail: usize,
}

impl Default for ToySimulator {
    fn default() -> Self {
        Self {
            start_frame: 0,
            spawn_per_frame: 2,
            lifetime: 6,
            max_trail: 3,
        }
    }
}

impl ToySimulator {
    /// Bring `state` to `target`, reusing its last frame when it lies
    /// at or before `target`.
    ///
    /// A state that is uncomputed, partially computed, or ahead of the
    /// target is cleared and simulated from `start_frame`.
    pub fn advance(&self, state: &mut FrameState<TrailParticle>, target: i32) -> AdvanceReport {
        let resumable = state.has_computed_frame() && state.calculated && state.frame <= target;
        let (first, restarted) = if resumable {
            match state.frame.checked_add(1) {
                Some(next) => (next.max(self.start_frame), false),
                // Already at the last representable frame.
                None => return AdvanceReport { steps: 0, restarted: false },
            }
        } else {
            state.clear();
            (self.start_frame, true)
        };

        let mut steps = 0;
        for frame in first..=target {
            self.step(state, frame);
            steps += 1;
        }
        if !state.has_computed_frame() {
            // Target precedes the effect's start: an empty, computed frame.
            state.frame = target;
            state.calculated = true;
        }
        AdvanceReport { steps, restarted }
    }

    fn step(&self, state: &mut FrameState<TrailParticle>, frame: i32) {
        state.calculated = false;

        let max_trail = self.max_trail;
        for p in &mut state.particles {
            p.history.insert(0, (p.x, p.y));
            p.history.truncate(max_trail);
            p.x += p.vx;
            p.y += p.vy;
            p.age += 1;
        }
        let lifetime = self.lifetime;
        state.particles.retain(|p| p.age < lifetime);

        for _ in 0..self.spawn_per_frame {
            let vx = unit(&mut state.random) * 2.0 - 1.0;
            let vy = unit(&mut state.random);
            state.particles.push(TrailParticle {
                x: 0.0,
                y: 0.0,
                vx,
                vy,
                age: 0,
                history: SmallVec::new(),
            });
        }
        state.total_particles += self.spawn_per_frame as u64;

        state.frame = frame;
        state.recompute_max_trail();
        state.calculated = true;
    }
}

/// Uniform sample in `[0, 1)` with 24 bits of precision.
fn unit(rng: &mut ChaCha8Rng) -> f32 {
    (rng.next_u32() >> 8) as f32 / (1u32 << 24) as f32
}
