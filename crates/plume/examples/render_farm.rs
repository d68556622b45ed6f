//! Several render threads sharing one cache across two sessions.
//!
//! Each thread renders an interleaved slice of the frame range for a
//! handful of effects. Every effect state advances incrementally from
//! the last frame that thread rendered, so a thread never resimulates
//! frames it has already stepped through.
//!
//! Run with `cargo run --example render_farm -p plume`.

use std::thread;

use plume::prelude::*;

/// Minimal particle: an age in frames, with the trail growing with age.
#[derive(Clone, Copy, Debug)]
struct Spark {
    age: i32,
}

impl Particle for Spark {
    fn trail(&self) -> i32 {
        self.age.min(4)
    }
}

const LIFETIME: i32 = 12;
const THREADS: i32 = 4;
const FRAMES: i32 = 48;

/// Advance `state` to `target`, returning how many frames were simulated.
fn render(state: &mut FrameState<Spark>, target: i32) -> i32 {
    if !state.calculated || state.frame > target {
        state.clear();
        state.frame = 0;
        state.calculated = true;
    }
    let steps = target - state.frame;
    for _ in 0..steps {
        for p in &mut state.particles {
            p.age += 1;
        }
        state.particles.retain(|p| p.age < LIFETIME);
        state.particles.push(Spark { age: 0 });
        state.total_particles += 1;
        state.frame += 1;
    }
    state.recompute_max_trail();
    steps
}

fn main() -> Result<(), SessionError> {
    let registry: SessionRegistry<Spark> = SessionRegistry::new(CacheConfig {
        invalidation: InvalidationPolicy::ClearOnSessionStart,
        ..CacheConfig::default()
    })?;
    let render_id = RenderId(1);
    let cache = registry.instance(render_id)?;
    let effects = [EffectId(100), EffectId(200), EffectId(300)];

    for session in 0..2 {
        registry.on_session_start(render_id, SessionStatus(session))?;

        let simulated: i32 = thread::scope(|scope| {
            let handles: Vec<_> = (0..THREADS)
                .map(|t| {
                    let cache = &cache;
                    scope.spawn(move || {
                        let mut steps = 0;
                        for frame in (t..FRAMES).step_by(THREADS as usize) {
                            for &effect in &effects {
                                steps += render(&mut cache.lookup(effect), frame);
                            }
                        }
                        steps
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("render thread panicked"))
                .sum()
        });

        let metrics = cache.metrics();
        println!(
            "session {session}: {simulated} frames simulated, {} lookups, {} states created, \
             {} live records, {} live threads",
            metrics.lookups, metrics.states_created, metrics.live_records, metrics.live_threads
        );
    }

    registry.end_session(render_id);
    Ok(())
}
