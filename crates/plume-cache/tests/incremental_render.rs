//! End-to-end: a render thread resumes from its own last frame.

use std::thread;

use plume_cache::{CacheConfig, InvalidationPolicy, SessionCache};
use plume_core::{EffectId, SessionStatus, UNCOMPUTED_FRAME};
use plume_test_utils::{run_job_pool, run_render_threads, ToySimulator, TrailParticle};

fn cache(invalidation: InvalidationPolicy) -> SessionCache<TrailParticle> {
    SessionCache::new(CacheConfig {
        rng_seed: 7,
        particle_capacity: 32,
        invalidation,
        ..CacheConfig::default()
    })
    .expect("valid config")
}

#[test]
fn frame_eleven_resumes_from_frame_ten() {
    let cache = cache(InvalidationPolicy::Manual);
    let effect = EffectId(9);
    let sim = ToySimulator {
        spawn_per_frame: 1,
        lifetime: 5,
        ..ToySimulator::default()
    };

    // This thread computes frame 10.
    let frame_ten = {
        let mut state = cache.lookup(effect);
        sim.advance(&mut state, 10);
        assert_eq!(state.frame, 10);
        assert_eq!(state.particles.len(), 5);
        assert!(state.calculated);
        state.particles.clone()
    };

    // Another thread works on the same effect meanwhile.
    thread::scope(|scope| {
        scope.spawn(|| sim.advance(&mut cache.lookup(effect), 30));
    });

    // Back here for frame 11: exactly our own frame 10 is waiting.
    let mut state = cache.lookup(effect);
    assert_eq!(state.frame, 10);
    assert_eq!(state.particles, frame_ten);

    let report = sim.advance(&mut state, 11);
    assert!(!report.restarted);
    assert_eq!(report.steps, 1);
    assert_eq!(state.frame, 11);
}

#[test]
fn sparse_increasing_frames_stay_incremental() {
    let cache = cache(InvalidationPolicy::Manual);
    let sim = ToySimulator::default();

    let outcomes = run_render_threads(3, |index| {
        let mut restarts = 0;
        let mut steps = 0;
        for target in (index as i32..60).step_by(3) {
            let report = sim.advance(&mut cache.lookup(EffectId(1)), target);
            restarts += u32::from(report.restarted);
            steps += report.steps;
        }
        (restarts, steps, cache.lookup(EffectId(1)).frame)
    });

    for outcome in outcomes {
        let (restarts, steps, last) = outcome.value;
        assert_eq!(restarts, 1, "only the first frame resimulates");
        assert_eq!(steps as i32, last + 1, "every frame simulated exactly once");
    }
}

#[test]
fn pooled_jobs_resume_their_workers_last_frame() {
    const WORKERS: usize = 2;
    let cache = cache(InvalidationPolicy::Manual);
    let sim = ToySimulator::default();
    let effect = EffectId(3);

    // One short-lived job per frame, handed to whichever worker is free.
    let outcomes = run_job_pool(WORKERS, (0..40).collect(), |frame: i32| {
        let mut state = cache.lookup(effect);
        let before = state.frame;
        let report = sim.advance(&mut state, frame);
        (before, report)
    });

    let mut busy_workers = 0;
    for worker in 0..WORKERS {
        let jobs: Vec<_> = outcomes.iter().filter(|o| o.worker == worker).collect();
        if jobs.is_empty() {
            continue;
        }
        busy_workers += 1;

        let mut previous = UNCOMPUTED_FRAME;
        for (i, outcome) in jobs.iter().enumerate() {
            let (before, report) = outcome.value;
            assert_eq!(before, previous, "job {} lost its worker's frame", outcome.job);
            assert_eq!(report.restarted, i == 0);
            previous = outcome.job as i32;
        }
    }
    assert_eq!(cache.metrics().states_created, busy_workers);
    assert_eq!(cache.thread_count(), busy_workers as usize);
}

#[test]
fn manual_policy_continues_across_sessions() {
    let cache = cache(InvalidationPolicy::Manual);
    let sim = ToySimulator::default();

    cache.on_session_start(SessionStatus(0));
    sim.advance(&mut cache.lookup(EffectId(1)), 5);

    cache.on_session_start(SessionStatus(1));
    let report = sim.advance(&mut cache.lookup(EffectId(1)), 6);
    assert!(!report.restarted);
    assert_eq!(cache.session_status(), Some(SessionStatus(1)));
}

#[test]
fn clear_policy_restarts_after_session_start() {
    let cache = cache(InvalidationPolicy::ClearOnSessionStart);
    let sim = ToySimulator::default();

    cache.on_session_start(SessionStatus(0));
    sim.advance(&mut cache.lookup(EffectId(1)), 5);

    cache.on_session_start(SessionStatus(1));
    let report = sim.advance(&mut cache.lookup(EffectId(1)), 6);
    assert!(report.restarted);
    assert_eq!(report.steps, 7);
    assert_eq!(cache.metrics().session_clears, 1);
}

#[test]
fn explicit_clear_forces_resimulation() {
    let cache = cache(InvalidationPolicy::Manual);
    let sim = ToySimulator::default();

    sim.advance(&mut cache.lookup(EffectId(1)), 5);
    let before = cache.ref_count(EffectId(1));

    cache.lookup(EffectId(1)).clear();
    assert_eq!(cache.ref_count(EffectId(1)), before);

    let report = sim.advance(&mut cache.lookup(EffectId(1)), 6);
    assert!(report.restarted);
}

#[test]
fn clear_thread_forces_resimulation_of_every_effect() {
    let cache = cache(InvalidationPolicy::Manual);
    let sim = ToySimulator::default();

    sim.advance(&mut cache.lookup(EffectId(1)), 5);
    sim.advance(&mut cache.lookup(EffectId(2)), 5);
    cache.clear_thread();

    assert!(sim.advance(&mut cache.lookup(EffectId(1)), 6).restarted);
    assert!(sim.advance(&mut cache.lookup(EffectId(2)), 6).restarted);
}
