//! Concurrent first lookups of the same and of different effects.
//!
//! Many render threads hitting an unseen effect at the same instant must
//! agree on a single effect record while each receiving its own, freshly
//! initialised frame state.

use std::collections::HashSet;
use std::sync::Arc;

use plume_cache::{CacheConfig, FrameState, SessionCache};
use plume_core::{EffectId, UNCOMPUTED_FRAME};
use plume_test_utils::{run_render_threads, ToySimulator, TrailParticle};

const THREADS: usize = 8;

fn cache() -> SessionCache<TrailParticle> {
    SessionCache::new(CacheConfig::default()).expect("default config is valid")
}

fn is_fresh(state: &FrameState<TrailParticle>) -> bool {
    state.frame == UNCOMPUTED_FRAME
        && state.particles.is_empty()
        && !state.calculated
        && state.max_trail == -1
        && state.total_particles == 0
}

#[test]
fn simultaneous_first_lookup_creates_one_record() {
    let cache = cache();
    let effect = EffectId(42);

    let outcomes = run_render_threads(THREADS, |_| {
        let state = cache.lookup(effect);
        let fresh = is_fresh(&state);
        let record = Arc::as_ptr(state.effect()) as usize;
        let address = &*state as *const FrameState<TrailParticle> as usize;
        (fresh, record, address)
    });

    let metrics = cache.metrics();
    assert_eq!(metrics.records_created, 1);
    assert_eq!(metrics.states_created, THREADS as u64);
    assert_eq!(metrics.live_threads, THREADS as u64);
    assert_eq!(cache.effect_count(), 1);

    assert!(outcomes.iter().all(|o| o.value.0), "every state starts fresh");

    let records: HashSet<usize> = outcomes.iter().map(|o| o.value.1).collect();
    assert_eq!(records.len(), 1, "all threads bound to the same record");

    let states: HashSet<usize> = outcomes.iter().map(|o| o.value.2).collect();
    assert_eq!(states.len(), THREADS, "every thread got its own state");

    // States stay with the cache after their threads exit.
    assert_eq!(cache.ref_count(effect), Some(THREADS + 1));
}

#[test]
fn threads_do_not_see_each_others_progress() {
    let cache = cache();
    let sim = ToySimulator::default();
    let effect = EffectId(1);

    let outcomes = run_render_threads(THREADS, |index| {
        // Thread i renders frames i, i + THREADS, i + 2 * THREADS.
        let mut frames = Vec::new();
        for round in 0..3 {
            let target = (index + round * THREADS) as i32;
            let mut state = cache.lookup(effect);
            let before = state.frame;
            sim.advance(&mut state, target);
            frames.push((before, state.frame));
        }
        frames
    });

    for outcome in &outcomes {
        let i = outcome.index as i32;
        let t = THREADS as i32;
        assert_eq!(
            outcome.value,
            vec![(UNCOMPUTED_FRAME, i), (i, i + t), (i + t, i + 2 * t)],
            "thread {} observed foreign writes",
            outcome.index
        );
    }
}

#[test]
fn many_effects_many_threads() {
    let cache = cache();
    let effects: Vec<EffectId> = (0..32).map(EffectId).collect();

    let outcomes = run_render_threads(THREADS, |index| {
        // Each thread walks the effects in a different rotation.
        for k in 0..effects.len() {
            let effect = effects[(k + index * 3) % effects.len()];
            cache.lookup(effect).frame = index as i32;
        }
        let frames: Vec<i32> = effects.iter().map(|&e| cache.lookup(e).frame).collect();
        (cache.local_effects().len(), frames)
    });

    assert_eq!(cache.effect_count(), effects.len());
    assert_eq!(cache.metrics().records_created, effects.len() as u64);
    for &effect in &effects {
        assert_eq!(cache.ref_count(effect), Some(THREADS + 1));
    }
    for outcome in &outcomes {
        let (held, frames) = &outcome.value;
        assert_eq!(*held, effects.len());
        assert!(frames.iter().all(|&f| f == outcome.index as i32));
    }
}

#[test]
fn dropping_cache_releases_every_thread_state() {
    let cache = cache();
    let effect = EffectId(5);
    run_render_threads(4, |_| {
        cache.lookup(effect);
    });
    let weak = Arc::downgrade(&cache.record(effect).expect("record exists"));
    assert_eq!(weak.strong_count(), 4 + 1);

    drop(cache);
    assert!(weak.upgrade().is_none());
}
