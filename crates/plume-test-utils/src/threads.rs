//! Harnesses for driving one cache from several render threads.
//!
//! [`run_render_threads`] gives every thread one long-running task.
//! [`run_job_pool`] models a render framework instead: a fixed set of
//! worker threads pulling short per-frame jobs from a shared queue, so
//! one OS thread runs many unrelated jobs in turn.

use std::sync::Barrier;
use std::thread;

/// What one render thread produced.
pub struct ThreadOutcome<R> {
    pub index: usize,
    pub value: R,
}

/// Run `work` on `threads` scoped threads.
///
/// All threads start `work` together behind a barrier, maximising
/// overlap on first lookups. Outcomes are returned ordered by thread
/// index.
pub fn run_render_threads<R, F>(threads: usize, work: F) -> Vec<ThreadOutcome<R>>
where
    R: Send,
    F: Fn(usize) -> R + Sync,
{
    let barrier = Barrier::new(threads);
    let (tx, rx) = crossbeam_channel::unbounded();

    thread::scope(|scope| {
        for index in 0..threads {
            let tx = tx.clone();
            let barrier = &barrier;
            let work = &work;
            scope.spawn(move || {
                barrier.wait();
                let value = work(index);
                tx.send(ThreadOutcome { index, value })
                    .expect("outcome receiver dropped");
            });
        }
    });
    drop(tx);

    let mut outcomes: Vec<ThreadOutcome<R>> = rx.iter().collect();
    outcomes.sort_by_key(|o| o.index);
    outcomes
}

/// What one pooled job produced, and which worker ran it.
pub struct JobOutcome<R> {
    pub job: usize,
    pub worker: usize,
    pub value: R,
}

/// Run every job in `jobs` on a pool of `workers` scoped threads.
///
/// Jobs are queued in order and each worker takes the next one when it
/// is free, so the jobs one worker runs are always increasing in index.
/// Outcomes are returned ordered by job index.
pub fn run_job_pool<J, R, F>(workers: usize, jobs: Vec<J>, work: F) -> Vec<JobOutcome<R>>
where
    J: Send,
    R: Send,
    F: Fn(J) -> R + Sync,
{
    let (job_tx, job_rx) = crossbeam_channel::unbounded();
    for (index, job) in jobs.into_iter().enumerate() {
        job_tx.send((index, job)).expect("job receiver dropped");
    }
    drop(job_tx);

    let (tx, rx) = crossbeam_channel::unbounded();
    thread::scope(|scope| {
        for worker in 0..workers {
            let jobs = job_rx.clone();
            let tx = tx.clone();
            let work = &work;
            scope.spawn(move || {
                for (job, payload) in jobs.iter() {
                    let value = work(payload);
                    tx.send(JobOutcome { job, worker, value })
                        .expect("outcome receiver dropped");
                }
            });
        }
    });
    drop(tx);

    let mut outcomes: Vec<JobOutcome<R>> = rx.iter().collect();
    outcomes.sort_by_key(|o| o.job);
    outcomes
}
