//! Search Driver (C5): a fixed OS-thread pool that claims batches off a
//! shared atomic cursor, runs the two-stage filter over every seed in each
//! batch, and funnels survivors through the configured [`Cutoff`].
//!
//! Pause/resume/cancel are coarse — checked at batch boundaries and between
//! lane chunks, not per seed, so a pause or cancel request lands within one
//! chunk's worth of work rather than instantly.

use crate::driver::batch;
use crate::driver::progress::{ProgressCounters, ProgressSnapshot};
use crate::filter::{evaluate, CompiledFilter, Cutoff, MatchOutcome};
use crate::lanes::LaneMask;
use crate::LANES;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Condvar, Mutex};

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Running = 0,
    Paused = 1,
    Disposed = 2,
    Completed = 3,
}

impl Status {
    fn from_u8(v: u8) -> Status {
        match v {
            0 => Status::Running,
            1 => Status::Paused,
            2 => Status::Disposed,
            _ => Status::Completed,
        }
    }
}

pub struct SearchConfig {
    pub filter: CompiledFilter,
    pub batch_size: u32,
    pub seed_length: usize,
    pub start_batch: u64,
    pub end_batch: u64,
    pub threads: usize,
    pub use_prefilter: bool,
}

impl SearchConfig {
    pub fn total_batches(&self) -> u64 {
        self.end_batch - self.start_batch
    }
}

/// shared state a [`SearchDriver`]'s worker threads all see; split out from
/// `SearchDriver` itself so it can be captured behind an `Arc` by each
/// spawned thread without the driver struct needing to be `Sync` on its
/// non-atomic fields.
struct Shared {
    config: SearchConfig,
    cutoff: Cutoff,
    cursor: AtomicU64,
    status: AtomicU8,
    progress: ProgressCounters,
    pause_lock: Mutex<()>,
    pause_cv: Condvar,
    matches: Mutex<Vec<MatchOutcome>>,
}

pub struct SearchDriver {
    shared: Arc<Shared>,
}

impl SearchDriver {
    pub fn new(config: SearchConfig, cutoff: Cutoff) -> Self {
        let total = config.total_batches();
        let start = config.start_batch;
        Self {
            shared: Arc::new(Shared {
                config,
                cutoff,
                cursor: AtomicU64::new(start),
                status: AtomicU8::new(Status::Running as u8),
                progress: ProgressCounters::new(total),
                pause_lock: Mutex::new(()),
                pause_cv: Condvar::new(),
                matches: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn pause(&self) {
        self.shared.status.store(Status::Paused as u8, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.shared.status.store(Status::Running as u8, Ordering::SeqCst);
        self.shared.pause_cv.notify_all();
    }

    /// idempotent: disposing an already-disposed driver is a no-op.
    pub fn cancel(&self) {
        self.shared.status.store(Status::Disposed as u8, Ordering::SeqCst);
        self.shared.pause_cv.notify_all();
    }

    pub fn progress(&self) -> ProgressSnapshot {
        self.shared.progress.snapshot()
    }

    pub fn matches(&self) -> Vec<MatchOutcome> {
        self.shared.matches.lock().expect("matches mutex poisoned").clone()
    }

    /// runs every configured worker thread to completion (or until
    /// cancelled) and returns the accumulated matches, sorted by descending
    /// score (§5 "results ordered best-first").
    pub fn run(&self) -> Vec<MatchOutcome> {
        let threads = self.shared.config.threads.max(1);
        std::thread::scope(|scope| {
            for _ in 0..threads {
                let shared = Arc::clone(&self.shared);
                scope.spawn(move || worker_loop(&shared));
            }
        });
        // a dispose request wins a race against the natural end-of-range
        // completion; only mark Completed if nobody disposed us meanwhile.
        let _ = self.shared.status.compare_exchange(
            Status::Running as u8,
            Status::Completed as u8,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
        let mut out = self.matches();
        out.sort_by(|a, b| b.score.cmp(&a.score));
        out
    }
}

/// blocks the calling thread while the driver is paused, returning `false`
/// if it should stop entirely because the driver was cancelled.
fn wait_while_paused(shared: &Shared) -> bool {
    loop {
        match Status::from_u8(shared.status.load(Ordering::SeqCst)) {
            Status::Running => return true,
            Status::Disposed | Status::Completed => return false,
            Status::Paused => {
                let guard = shared.pause_lock.lock().expect("pause mutex poisoned");
                let _unused = shared
                    .pause_cv
                    .wait_timeout(guard, std::time::Duration::from_millis(50))
                    .expect("pause condvar poisoned");
            }
        }
    }
}

fn worker_loop(shared: &Shared) {
    loop {
        if !wait_while_paused(shared) {
            return;
        }
        let batch_index = shared.cursor.fetch_add(1, Ordering::SeqCst);
        if batch_index >= shared.config.end_batch {
            return;
        }

        for chunk in batch::lane_chunks(batch_index, shared.config.batch_size, shared.config.seed_length) {
            if !wait_while_paused(shared) {
                return;
            }
            run_chunk(shared, &chunk);
            shared.progress.record_seeds_searched(chunk.len() as u64);
        }

        shared.progress.record_batch_done();
    }
}

fn run_chunk(shared: &Shared, chunk: &[crate::seed::Seed]) {
    let mask = if shared.config.use_prefilter {
        evaluate::vector_prefilter_batch(&shared.config.filter, chunk)
    } else {
        LaneMask::from_fn(|lane| lane < chunk.len())
    };
    for (lane, seed) in chunk.iter().enumerate() {
        if !mask.get(lane) {
            continue;
        }
        if let Some(outcome) = evaluate::evaluate_seed(&shared.config.filter, *seed) {
            if shared.cutoff.accept(outcome.score) {
                shared.progress.record_match();
                shared
                    .matches
                    .lock()
                    .expect("matches mutex poisoned")
                    .push(outcome);
            }
        }
    }
}

/// drains a user-supplied [`batch::SeedProvider`] instead of enumerating
/// sequential batches; single-threaded since providers are not `Sync`. Seeds
/// are still buffered into `LANES`-wide chunks before the prefilter runs, so
/// the provider path shares the same batched Stage 1 as sequential mode.
pub fn run_with_provider(
    filter: &CompiledFilter,
    cutoff: &Cutoff,
    use_prefilter: bool,
    mut provider: Box<dyn batch::SeedProvider>,
) -> Vec<MatchOutcome> {
    let mut out = Vec::new();
    loop {
        let mut chunk = Vec::with_capacity(LANES);
        for _ in 0..LANES {
            match provider.next_seed() {
                Some(seed) => chunk.push(seed),
                None => break,
            }
        }
        if chunk.is_empty() {
            break;
        }

        let mask = if use_prefilter {
            evaluate::vector_prefilter_batch(filter, &chunk)
        } else {
            LaneMask::from_fn(|lane| lane < chunk.len())
        };
        for (lane, &seed) in chunk.iter().enumerate() {
            if !mask.get(lane) {
                continue;
            }
            if let Some(outcome) = evaluate::evaluate_seed(filter, seed) {
                if cutoff.accept(outcome.score) {
                    out.push(outcome);
                }
            }
        }
    }
    out.sort_by(|a, b| b.score.cmp(&a.score));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;
    use crate::filter::compile;

    fn tiny_filter() -> CompiledFilter {
        let raw: config::RawFilterConfig =
            serde_json::from_str(r#"{"must":[{"type":"voucher","value":"Overstock","antes":[1]}]}"#).unwrap();
        compile::compile(config::compile(raw).unwrap())
    }

    #[test]
    fn run_searches_every_seed_in_range_exactly_once() {
        let config = SearchConfig {
            filter: tiny_filter(),
            batch_size: 1,
            seed_length: 2,
            start_batch: 0,
            end_batch: batch::batch_total(1),
            threads: 2,
            use_prefilter: true,
        };
        let driver = SearchDriver::new(config, Cutoff::Unbounded);
        let results = driver.run();
        assert!(!results.is_empty());
        let progress = driver.progress();
        assert_eq!(progress.batches_done, batch::batch_total(1));
    }

    #[test]
    fn cancel_stops_workers_before_full_range_completes() {
        let config = SearchConfig {
            filter: tiny_filter(),
            batch_size: 1,
            seed_length: 3,
            start_batch: 0,
            end_batch: batch::batch_total(1),
            threads: 1,
            use_prefilter: true,
        };
        let driver = SearchDriver::new(config, Cutoff::Unbounded);
        driver.cancel();
        let results = driver.run();
        assert!(results.is_empty());
        assert_eq!(driver.progress().batches_done, 0);
    }

    #[test]
    fn results_are_sorted_best_first() {
        let raw: config::RawFilterConfig = serde_json::from_str(
            r#"{"should":[{"type":"voucher","value":"Overstock","antes":[1],"score":5}]}"#,
        )
        .unwrap();
        let filter = compile::compile(config::compile(raw).unwrap());
        let config = SearchConfig {
            filter,
            batch_size: 1,
            seed_length: 2,
            start_batch: 0,
            end_batch: batch::batch_total(1),
            threads: 2,
            use_prefilter: false,
        };
        let driver = SearchDriver::new(config, Cutoff::Unbounded);
        let results = driver.run();
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }
}
