//! Lock-free progress accounting (§9 "keep the driver pure"): worker
//! threads bump a handful of atomics on the hot path; a caller reads a
//! consistent-enough snapshot at its own cadence (the CLI binary polls at
//! <=1Hz and renders it, but the driver itself never blocks on or owns a
//! renderer).

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

#[derive(Debug)]
pub struct ProgressCounters {
    started: Instant,
    batches_done: AtomicU64,
    batches_total: u64,
    seeds_searched: AtomicU64,
    matches_found: AtomicU64,
}

#[derive(Debug, Clone, Copy)]
pub struct ProgressSnapshot {
    pub elapsed_ms: u128,
    pub batches_done: u64,
    pub batches_total: u64,
    pub seeds_searched: u64,
    pub matches_found: u64,
    pub seeds_per_ms: f64,
}

impl ProgressCounters {
    pub fn new(batches_total: u64) -> Self {
        Self {
            started: Instant::now(),
            batches_done: AtomicU64::new(0),
            batches_total,
            seeds_searched: AtomicU64::new(0),
            matches_found: AtomicU64::new(0),
        }
    }

    pub fn record_batch_done(&self) {
        self.batches_done.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_seeds_searched(&self, count: u64) {
        self.seeds_searched.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_match(&self) {
        self.matches_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let elapsed_ms = self.started.elapsed().as_millis();
        let seeds_searched = self.seeds_searched.load(Ordering::Relaxed);
        let seeds_per_ms = if elapsed_ms == 0 {
            0.0
        } else {
            seeds_searched as f64 / elapsed_ms as f64
        };
        ProgressSnapshot {
            elapsed_ms,
            batches_done: self.batches_done.load(Ordering::Relaxed),
            batches_total: self.batches_total,
            seeds_searched,
            matches_found: self.matches_found.load(Ordering::Relaxed),
            seeds_per_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_across_calls() {
        let counters = ProgressCounters::new(10);
        counters.record_batch_done();
        counters.record_seeds_searched(8);
        counters.record_match();
        let snap = counters.snapshot();
        assert_eq!(snap.batches_done, 1);
        assert_eq!(snap.batches_total, 10);
        assert_eq!(snap.seeds_searched, 8);
        assert_eq!(snap.matches_found, 1);
    }
}
