//! Read/write/take counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Per-store operation counters.
///
/// The store bumps these while holding its lock, so each count lands
/// together with the operation it describes. Atomics let callers read them
/// without taking that lock.
#[derive(Debug, Default)]
pub struct Stats {
    reads: AtomicU64,
    writes: AtomicU64,
    takes: AtomicU64,
}

impl Stats {
    pub fn record_reads(&self, n: u64) {
        self.reads.fetch_add(n, Ordering::Relaxed);
    }

    pub fn record_writes(&self, n: u64) {
        self.writes.fetch_add(n, Ordering::Relaxed);
    }

    pub fn record_takes(&self, n: u64) {
        self.takes.fetch_add(n, Ordering::Relaxed);
    }

    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    pub fn takes(&self) -> u64 {
        self.takes.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.reads.store(0, Ordering::Relaxed);
        self.writes.store(0, Ordering::Relaxed);
        self.takes.store(0, Ordering::Relaxed);
    }

    pub fn snapshot(&self, size: usize) -> StatsSnapshot {
        StatsSnapshot {
            reads: self.reads(),
            writes: self.writes(),
            takes: self.takes(),
            size,
        }
    }
}

/// Point-in-time copy of the counters plus the live object count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub reads: u64,
    pub writes: u64,
    pub takes: u64,
    pub size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn counts_and_resets() {
        let stats = Stats::default();
        stats.record_reads(3);
        stats.record_writes(2);
        stats.record_takes(1);
        assert_eq!(
            stats.snapshot(7),
            StatsSnapshot { reads: 3, writes: 2, takes: 1, size: 7 }
        );

        stats.reset();
        assert_eq!(stats.snapshot(0), StatsSnapshot::default());

        stats.record_writes(1);
        assert_eq!(stats.writes(), 1);
    }

    #[test]
    fn no_lost_updates_across_threads() {
        let stats = Arc::new(Stats::default());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let stats = Arc::clone(&stats);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        stats.record_writes(1);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(stats.writes(), 8000);
    }
}
