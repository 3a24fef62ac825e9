//! CPU-based worker for vanity key search.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::crypto::{KeyError, KeySource};
use crate::matcher::Pattern;

use super::{Match, MatchSender, SearchCounter};

/// Keys generated between flushes of the shared key counter.
const STATS_FLUSH_INTERVAL: u64 = 1024;

/// Statistics shared by all workers of a pool.
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Total keys generated
    pub keys_generated: AtomicU64,
    /// Matches found
    pub matches_found: AtomicU64,
}

impl WorkerStats {
    /// Creates new worker stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total keys generated.
    pub fn total_keys(&self) -> u64 {
        self.keys_generated.load(Ordering::Relaxed)
    }

    /// Returns the total matches found.
    pub fn total_matches(&self) -> u64 {
        self.matches_found.load(Ordering::Relaxed)
    }
}

/// Everything a worker shares with the rest of the search.
///
/// Built once per search and cloned into each worker at spawn time.
#[derive(Clone)]
pub struct WorkerContext {
    pub pattern: Pattern,
    pub source: Arc<dyn KeySource>,
    pub counter: SearchCounter,
    /// Stop once the counter reaches this value
    pub target: u64,
    pub result_tx: MatchSender,
}

/// A CPU worker that generates and tests keypairs.
pub struct CpuWorker {
    /// Worker ID
    id: usize,
    ctx: WorkerContext,
    /// Pool-wide stop flag
    stop_flag: Arc<AtomicBool>,
    /// Worker statistics
    stats: Arc<WorkerStats>,
}

impl CpuWorker {
    /// Creates a new CPU worker.
    pub fn new(
        id: usize,
        ctx: WorkerContext,
        stop_flag: Arc<AtomicBool>,
        stats: Arc<WorkerStats>,
    ) -> Self {
        Self {
            id,
            ctx,
            stop_flag,
            stats,
        }
    }

    /// Runs the worker loop.
    ///
    /// Generates keypairs and tests them against the pattern until:
    /// - The shared counter reaches the target
    /// - Stop flag is set
    /// - The result receiver is gone
    /// - The key source fails (returned as the error)
    ///
    /// The stop check and the increment are separate steps, so several
    /// workers can pass the check together and each record a match. A
    /// search may therefore end with up to `workers - 1` matches more than
    /// its target.
    pub fn run(&self) -> Result<(), KeyError> {
        let mut pending = 0u64;

        let outcome = loop {
            if self.should_stop() {
                break Ok(());
            }

            let keypair = match self.ctx.source.generate() {
                Ok(keypair) => keypair,
                Err(e) => break Err(e),
            };
            pending += 1;

            let public_b64 = keypair.public_key_b64();
            if self.ctx.pattern.matches_key(&public_b64) {
                let sequence = self.ctx.counter.increment_and_fetch();
                self.stats.matches_found.fetch_add(1, Ordering::Relaxed);

                let found = Match {
                    sequence,
                    private_b64: keypair.private_key_b64(),
                    public_b64,
                    worker_id: self.id,
                };

                if !self.ctx.result_tx.push(found) {
                    break Ok(());
                }
            }

            if pending == STATS_FLUSH_INTERVAL {
                self.stats.keys_generated.fetch_add(pending, Ordering::Relaxed);
                pending = 0;
            }
        };

        self.stats.keys_generated.fetch_add(pending, Ordering::Relaxed);
        outcome
    }

    #[inline]
    fn should_stop(&self) -> bool {
        self.stop_flag.load(Ordering::Relaxed) || self.ctx.counter.reached(self.ctx.target)
    }
}
