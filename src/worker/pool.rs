//! Worker pool management.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::crypto::KeyError;

use super::cpu::{CpuWorker, WorkerContext, WorkerStats};

/// How a worker thread ended.
#[derive(Debug, Clone)]
pub enum WorkerExit {
    /// Left its loop normally
    Finished,
    /// The key source failed
    Failed(KeyError),
    /// The thread panicked
    Panicked,
}

/// Owns a set of worker threads started and stopped together.
pub struct WorkerPool {
    /// Worker thread handles (Option to allow taking during join)
    handles: Option<Vec<JoinHandle<Result<(), KeyError>>>>,
    /// Shared stop flag
    stop_flag: Arc<AtomicBool>,
    /// Shared statistics
    stats: Arc<WorkerStats>,
    /// Start time
    start_time: Instant,
}

impl WorkerPool {
    /// Spawns `num_workers` workers running against `ctx`.
    ///
    /// `ctx` is dropped once every worker holds its own clone, so the result
    /// channel disconnects when the last worker exits. If a thread cannot be
    /// spawned, the workers already running are stopped and joined.
    pub fn start(num_workers: usize, ctx: WorkerContext) -> io::Result<Self> {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let stats = Arc::new(WorkerStats::new());
        let mut handles = Vec::with_capacity(num_workers);

        for id in 0..num_workers {
            let ctx = ctx.clone();
            let stop = stop_flag.clone();
            let stats = stats.clone();

            let spawned = thread::Builder::new()
                .name(format!("wg-vanity-worker-{}", id))
                .spawn(move || CpuWorker::new(id, ctx, stop, stats).run());

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    stop_flag.store(true, Ordering::SeqCst);
                    for handle in handles {
                        let _ = handle.join();
                    }
                    return Err(e);
                }
            }
        }

        log::debug!("spawned {} workers", handles.len());

        Ok(Self {
            handles: Some(handles),
            stop_flag,
            stats,
            start_time: Instant::now(),
        })
    }

    /// Signals all workers to stop at their next loop check.
    pub fn stop_all(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }

    /// Waits for every worker to exit and reports how each one ended,
    /// indexed by worker ID.
    ///
    /// Does not signal a stop; call [`stop_all`](Self::stop_all) first unless
    /// the workers are expected to finish on their own.
    pub fn join_all(&mut self) -> Vec<WorkerExit> {
        let Some(handles) = self.handles.take() else {
            return Vec::new();
        };

        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(Ok(())) => WorkerExit::Finished,
                Ok(Err(e)) => WorkerExit::Failed(e),
                Err(_) => WorkerExit::Panicked,
            })
            .collect()
    }

    /// Returns the number of workers still owned by the pool.
    pub fn num_workers(&self) -> usize {
        self.handles.as_ref().map_or(0, Vec::len)
    }

    /// Returns the total keys generated across all workers.
    pub fn total_keys(&self) -> u64 {
        self.stats.total_keys()
    }

    /// Returns the total matches found.
    pub fn total_matches(&self) -> u64 {
        self.stats.total_matches()
    }

    /// Returns the elapsed time since the pool was started.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Returns the current generation rate (keys per second).
    pub fn keys_per_second(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.total_keys() as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Returns true if the pool has been signaled to stop.
    pub fn is_stopped(&self) -> bool {
        self.stop_flag.load(Ordering::SeqCst)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.stop_all();
        // Wait for workers to finish if they haven't been joined
        if let Some(handles) = self.handles.take() {
            for handle in handles {
                let _ = handle.join();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{KeySource, Keypair, OsKeySource};
    use crate::matcher::{MatchMode, Pattern};
    use crate::worker::{result_channel, SearchCounter};

    fn context(source: Arc<dyn KeySource>, target: u64) -> (WorkerContext, crate::worker::MatchReceiver) {
        let (result_tx, rx) = result_channel();
        let ctx = WorkerContext {
            // 43 significant characters never match a random key in practice
            pattern: Pattern::new("a".repeat(43), MatchMode::Prefix),
            source,
            counter: SearchCounter::new(),
            target,
            result_tx,
        };
        (ctx, rx)
    }

    #[test]
    fn test_stop_all_then_join_all() {
        let (ctx, rx) = context(Arc::new(OsKeySource), u64::MAX);
        let mut pool = WorkerPool::start(3, ctx).unwrap();
        assert_eq!(pool.num_workers(), 3);

        thread::sleep(Duration::from_millis(20));
        pool.stop_all();
        assert!(pool.is_stopped());

        let exits = pool.join_all();
        assert_eq!(exits.len(), 3);
        assert!(exits.iter().all(|e| matches!(e, WorkerExit::Finished)));
        assert!(pool.total_keys() > 0);
        assert_eq!(pool.num_workers(), 0);
        assert!(pool.join_all().is_empty());
        assert!(rx.drain().is_empty());
    }

    #[test]
    fn test_failed_workers_reported() {
        struct Broken;
        impl KeySource for Broken {
            fn generate(&self) -> Result<Keypair, KeyError> {
                Err(KeyError::Randomness("unavailable".into()))
            }
        }

        let (ctx, _rx) = context(Arc::new(Broken), u64::MAX);
        let mut pool = WorkerPool::start(2, ctx).unwrap();
        let exits = pool.join_all();

        assert_eq!(exits.len(), 2);
        assert!(exits.iter().all(|e| matches!(e, WorkerExit::Failed(_))));
    }

    #[test]
    fn test_drop_stops_workers() {
        let (ctx, _rx) = context(Arc::new(OsKeySource), u64::MAX);
        let pool = WorkerPool::start(2, ctx).unwrap();
        drop(pool);
    }
}
