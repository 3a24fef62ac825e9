//! Search coordination.
//!
//! A search moves through `Init -> Validating -> Running -> Stopping ->
//! Draining -> Done`. It fails from `Validating` on a bad pattern or
//! configuration, and from `Draining` when nothing was found or every
//! worker died before the target was reached. A failed search is not
//! retried.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::RecvTimeoutError;

use crate::crypto::{KeyError, KeySource, OsKeySource};
use crate::matcher::{validate_pattern, MatchMode, Pattern, PatternError};
use crate::worker::{result_channel, Match, SearchCounter, WorkerContext, WorkerExit, WorkerPool};

/// Default number of matches to look for.
pub const DEFAULT_TARGET_COUNT: u64 = 5;

/// Default interval between completion checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Default interval between progress log lines.
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(5);

/// One less than the available parallelism, and never zero.
pub fn default_worker_count() -> usize {
    num_cpus::get().saturating_sub(1).max(1)
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] PatternError),

    #[error("invalid search configuration: {0}")]
    InvalidConfig(String),

    #[error("no keys were found")]
    NoKeysFound,

    #[error("all workers exited after {found} of {target} matches")]
    WorkersExhausted {
        found: u64,
        target: u64,
        #[source]
        source: Option<KeyError>,
    },

    #[error("worker {worker_id} panicked")]
    WorkerPanicked { worker_id: usize },

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Parameters of one search. Not modified while the search runs.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub pattern: String,
    pub mode: MatchMode,
    /// Matches to find before stopping; [`SearchConfig::UNBOUNDED`] runs
    /// until interrupted
    pub target_count: u64,
    pub worker_count: usize,
    /// Upper bound on how long the coordinator sleeps between checks
    pub poll_interval: Duration,
    /// Progress log interval (zero disables)
    pub report_interval: Duration,
}

impl SearchConfig {
    pub const UNBOUNDED: u64 = u64::MAX;

    /// Creates a config with default count, workers and intervals.
    pub fn new(pattern: impl Into<String>, mode: MatchMode) -> Self {
        Self {
            pattern: pattern.into(),
            mode,
            target_count: DEFAULT_TARGET_COUNT,
            worker_count: default_worker_count(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            report_interval: DEFAULT_REPORT_INTERVAL,
        }
    }

    pub fn with_target_count(mut self, target_count: u64) -> Self {
        self.target_count = target_count;
        self
    }

    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_report_interval(mut self, report_interval: Duration) -> Self {
        self.report_interval = report_interval;
        self
    }

    /// Returns true if the search only ends on an external stop.
    pub fn is_unbounded(&self) -> bool {
        self.target_count == Self::UNBOUNDED
    }

    /// Checks the pattern and the numeric limits.
    pub fn validate(&self) -> Result<(), SearchError> {
        validate_pattern(&self.pattern)?;

        if self.target_count == 0 {
            return Err(SearchError::InvalidConfig(
                "target count must be at least 1".into(),
            ));
        }
        if self.worker_count == 0 {
            return Err(SearchError::InvalidConfig(
                "worker count must be at least 1".into(),
            ));
        }
        if self.poll_interval.is_zero() {
            return Err(SearchError::InvalidConfig(
                "poll interval must be non-zero".into(),
            ));
        }

        Ok(())
    }
}

/// Outcome of a completed search.
#[derive(Debug, Clone)]
pub struct SearchReport {
    /// Every match delivered, sorted by sequence.
    ///
    /// May hold more than the target count: workers that passed their stop
    /// check together all record their match.
    pub matches: Vec<Match>,
    /// Final counter value, equal to `matches.len()`
    pub final_count: u64,
    /// Keys generated across all workers
    pub keys_generated: u64,
    /// Matches recorded by the workers' statistics
    pub matches_found: u64,
    pub elapsed: Duration,
    /// True if the search was ended by the stop handle
    pub interrupted: bool,
}

impl SearchReport {
    /// Returns the average generation rate.
    pub fn keys_per_second(&self) -> f64 {
        let elapsed = self.elapsed.as_secs_f64();
        if elapsed > 0.0 {
            self.keys_generated as f64 / elapsed
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchState {
    Validating,
    Running,
    Stopping,
    Draining,
    Done,
    Failed,
}

/// Runs vanity searches on a pool of worker threads.
pub struct Coordinator {
    source: Arc<dyn KeySource>,
    /// External stop request, e.g. from a Ctrl-C handler
    interrupt: Arc<AtomicBool>,
    /// Workers started by the most recent search
    spawned: AtomicUsize,
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl Coordinator {
    /// Creates a coordinator drawing keys from the OS RNG.
    pub fn new() -> Self {
        Self::with_key_source(Arc::new(OsKeySource))
    }

    /// Creates a coordinator drawing keys from `source`.
    pub fn with_key_source(source: Arc<dyn KeySource>) -> Self {
        Self {
            source,
            interrupt: Arc::new(AtomicBool::new(false)),
            spawned: AtomicUsize::new(0),
        }
    }

    /// Returns the stop flag. Setting it ends the running search early;
    /// whatever was found so far is returned.
    ///
    /// A stop raised before a search starts ends that search at its first
    /// check. The flag is cleared when a search finishes.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.interrupt.clone()
    }

    /// Returns how many workers the most recent search started.
    pub fn workers_spawned(&self) -> usize {
        self.spawned.load(Ordering::SeqCst)
    }

    /// Runs a search and returns the matches sorted by sequence.
    pub fn run(&self, config: &SearchConfig) -> Result<Vec<Match>, SearchError> {
        self.search(config, |_| {}).map(|report| report.matches)
    }

    /// Runs a search, calling `on_match` on this thread for every match as
    /// it arrives.
    pub fn search<F>(&self, config: &SearchConfig, on_match: F) -> Result<SearchReport, SearchError>
    where
        F: FnMut(&Match),
    {
        self.spawned.store(0, Ordering::SeqCst);

        let result = self.execute(config, on_match);
        self.interrupt.store(false, Ordering::SeqCst);
        if let Err(e) = &result {
            transition(SearchState::Failed);
            log::debug!("search failed: {}", e);
        }
        result
    }

    fn execute<F>(&self, config: &SearchConfig, mut on_match: F) -> Result<SearchReport, SearchError>
    where
        F: FnMut(&Match),
    {
        transition(SearchState::Validating);
        config.validate()?;

        let counter = SearchCounter::new();
        let (result_tx, result_rx) = result_channel();
        let ctx = WorkerContext {
            pattern: Pattern::new(config.pattern.as_str(), config.mode),
            source: self.source.clone(),
            counter: counter.clone(),
            target: config.target_count,
            result_tx,
        };

        let mut pool = WorkerPool::start(config.worker_count, ctx)?;
        self.spawned.store(pool.num_workers(), Ordering::SeqCst);
        transition(SearchState::Running);

        let mut matches = Vec::new();
        let mut interrupted = false;
        let mut last_report = Instant::now();

        while !counter.reached(config.target_count) {
            if self.interrupt.load(Ordering::SeqCst) {
                log::info!("stop requested");
                interrupted = true;
                break;
            }

            match result_rx.recv_timeout(config.poll_interval) {
                Ok(found) => {
                    on_match(&found);
                    matches.push(found);
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    log::debug!("all workers have exited");
                    break;
                }
            }

            if !config.report_interval.is_zero() && last_report.elapsed() >= config.report_interval {
                log::info!(
                    "[{:>4}s] generated {} keys ({:.0}/s), {} match(es)",
                    pool.elapsed().as_secs(),
                    pool.total_keys(),
                    pool.keys_per_second(),
                    counter.fetch()
                );
                last_report = Instant::now();
            }
        }

        transition(SearchState::Stopping);
        pool.stop_all();
        let exits = pool.join_all();

        transition(SearchState::Draining);
        for found in result_rx.drain() {
            on_match(&found);
            matches.push(found);
        }

        let final_count = counter.fetch();
        if !interrupted && final_count < config.target_count {
            return Err(exhausted(&exits, final_count, config.target_count));
        }
        for (worker_id, exit) in exits.iter().enumerate() {
            match exit {
                WorkerExit::Failed(e) => log::warn!("worker {} failed: {}", worker_id, e),
                WorkerExit::Panicked => log::warn!("worker {} panicked", worker_id),
                WorkerExit::Finished => {}
            }
        }

        if matches.is_empty() {
            return Err(SearchError::NoKeysFound);
        }
        matches.sort_by_key(|m| m.sequence);

        transition(SearchState::Done);
        Ok(SearchReport {
            matches,
            final_count,
            keys_generated: pool.total_keys(),
            matches_found: pool.total_matches(),
            elapsed: pool.elapsed(),
            interrupted,
        })
    }
}

fn transition(state: SearchState) {
    log::debug!("search state -> {:?}", state);
}

/// Builds the error for a search whose workers all died short of the target.
fn exhausted(exits: &[WorkerExit], found: u64, target: u64) -> SearchError {
    if let Some(worker_id) = exits.iter().position(|e| matches!(e, WorkerExit::Panicked)) {
        log::error!("worker {} panicked", worker_id);
        return SearchError::WorkerPanicked { worker_id };
    }

    let source = exits.iter().find_map(|e| match e {
        WorkerExit::Failed(e) => Some(e.clone()),
        _ => None,
    });
    if let Some(e) = &source {
        log::error!("workers failed: {}", e);
    }

    SearchError::WorkersExhausted {
        found,
        target,
        source,
    }
}
