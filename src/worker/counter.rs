//! Shared match counter.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Count of matches found so far, shared by every worker of one search.
///
/// The value returned by [`increment_and_fetch`](Self::increment_and_fetch)
/// doubles as the sequence number of the match that caused it, so sequence
/// numbers are unique and dense. They say nothing about the order in which
/// matches reach the result channel.
#[derive(Debug, Clone, Default)]
pub struct SearchCounter(Arc<AtomicU64>);

impl SearchCounter {
    /// Creates a counter starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the current value.
    #[inline]
    pub fn fetch(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    /// Atomically adds one and returns the new value.
    #[inline]
    pub fn increment_and_fetch(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Returns true once the counter has reached `target`.
    #[inline]
    pub fn reached(&self, target: u64) -> bool {
        self.fetch() >= target
    }
}
