//! Parallel key search workers.
//!
//! This module provides:
//! - The shared match counter used as stop signal and sequence source
//! - The unbounded result channel from workers to the coordinator
//! - Multi-threaded CPU workers and the pool that owns them

mod channel;
mod counter;
mod cpu;
mod pool;

pub use channel::{result_channel, Match, MatchReceiver, MatchSender};
pub use counter::SearchCounter;
pub use cpu::{CpuWorker, WorkerContext, WorkerStats};
pub use pool::{WorkerExit, WorkerPool};
