//! Result delivery from workers to the coordinator.

use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};

/// A key whose encoding satisfied the search pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Counter value claimed by the worker that found this key
    pub sequence: u64,
    /// The private key (padded base64)
    pub private_b64: String,
    /// The public key (padded base64)
    pub public_b64: String,
    /// The ID of the worker that found this match
    pub worker_id: usize,
}

/// Creates the multi-producer, single-consumer result channel.
pub fn result_channel() -> (MatchSender, MatchReceiver) {
    let (tx, rx) = unbounded();
    (MatchSender { tx }, MatchReceiver { rx })
}

/// Producer half, cloned into every worker.
#[derive(Debug, Clone)]
pub struct MatchSender {
    tx: Sender<Match>,
}

impl MatchSender {
    /// Queues a match. Never blocks.
    ///
    /// Returns false if the receiver is gone.
    #[inline]
    pub fn push(&self, found: Match) -> bool {
        self.tx.send(found).is_ok()
    }
}

/// Consumer half, owned by the coordinator.
///
/// Once every [`MatchSender`] has been dropped the channel reports itself
/// disconnected, which is how the coordinator learns that all workers exited.
#[derive(Debug)]
pub struct MatchReceiver {
    rx: Receiver<Match>,
}

impl MatchReceiver {
    /// Waits up to `timeout` for the next match.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Match, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    /// Takes everything still queued, in arrival order.
    ///
    /// Arrival order is not sequence order.
    pub fn drain(self) -> Vec<Match> {
        self.rx.try_iter().collect()
    }
}
