use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Trailing-edge debouncer holding at most one pending task.
///
/// Each `schedule` cancels the previously scheduled task, if it has not
/// fired yet, and arms a new one that runs once the quantum elapses. Only
/// the last call within a quantum actually executes.
#[derive(Debug)]
pub struct Debouncer {
    quantum: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(quantum: Duration) -> Self {
        Self {
            quantum,
            pending: None,
        }
    }

    pub fn quantum(&self) -> Duration {
        self.quantum
    }

    /// Cancels any pending task and schedules `task` after the quantum.
    pub fn schedule<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let quantum = self.quantum;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(quantum).await;
            task.await;
        }));
    }

    /// Drops the pending task, if any, without running it.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
