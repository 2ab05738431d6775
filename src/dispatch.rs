//! Blocking provider calls on a dedicated worker pool.
//!
//! Collaborators do network I/O, so they run on the planner's own rayon pool
//! rather than the global one sized for CPU work. Each call is waited on with
//! a deadline; a call that misses it is reported as
//! [`ProviderError::TimedOut`] and its late answer is discarded. The worker
//! stays busy until the collaborator returns, so the pool should be sized for
//! a few stragglers on top of the fan-out.

use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

use crate::error::ProviderError;

/// Provider calls issued at once by the planner's fan-out.
pub const FAN_OUT_BRANCHES: usize = 5;

#[derive(Clone)]
pub struct ProviderPool {
    pool: Arc<ThreadPool>,
    timeout: Duration,
}

/// A provider call in flight.
pub struct Pending<T> {
    provider: &'static str,
    timeout: Duration,
    rx: mpsc::Receiver<Result<T, ProviderError>>,
}

impl ProviderPool {
    /// Builds a pool of at least [`FAN_OUT_BRANCHES`] threads.
    pub fn new(threads: usize, timeout: Duration) -> Result<Self, ThreadPoolBuildError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads.max(FAN_OUT_BRANCHES))
            .thread_name(|i| format!("planner-io-{}", i))
            .panic_handler(|_| tracing::error!("provider call panicked"))
            .build()?;
        Ok(Self {
            pool: Arc::new(pool),
            timeout,
        })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Starts `call` on the pool without waiting for it.
    pub fn dispatch<T, F>(&self, provider: &'static str, call: F) -> Pending<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, ProviderError> + Send + 'static,
    {
        let (tx, rx) = mpsc::sync_channel(1);
        self.pool.spawn(move || {
            // The receiver is gone once the deadline passed.
            let _ = tx.send(call());
        });
        Pending {
            provider,
            timeout: self.timeout,
            rx,
        }
    }

    /// Deadline for calls dispatched now.
    pub fn deadline(&self) -> Instant {
        Instant::now() + self.timeout
    }
}

impl<T> Pending<T> {
    /// Waits until `deadline` for the answer.
    pub fn wait(self, deadline: Instant) -> Result<T, ProviderError> {
        match self.rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(ProviderError::TimedOut {
                provider: self.provider,
                timeout: self.timeout,
            }),
            Err(RecvTimeoutError::Disconnected) => Err(ProviderError::unavailable(
                self.provider,
                "provider call panicked",
            )),
        }
    }
}
