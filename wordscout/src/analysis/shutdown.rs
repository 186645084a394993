//! Shutdown barrier for the file worker pool.
//!
//! The orchestrator registers each worker before spawning it, so the active
//! count is already raised by the time `wait` runs. Each `WorkerGuard` lowers
//! the count and broadcasts under the same mutex when it drops, which also
//! happens if the worker panics. A waiter therefore cannot miss the final
//! wakeup, and cannot return while any registered worker is still running.
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Counts running workers and lets one thread block until none remain
#[derive(Debug, Default)]
pub struct ShutdownCoordinator {
    active: Mutex<usize>,
    changed: Condvar,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a worker; the returned guard signals completion on drop
    pub fn register(self: &Arc<Self>) -> WorkerGuard {
        *self.active.lock() += 1;
        WorkerGuard {
            coordinator: Arc::clone(self),
        }
    }

    /// Number of registered workers that have not finished
    pub fn active(&self) -> usize {
        *self.active.lock()
    }

    /// Blocks until every registered worker has finished
    pub fn wait(&self) {
        let mut active = self.active.lock();
        while *active > 0 {
            self.changed.wait(&mut active);
        }
    }

    /// Like `wait`, but gives up after `timeout`. Returns true if all workers finished.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut active = self.active.lock();
        while *active > 0 {
            if self.changed.wait_until(&mut active, deadline).timed_out() {
                return *active == 0;
            }
        }
        true
    }

    fn finish(&self) {
        let mut active = self.active.lock();
        *active = active.saturating_sub(1);
        self.changed.notify_all();
    }
}

/// Held by a running worker; dropping it marks the worker finished
#[derive(Debug)]
pub struct WorkerGuard {
    coordinator: Arc<ShutdownCoordinator>,
}

impl Drop for WorkerGuard {
    fn drop(&mut self) {
        self.coordinator.finish();
    }
}
