use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Process-wide flag ensuring at most one crawl session runs at a time
///
/// The guard is a plain object; callers share it through an `Arc`.
#[derive(Debug, Default)]
pub struct SessionGuard {
    running: AtomicBool,
}

impl SessionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically flips idle to running
    ///
    /// Returns false without blocking if a session already holds the guard.
    pub fn try_start(&self) -> bool {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Flips running back to idle
    pub fn finish(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// Reads the flag; never mutates or blocks
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Acquires the guard and returns a permit that releases it on drop
    pub fn try_acquire(self: &Arc<Self>) -> Option<SessionPermit> {
        if self.try_start() {
            Some(SessionPermit {
                guard: Arc::clone(self),
            })
        } else {
            None
        }
    }
}

/// Holds the session guard until dropped
#[derive(Debug)]
pub struct SessionPermit {
    guard: Arc<SessionGuard>,
}

impl Drop for SessionPermit {
    fn drop(&mut self) {
        self.guard.finish();
    }
}
