//! Process-wide serialization of runtime access
//!
//! The automation runtime is not reentrant, so every query in the process
//! takes the same lock for its whole duration. This is a process-wide
//! singleton, not per executor: two executors built over different backends
//! still wait on each other.

use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

use tracing::trace;

static RUNTIME_LOCK: Mutex<()> = Mutex::new(());

/// Entry point for the process-wide runtime lock.
pub struct RuntimeGuard;

/// Exclusive access to the runtime, released on drop.
#[must_use = "the runtime is released as soon as the lease is dropped"]
pub struct RuntimeLease {
    _guard: MutexGuard<'static, ()>,
}

impl RuntimeGuard {
    /// Block until no other query holds the runtime.
    pub fn acquire() -> RuntimeLease {
        // A panic inside a previous query already dropped its handles
        let guard = RUNTIME_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        trace!("runtime lease acquired");
        RuntimeLease { _guard: guard }
    }

    /// Take the lease only if it is free right now.
    pub fn try_acquire() -> Option<RuntimeLease> {
        match RUNTIME_LOCK.try_lock() {
            Ok(guard) => Some(RuntimeLease { _guard: guard }),
            Err(TryLockError::Poisoned(poisoned)) => Some(RuntimeLease {
                _guard: poisoned.into_inner(),
            }),
            Err(TryLockError::WouldBlock) => None,
        }
    }
}

impl Drop for RuntimeLease {
    fn drop(&mut self) {
        trace!("runtime lease released");
    }
}
