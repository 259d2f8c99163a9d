//! Per-session lock handles and the factory that creates them.
//!
//! The store hands one [`SessionLock`] to the caller per session so the
//! request layer can serialize concurrent requests against the same
//! session. The store itself never acquires these locks; its own
//! bookkeeping is protected by a separate coarse mutex.

use std::fmt;
use std::sync::Arc;

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

/// Capability for manufacturing per-session locks.
///
/// The store calls [`create_lock`](Self::create_lock) exactly once per
/// session creation, outside its own mutex.
pub trait LockFactory: Send + Sync {
    /// Create a fresh, unheld lock.
    fn create_lock(&self) -> SessionLock;
}

/// A cloneable, reentrant mutual-exclusion handle for one session.
///
/// Clones share the same underlying lock. Reentrant: the thread holding
/// the lock may acquire it again without deadlocking.
#[derive(Clone)]
pub struct SessionLock {
    inner: Arc<ReentrantMutex<()>>,
}

impl SessionLock {
    fn new() -> Self {
        Self {
            inner: Arc::new(ReentrantMutex::new(())),
        }
    }

    /// Block until the lock is held, returning a guard that releases it
    /// on drop.
    pub fn acquire(&self) -> SessionLockGuard<'_> {
        SessionLockGuard {
            _guard: self.inner.lock(),
        }
    }

    /// Try to take the lock without blocking.
    pub fn try_acquire(&self) -> Option<SessionLockGuard<'_>> {
        self.inner
            .try_lock()
            .map(|guard| SessionLockGuard { _guard: guard })
    }

    /// Whether two handles refer to the same underlying lock.
    pub fn same_lock(&self, other: &SessionLock) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for SessionLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionLock")
            .field("locked", &self.inner.is_locked())
            .finish()
    }
}

/// Guard returned by [`SessionLock::acquire`]; releases the lock on drop.
pub struct SessionLockGuard<'a> {
    _guard: ReentrantMutexGuard<'a, ()>,
}

/// Default lock factory backed by in-process reentrant mutexes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadLockFactory;

impl LockFactory for ThreadLockFactory {
    fn create_lock(&self) -> SessionLock {
        SessionLock::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_is_reentrant() {
        let lock = ThreadLockFactory.create_lock();
        let _outer = lock.acquire();
        let _inner = lock.acquire();
    }

    #[test]
    fn clones_share_the_lock() {
        let lock = ThreadLockFactory.create_lock();
        let other = lock.clone();
        assert!(lock.same_lock(&other));

        let fresh = ThreadLockFactory.create_lock();
        assert!(!lock.same_lock(&fresh));
    }

    #[test]
    fn try_acquire_fails_across_threads() {
        let lock = ThreadLockFactory.create_lock();
        let _held = lock.acquire();

        let other = lock.clone();
        std::thread::scope(|s| {
            s.spawn(move || {
                assert!(other.try_acquire().is_none());
            });
        });
    }
}
