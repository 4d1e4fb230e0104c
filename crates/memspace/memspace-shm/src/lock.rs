use crate::{ShmError, lock_name};
use std::ffi::CString;
use tracing::{debug, trace};

/// A named POSIX semaphore used as a binary mutex.
///
/// Acquiring returns a [`LockGuard`] whose `Drop` releases the semaphore, so
/// every exit path — normal return, an early `?`, or an unwinding panic —
/// releases the lock exactly once. Callers should never call the raw
/// `sem_post`/`sem_wait` syscalls directly.
pub struct NamedLock {
    sem: *mut libc::sem_t,
    name: String,
}

// SAFETY: POSIX named semaphores are designed for concurrent cross-process
// and cross-thread use; `sem_wait`/`sem_post` are safe to call from any
// thread that holds a valid `sem_t*`.
unsafe impl Send for NamedLock {}
unsafe impl Sync for NamedLock {}

impl NamedLock {
    /// Opens an existing named semaphore. Fails with [`ShmError::NotFound`]
    /// if it has not been created yet.
    pub fn open_existing(name: &str) -> Result<Self, ShmError> {
        let posix = lock_name(name);
        let c_name = CString::new(posix.clone()).expect("semaphore name has no interior NUL");

        let sem = unsafe { libc::sem_open(c_name.as_ptr(), 0) };
        if sem == libc::SEM_FAILED {
            let err = std::io::Error::last_os_error();
            if err.raw_os_error() == Some(libc::ENOENT) {
                return Err(ShmError::NotFound(posix));
            }
            return Err(ShmError::Io { name: posix, source: err });
        }
        Ok(Self { sem, name: posix })
    }

    /// Creates a new named semaphore exclusively with the given initial
    /// value. Fails with [`ShmError::AlreadyExists`] if another process won
    /// the creation race first.
    ///
    /// The bootstrap protocol (§4.1/§4.3) creates this with an initial value
    /// of 0 — i.e. created-held — and releases it only once the region
    /// header has been fully initialized.
    pub fn create_exclusive(name: &str, initial_value: u32) -> Result<Self, ShmError> {
        let posix = lock_name(name);
        let c_name = CString::new(posix.clone()).expect("semaphore name has no interior NUL");

        let sem = unsafe {
            libc::sem_open(
                c_name.as_ptr(),
                libc::O_CREAT | libc::O_EXCL,
                0o666u32,
                initial_value,
            )
        };
        if sem == libc::SEM_FAILED {
            let err = std::io::Error::last_os_error();
            if err.raw_os_error() == Some(libc::EEXIST) {
                return Err(ShmError::AlreadyExists(posix));
            }
            return Err(ShmError::Io { name: posix, source: err });
        }
        debug!(name = %posix, initial_value, "sem_open: created new lock");
        Ok(Self { sem, name: posix })
    }

    /// Removes the semaphore's name from the system namespace.
    pub fn unlink(name: &str) -> Result<(), ShmError> {
        let posix = lock_name(name);
        let c_name = CString::new(posix.clone()).expect("semaphore name has no interior NUL");
        if unsafe { libc::sem_unlink(c_name.as_ptr()) } != 0 {
            let err = std::io::Error::last_os_error();
            return Err(ShmError::Io { name: posix, source: err });
        }
        Ok(())
    }

    /// Blocks until the lock is held exclusively, returning a guard that
    /// releases it on drop.
    pub fn acquire(&self) -> LockGuard<'_> {
        trace!(name = %self.name, "acquiring lock");
        let rc = unsafe { libc::sem_wait(self.sem) };
        debug_assert_eq!(rc, 0, "sem_wait failed unexpectedly");
        LockGuard { lock: self }
    }

    /// Releases one count on the semaphore directly, without a matching
    /// `acquire`. Used exactly once, by the bootstrap creator (§4.3 step 4),
    /// to hand off a lock that was created already-held.
    pub fn release_initial_hold(&self) {
        let rc = unsafe { libc::sem_post(self.sem) };
        debug_assert_eq!(rc, 0, "sem_post failed unexpectedly");
    }
}

impl Drop for NamedLock {
    fn drop(&mut self) {
        unsafe {
            libc::sem_close(self.sem);
        }
    }
}

/// RAII guard for a held [`NamedLock`]. Releases the lock when dropped,
/// covering normal returns, early `?` propagation, and unwinding panics
/// alike.
#[must_use = "the lock is held only as long as this guard is alive"]
pub struct LockGuard<'a> {
    lock: &'a NamedLock,
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        trace!(name = %self.lock.name, "releasing lock");
        let rc = unsafe { libc::sem_post(self.lock.sem) };
        debug_assert_eq!(rc, 0, "sem_post failed unexpectedly");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_name(tag: &str) -> String {
        format!("memspace_lock_test_{tag}_{}", std::process::id())
    }

    #[test]
    fn acquire_then_release_allows_reentry() {
        let name = unique_name("reentry");
        let lock = NamedLock::create_exclusive(&name, 1).unwrap();
        {
            let _guard = lock.acquire();
        }
        {
            let _guard = lock.acquire();
        }
        drop(lock);
        NamedLock::unlink(&name).unwrap();
    }

    #[test]
    fn created_held_releases_once_via_initial_hold() {
        let name = unique_name("held");
        let lock = NamedLock::create_exclusive(&name, 0).unwrap();
        lock.release_initial_hold();
        let _guard = lock.acquire();
        drop(lock);
        NamedLock::unlink(&name).unwrap();
    }

    #[test]
    fn create_exclusive_twice_loses_the_race() {
        let name = unique_name("race");
        let _first = NamedLock::create_exclusive(&name, 1).unwrap();
        let second = NamedLock::create_exclusive(&name, 1);
        assert!(matches!(second, Err(ShmError::AlreadyExists(_))));
        NamedLock::unlink(&name).unwrap();
    }
}
