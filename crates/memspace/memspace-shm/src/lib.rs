//! Mechanical POSIX primitives backing a tuple space: a named shared memory
//! object and a named semaphore used as a mutex.
//!
//! This crate knows nothing about the memspace binary layout. It only
//! provides "create exclusively or tell me it already exists" / "open an
//! existing one or tell me it doesn't" primitives over `shm_open`/`mmap` and
//! `sem_open`, plus an RAII lock guard. The bootstrap race (§4.1) and the
//! on-shmem header format live one layer up, in `memspace-core`.

mod lock;
mod name;
mod region;

pub use lock::{LockGuard, NamedLock};
pub use region::ShmRegion;

use thiserror::Error;

/// Errors surfaced by the mechanical shm/semaphore layer.
#[derive(Debug, Error)]
pub enum ShmError {
    /// `shm_open`/`sem_open` without `O_CREAT` found nothing by that name.
    #[error("no shared object named '{0}'")]
    NotFound(String),

    /// `shm_open`/`sem_open` with `O_CREAT | O_EXCL` lost the creation race.
    #[error("shared object '{0}' already exists")]
    AlreadyExists(String),

    /// Any other syscall failure (`ftruncate`, `mmap`, `fchmod`, ...).
    #[error("io error on '{name}'")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

pub(crate) use name::{lock_name, posix_name};
