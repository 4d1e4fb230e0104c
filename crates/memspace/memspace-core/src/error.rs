use memspace_shm::ShmError;
use thiserror::Error;

/// Errors surfaced by the core `put`/`get`/`read` protocol (§7).
#[derive(Debug, Error)]
pub enum CoreError {
    /// The magic tag never appeared within the attach timeout.
    #[error("region '{name}' did not become ready after {attempts} attempts")]
    NotReady { name: String, attempts: u32 },

    /// The region's version byte did not match the version this
    /// implementation understands.
    #[error("region '{name}' has version {found}, expected {expected}")]
    VersionMismatch { name: String, found: u8, expected: u8 },

    /// `put` could not fit the new slot before the end of the region.
    #[error("region '{name}' is exhausted: {needed} bytes needed, {available} available")]
    SpaceExhausted { name: String, needed: usize, available: usize },

    /// A tuple or template arity exceeds the 1-byte field count.
    #[error("arity {0} exceeds the maximum of 255 fields")]
    ArityOverflow(usize),

    /// A slot header is internally inconsistent (e.g. `length` would overrun
    /// the region). Treated as fatal for the current operation; no attempt
    /// is made to repair it.
    #[error("corrupt slot at offset {offset} in region '{name}': {reason}")]
    CorruptSlot { name: String, offset: u32, reason: &'static str },

    /// The requested region size is too small to hold even an empty header.
    #[error("region size {0} is smaller than the minimum header size")]
    RegionTooSmall(usize),

    /// An underlying shm/semaphore syscall failed.
    #[error(transparent)]
    Shm(#[from] ShmError),
}
