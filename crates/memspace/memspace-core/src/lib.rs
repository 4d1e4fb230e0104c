//! The tuple-space core: on-shmem binary layout, the creator/attacher
//! bootstrap race, and the `put`/`get`/`read` concurrency protocol.
//!
//! Payload bytes are opaque to this crate (§1); callers that want a concrete,
//! portable tuple encoding and wildcard-template matching should reach for
//! `memspace-codec` and drive [`Space::get`]/[`Space::read`] with the
//! predicates it builds.

mod error;
mod layout;
mod space;

pub use error::CoreError;
pub use layout::{DATA_START, FLAG_INVALID, MAGIC, PAGE_SIZE, SLOT_HEADER_LEN, VERSION};
pub use space::Space;
