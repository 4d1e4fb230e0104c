use crate::{ShmError, posix_name};
use std::ffi::CString;
use std::ptr;
use tracing::debug;

/// A mapped view of a POSIX named shared memory object.
///
/// Owns both the mapping and (implicitly, via the OS) the underlying object;
/// the file descriptor used to create the mapping is closed immediately
/// after `mmap` succeeds, matching the usual POSIX shm idiom of only needing
/// the fd long enough to map it.
pub struct ShmRegion {
    base: *mut u8,
    len: usize,
    name: String,
}

// SAFETY: the mapped region is shared memory; concurrent access from
// multiple threads/processes is the entire point. Callers are responsible
// for synchronizing writes (see `memspace-core`'s header/lock protocol).
unsafe impl Send for ShmRegion {}
unsafe impl Sync for ShmRegion {}

impl ShmRegion {
    /// Opens an existing shared memory object. Fails with
    /// [`ShmError::NotFound`] if it does not exist.
    pub fn open_existing(name: &str, len: usize) -> Result<Self, ShmError> {
        let posix = posix_name(name);
        let c_name = CString::new(posix.clone()).expect("shm name has no interior NUL");

        let fd = unsafe { libc::shm_open(c_name.as_ptr(), libc::O_RDWR, 0o666) };
        if fd == -1 {
            let err = std::io::Error::last_os_error();
            return Err(map_open_err(&posix, err));
        }
        debug!(name = %posix, "shm_open: attached to existing region");
        Self::map_and_close(fd, len, posix)
    }

    /// Creates a new shared memory object exclusively, sized to `len`.
    /// Fails with [`ShmError::AlreadyExists`] if another process won the
    /// creation race first.
    pub fn create_exclusive(name: &str, len: usize) -> Result<Self, ShmError> {
        let posix = posix_name(name);
        let c_name = CString::new(posix.clone()).expect("shm name has no interior NUL");

        let fd = unsafe {
            libc::shm_open(
                c_name.as_ptr(),
                libc::O_RDWR | libc::O_CREAT | libc::O_EXCL,
                0o666,
            )
        };
        if fd == -1 {
            let err = std::io::Error::last_os_error();
            if err.raw_os_error() == Some(libc::EEXIST) {
                return Err(ShmError::AlreadyExists(posix));
            }
            return Err(ShmError::Io { name: posix, source: err });
        }
        debug!(name = %posix, size = len, "shm_open: created new region");

        if unsafe { libc::ftruncate(fd, len as libc::off_t) } != 0 {
            let err = std::io::Error::last_os_error();
            unsafe { libc::close(fd) };
            let _ = unsafe { libc::shm_unlink(c_name.as_ptr()) };
            return Err(ShmError::Io { name: posix, source: err });
        }

        Self::map_and_close(fd, len, posix)
    }

    fn map_and_close(fd: i32, len: usize, name: String) -> Result<Self, ShmError> {
        let base = unsafe {
            libc::mmap(
                ptr::null_mut(),
                len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                fd,
                0,
            )
        };
        unsafe { libc::close(fd) };

        if base == libc::MAP_FAILED {
            let err = std::io::Error::last_os_error();
            return Err(ShmError::Io { name, source: err });
        }

        Ok(Self { base: base as *mut u8, len, name })
    }

    /// Removes the shared memory object's name from the system namespace.
    /// Existing mappings (including this one, until dropped) remain valid.
    pub fn unlink(name: &str) -> Result<(), ShmError> {
        let posix = posix_name(name);
        let c_name = CString::new(posix.clone()).expect("shm name has no interior NUL");
        if unsafe { libc::shm_unlink(c_name.as_ptr()) } != 0 {
            let err = std::io::Error::last_os_error();
            return Err(ShmError::Io { name: posix, source: err });
        }
        Ok(())
    }

    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.base
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.base
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for ShmRegion {
    fn drop(&mut self) {
        unsafe {
            libc::munmap(self.base as *mut libc::c_void, self.len);
        }
    }
}

fn map_open_err(name: &str, err: std::io::Error) -> ShmError {
    if err.raw_os_error() == Some(libc::ENOENT) {
        ShmError::NotFound(name.to_string())
    } else {
        ShmError::Io { name: name.to_string(), source: err }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_name(tag: &str) -> String {
        format!("memspace_shm_test_{tag}_{}", std::process::id())
    }

    #[test]
    fn create_then_open_round_trips_bytes() {
        let name = unique_name("roundtrip");
        let mut created = ShmRegion::create_exclusive(&name, 4096).unwrap();
        unsafe {
            *created.as_mut_ptr().add(0) = 0xAB;
            *created.as_mut_ptr().add(1) = 0xCD;
        }

        let attached = ShmRegion::open_existing(&name, 4096).unwrap();
        unsafe {
            assert_eq!(*attached.as_ptr().add(0), 0xAB);
            assert_eq!(*attached.as_ptr().add(1), 0xCD);
        }

        drop(created);
        drop(attached);
        ShmRegion::unlink(&name).unwrap();
    }

    #[test]
    fn create_exclusive_twice_loses_the_race() {
        let name = unique_name("race");
        let _first = ShmRegion::create_exclusive(&name, 4096).unwrap();
        let second = ShmRegion::create_exclusive(&name, 4096);
        assert!(matches!(second, Err(ShmError::AlreadyExists(_))));
        ShmRegion::unlink(&name).unwrap();
    }

    #[test]
    fn open_existing_missing_region_not_found() {
        let name = unique_name("missing");
        let err = ShmRegion::open_existing(&name, 4096).unwrap_err();
        assert!(matches!(err, ShmError::NotFound(_)));
    }
}
