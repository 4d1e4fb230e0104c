use crate::error::CoreError;
use crate::layout::{self, DATA_START, FLAG_INVALID, MAGIC, MIN_REGION_SIZE, SLOT_HEADER_LEN, VERSION};
use memspace_shm::{NamedLock, ShmError, ShmRegion};
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};

const READY_POLL_ATTEMPTS: u32 = 10;
const READY_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// A single attacher's handle onto a tuple space region.
///
/// `put`/`get`/`read` implement the protocol in §4.4–§4.6. The payload byte
/// string is opaque to `Space`: it neither inspects nor defines its format
/// beyond the slot's `length`/`fields` header (§1 — out of scope: tuple
/// payload encoding).
pub struct Space {
    region: ShmRegion,
    lock: NamedLock,
    name: String,
}

impl Space {
    /// Attaches to (creating if necessary) the named region, sized `size`
    /// bytes if this call wins the creation race (§4.1).
    pub fn open(name: &str, size: usize) -> Result<Self, CoreError> {
        if size < MIN_REGION_SIZE {
            return Err(CoreError::RegionTooSmall(size));
        }

        let (region, lock) = Self::connect_or_create(name, size)?;
        Self::wait_until_ready(&region, name, READY_POLL_ATTEMPTS, READY_POLL_INTERVAL)?;

        let found = unsafe { layout::read_version(&region) };
        if found != VERSION {
            error!(name, found, expected = VERSION, "version mismatch");
            return Err(CoreError::VersionMismatch { name: name.to_string(), found, expected: VERSION });
        }

        info!(name, size, "space attached");
        Ok(Self { region, lock, name: name.to_string() })
    }

    fn connect_or_create(name: &str, size: usize) -> Result<(ShmRegion, NamedLock), CoreError> {
        match Self::try_connect(name, size) {
            Ok(pair) => Ok(pair),
            Err(ShmError::NotFound(_)) => {
                debug!(name, "no existing region, attempting to create");
                match Self::try_create(name, size) {
                    Ok(pair) => Ok(pair),
                    Err(ShmError::AlreadyExists(_)) => {
                        warn!(name, "lost the creation race, attaching to the winner");
                        Self::try_connect(name, size).map_err(CoreError::from)
                    }
                    Err(e) => Err(e.into()),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    fn try_connect(name: &str, size: usize) -> Result<(ShmRegion, NamedLock), ShmError> {
        let region = ShmRegion::open_existing(name, size)?;
        let lock = NamedLock::open_existing(name)?;
        Ok((region, lock))
    }

    fn try_create(name: &str, size: usize) -> Result<(ShmRegion, NamedLock), ShmError> {
        let mut region = ShmRegion::create_exclusive(name, size)?;
        let lock = match NamedLock::create_exclusive(name, 0) {
            Ok(lock) => lock,
            Err(e) => {
                let _ = ShmRegion::unlink(name);
                return Err(e);
            }
        };

        // SAFETY: we just created this region exclusively; no other
        // attacher can be reading it yet (the lock is still held at 0 and
        // the magic tag has not been written).
        unsafe { Self::initialize(&mut region) };

        debug!(name, "initialized new region, releasing creation lock");
        lock.release_initial_hold();
        Ok((region, lock))
    }

    /// §4.3: write version, cursor, then magic last; the creator is assumed
    /// to be the sole writer at this point.
    unsafe fn initialize(region: &mut ShmRegion) {
        unsafe {
            layout::write_version(region, VERSION);
            layout::write_end(region, DATA_START as u32);
            layout::write_magic(region);
        }
    }

    fn wait_until_ready(
        region: &ShmRegion,
        name: &str,
        attempts: u32,
        interval: Duration,
    ) -> Result<(), CoreError> {
        for attempt in 0..attempts {
            let magic = unsafe { layout::read_magic(region) };
            if &magic == MAGIC {
                trace!(name, attempt, "region ready");
                return Ok(());
            }
            std::thread::sleep(interval);
        }
        error!(name, attempts, "region did not become ready before timeout");
        Err(CoreError::NotReady { name: name.to_string(), attempts })
    }

    /// §4.4: append `payload` (already serialized by the caller) as a new
    /// slot of the given arity.
    pub fn put(&mut self, payload: &[u8], arity: usize) -> Result<(), CoreError> {
        if arity > u8::MAX as usize {
            warn!(name = %self.name, arity, "put: arity exceeds the 255-field maximum");
            return Err(CoreError::ArityOverflow(arity));
        }
        let arity = arity as u8;

        let guard = self.lock.acquire();

        let end = unsafe { layout::read_end(&self.region) } as usize;
        let needed = SLOT_HEADER_LEN + payload.len();
        if end + needed > self.region.len() {
            let available = self.region.len().saturating_sub(end);
            drop(guard);
            warn!(name = %self.name, needed, available, "put: region exhausted");
            return Err(CoreError::SpaceExhausted { name: self.name.clone(), needed, available });
        }

        unsafe {
            layout::write_slot_header(&mut self.region, end, payload.len() as u32, arity, 0);
            layout::write_payload(&mut self.region, end + SLOT_HEADER_LEN, payload);
            layout::write_end(&mut self.region, (end + needed) as u32);
        }

        trace!(name = %self.name, offset = end, arity, len = payload.len(), "put");
        drop(guard);
        Ok(())
    }

    /// §4.5: scan for the first valid slot of the given arity whose payload
    /// satisfies `matches`, and atomically claim it (mark INVALID) before
    /// returning it. `matches` is supplied by the caller precisely because
    /// the payload format is opaque to `Space` — see `memspace-codec` for a
    /// ready-made wildcard-template matcher.
    pub fn get(&mut self, arity: u8, mut matches: impl FnMut(&[u8]) -> bool) -> Result<Option<Vec<u8>>, CoreError> {
        let mut cursor = DATA_START;
        loop {
            let end = unsafe { layout::read_end(&self.region) } as usize;
            if cursor >= end {
                return Ok(None);
            }

            let header = self.read_header_checked(cursor, end)?;
            if header.fields != arity || header.is_invalid() {
                cursor += header.total_len();
                continue;
            }

            let payload = unsafe { layout::read_payload(&self.region, cursor + SLOT_HEADER_LEN, header.length as usize) };
            if !matches(&payload) {
                cursor += header.total_len();
                continue;
            }

            let guard = self.lock.acquire();
            let flags_offset = layout::flags_offset(cursor);
            let current_flags = unsafe { layout::read_u8(&self.region, flags_offset) };
            if current_flags & FLAG_INVALID != 0 {
                drop(guard);
                cursor += header.total_len();
                continue;
            }
            unsafe { layout::write_u8(&mut self.region, flags_offset, current_flags | FLAG_INVALID) };
            drop(guard);

            trace!(name = %self.name, offset = cursor, arity, "get: claimed");
            return Ok(Some(payload));
        }
    }

    /// §4.6: identical scan to [`Space::get`], but never takes the lock and
    /// never marks a slot INVALID.
    pub fn read(&self, arity: u8, mut matches: impl FnMut(&[u8]) -> bool) -> Result<Option<Vec<u8>>, CoreError> {
        let mut cursor = DATA_START;
        loop {
            let end = unsafe { layout::read_end(&self.region) } as usize;
            if cursor >= end {
                return Ok(None);
            }

            let header = self.read_header_checked(cursor, end)?;
            if header.fields != arity || header.is_invalid() {
                cursor += header.total_len();
                continue;
            }

            let payload = unsafe { layout::read_payload(&self.region, cursor + SLOT_HEADER_LEN, header.length as usize) };
            if matches(&payload) {
                trace!(name = %self.name, offset = cursor, arity, "read: matched");
                return Ok(Some(payload));
            }
            cursor += header.total_len();
        }
    }

    fn read_header_checked(&self, cursor: usize, end: usize) -> Result<layout::SlotHeader, CoreError> {
        if cursor + SLOT_HEADER_LEN > self.region.len() {
            let reason = "slot header would overrun region";
            error!(name = %self.name, offset = cursor, reason, "corrupt slot");
            return Err(CoreError::CorruptSlot { name: self.name.clone(), offset: cursor as u32, reason });
        }
        let header = unsafe { layout::read_slot_header(&self.region, cursor) };
        if cursor + header.total_len() > end {
            let reason = "slot length would overrun end cursor";
            error!(name = %self.name, offset = cursor, reason, "corrupt slot");
            return Err(CoreError::CorruptSlot { name: self.name.clone(), offset: cursor as u32, reason });
        }
        Ok(header)
    }

    /// Current end cursor — mostly useful for tests and diagnostics.
    pub fn end_cursor(&self) -> u32 {
        unsafe { layout::read_end(&self.region) }
    }

    /// Region name this handle is attached to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// §4.7: detach. The mapped view and lock handle are dropped; the
    /// region and semaphore persist in the system namespace.
    pub fn close(self) {
        // Dropping `self.region` and `self.lock` performs the detach.
    }

    /// §4.7: close, then remove the shmem and semaphore names from the
    /// system namespace.
    pub fn unlink(self) -> Result<(), CoreError> {
        let name = self.name.clone();
        drop(self);
        ShmRegion::unlink(&name)?;
        NamedLock::unlink(&name)?;
        Ok(())
    }
}
