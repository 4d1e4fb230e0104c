/// Normalizes a caller-supplied region name into the `/name` form POSIX
/// `shm_open` requires (a single leading slash, no other slashes).
pub fn posix_name(raw: &str) -> String {
    let trimmed = raw.trim_start_matches('/');
    format!("/{trimmed}")
}

/// Derives the semaphore name for a region, by appending a fixed `.lock`
/// suffix to its normalized shm name (§6) — the one scheme this
/// implementation uses, in place of the two inconsistent schemes the
/// original prototype shipped.
pub fn lock_name(raw: &str) -> String {
    format!("{}.lock", posix_name(raw))
}
