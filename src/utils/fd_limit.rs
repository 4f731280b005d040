//! File descriptor limit detection for sanity-checking the open-file semaphore (Unix).

use log::warn;

/// Fraction of the process FD limit the semaphore may claim (leave headroom for sockets, stdio, walk handles).
const FD_LIMIT_FRACTION: f64 = 0.8;

/// Returns the soft limit for max open file descriptors, or `None` if unavailable (e.g. Windows).
#[cfg(unix)]
pub fn max_open_fds() -> Option<u64> {
    use std::mem::MaybeUninit;
    let mut rlim = MaybeUninit::<libc::rlimit>::uninit();
    if unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, rlim.as_mut_ptr()) } != 0 {
        return None;
    }
    let rlim = unsafe { rlim.assume_init() };
    let cur = rlim.rlim_cur;
    // RLIM_INFINITY is typically !0 or u64::MAX; treat as "no practical limit"
    if cur == libc::RLIM_INFINITY || cur > i64::MAX as u64 {
        return None;
    }
    Some(cur as u64)
}

#[cfg(not(unix))]
pub fn max_open_fds() -> Option<u64> {
    None
}

/// Usable descriptor budget (~80% of the soft limit), or `None` when there is no limit.
pub fn usable_fds() -> Option<usize> {
    let limit = max_open_fds()?;
    Some((limit as f64 * FD_LIMIT_FRACTION) as usize)
}

/// Warn when the semaphore capacity would not fit in the usable descriptor budget.
/// Capacity is left unchanged; the warning tells the operator to lower `--workers` or raise `ulimit -n`.
pub fn warn_if_permits_exceed_fd_limit(permits: usize) -> bool {
    match usable_fds() {
        Some(usable) if permits > usable => {
            warn!(
                "Open-file permits ({}) exceed ~80% of the descriptor limit ({}); consider fewer workers or a higher ulimit -n",
                permits, usable
            );
            true
        }
        _ => false,
    }
}
