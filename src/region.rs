//! Raw region provider.
//!
//! A kernel allocator pulls physical frames from a bitmap it already owns
//! and maps them itself; a user-space process has no such privilege and
//! must ask the host kernel directly. This module is the one place the
//! allocator ever talks to the OS: it reserves anonymous, page-aligned,
//! zero-initialised memory via `mmap` and never gives it back.

use std::io;
use std::ptr::NonNull;

/// Failure acquiring a backing region from the host OS.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RegionError {
    /// `mmap` refused the request; `errno` is the raw OS error code, or `-1`
    /// if the platform didn't report one.
    #[error("mmap failed to reserve {requested} bytes (errno {errno})")]
    MmapFailed { requested: usize, errno: i32 },
}

/// Acquires a contiguous, page-aligned, zero-initialised, read/write region
/// of at least `size` bytes. The region is anonymous (backed by no file) and
/// is held until the process exits; there is no corresponding release call.
pub(crate) fn acquire(size: usize) -> Result<NonNull<u8>, RegionError> {
    let rounded = crate::header::align_up(size.max(1), page_size());
    // SAFETY: a fixed, valid argument list for an anonymous private mapping;
    // the result is checked against MAP_FAILED before use.
    let addr = unsafe {
        libc::mmap(
            std::ptr::null_mut(),
            rounded,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
            -1,
            0,
        )
    };
    if addr == libc::MAP_FAILED {
        let errno = io::Error::last_os_error().raw_os_error().unwrap_or(-1);
        log::error!("mmap failed to reserve {rounded} bytes (errno {errno})");
        return Err(RegionError::MmapFailed {
            requested: rounded,
            errno,
        });
    }
    log::debug!("acquired {rounded} byte region at {addr:p}");
    // SAFETY: addr is non-null and non-MAP_FAILED at this point.
    Ok(unsafe { NonNull::new_unchecked(addr.cast()) })
}

fn page_size() -> usize {
    // SAFETY: sysconf with a well-known, always-valid name.
    unsafe { libc::sysconf(libc::_SC_PAGE_SIZE) as usize }
}
