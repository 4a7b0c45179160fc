// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 ipcbench contributors
//
// Named POSIX counting semaphore (sem_open family).
// The permit protocol on top of this lives in handshake.rs.

use std::ffi::CString;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::names;
use crate::signal;

/// A named, inter-process counting semaphore.
///
/// Both workers open the same name independently; the kernel object is
/// shared, the handle is per-opener. Dropping a handle closes it but
/// does not remove the name — `unlink` / `clear_storage` does that.
pub struct Semaphore {
    sem: *mut libc::sem_t,
    name: String, // POSIX name (with leading '/')
}

// Safety: sem_t operations are inter-process by construction; the raw
// pointer is only ever passed to sem_* calls.
unsafe impl Send for Semaphore {}
unsafe impl Sync for Semaphore {}

impl Semaphore {
    /// Open (or create) a named semaphore with `initial` permits.
    ///
    /// The initial value only applies if this call creates the object;
    /// opening an existing semaphore keeps its current count, which is
    /// why callers are expected to `clear_storage` before a run.
    pub fn open(name: &str, initial: u32) -> Result<Self> {
        let posix_name = names::make_sem_name(name);
        let c_name = CString::new(posix_name.as_bytes()).map_err(|_| Error::Resource {
            op: "sem_open",
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "name contains NUL"),
        })?;

        let sem = unsafe {
            libc::sem_open(
                c_name.as_ptr(),
                libc::O_CREAT,
                0o666 as libc::c_uint,
                initial as libc::c_uint,
            )
        };
        if sem == libc::SEM_FAILED {
            return Err(Error::resource_os("sem_open"));
        }

        debug!(name = %posix_name, initial, "opened semaphore");
        Ok(Self {
            sem,
            name: posix_name,
        })
    }

    /// Consume one permit, blocking until one is available.
    ///
    /// `EINTR` after an interrupt signal is surfaced as a
    /// `Synchronization` error so the worker can bail out through the
    /// normal teardown path; a spurious `EINTR` is retried.
    pub fn wait(&self) -> Result<()> {
        loop {
            let ret = unsafe { libc::sem_wait(self.sem) };
            if ret == 0 {
                return Ok(());
            }
            let errno = std::io::Error::last_os_error();
            if errno.raw_os_error() == Some(libc::EINTR) {
                if signal::interrupted() {
                    return Err(Error::Synchronization {
                        op: "sem_wait",
                        reason: "interrupted by signal".into(),
                    });
                }
                continue;
            }
            return Err(Error::sync_os("sem_wait"));
        }
    }

    /// Produce one permit, waking one blocked waiter if any.
    pub fn post(&self) -> Result<()> {
        let ret = unsafe { libc::sem_post(self.sem) };
        if ret != 0 {
            return Err(Error::sync_os("sem_post"));
        }
        Ok(())
    }

    /// Remove the name from the global namespace. The object itself
    /// lives until the last open handle closes.
    pub fn unlink(&self) {
        if let Ok(c_name) = CString::new(self.name.as_bytes()) {
            if unsafe { libc::sem_unlink(c_name.as_ptr()) } != 0 {
                let e = std::io::Error::last_os_error();
                if e.raw_os_error() != Some(libc::ENOENT) {
                    warn!(name = %self.name, error = %e, "sem_unlink failed");
                }
            }
        }
    }

    /// Remove a named semaphore without an open handle. Missing names
    /// are not an error — this is pre-run hygiene.
    pub fn clear_storage(name: &str) {
        let posix_name = names::make_sem_name(name);
        if let Ok(c_name) = CString::new(posix_name.as_bytes()) {
            unsafe { libc::sem_unlink(c_name.as_ptr()) };
        }
    }
}

impl Drop for Semaphore {
    fn drop(&mut self) {
        unsafe { libc::sem_close(self.sem) };
    }
}
