// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 ipcbench contributors
//
// System-V shared memory transport. Unlike the other variants the key
// is IPC_PRIVATE: the kernel allocates a fresh id, the driver hands it
// to both endpoints, and each attaches its own mapping with shmat.
// One fixed region is overwritten every iteration — no offset cycling
// here; the handshake pair is the only ordering.

use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::transport::{Endpoint, Role, Transport};

pub struct SharedMemoryTransport {
    shmid: i32,
    block_size: usize,
    removed: AtomicBool,
}

impl SharedMemoryTransport {
    fn remove_id(&self) -> Result<()> {
        if self.removed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let ret = unsafe { libc::shmctl(self.shmid, libc::IPC_RMID, std::ptr::null_mut()) };
        if ret != 0 {
            let e = std::io::Error::last_os_error();
            if !matches!(e.raw_os_error(), Some(libc::EINVAL) | Some(libc::EIDRM)) {
                return Err(Error::Resource {
                    op: "shmctl IPC_RMID",
                    source: e,
                });
            }
        }
        debug!(shmid = self.shmid, "removed shared memory segment");
        Ok(())
    }
}

impl Transport for SharedMemoryTransport {
    type Endpoint = SharedMemoryEndpoint;

    fn setup(cfg: &Config) -> Result<Self> {
        // The segment holds exactly one block; IPC_PRIVATE never
        // collides with another run's key.
        let shmid =
            unsafe { libc::shmget(libc::IPC_PRIVATE, cfg.block_size, libc::IPC_CREAT | 0o666) };
        if shmid < 0 {
            return Err(Error::resource_os("shmget"));
        }
        debug!(shmid, size = cfg.block_size, "created shared memory segment");
        Ok(Self {
            shmid,
            block_size: cfg.block_size,
            removed: AtomicBool::new(false),
        })
    }

    fn endpoint(&self, role: Role) -> Result<SharedMemoryEndpoint> {
        let mem = unsafe { libc::shmat(self.shmid, ptr::null(), 0) };
        if mem as isize == -1 {
            return Err(Error::resource_os("shmat"));
        }
        let _ = role;
        Ok(SharedMemoryEndpoint {
            mem: mem as *mut u8,
            size: self.block_size,
        })
    }

    fn teardown(self) -> Result<()> {
        self.remove_id()
    }
}

pub struct SharedMemoryEndpoint {
    mem: *mut u8,
    size: usize,
}

// Safety: the segment is inter-process shared by design; each endpoint
// owns its own attachment and the handshake serializes access.
unsafe impl Send for SharedMemoryEndpoint {}

impl Endpoint for SharedMemoryEndpoint {
    fn send(&mut self, block: &[u8]) -> Result<()> {
        if block.len() > self.size {
            return Err(Error::Transfer {
                op: "shm write",
                reason: format!("block {} exceeds segment {}", block.len(), self.size),
            });
        }
        unsafe {
            ptr::copy_nonoverlapping(block.as_ptr(), self.mem, block.len());
        }
        Ok(())
    }

    fn recv(&mut self, out: &mut [u8]) -> Result<usize> {
        if out.len() > self.size {
            return Err(Error::Transfer {
                op: "shm read",
                reason: format!("block {} exceeds segment {}", out.len(), self.size),
            });
        }
        unsafe {
            ptr::copy_nonoverlapping(self.mem, out.as_mut_ptr(), out.len());
        }
        Ok(out.len())
    }
}

impl Drop for SharedMemoryEndpoint {
    fn drop(&mut self) {
        unsafe { libc::shmdt(self.mem as *const libc::c_void) };
    }
}
