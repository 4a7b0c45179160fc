// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 ipcbench contributors
//
// Memory-mapped-file transport. The backing file is sized to
// `capacity` once and mapped shared by each worker; after that a
// transfer is a pure memcpy, no syscall per iteration.
//
// The write offset cycles through the mapping, offset(i) = i % (cap -
// block), so successive iterations touch different address ranges
// instead of hammering one cache-hot region. Producer and consumer
// keep identical iteration counters, so both sides always compute the
// same offset for a given block.

use std::fs::{self, OpenOptions};
use std::os::unix::io::AsRawFd;
use std::path::PathBuf;
use std::ptr;

use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::transport::{Endpoint, Role, Transport};

pub struct MappedFileTransport {
    path: PathBuf,
    capacity: usize,
}

impl Transport for MappedFileTransport {
    type Endpoint = MappedFileEndpoint;

    fn setup(cfg: &Config) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&cfg.map_path)
            .map_err(|source| Error::Resource {
                op: "map file create",
                source,
            })?;
        file.set_len(cfg.capacity as u64)
            .map_err(|source| Error::Resource {
                op: "map file truncate",
                source,
            })?;
        debug!(
            path = %cfg.map_path.display(),
            capacity = cfg.capacity,
            "created mapping file"
        );
        Ok(Self {
            path: cfg.map_path.clone(),
            capacity: cfg.capacity,
        })
    }

    fn endpoint(&self, role: Role) -> Result<MappedFileEndpoint> {
        // Each worker maps the file itself; the two mappings alias the
        // same pages but live at independent addresses, like two
        // processes attaching the same segment.
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.path)
            .map_err(|source| Error::Resource {
                op: "map file open",
                source,
            })?;
        let mem = unsafe {
            libc::mmap(
                ptr::null_mut(),
                self.capacity,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                file.as_raw_fd(),
                0,
            )
        };
        // The mapping outlives the descriptor; `file` may close here.
        if mem == libc::MAP_FAILED {
            return Err(Error::resource_os("mmap"));
        }
        let _ = role;
        Ok(MappedFileEndpoint {
            mem: mem as *mut u8,
            capacity: self.capacity,
            iteration: 0,
        })
    }

    fn teardown(self) -> Result<()> {
        fs::remove_file(&self.path).map_err(|source| Error::Resource {
            op: "map file unlink",
            source,
        })?;
        debug!(path = %self.path.display(), "removed mapping file");
        Ok(())
    }
}

/// Offset of iteration `i` inside a mapping of `capacity` bytes
/// holding `block_size`-byte transfers. Stays in
/// `[0, capacity - block_size)`, so every block fits.
pub fn cycle_offset(iteration: u64, capacity: usize, block_size: usize) -> usize {
    (iteration % (capacity - block_size) as u64) as usize
}

pub struct MappedFileEndpoint {
    mem: *mut u8,
    capacity: usize,
    iteration: u64,
}

// Safety: each endpoint owns its own mapping; the pages behind it are
// shared between workers by design and only the handshake serializes
// access to them.
unsafe impl Send for MappedFileEndpoint {}

impl Endpoint for MappedFileEndpoint {
    fn send(&mut self, block: &[u8]) -> Result<()> {
        let offset = cycle_offset(self.iteration, self.capacity, block.len());
        unsafe {
            ptr::copy_nonoverlapping(block.as_ptr(), self.mem.add(offset), block.len());
        }
        self.iteration += 1;
        Ok(())
    }

    fn recv(&mut self, out: &mut [u8]) -> Result<usize> {
        let offset = cycle_offset(self.iteration, self.capacity, out.len());
        unsafe {
            ptr::copy_nonoverlapping(self.mem.add(offset), out.as_mut_ptr(), out.len());
        }
        self.iteration += 1;
        Ok(out.len())
    }
}

impl Drop for MappedFileEndpoint {
    fn drop(&mut self) {
        unsafe { libc::munmap(self.mem as *mut libc::c_void, self.capacity) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_stay_inside_the_mapping() {
        let capacity = 1024 * 1024;
        let block = 2048;
        for i in 0..200_000u64 {
            let off = cycle_offset(i, capacity, block);
            assert!(off < capacity - block);
            assert!(off + block <= capacity);
        }
    }

    #[test]
    fn offsets_cycle_with_period_capacity_minus_block() {
        let capacity = 4096;
        let block = 1024;
        let period = (capacity - block) as u64;
        assert_eq!(cycle_offset(0, capacity, block), 0);
        assert_eq!(cycle_offset(1, capacity, block), 1);
        assert_eq!(cycle_offset(period, capacity, block), 0);
        assert_eq!(cycle_offset(period + 7, capacity, block), 7);
    }
}
