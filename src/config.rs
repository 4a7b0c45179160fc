// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 ipcbench contributors
//
// Run configuration. Defaults match the workload this tool has always
// measured: 100k transfers of 2048-byte blocks through a 1 MiB slot.

use std::path::PathBuf;

use crate::error::{Error, Result};

pub const DEFAULT_BLOCK_SIZE: usize = 2048;
pub const DEFAULT_ITERATIONS: u64 = 100_000;
pub const DEFAULT_CAPACITY: usize = 1024 * 1024;
pub const DEFAULT_QUEUE_KEY: i32 = 1234;

/// Everything a run needs: sizes, counts, and the names/keys of the
/// named OS resources each transport creates and later unlinks.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bytes per transfer.
    pub block_size: usize,
    /// Number of transfers.
    pub iterations: u64,
    /// Backing-store size for the mapped and shared-memory variants.
    pub capacity: usize,
    /// Seed for the producer's block generator.
    pub seed: u64,
    /// Regular file used as the single-slot channel.
    pub file_path: PathBuf,
    /// File backing the shared mapping.
    pub map_path: PathBuf,
    /// System-V message queue key.
    pub queue_key: i32,
    /// Filesystem path the stream socket binds to.
    pub socket_path: PathBuf,
    /// Stem for the per-variant handshake semaphore names.
    pub sem_stem: String,
    /// Consumer re-derives the producer's blocks and compares each one.
    /// Used by tests; left off for timing runs.
    pub verify: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            iterations: DEFAULT_ITERATIONS,
            capacity: DEFAULT_CAPACITY,
            seed: 42,
            file_path: PathBuf::from("ipc_test_file"),
            map_path: PathBuf::from("mmap_test_file"),
            queue_key: DEFAULT_QUEUE_KEY,
            socket_path: PathBuf::from("/tmp/ipcbench.sock"),
            sem_stem: "ipcbench_sem".to_string(),
            verify: false,
        }
    }
}

impl Config {
    /// Reject size combinations the framing rules cannot satisfy.
    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(Error::Measurement("block_size must be non-zero".into()));
        }
        if self.iterations == 0 {
            return Err(Error::Measurement("iterations must be non-zero".into()));
        }
        // The cycling offset is i % (capacity - block_size); the last
        // byte written lands at offset + block_size - 1, so capacity
        // must exceed 2 * block_size - 1 for every offset to fit.
        if self.capacity < self.block_size * 2 {
            return Err(Error::Measurement(format!(
                "capacity {} too small for block_size {} (need at least 2x)",
                self.capacity, self.block_size
            )));
        }
        Ok(())
    }
}
