// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 ipcbench contributors
//
// Regular-file transport. One reusable slot at offset 0: the position
// is reset before every read and write, so each iteration overwrites
// the same region rather than appending a log. Ordering comes entirely
// from the external handshake pair.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::transport::{Endpoint, Role, Transport};

pub struct FileTransport {
    path: PathBuf,
}

impl Transport for FileTransport {
    type Endpoint = FileEndpoint;

    fn setup(cfg: &Config) -> Result<Self> {
        // Create-or-truncate so stale content from a previous run can
        // never be mistaken for a delivered block.
        File::create(&cfg.file_path).map_err(|source| Error::Resource {
            op: "file create",
            source,
        })?;
        debug!(path = %cfg.file_path.display(), "created slot file");
        Ok(Self {
            path: cfg.file_path.clone(),
        })
    }

    fn endpoint(&self, role: Role) -> Result<FileEndpoint> {
        // Each worker holds its own descriptor with its own position,
        // as two processes would.
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.path)
            .map_err(|source| Error::Resource {
                op: "file open",
                source,
            })?;
        let _ = role;
        Ok(FileEndpoint { file })
    }

    fn teardown(self) -> Result<()> {
        fs::remove_file(&self.path).map_err(|source| Error::Resource {
            op: "file unlink",
            source,
        })?;
        debug!(path = %self.path.display(), "removed slot file");
        Ok(())
    }
}

pub struct FileEndpoint {
    file: File,
}

impl Endpoint for FileEndpoint {
    fn send(&mut self, block: &[u8]) -> Result<()> {
        self.file
            .seek(SeekFrom::Start(0))
            .and_then(|_| self.file.write_all(block))
            .map_err(|e| Error::Transfer {
                op: "file write",
                reason: e.to_string(),
            })
    }

    fn recv(&mut self, out: &mut [u8]) -> Result<usize> {
        self.file
            .seek(SeekFrom::Start(0))
            .and_then(|_| self.file.read_exact(out))
            .map_err(|e| Error::Transfer {
                op: "file read",
                reason: e.to_string(),
            })?;
        Ok(out.len())
    }
}
