// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 ipcbench contributors
//
// The pluggable transport seam. Five variants move the same fixed-size
// block through fundamentally different kernel channels; the traits
// here are what lets one benchmark loop drive all of them fairly.
//
// Each worker attaches its own endpoint by name/key/id, exactly the
// way two separate processes would: separate file descriptors,
// separate mappings, separate socket ends. The transport applies no
// locking of its own — ordering comes from the external handshake
// pair or from the primitive's own blocking semantics.

use std::fmt;
use std::str::FromStr;

use crate::config::Config;
use crate::error::Result;

mod file;
mod mmap;
mod queue;
mod shm;
mod socket;

pub use file::FileTransport;
pub use mmap::MappedFileTransport;
pub use queue::MessageQueueTransport;
pub use shm::SharedMemoryTransport;
pub use socket::SocketTransport;

/// Which side of the channel a worker drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Producer,
    Consumer,
}

/// One worker's attachment to the channel.
pub trait Endpoint {
    /// Transfer exactly `block.len()` bytes into the channel.
    fn send(&mut self, block: &[u8]) -> Result<()>;

    /// Fill `out` from the channel. Blocks until data is available.
    /// Returns the byte count, which must equal `out.len()`; a short
    /// transfer is fatal and is reported, never retried.
    fn recv(&mut self, out: &mut [u8]) -> Result<usize>;
}

/// One IPC mechanism: owns the named resource for the duration of a
/// run and hands out per-role endpoints.
pub trait Transport: Sync + Sized {
    type Endpoint: Endpoint;

    /// Create (or re-create) the underlying named resource, sized for
    /// at least one block. Fatal on OS refusal; never retried.
    fn setup(cfg: &Config) -> Result<Self>;

    /// Attach one worker. Called from the worker's own thread.
    fn endpoint(&self, role: Role) -> Result<Self::Endpoint>;

    /// Whether producer and consumer need the external semaphore
    /// handshake. Variants whose primitive already blocks both sides
    /// (queue, stream socket) return false.
    fn needs_handshake(&self) -> bool {
        true
    }

    /// Best-effort wakeup of a peer blocked inside the primitive,
    /// called by a worker that failed. The default is a no-op; the
    /// semaphore variants propagate failure through the handshake
    /// pair instead.
    fn abort(&self) {}

    /// Release the resource and remove its name/key/id from the
    /// global namespace so repeated runs do not collide.
    fn teardown(self) -> Result<()>;
}

/// Transport selector, one per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    File,
    MappedFile,
    MessageQueue,
    SharedMemory,
    Socket,
}

impl Variant {
    pub const ALL: [Variant; 5] = [
        Variant::File,
        Variant::MappedFile,
        Variant::MessageQueue,
        Variant::SharedMemory,
        Variant::Socket,
    ];

    /// Short name used on the CLI and in semaphore name stems.
    pub fn label(&self) -> &'static str {
        match self {
            Variant::File => "file",
            Variant::MappedFile => "mmap",
            Variant::MessageQueue => "queue",
            Variant::SharedMemory => "shm",
            Variant::Socket => "socket",
        }
    }

    /// Human-readable title for report lines.
    pub fn title(&self) -> &'static str {
        match self {
            Variant::File => "File IPC",
            Variant::MappedFile => "mmap IPC",
            Variant::MessageQueue => "Message Queue IPC",
            Variant::SharedMemory => "Shared Memory IPC",
            Variant::Socket => "Unix Socket IPC",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "file" => Ok(Variant::File),
            "mmap" => Ok(Variant::MappedFile),
            "queue" => Ok(Variant::MessageQueue),
            "shm" => Ok(Variant::SharedMemory),
            "socket" => Ok(Variant::Socket),
            other => Err(format!(
                "unknown transport '{other}' (expected file, mmap, queue, shm or socket)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_labels_round_trip() {
        for v in Variant::ALL {
            assert_eq!(v.label().parse::<Variant>().unwrap(), v);
        }
    }

    #[test]
    fn unknown_variant_is_rejected() {
        assert!("pipe".parse::<Variant>().is_err());
    }
}
