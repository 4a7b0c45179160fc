// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 ipcbench contributors
//
// Unix stream socket transport. The listener is bound during setup so
// the producer's connect cannot race the consumer's accept; blocking
// send/recv is the only backpressure, no external handshake.
//
// Stream semantics do not frame messages: one send does not guarantee
// one matching recv. The consumer therefore accumulates with
// read_exact until a whole block has arrived, instead of trusting a
// single call to deliver it.

use std::fs;
use std::io::{Read, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::PathBuf;

use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::transport::{Endpoint, Role, Transport};

pub struct SocketTransport {
    listener: UnixListener,
    path: PathBuf,
}

impl Transport for SocketTransport {
    type Endpoint = SocketEndpoint;

    fn setup(cfg: &Config) -> Result<Self> {
        // A stale socket file from a crashed run would make bind fail
        // with EADDRINUSE; clear it first.
        if cfg.socket_path.exists() {
            fs::remove_file(&cfg.socket_path).map_err(|source| Error::Resource {
                op: "socket unlink stale",
                source,
            })?;
        }
        let listener = UnixListener::bind(&cfg.socket_path).map_err(|source| Error::Resource {
            op: "socket bind",
            source,
        })?;
        debug!(path = %cfg.socket_path.display(), "bound stream socket");
        Ok(Self {
            listener,
            path: cfg.socket_path.clone(),
        })
    }

    fn endpoint(&self, role: Role) -> Result<SocketEndpoint> {
        let stream = match role {
            Role::Consumer => {
                let (stream, _addr) = self.listener.accept().map_err(|source| Error::Resource {
                    op: "socket accept",
                    source,
                })?;
                stream
            }
            Role::Producer => {
                UnixStream::connect(&self.path).map_err(|source| Error::Resource {
                    op: "socket connect",
                    source,
                })?
            }
        };
        Ok(SocketEndpoint { stream })
    }

    fn needs_handshake(&self) -> bool {
        false
    }

    fn teardown(self) -> Result<()> {
        drop(self.listener);
        fs::remove_file(&self.path).map_err(|source| Error::Resource {
            op: "socket unlink",
            source,
        })?;
        debug!(path = %self.path.display(), "removed socket path");
        Ok(())
    }
}

pub struct SocketEndpoint {
    stream: UnixStream,
}

impl Endpoint for SocketEndpoint {
    fn send(&mut self, block: &[u8]) -> Result<()> {
        self.stream.write_all(block).map_err(|e| Error::Transfer {
            op: "socket send",
            reason: e.to_string(),
        })
    }

    fn recv(&mut self, out: &mut [u8]) -> Result<usize> {
        self.stream.read_exact(out).map_err(|e| Error::Transfer {
            op: "socket recv",
            reason: e.to_string(),
        })?;
        Ok(out.len())
    }
}
