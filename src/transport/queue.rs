// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 ipcbench contributors
//
// System-V message queue transport. The queue blocks a receive until a
// message exists and blocks a send when full, so no external handshake
// is needed: one typed message carries one block.

use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::signal;
use crate::transport::{Endpoint, Role, Transport};

/// All benchmark messages share one type tag.
const MSG_TYPE: libc::c_long = 1;

pub struct MessageQueueTransport {
    msqid: i32,
    removed: AtomicBool,
}

impl MessageQueueTransport {
    fn remove_id(&self) -> Result<()> {
        if self.removed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let ret = unsafe { libc::msgctl(self.msqid, libc::IPC_RMID, std::ptr::null_mut()) };
        if ret != 0 {
            let e = std::io::Error::last_os_error();
            // Already gone is fine; anything else is a real failure.
            if !matches!(e.raw_os_error(), Some(libc::EINVAL) | Some(libc::EIDRM)) {
                return Err(Error::Resource {
                    op: "msgctl IPC_RMID",
                    source: e,
                });
            }
        }
        debug!(msqid = self.msqid, "removed message queue");
        Ok(())
    }
}

impl Transport for MessageQueueTransport {
    type Endpoint = MessageQueueEndpoint;

    fn setup(cfg: &Config) -> Result<Self> {
        let msqid = unsafe { libc::msgget(cfg.queue_key as libc::key_t, libc::IPC_CREAT | 0o666) };
        if msqid < 0 {
            return Err(Error::resource_os("msgget"));
        }
        debug!(key = cfg.queue_key, msqid, "created message queue");
        Ok(Self {
            msqid,
            removed: AtomicBool::new(false),
        })
    }

    fn endpoint(&self, role: Role) -> Result<MessageQueueEndpoint> {
        let _ = role;
        Ok(MessageQueueEndpoint {
            msqid: self.msqid,
            buf: MsgBuf::with_payload_len(0),
        })
    }

    fn needs_handshake(&self) -> bool {
        false
    }

    fn abort(&self) {
        // Removing the id wakes a peer blocked in msgsnd/msgrcv with
        // EIDRM, which it reports as a synchronization failure.
        let _ = self.remove_id();
    }

    fn teardown(self) -> Result<()> {
        self.remove_id()
    }
}

pub struct MessageQueueEndpoint {
    msqid: i32,
    // Reused across iterations; resized at most once per run so the
    // timed loop never allocates.
    buf: MsgBuf,
}

/// A send/receive buffer laid out as the kernel expects: a `c_long`
/// type tag followed by the payload bytes. Backed by `c_long` storage
/// so the tag is properly aligned.
struct MsgBuf {
    words: Vec<libc::c_long>,
}

impl MsgBuf {
    fn with_payload_len(len: usize) -> Self {
        let word = mem::size_of::<libc::c_long>();
        let words = vec![0; 1 + len.div_ceil(word)];
        Self { words }
    }

    fn ensure_payload_len(&mut self, len: usize) {
        let word = mem::size_of::<libc::c_long>();
        let needed = 1 + len.div_ceil(word);
        if self.words.len() < needed {
            self.words.resize(needed, 0);
        }
    }

    fn as_mut_ptr(&mut self) -> *mut libc::c_void {
        self.words.as_mut_ptr() as *mut libc::c_void
    }

    fn set_type(&mut self, mtype: libc::c_long) {
        self.words[0] = mtype;
    }

    fn payload_mut(&mut self, len: usize) -> &mut [u8] {
        unsafe {
            std::slice::from_raw_parts_mut(self.words.as_mut_ptr().add(1) as *mut u8, len)
        }
    }
}

impl Endpoint for MessageQueueEndpoint {
    fn send(&mut self, block: &[u8]) -> Result<()> {
        self.buf.ensure_payload_len(block.len());
        self.buf.set_type(MSG_TYPE);
        self.buf.payload_mut(block.len()).copy_from_slice(block);
        loop {
            let ret = unsafe { libc::msgsnd(self.msqid, self.buf.as_mut_ptr(), block.len(), 0) };
            if ret == 0 {
                return Ok(());
            }
            let e = std::io::Error::last_os_error();
            match e.raw_os_error() {
                Some(libc::EINTR) if !signal::interrupted() => continue,
                Some(libc::EINTR) => {
                    return Err(Error::Synchronization {
                        op: "msgsnd",
                        reason: "interrupted by signal".into(),
                    })
                }
                Some(libc::EIDRM) => {
                    return Err(Error::Synchronization {
                        op: "msgsnd",
                        reason: "queue removed by peer".into(),
                    })
                }
                _ => return Err(Error::transfer_os("msgsnd")),
            }
        }
    }

    fn recv(&mut self, out: &mut [u8]) -> Result<usize> {
        self.buf.ensure_payload_len(out.len());
        loop {
            let n = unsafe {
                libc::msgrcv(self.msqid, self.buf.as_mut_ptr(), out.len(), MSG_TYPE, 0)
            };
            if n >= 0 {
                let n = n as usize;
                if n != out.len() {
                    return Err(Error::Transfer {
                        op: "msgrcv",
                        reason: format!("short message: {n} of {} bytes", out.len()),
                    });
                }
                out.copy_from_slice(self.buf.payload_mut(n));
                return Ok(n);
            }
            let e = std::io::Error::last_os_error();
            match e.raw_os_error() {
                Some(libc::EINTR) if !signal::interrupted() => continue,
                Some(libc::EINTR) => {
                    return Err(Error::Synchronization {
                        op: "msgrcv",
                        reason: "interrupted by signal".into(),
                    })
                }
                Some(libc::EIDRM) => {
                    return Err(Error::Synchronization {
                        op: "msgrcv",
                        reason: "queue removed by peer".into(),
                    })
                }
                _ => return Err(Error::transfer_os("msgrcv")),
            }
        }
    }
}
