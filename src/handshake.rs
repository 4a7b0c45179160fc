// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 ipcbench contributors
//
// Two-semaphore handshake enforcing strict producer/consumer
// alternation on a single shared slot.
//
// State machine per slot:
//   WRITABLE (writer=1, reader=0)  --end_write-->  READABLE (0, 1)
//   READABLE (writer=0, reader=1)  --end_read --->  WRITABLE (1, 0)
// No state lets both roles touch the slot at once; the permits are the
// sole concurrency control, the transport adds no locking of its own.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::sem::Semaphore;

/// The permit pair for one slot: `writer_permit` starts at 1 (slot is
/// free for the producer), `reader_permit` at 0 (nothing to read yet).
pub struct HandshakePair {
    writer_permit: Semaphore,
    reader_permit: Semaphore,
    poisoned: Arc<AtomicBool>,
    writer_name: String,
    reader_name: String,
}

impl HandshakePair {
    /// Create the pair under names derived from `stem`. Any leftover
    /// semaphores under those names are unlinked first so the initial
    /// counts are trustworthy.
    pub fn create(stem: &str) -> Result<Self> {
        let writer_name = format!("{stem}_write");
        let reader_name = format!("{stem}_read");
        Semaphore::clear_storage(&writer_name);
        Semaphore::clear_storage(&reader_name);
        let writer_permit = Semaphore::open(&writer_name, 1)?;
        let reader_permit = Semaphore::open(&reader_name, 0)?;
        Ok(Self {
            writer_permit,
            reader_permit,
            poisoned: Arc::new(AtomicBool::new(false)),
            writer_name,
            reader_name,
        })
    }

    fn check_poison(&self, op: &'static str) -> Result<()> {
        if self.poisoned.load(Ordering::Acquire) {
            return Err(Error::Synchronization {
                op,
                reason: "handshake poisoned by peer".into(),
            });
        }
        Ok(())
    }

    /// Block until the slot is writable. Must be paired with `end_write`.
    pub fn begin_write(&self) -> Result<()> {
        self.writer_permit.wait()?;
        self.check_poison("begin_write")
    }

    /// Publish the written slot to the reader.
    pub fn end_write(&self) -> Result<()> {
        self.reader_permit.post()
    }

    /// Block until the slot holds undelivered data. Pair with `end_read`.
    pub fn begin_read(&self) -> Result<()> {
        self.reader_permit.wait()?;
        self.check_poison("begin_read")
    }

    /// Hand the slot back to the writer.
    pub fn end_read(&self) -> Result<()> {
        self.writer_permit.post()
    }

    /// Mark the pair dead and wake both roles. Called by a worker that
    /// hit a fatal error so its peer fails fast instead of deadlocking
    /// on a permit that will never arrive.
    pub fn poison(&self) {
        self.poisoned.store(true, Ordering::Release);
        let _ = self.writer_permit.post();
        let _ = self.reader_permit.post();
    }

    /// Remove both names from the global namespace.
    pub fn unlink(&self) {
        self.writer_permit.unlink();
        self.reader_permit.unlink();
    }

    /// Semaphore names backing this pair (used by cleanup tests).
    pub fn names(&self) -> (&str, &str) {
        (&self.writer_name, &self.reader_name)
    }

    /// Remove a pair's names without an open handle.
    pub fn clear_storage(stem: &str) {
        Semaphore::clear_storage(&format!("{stem}_write"));
        Semaphore::clear_storage(&format!("{stem}_read"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alternation_single_thread() {
        let pair = HandshakePair::create("ipcbench_test_hs_alt").expect("create pair");
        // WRITABLE -> READABLE -> WRITABLE, twice, without blocking.
        for _ in 0..2 {
            pair.begin_write().expect("begin_write");
            pair.end_write().expect("end_write");
            pair.begin_read().expect("begin_read");
            pair.end_read().expect("end_read");
        }
        pair.unlink();
    }

    #[test]
    fn poison_wakes_blocked_reader() {
        let pair = Arc::new(HandshakePair::create("ipcbench_test_hs_poison").expect("create pair"));
        let reader = {
            let pair = Arc::clone(&pair);
            std::thread::spawn(move || pair.begin_read())
        };
        std::thread::sleep(std::time::Duration::from_millis(50));
        pair.poison();
        let res = reader.join().expect("join reader");
        assert!(matches!(res, Err(Error::Synchronization { .. })));
        pair.unlink();
    }
}
