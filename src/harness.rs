// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 ipcbench contributors
//
// The driver. One run: create the channel, create the handshake pair
// if the variant needs one, let a producer and a consumer loop N times
// against their own endpoints, join both, and release every named
// resource on every exit path — success or not, nothing may leak into
// the next run.
//
// The two workers are scheduled independently and share nothing at the
// language level except the poison flag; all pacing flows through the
// channel and the permits. There is deliberately no timeout on any
// wait: a hang in one worker hangs the run, which is the honest
// behavior for a latency measurement.

use std::thread;

use tracing::{debug, warn};

use crate::block::BlockGenerator;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::handshake::HandshakePair;
use crate::timing::{RunMetrics, TimingRecorder};
use crate::transport::{
    Endpoint, FileTransport, MappedFileTransport, MessageQueueTransport, Role,
    SharedMemoryTransport, SocketTransport, Transport, Variant,
};

/// Run one transport variant to completion and return the consumer's
/// metrics.
pub fn run(variant: Variant, cfg: &Config) -> Result<RunMetrics> {
    cfg.validate()?;
    debug!(variant = variant.label(), iterations = cfg.iterations, "starting run");
    match variant {
        Variant::File => run_with(FileTransport::setup(cfg)?, variant, cfg),
        Variant::MappedFile => run_with(MappedFileTransport::setup(cfg)?, variant, cfg),
        Variant::MessageQueue => run_with(MessageQueueTransport::setup(cfg)?, variant, cfg),
        Variant::SharedMemory => run_with(SharedMemoryTransport::setup(cfg)?, variant, cfg),
        Variant::Socket => run_with(SocketTransport::setup(cfg)?, variant, cfg),
    }
}

fn run_with<T: Transport>(transport: T, variant: Variant, cfg: &Config) -> Result<RunMetrics> {
    let handshake = if transport.needs_handshake() {
        Some(HandshakePair::create(&format!(
            "{}_{}",
            cfg.sem_stem,
            variant.label()
        ))?)
    } else {
        None
    };

    let (produced, consumed) = thread::scope(|s| {
        let producer = s.spawn(|| {
            let res = transport
                .endpoint(Role::Producer)
                .and_then(|ep| produce(ep, handshake.as_ref(), cfg));
            if res.is_err() {
                if let Some(h) = handshake.as_ref() {
                    h.poison();
                }
                transport.abort();
            }
            res
        });
        let consumer = s.spawn(|| {
            let res = transport
                .endpoint(Role::Consumer)
                .and_then(|ep| consume(ep, handshake.as_ref(), cfg));
            if res.is_err() {
                if let Some(h) = handshake.as_ref() {
                    h.poison();
                }
                transport.abort();
            }
            res
        });
        (join_worker(producer), join_worker(consumer))
    });

    // Teardown happens regardless of how the workers fared.
    let teardown = transport.teardown();
    if let Some(h) = handshake {
        h.unlink();
    }

    let metrics = match (produced, consumed) {
        (Ok(()), Ok(metrics)) => metrics,
        (Err(e), _) | (_, Err(e)) => {
            if let Err(t) = teardown {
                warn!(error = %t, "teardown failed after worker error");
            }
            return Err(e);
        }
    };
    teardown?;
    debug!(variant = variant.label(), "run complete");
    Ok(metrics)
}

fn join_worker<R>(handle: thread::ScopedJoinHandle<'_, Result<R>>) -> Result<R> {
    handle.join().unwrap_or_else(|_| {
        Err(Error::Synchronization {
            op: "join",
            reason: "worker panicked".into(),
        })
    })
}

/// Producer loop: N iterations of acquire-slot, generate, send,
/// publish. The block buffer is allocated once and overwritten in
/// place each iteration.
fn produce<E: Endpoint>(mut ep: E, hs: Option<&HandshakePair>, cfg: &Config) -> Result<()> {
    let mut gen = BlockGenerator::new(cfg.seed);
    let mut block = vec![0u8; cfg.block_size];
    for _ in 0..cfg.iterations {
        if let Some(h) = hs {
            h.begin_write()?;
        }
        gen.fill(&mut block);
        ep.send(&block)?;
        if let Some(h) = hs {
            h.end_write()?;
        }
    }
    Ok(())
}

/// Consumer loop: N receives, timed. A short transfer is fatal. In
/// verify mode every block is compared against the regenerated
/// producer sequence (tests only; skews timing).
fn consume<E: Endpoint>(
    mut ep: E,
    hs: Option<&HandshakePair>,
    cfg: &Config,
) -> Result<RunMetrics> {
    let mut buf = vec![0u8; cfg.block_size];
    let mut verifier = if cfg.verify {
        Some((BlockGenerator::new(cfg.seed), vec![0u8; cfg.block_size]))
    } else {
        None
    };

    let recorder = TimingRecorder::start();
    for i in 0..cfg.iterations {
        if let Some(h) = hs {
            h.begin_read()?;
        }
        let n = ep.recv(&mut buf)?;
        if let Some(h) = hs {
            h.end_read()?;
        }
        if n != cfg.block_size {
            return Err(Error::Transfer {
                op: "recv",
                reason: format!("short block at iteration {i}: {n} of {} bytes", cfg.block_size),
            });
        }
        if let Some((gen, expected)) = verifier.as_mut() {
            gen.fill(expected);
            if *expected != buf {
                return Err(Error::Transfer {
                    op: "recv",
                    reason: format!("content mismatch at iteration {i}"),
                });
            }
        }
    }
    Ok(recorder.stop(cfg.iterations, cfg.block_size))
}
