// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 ipcbench contributors
//
// Latency/throughput benchmark harness for POSIX IPC transports.
// Five channels — file, mapped file, System-V message queue, System-V
// shared memory, Unix stream socket — driven by one producer/consumer
// loop with a shared timing methodology, so the reported numbers are
// comparable across primitives with very different synchronization
// disciplines.

pub mod block;
pub mod config;
pub mod error;
pub mod handshake;
pub mod harness;
pub mod names;
pub mod sem;
pub mod signal;
pub mod timing;
pub mod transport;

pub use config::Config;
pub use error::{Error, Result};
pub use timing::RunMetrics;
pub use transport::Variant;
