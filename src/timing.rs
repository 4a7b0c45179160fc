// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 ipcbench contributors
//
// Consumer-side timing. The recorder brackets the receive loop with a
// monotonic clock; producer timing never enters the reported numbers.

use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// Captures a monotonic window around the consumer's receive loop.
pub struct TimingRecorder {
    start: Instant,
}

impl TimingRecorder {
    /// Start the clock immediately before the first receive.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Stop the clock after the last receive and freeze the metrics.
    pub fn stop(self, iterations: u64, block_size: usize) -> RunMetrics {
        RunMetrics {
            iterations,
            block_size,
            elapsed: self.start.elapsed(),
        }
    }
}

/// Immutable result of one timed run.
#[derive(Debug, Clone, Copy)]
pub struct RunMetrics {
    pub iterations: u64,
    pub block_size: usize,
    pub elapsed: Duration,
}

impl RunMetrics {
    /// Total elapsed time in integer microseconds.
    pub fn elapsed_micros(&self) -> u128 {
        self.elapsed.as_micros()
    }

    /// Mean per-iteration latency in fractional microseconds.
    ///
    /// A zero-length window is a measurement error, not an infinity.
    pub fn latency_micros(&self) -> Result<f64> {
        self.guard()?;
        Ok(self.elapsed.as_micros() as f64 / self.iterations as f64)
    }

    /// Aggregate throughput in fractional MB/s (1 MB = 1024 * 1024 bytes).
    pub fn throughput_mb_s(&self) -> Result<f64> {
        self.guard()?;
        let bytes = self.block_size as f64 * self.iterations as f64;
        let bytes_per_sec = bytes / self.elapsed.as_micros() as f64 * 1e6;
        Ok(bytes_per_sec / 1024.0 / 1024.0)
    }

    fn guard(&self) -> Result<()> {
        if self.elapsed.as_micros() == 0 {
            return Err(Error::Measurement(
                "elapsed time is zero; window too small to report".into(),
            ));
        }
        if self.iterations == 0 {
            return Err(Error::Measurement("no iterations recorded".into()));
        }
        Ok(())
    }
}
