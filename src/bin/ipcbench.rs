// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 ipcbench contributors
//
// CLI entry point: picks the transports, runs each one, prints one
// report line per run. Exit code is non-zero on any failure.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ipcbench::transport::Variant;
use ipcbench::{harness, signal, Config, RunMetrics};

#[derive(Parser, Debug)]
#[command(
    name = "ipcbench",
    about = "Latency/throughput benchmark for POSIX IPC transports"
)]
struct Cli {
    /// Transport to run: file, mmap, queue, shm, socket, or all.
    #[arg(default_value = "all")]
    transport: String,

    /// Bytes per transfer.
    #[arg(long, default_value_t = ipcbench::config::DEFAULT_BLOCK_SIZE)]
    block_size: usize,

    /// Number of transfers.
    #[arg(long, default_value_t = ipcbench::config::DEFAULT_ITERATIONS)]
    iterations: u64,

    /// Backing-store size for the mapped and shared-memory variants.
    #[arg(long, default_value_t = ipcbench::config::DEFAULT_CAPACITY)]
    capacity: usize,

    /// Seed for the producer's block generator.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Filesystem path for the stream socket.
    #[arg(long, default_value = "/tmp/ipcbench.sock")]
    socket_path: PathBuf,
}

fn report(variant: Variant, metrics: &RunMetrics) -> ipcbench::Result<()> {
    println!(
        "{} Results: {} microseconds elapsed, Latency: {:.2} microseconds, Throughput: {:.2} MB/s",
        variant.title(),
        metrics.elapsed_micros(),
        metrics.latency_micros()?,
        metrics.throughput_mb_s()?,
    );
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let variants: Vec<Variant> = if cli.transport == "all" {
        Variant::ALL.to_vec()
    } else {
        match cli.transport.parse() {
            Ok(v) => vec![v],
            Err(e) => {
                eprintln!("ipcbench: {e}");
                return ExitCode::FAILURE;
            }
        }
    };

    let cfg = Config {
        block_size: cli.block_size,
        iterations: cli.iterations,
        capacity: cli.capacity,
        seed: cli.seed,
        socket_path: cli.socket_path,
        ..Config::default()
    };

    if let Err(e) = signal::install() {
        eprintln!("ipcbench: {e}");
        return ExitCode::FAILURE;
    }

    for variant in variants {
        let result = harness::run(variant, &cfg).and_then(|m| report(variant, &m));
        if let Err(e) = result {
            eprintln!("ipcbench: {}: {e}", variant.label());
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}
