// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 ipcbench contributors
//
// Block generator benchmarks.
//
// Run with:
//   cargo bench --bench blockgen
//
// The generator sits inside the producer's critical section for the
// handshake variants, so its cost is part of every measured latency;
// this bench keeps an eye on it in isolation.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use ipcbench::block::BlockGenerator;

const SIZES: &[(&str, usize)] = &[
    ("small_64", 64),
    ("default_2048", 2048),
    ("large_8192", 8192),
];

fn bench_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("blockgen_fill");
    for &(label, size) in SIZES {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(label), &size, |b, &size| {
            let mut gen = BlockGenerator::new(42);
            let mut buf = vec![0u8; size];
            b.iter(|| {
                gen.fill(&mut buf);
                black_box(buf[0]);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_fill);
criterion_main!(benches);
