// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 ipcbench contributors
//
// Mutual-exclusion property of the permit pair: instrument a slot with
// read/write interval recording and assert that no producer interval
// ever overlaps a consumer interval, regardless of scheduling.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;

use ipcbench::handshake::HandshakePair;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Write,
    Read,
}

#[test]
fn writer_and_reader_intervals_never_overlap() {
    const N: usize = 300;

    let pair = Arc::new(HandshakePair::create("ipcbench_t_hs_overlap").expect("create pair"));
    let intervals: Arc<Mutex<Vec<(Side, Instant, Instant)>>> =
        Arc::new(Mutex::new(Vec::with_capacity(2 * N)));

    let writer = {
        let pair = Arc::clone(&pair);
        let intervals = Arc::clone(&intervals);
        thread::spawn(move || {
            for _ in 0..N {
                pair.begin_write().expect("begin_write");
                let start = Instant::now();
                // Simulated slot access; a non-zero window so an
                // exclusion bug actually shows up as an overlap.
                for i in 0..64u64 {
                    std::hint::black_box(i);
                }
                let end = Instant::now();
                intervals.lock().unwrap().push((Side::Write, start, end));
                pair.end_write().expect("end_write");
            }
        })
    };

    let reader = {
        let pair = Arc::clone(&pair);
        let intervals = Arc::clone(&intervals);
        thread::spawn(move || {
            for _ in 0..N {
                pair.begin_read().expect("begin_read");
                let start = Instant::now();
                for i in 0..64u64 {
                    std::hint::black_box(i);
                }
                let end = Instant::now();
                intervals.lock().unwrap().push((Side::Read, start, end));
                pair.end_read().expect("end_read");
            }
        })
    };

    writer.join().expect("writer");
    reader.join().expect("reader");
    pair.unlink();

    let mut recorded = intervals.lock().unwrap().clone();
    assert_eq!(recorded.len(), 2 * N);

    recorded.sort_by_key(|&(_, start, _)| start);

    // Strict alternation: sorted by start time the sides must
    // interleave W R W R ..., and no interval may begin before the
    // previous one ended.
    for window in recorded.windows(2) {
        let (side_a, _, end_a) = window[0];
        let (side_b, start_b, _) = window[1];
        assert_ne!(side_a, side_b, "two consecutive slot accesses by the same side");
        assert!(
            start_b >= end_a,
            "slot access started before the previous one finished"
        );
    }
    assert_eq!(recorded[0].0, Side::Write, "reader entered the slot first");
}
