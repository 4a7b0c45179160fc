// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 ipcbench contributors
//
// End-to-end runs of every transport with a small iteration count and
// verification enabled: the consumer regenerates the producer's seeded
// sequence and compares every block, so a single corrupted or
// reordered transfer fails the run.
//
// Each test uses its own resource names/keys so the tests can run in
// parallel without colliding in the kernel namespace.

use std::path::PathBuf;

use ipcbench::transport::Variant;
use ipcbench::{harness, Config};

fn test_config(tag: &str, queue_key: i32) -> Config {
    let tmp = std::env::temp_dir();
    Config {
        block_size: 256,
        iterations: 500,
        capacity: 8192,
        seed: 0xDEADBEEF,
        file_path: tmp.join(format!("ipcbench_{tag}.slot")),
        map_path: tmp.join(format!("ipcbench_{tag}.map")),
        queue_key,
        socket_path: tmp.join(format!("ipcbench_{tag}.sock")),
        sem_stem: format!("ipcbench_t_{tag}"),
        verify: true,
    }
}

/// Probe that a named semaphore does not exist: exclusive creation
/// must succeed. Cleans up after itself.
fn assert_sem_name_free(name: &str) {
    let posix_name = ipcbench::names::make_sem_name(name);
    let c_name = std::ffi::CString::new(posix_name.as_bytes()).unwrap();
    let sem = unsafe {
        libc::sem_open(
            c_name.as_ptr(),
            libc::O_CREAT | libc::O_EXCL,
            0o666 as libc::c_uint,
            0,
        )
    };
    assert!(
        sem != libc::SEM_FAILED,
        "semaphore {posix_name} leaked by a previous run"
    );
    unsafe {
        libc::sem_close(sem);
        libc::sem_unlink(c_name.as_ptr());
    }
}

fn assert_gone(path: &PathBuf) {
    assert!(!path.exists(), "leaked path: {}", path.display());
}

#[test]
fn file_end_to_end() {
    let cfg = test_config("file", 0x4201);
    let m = harness::run(Variant::File, &cfg).expect("file run");
    assert_eq!(m.iterations, cfg.iterations);
    assert_eq!(m.block_size, cfg.block_size);
    assert_gone(&cfg.file_path);
}

#[test]
fn mmap_end_to_end() {
    let cfg = test_config("mmap", 0x4202);
    let m = harness::run(Variant::MappedFile, &cfg).expect("mmap run");
    assert_eq!(m.iterations, cfg.iterations);
    assert_gone(&cfg.map_path);
}

#[test]
fn queue_end_to_end() {
    let cfg = test_config("queue", 0x4203);
    let m = harness::run(Variant::MessageQueue, &cfg).expect("queue run");
    assert_eq!(m.iterations, cfg.iterations);
}

#[test]
fn shm_end_to_end() {
    let cfg = test_config("shm", 0x4204);
    let m = harness::run(Variant::SharedMemory, &cfg).expect("shm run");
    assert_eq!(m.iterations, cfg.iterations);
}

#[test]
fn socket_end_to_end() {
    let cfg = test_config("socket", 0x4205);
    let m = harness::run(Variant::Socket, &cfg).expect("socket run");
    assert_eq!(m.iterations, cfg.iterations);
    assert_gone(&cfg.socket_path);
}

// Setup → teardown → setup → teardown with the same names/keys: the
// first run must not leave anything that blocks the second.
#[test]
fn repeated_runs_do_not_collide() {
    let cfg = test_config("repeat", 0x4206);
    for _ in 0..2 {
        harness::run(Variant::File, &cfg).expect("file repeat");
        harness::run(Variant::MessageQueue, &cfg).expect("queue repeat");
        harness::run(Variant::SharedMemory, &cfg).expect("shm repeat");
    }
}

// Shared-memory scenario: 1000 transfers of 64-byte blocks,
// all byte-for-byte verified, and teardown leaves neither a semaphore
// name nor a segment id behind.
#[test]
fn shm_scenario_small_blocks() {
    let mut cfg = test_config("shm_scn", 0x4207);
    cfg.block_size = 64;
    cfg.iterations = 1000;
    cfg.capacity = 4096;

    let m = harness::run(Variant::SharedMemory, &cfg).expect("shm scenario");
    assert_eq!(m.iterations, 1000);
    assert_eq!(m.block_size, 64);

    // The handshake semaphores for this run must be unlinked.
    assert_sem_name_free(&format!("{}_shm_write", cfg.sem_stem));
    assert_sem_name_free(&format!("{}_shm_read", cfg.sem_stem));
}

// Capacity below two blocks can't satisfy the cycling-offset rule and
// must be rejected before any resource is created.
#[test]
fn invalid_capacity_is_rejected_up_front() {
    let mut cfg = test_config("badcap", 0x4208);
    cfg.capacity = cfg.block_size;
    assert!(harness::run(Variant::MappedFile, &cfg).is_err());
    assert_gone(&cfg.map_path);
}
