//! Throughput of the block cipher, digest and MAC.
//!
//! Run with:
//! ```bash
//! cargo bench --bench primitives
//! ```

#![allow(clippy::expect_used)]

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use tagvault_crypto::{CryptoEngine, Key, SecureMessage, derive_slot_key, digest, encrypt_block};

fn bench_block_cipher(c: &mut Criterion) {
    let key = [0x42u8; 16];
    c.bench_function("tea_encrypt_block", |b| {
        b.iter(|| encrypt_block(black_box(*b"tagvault"), black_box(&key)));
    });

    let engine = CryptoEngine::new(Key::from_slice(&key));
    let mut group = c.benchmark_group("tea_ecb");
    for size in [32usize, 256, 4096] {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut data = vec![0u8; size];
            b.iter(|| {
                engine
                    .encrypt(black_box(&mut data))
                    .expect("benchmark buffers are block aligned");
            });
        });
    }
    group.finish();
}

fn bench_digest(c: &mut Criterion) {
    let mut group = c.benchmark_group("digest");
    for size in [8usize, 48, 1024] {
        let data = vec![0x5Au8; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| digest(black_box(data)));
        });
    }
    group.finish();

    c.bench_function("derive_slot_key", |b| {
        b.iter(|| derive_slot_key(black_box(&[1, 2, 3, 4, 5, 6, 7, 8])));
    });
}

fn bench_message(c: &mut Criterion) {
    let engine = CryptoEngine::new(Key::from_slice(&[0x01, 0x23, 0x45, 0x67]));
    let uid = [0x04, 0x1A, 0x2B, 0x3C, 0x4D, 0x5E, 0x6F];
    c.bench_function("seal_uid_message", |b| {
        b.iter(|| {
            SecureMessage::seal_with_iv(&engine, [0u8; 8], black_box(&uid))
                .expect("padded input always seals")
                .to_hex()
        });
    });
}

criterion_group!(benches, bench_block_cipher, bench_digest, bench_message);
criterion_main!(benches);
