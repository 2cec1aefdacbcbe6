//! Component-level microbenchmarks for flato.
//! Focuses on match finding, package-merge, and whole-stream encode/decode.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use flato::{compress, decompress, package_merge_any, MatchFinder};

fn make_pattern(len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    let pattern = b"The quick brown fox jumps over the lazy dog. ";
    while out.len() < len {
        out.extend_from_slice(pattern);
    }
    out.truncate(len);
    out
}

fn make_random(len: usize, mut seed: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    while out.len() < len {
        seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
        out.push((seed >> 16) as u8);
    }
    out.truncate(len);
    out
}

fn bench_match_finder(c: &mut Criterion) {
    let compressible = make_pattern(1 << 20);
    let random = make_random(1 << 20, 0x1234_5678);

    let mut group = c.benchmark_group("match_finder");
    group.throughput(Throughput::Bytes(compressible.len() as u64));

    group.bench_with_input(
        BenchmarkId::new("compressible_level6", "1mb"),
        &compressible,
        |b, data| {
            let mut finder = MatchFinder::new(6);
            let mut tokens = Vec::new();
            b.iter(|| {
                finder.compress_into(black_box(data), &mut tokens);
                black_box(tokens.len())
            });
        },
    );

    group.bench_with_input(
        BenchmarkId::new("random_level6", "1mb"),
        &random,
        |b, data| {
            let mut finder = MatchFinder::new(6);
            let mut tokens = Vec::new();
            b.iter(|| {
                finder.compress_into(black_box(data), &mut tokens);
                black_box(tokens.len())
            });
        },
    );

    group.finish();
}

fn bench_package_merge(c: &mut Criterion) {
    // Printable-ASCII-shaped histogram, the usual text case.
    let mut freqs = vec![0u32; 95];
    let mut seed = 0xBEEFu32;
    for _ in 0..(64 << 10) {
        seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
        freqs[(seed % 95) as usize] += 1;
    }

    let mut group = c.benchmark_group("package_merge");
    group.bench_function("ascii_histogram_limit15", |b| {
        b.iter(|| package_merge_any(black_box(&freqs), 15).unwrap());
    });

    let mut fib = vec![1u32, 1];
    while fib.len() < 42 {
        fib.push(fib[fib.len() - 1] + fib[fib.len() - 2]);
    }
    group.bench_function("fibonacci42_limit32", |b| {
        b.iter(|| package_merge_any(black_box(&fib), 32).unwrap());
    });

    group.finish();
}

fn bench_deflate(c: &mut Criterion) {
    let compressible = make_pattern(1 << 20);
    let random = make_random(1 << 20, 0x9E37_79B9);

    let mut group = c.benchmark_group("deflate");
    group.throughput(Throughput::Bytes(compressible.len() as u64));

    for level in [1, 6, 9] {
        group.bench_with_input(
            BenchmarkId::new("compressible", level),
            &compressible,
            |b, data| {
                b.iter(|| compress(black_box(data), level));
            },
        );
    }

    group.bench_with_input(BenchmarkId::new("random", 6), &random, |b, data| {
        b.iter(|| compress(black_box(data), 6));
    });

    group.finish();
}

fn bench_inflate(c: &mut Criterion) {
    let original = make_pattern(1 << 20);
    let compressed = compress(&original, 6);

    let mut group = c.benchmark_group("inflate");
    group.throughput(Throughput::Bytes(original.len() as u64));

    group.bench_with_input(
        BenchmarkId::new("compressible", "1mb"),
        &compressed,
        |b, data| {
            b.iter(|| decompress(black_box(data)).unwrap());
        },
    );

    group.finish();
}

criterion_group!(
    benches,
    bench_match_finder,
    bench_package_merge,
    bench_deflate,
    bench_inflate
);
criterion_main!(benches);
