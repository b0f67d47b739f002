//! LZW throughput benchmarks.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use oxigif_lzw::{compress, decompress};

fn make_indices(len: usize, alphabet: u32) -> Vec<u8> {
    (0..len as u32)
        .map(|i| ((i.wrapping_mul(2654435761) >> 20) % alphabet) as u8)
        .collect()
}

fn bench_compress(c: &mut Criterion) {
    let mut group = c.benchmark_group("lzw_compress");
    for size in [4 * 1024usize, 64 * 1024, 512 * 1024] {
        let indices = make_indices(size, 256);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &indices, |b, indices| {
            b.iter(|| compress(indices, 8).unwrap());
        });
    }
    group.finish();
}

fn bench_decompress(c: &mut Criterion) {
    let mut group = c.benchmark_group("lzw_decompress");
    for size in [4 * 1024usize, 64 * 1024, 512 * 1024] {
        let indices = make_indices(size, 256);
        let compressed = compress(&indices, 8).unwrap();
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(size),
            &compressed,
            |b, compressed| {
                b.iter(|| decompress(compressed, 8, size).unwrap());
            },
        );
    }
    group.finish();
}

fn bench_solid(c: &mut Criterion) {
    let mut group = c.benchmark_group("lzw_solid_color");
    let indices = vec![0u8; 256 * 1024];
    group.throughput(Throughput::Bytes(indices.len() as u64));
    group.bench_function("compress", |b| {
        b.iter(|| compress(&indices, 8).unwrap());
    });
    group.finish();
}

criterion_group!(benches, bench_compress, bench_decompress, bench_solid);
criterion_main!(benches);
