//! Benchmarks for marker-byte LZSS compression.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use marker_lzss::{decompress_to_vec, Compressor, Settings};

/// Calldata-like test data: zero padding, repeated selectors, and some noise.
fn generate_test_data(size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut state: u32 = 0x1234_5678;

    while data.len() < size {
        match (data.len() / 512) % 3 {
            0 => data.extend_from_slice(&[0; 28]),
            1 => data.extend_from_slice(b"\xa9\x05\x9c\xbb\x00\x00\x00\x00transfer"),
            _ => {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                data.push((state >> 24) as u8);
            }
        }
    }

    data.truncate(size);
    data
}

fn bench_compress(c: &mut Criterion) {
    let mut group = c.benchmark_group("lzss_compress");
    let compressor = Compressor::with_calldata_gas(Settings::new(0));

    for size in [1024, 4 * 1024, 16 * 1024] {
        let data = generate_test_data(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| compressor.compress_to_vec(black_box(data)).unwrap())
        });
    }

    group.finish();
}

fn bench_decompress(c: &mut Criterion) {
    let mut group = c.benchmark_group("lzss_decompress");
    let settings = Settings::new(0);
    let compressor = Compressor::with_calldata_gas(settings);

    for size in [1024, 4 * 1024, 16 * 1024] {
        let data = generate_test_data(size);
        let compressed = compressor.compress_to_vec(&data).unwrap();
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(size),
            &compressed,
            |b, compressed| {
                b.iter(|| decompress_to_vec(black_box(compressed), &settings, Some(size)).unwrap())
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_compress, bench_decompress);
criterion_main!(benches);
