//! Benchmarks for tilestats.
//!
//! Run with:
//!     cargo bench

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};

use tilestats::TileStats;

// Minimal tile encoder for synthesizing bench input.
mod encode {
    pub fn varint(mut value: u64, out: &mut Vec<u8>) {
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                out.push(byte);
                break;
            }
            out.push(byte | 0x80);
        }
    }

    pub fn field(number: u32, wire_type: u8, out: &mut Vec<u8>) {
        varint(u64::from(number) << 3 | u64::from(wire_type), out);
    }

    pub fn len_field(number: u32, payload: &[u8], out: &mut Vec<u8>) {
        field(number, 2, out);
        varint(payload.len() as u64, out);
        out.extend_from_slice(payload);
    }

    pub fn string_value(s: &str) -> Vec<u8> {
        let mut out = Vec::new();
        len_field(1, s.as_bytes(), &mut out);
        out
    }

    pub fn feature(id: u64, geom_type: u64, tags: &[u32]) -> Vec<u8> {
        let mut out = Vec::new();
        field(1, 0, &mut out);
        varint(id, &mut out);

        let mut packed = Vec::new();
        for &tag in tags {
            varint(u64::from(tag), &mut packed);
        }
        len_field(2, &packed, &mut out);

        field(3, 0, &mut out);
        varint(geom_type, &mut out);

        let mut geometry = Vec::new();
        for command in [9u64, 2, 2] {
            varint(command, &mut geometry);
        }
        len_field(4, &geometry, &mut out);
        out
    }

    pub fn layer(name: &str, keys: &[&str], values: &[Vec<u8>], features: &[Vec<u8>]) -> Vec<u8> {
        let mut out = Vec::new();
        len_field(1, name.as_bytes(), &mut out);
        for feature in features {
            len_field(2, feature, &mut out);
        }
        for key in keys {
            len_field(3, key.as_bytes(), &mut out);
        }
        for value in values {
            len_field(4, value, &mut out);
        }
        field(5, 0, &mut out);
        varint(4096, &mut out);
        field(15, 0, &mut out);
        varint(2, &mut out);
        out
    }

    pub fn tile(layers: &[Vec<u8>]) -> Vec<u8> {
        let mut out = Vec::new();
        for layer in layers {
            len_field(3, layer, &mut out);
        }
        out
    }

    pub fn gzip(data: &[u8]) -> Vec<u8> {
        use std::io::Write;

        use flate2::Compression;
        use flate2::write::GzEncoder;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).expect("in-memory gzip");
        encoder.finish().expect("in-memory gzip")
    }
}

/// Builds a tile with `feature_count` features spread over 32 distinct
/// attribute values.
fn synthetic_tile(feature_count: u64) -> Vec<u8> {
    let values: Vec<Vec<u8>> = (0..32)
        .map(|i| encode::string_value(&format!("class-{}", i)))
        .collect();
    let features: Vec<Vec<u8>> = (0..feature_count)
        .map(|i| encode::feature(i, 2, &[0, (i % 32) as u32]))
        .collect();
    let layer = encode::layer("roads", &["class"], &values, &features);
    encode::tile(&[layer])
}

fn bench_ingest(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest");

    for feature_count in [16u64, 256, 4096] {
        let tile = synthetic_tile(feature_count);

        group.throughput(Throughput::Bytes(tile.len() as u64));
        group.bench_with_input(
            format!("features_{}", feature_count),
            &tile,
            |b, tile| {
                b.iter(|| {
                    let mut stats = TileStats::default();
                    stats.add_tile(black_box(tile)).unwrap();
                    black_box(stats.layer_count())
                });
            },
        );
    }

    group.finish();
}

fn bench_gzip(c: &mut Criterion) {
    let mut group = c.benchmark_group("gzip");
    let raw = synthetic_tile(1024);
    let compressed = encode::gzip(&raw);

    group.throughput(Throughput::Bytes(raw.len() as u64));
    group.bench_function("raw", |b| {
        b.iter(|| {
            let mut stats = TileStats::default();
            stats.add_tile(black_box(&raw)).unwrap();
            black_box(stats.tile_count())
        });
    });

    group.bench_function("gzipped", |b| {
        b.iter(|| {
            let mut stats = TileStats::default();
            stats.add_tile(black_box(&compressed)).unwrap();
            black_box(stats.tile_count())
        });
    });

    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");
    let tile = synthetic_tile(1024);

    group.bench_function("pairwise", |b| {
        b.iter(|| {
            let mut left = TileStats::default();
            left.add_tile(&tile).unwrap();
            let mut right = TileStats::default();
            right.add_tile(&tile).unwrap();
            left.merge(right);
            black_box(left.layer_count())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_ingest, bench_gzip, bench_merge);
criterion_main!(benches);
