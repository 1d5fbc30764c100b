#![allow(clippy::expect_used, clippy::cast_possible_truncation)]

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use s3prep::PartSplitter;
use std::{hint::black_box, io::Cursor};

const MIB: usize = 1024 * 1024;

fn split(data: &[u8], part_size: u64, read_size: usize) -> u64 {
    PartSplitter::new(Cursor::new(data), part_size)
        .expect("part size")
        .with_read_size(read_size)
        .expect("read size")
        .parts()
        .map(|part| part.expect("part").size())
        .sum()
}

pub fn from_elem(c: &mut Criterion) {
    let data = vec![0xAB_u8; 16 * MIB];

    let mut group = c.benchmark_group("split");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.sample_size(10);

    for read_size in [1024, 64 * 1024, 256 * 1024] {
        group.bench_with_input(
            BenchmarkId::new("read_size", read_size),
            &read_size,
            |b, &read_size| {
                b.iter(|| split(black_box(&data), (5 * MIB) as u64, read_size));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, from_elem);
criterion_main!(benches);
