//! Mesh performance benchmarks.
//!
//! 1. Incremental vertex insertion at a few scales
//! 2. Constraint segment insertion through a populated mesh
//! 3. Point location with and without a walk hint
//!
//! Point sets come from a fixed seed so runs are comparable.

#![allow(missing_docs)]

use cdt_mesh::prelude::*;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;

const COUNTS: &[usize] = &[100, 1_000, 5_000];
const SIZE: f64 = 1_000.0;
const SEED: u64 = 0x00C0_FFEE;

fn random_points(count: usize, seed: u64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| Point::new(rng.random_range(0.0..SIZE), rng.random_range(0.0..SIZE)))
        .collect()
}

fn populated(count: usize) -> Mesh {
    let mut mesh = Mesh::new(SIZE, SIZE).unwrap();
    for p in random_points(count, SEED) {
        mesh.insert_vertex(p);
    }
    mesh
}

fn bench_vertex_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_vertex");
    for &count in COUNTS {
        let points = random_points(count, SEED.wrapping_add(count as u64));
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &points, |b, points| {
            b.iter(|| {
                let mut mesh = Mesh::new(SIZE, SIZE).unwrap();
                for &p in points {
                    black_box(mesh.insert_vertex(p));
                }
                mesh
            });
        });
    }
    group.finish();
}

fn bench_constraint_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_constraint_segment");
    group.sample_size(30);
    for &count in &COUNTS[..2] {
        let mesh = populated(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &mesh, |b, mesh| {
            b.iter_batched(
                || mesh.clone(),
                |mut mesh| {
                    black_box(mesh.insert_constraint_segment(
                        Point::new(1.0, SIZE * 0.3),
                        Point::new(SIZE - 1.0, SIZE * 0.7),
                    ))
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_locate(c: &mut Criterion) {
    let mesh = populated(COUNTS[1]);
    let queries = random_points(256, SEED ^ 0xFF);
    c.bench_function("locate_position/1000", |b| {
        b.iter(|| {
            for &q in &queries {
                black_box(mesh.locate_position(q).ok());
            }
        });
    });
}

criterion_group!(
    benches,
    bench_vertex_insertion,
    bench_constraint_insertion,
    bench_locate
);
criterion_main!(benches);
