// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use circle_hull::{Arc, HullBuilder, HullConfig};
use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use std::f64::consts::TAU;

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

/// Circles scattered uniformly in a disc; most end up inside the hull.
fn gen_scattered(count: usize, spread: f64, seed: u64) -> Vec<Arc<u32>> {
    let mut rng = Rng::new(seed);
    (0..count)
        .map(|i| {
            let r = 0.5 + rng.next_f64() * 2.0;
            let d = spread * rng.next_f64().sqrt();
            let a = rng.next_f64() * TAU;
            Arc::placed(i as u32, r, d, a)
        })
        .collect()
}

/// Equal circles on a ring; every one of them is on the hull.
fn gen_ring(count: usize, distance: f64) -> Vec<Arc<u32>> {
    (0..count)
        .map(|i| Arc::placed(i as u32, 1.0, distance, i as f64 * TAU / count as f64))
        .collect()
}

/// A large center with small circles alternating around it, which splits arcs.
fn gen_jagged(count: usize, seed: u64) -> Vec<Arc<u32>> {
    let mut rng = Rng::new(seed);
    (0..count)
        .map(|i| {
            let r = 0.2 + rng.next_f64();
            let d = if i % 2 == 0 { 10.0 } else { 10.5 };
            Arc::placed(i as u32, r, d, i as f64 * TAU / count as f64)
        })
        .collect()
}

fn build(circles: &[Arc<u32>]) -> usize {
    let mut builder = HullBuilder::new(HullConfig::default());
    builder.push_circle(u32::MAX, 10.0).unwrap();
    for c in circles {
        builder.push_arc(c).unwrap();
    }
    builder.build().unwrap().len()
}

fn bench_scattered(c: &mut Criterion) {
    let mut group = c.benchmark_group("scattered");
    for &n in &[64usize, 512, 4096] {
        let circles = gen_scattered(n, 40.0, 0x9E37_79B9_7F4A_7C15);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("build_n{}", n), |b| {
            b.iter(|| black_box(build(black_box(&circles))))
        });
    }
    group.finish();
}

fn bench_ring(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring");
    for &n in &[64usize, 512, 4096] {
        let circles = gen_ring(n, 100.0);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("build_n{}", n), |b| {
            b.iter(|| black_box(build(black_box(&circles))))
        });
    }
    group.finish();
}

fn bench_jagged(c: &mut Criterion) {
    let mut group = c.benchmark_group("jagged");
    let circles = gen_jagged(1024, 0xDEAD_BEEF);
    group.throughput(Throughput::Elements(1024));
    group.bench_function("build_n1024", |b| {
        b.iter_batched(
            || circles.clone(),
            |circles| black_box(build(&circles)),
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_scattered, bench_ring, bench_jagged);
criterion_main!(benches);
