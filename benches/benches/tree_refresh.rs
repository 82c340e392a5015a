// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use circle_hull_tree::{LocalCircle, NodeId, Tree};
use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use std::f64::consts::TAU;

/// A balanced tree with `fanout` children per node, `levels` deep.
fn gen_balanced(fanout: usize, levels: usize) -> (Tree, NodeId, Vec<NodeId>) {
    let mut tree = Tree::new();
    let root = tree.insert(None, LocalCircle::new(1.0)).unwrap();
    let mut frontier = vec![root];
    let mut leaves = Vec::new();
    for level in 1..=levels {
        let spacing = (levels - level + 1) as f64 * 6.0;
        let mut next = Vec::with_capacity(frontier.len() * fanout);
        for &parent in &frontier {
            for k in 0..fanout {
                let angle = k as f64 * TAU / fanout as f64;
                let id = tree
                    .insert(Some(parent), LocalCircle::new(1.0).at(spacing, angle))
                    .unwrap();
                next.push(id);
            }
        }
        leaves = next.clone();
        frontier = next;
    }
    (tree, root, leaves)
}

fn bench_full_refresh(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree");
    group.bench_function("full_refresh_fanout4_depth5", |b| {
        b.iter_batched(
            || gen_balanced(4, 5),
            |(mut tree, root, _)| black_box(tree.hull(root).unwrap().len()),
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_leaf_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree");
    let (mut tree, root, leaves) = gen_balanced(4, 5);
    tree.hull(root).unwrap();
    let mut i = 0_usize;
    group.bench_function("leaf_radius_then_root_hull", |b| {
        b.iter(|| {
            let leaf = leaves[i % leaves.len()];
            i += 1;
            tree.set_radius(leaf, 1.0 + (i % 7) as f64 * 0.1).unwrap();
            black_box(tree.hull(root).unwrap().len())
        })
    });
    group.bench_function("cached_root_wedge", |b| {
        b.iter(|| black_box(tree.bounding_wedge(root, 500.0).unwrap()))
    });
    group.finish();
}

fn bench_deep_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree");
    group.bench_function("chain_10000_refresh", |b| {
        b.iter_batched(
            || {
                let mut tree = Tree::new();
                let root = tree.insert(None, LocalCircle::new(1.0)).unwrap();
                let mut tip = root;
                for k in 0..10_000 {
                    let angle = (k % 5) as f64 * 0.1;
                    tip = tree
                        .insert(Some(tip), LocalCircle::new(1.0).at(1.5, angle))
                        .unwrap();
                }
                (tree, root)
            },
            |(mut tree, root)| black_box(tree.bounding_circle(root).unwrap().radius),
            BatchSize::LargeInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_full_refresh, bench_leaf_update, bench_deep_chain);
criterion_main!(benches);
