// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

use criterion::{criterion_group, criterion_main, Criterion};

use evban_rs::prelude::*;

fn synthetic_atoms(n: usize) -> Vec<Atom> {
    // deterministic pseudo-random positions inside a 25 Å box
    let mut state = 88172645463325252u64;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state % 25_000) as f32 / 1000.0
    };

    (0..n)
        .map(|i| {
            Atom::new(
                i + 1,
                i / 3 + 1,
                1,
                0.0,
                Vector3D::new(next(), next(), next()),
            )
        })
        .collect()
}

fn benchmark_pair_distances(c: &mut Criterion) {
    let sbox = SimBox::from([25.0, 25.0, 25.0]);
    let atoms = synthetic_atoms(1000);
    let refs_a: Vec<&Atom> = atoms.iter().take(2).collect();
    let refs_b: Vec<&Atom> = atoms.iter().skip(2).collect();

    c.bench_function("pair_distances 2x998", |b| {
        b.iter(|| evban_rs::analysis::geometry::pair_distances(&refs_a, &refs_b, &sbox))
    });
}

fn benchmark_min_image_distance(c: &mut Criterion) {
    let sbox = SimBox::from([25.0, 25.0, 25.0]);
    let point1 = Vector3D::new(1.0, 24.0, 12.5);
    let point2 = Vector3D::new(24.0, 1.0, 13.0);

    c.bench_function("min image distance", |b| {
        b.iter(|| point1.distance(&point2, &sbox))
    });
}

criterion_group!(
    benches,
    benchmark_pair_distances,
    benchmark_min_image_distance
);
criterion_main!(benches);
