//! Benchmarks for triangulation and frontal refinement.

use criterion::{criterion_group, criterion_main, Criterion};
use nalgebra::Point2;
use tessella::prelude::*;

fn disk_pslg(n: usize) -> (Vec<Point2<f64>>, Vec<[usize; 2]>) {
    let points = (0..n)
        .map(|i| {
            let t = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
            Point2::new(t.cos(), t.sin())
        })
        .collect();
    let segments = (0..n).map(|i| [i, (i + 1) % n]).collect();
    (points, segments)
}

fn bench_construction(c: &mut Criterion) {
    let (points, segments) = disk_pslg(64);
    c.bench_function("triangulate_disk_64", |b| {
        b.iter(|| Triangulator::new(&points, &segments, &[], &PlaneSurface).unwrap())
    });
}

fn bench_frontal(c: &mut Criterion) {
    let (points, segments) = disk_pslg(32);

    for h in [0.2, 0.1, 0.05] {
        c.bench_function(&format!("frontal_disk_h{h}"), |b| {
            b.iter(|| {
                let mut tri =
                    Triangulator::new(&points, &segments, &[], &PlaneSurface).unwrap();
                tri.frontal(&UniformFeatureSize::new(h), &FrontalOptions::default())
                    .unwrap();
                tri.mesh()
            })
        });
    }
}

criterion_group!(benches, bench_construction, bench_frontal);
criterion_main!(benches);
