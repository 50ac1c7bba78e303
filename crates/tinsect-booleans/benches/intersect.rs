use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tinsect_booleans::{compute_splits, dedup_points, intersect_surfaces, IntersectSettings};
use tinsect_math::Point3;
use tinsect_surface::{Surface, Triangle};

/// Regular grid TIN of `n × n` cells over `[0, n]²` with elevation `f(x, y)`.
fn tin(id: &str, n: usize, f: impl Fn(f64, f64) -> f64) -> Surface {
    let at = |i: usize, j: usize| {
        let (x, y) = (i as f64, j as f64);
        Point3::new(x, y, f(x, y))
    };
    let mut triangles = Vec::with_capacity(n * n * 2);
    for i in 0..n {
        for j in 0..n {
            triangles.push(Triangle::new(at(i, j), at(i + 1, j), at(i + 1, j + 1)));
            triangles.push(Triangle::new(at(i, j), at(i + 1, j + 1), at(i, j + 1)));
        }
    }
    Surface::new(id, id, triangles)
}

fn terrain_pair(n: usize) -> [Surface; 2] {
    let half = n as f64 / 2.0;
    let ground = tin("EG", n, |x, y| ((x * 0.3).sin() + (y * 0.2).cos()) * 2.0);
    let design = tin("FG", n, |x, y| 0.1 * (x - half) + 0.05 * (y - half));
    [ground, design]
}

fn bench_intersect(c: &mut Criterion) {
    let settings = IntersectSettings::default();
    for n in [16, 64] {
        let surfaces = terrain_pair(n);
        c.bench_function(&format!("intersect_{}x{}", n, n), |b| {
            b.iter(|| intersect_surfaces(black_box(&surfaces), &settings))
        });
    }
}

fn bench_splits(c: &mut Criterion) {
    let settings = IntersectSettings::default();
    let [ground, design] = terrain_pair(32);
    c.bench_function("compute_splits_32x32", |b| {
        b.iter(|| compute_splits(black_box(&ground), black_box(&design), &settings))
    });
}

fn bench_dedup(c: &mut Criterion) {
    let points: Vec<Point3> = (0..20_000)
        .map(|i| {
            let t = i as f64 * 0.01;
            Point3::new(t.sin() * 100.0, t.cos() * 100.0, t)
        })
        .collect();
    c.bench_function("dedup_20k", |b| b.iter(|| dedup_points(black_box(&points), 0.05)));
}

criterion_group!(benches, bench_intersect, bench_splits, bench_dedup);
criterion_main!(benches);
