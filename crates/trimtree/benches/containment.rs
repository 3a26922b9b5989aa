//! Containment queries against a polygonal circle: tree vs. linear scan.

use std::f64::consts::TAU;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trimtree::{CurveTree, FaceTrims, Point2};
use trimtree_nurbs::BSplineCurve2d;

fn circle_points(n: usize, radius: f64) -> Vec<Point2> {
    (0..=n)
        .map(|i| {
            let a = TAU * (i % n) as f64 / n as f64;
            Point2::new(radius * a.cos(), radius * a.sin())
        })
        .collect()
}

/// Even-odd test over every edge.
fn scan_contains(points: &[Point2], u: f64, v: f64) -> bool {
    let mut inside = false;
    for edge in points.windows(2) {
        let (a, b) = (edge[0], edge[1]);
        if (a.x <= u) != (b.x <= u) {
            let s = (u - a.x) / (b.x - a.x);
            if v <= a.y + s * (b.y - a.y) {
                inside = !inside;
            }
        }
    }
    inside
}

fn query_points() -> Vec<(f64, f64)> {
    (0..64)
        .map(|i| {
            let a = 0.37 * i as f64;
            let r = 0.05 + 1.4 * (i as f64 / 64.0);
            (r * a.cos(), r * a.sin())
        })
        .collect()
}

fn bench_containment(c: &mut Criterion) {
    let mut group = c.benchmark_group("containment");
    let queries = query_points();

    for n in [100, 1_000, 10_000] {
        let points = circle_points(n, 1.0);
        let face = FaceTrims::new(((-2.0, 2.0), (-2.0, 2.0)))
            .with_loop(vec![Box::new(BSplineCurve2d::polyline(points.clone()))]);
        let tree = CurveTree::build(&face);

        group.bench_with_input(BenchmarkId::new("tree", n), &tree, |b, tree| {
            b.iter(|| {
                queries
                    .iter()
                    .filter(|&&(u, v)| !tree.is_trimmed(black_box(u), black_box(v)))
                    .count()
            })
        });

        group.bench_with_input(BenchmarkId::new("scan", n), &points, |b, points| {
            b.iter(|| {
                queries
                    .iter()
                    .filter(|&&(u, v)| scan_contains(points, black_box(u), black_box(v)))
                    .count()
            })
        });
    }

    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let face = FaceTrims::new(((-2.0, 2.0), (-2.0, 2.0)))
        .with_loop(vec![Box::new(BSplineCurve2d::polyline(circle_points(
            10_000, 1.0,
        )))]);
    c.bench_function("build_10k_segments", |b| {
        b.iter(|| CurveTree::build(black_box(&face)))
    });
}

criterion_group!(benches, bench_containment, bench_build);
criterion_main!(benches);
