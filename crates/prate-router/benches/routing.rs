//! Routing benchmarks.
//!
//! Run with: `cargo bench -p prate-router`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use http::Method;
use prate_router::Router;

fn build_router(num_routes: usize) -> Router<usize> {
    let mut router = Router::new();
    let per_kind = num_routes / 3;

    for i in 0..per_kind {
        router
            .insert(Method::GET, &format!("/api/v1/resource{i}"), i)
            .unwrap();
        router
            .insert(Method::GET, &format!("/api/v1/resource{i}/:id"), per_kind + i)
            .unwrap();
        router
            .insert(
                Method::GET,
                &format!("/api/v1/org/:orgId/resource{i}/:id"),
                2 * per_kind + i,
            )
            .unwrap();
    }

    router
}

fn bench_static_match(c: &mut Criterion) {
    let router = build_router(100);

    c.bench_function("static_match", |b| {
        b.iter(|| black_box(router.match_route(&Method::GET, "/api/v1/resource20")));
    });
}

fn bench_param_match(c: &mut Criterion) {
    let router = build_router(100);

    c.bench_function("param_match", |b| {
        b.iter(|| black_box(router.match_route(&Method::GET, "/api/v1/resource25/12345")));
    });
}

fn bench_nested_param_match(c: &mut Criterion) {
    let router = build_router(100);

    c.bench_function("nested_param_match", |b| {
        b.iter(|| {
            black_box(router.match_route(&Method::GET, "/api/v1/org/acme-corp/resource10/12345"))
        });
    });
}

fn bench_miss(c: &mut Criterion) {
    let router = build_router(100);

    c.bench_function("miss", |b| {
        b.iter(|| black_box(router.match_route(&Method::GET, "/api/v1/nonexistent/path")));
    });
}

fn bench_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("scaling");

    for num_routes in [12, 48, 96, 480, 960] {
        let router = build_router(num_routes);

        group.bench_with_input(
            BenchmarkId::new("param_match", num_routes),
            &num_routes,
            |b, &n| {
                let path = format!("/api/v1/resource{}/12345", n / 6);
                b.iter(|| black_box(router.match_route(&Method::GET, &path)));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_static_match,
    bench_param_match,
    bench_nested_param_match,
    bench_miss,
    bench_scaling
);
criterion_main!(benches);
