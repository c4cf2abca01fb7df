//! Benchmarks for manifold reconstruction
//!
//! 1. **`ManifoldConstructor::new`**: Delaunay complex, poles and Voronoi cell measures
//! 2. **`cocone` / `bound_cocone`**: candidate selection, pruning and extraction
//! 3. **`minimum_spanning_tree`**: Kruskal over the Delaunay graph
//!
//! Points come from the notched unit sphere, which is deterministic for a
//! given point count.

#![allow(missing_docs)] // Criterion macros generate undocumented functions

use cocone::geometry::util::generate_sphere_with_notch;
use cocone::reconstruction::constructor::ManifoldConstructor;
use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

const RHO: f64 = 0.3;
const ALPHA: f64 = 0.14;

/// Macro to generate reconstruction benchmarks for one dimension
macro_rules! generate_reconstruction_benchmarks {
    ($dim:literal, [$($points:literal),+]) => {
        pastey::paste! {
            fn [<benchmark_reconstruction_ $dim d>](c: &mut Criterion) {
                let point_counts = [$($points),+];
                let mut group = c.benchmark_group(concat!("reconstruction_", stringify!($dim), "d"));
                group.sample_size(10);

                for &n_points in &point_counts {
                    let points = generate_sphere_with_notch::<$dim>(n_points, false).unwrap();
                    group.throughput(Throughput::Elements(n_points as u64));

                    group.bench_with_input(
                        BenchmarkId::new("constructor", n_points),
                        &points,
                        |b, points| {
                            b.iter(|| black_box(ManifoldConstructor::new(points, None).unwrap()));
                        },
                    );

                    let constructor = ManifoldConstructor::new(&points, None).unwrap();
                    group.bench_with_input(
                        BenchmarkId::new("cocone", n_points),
                        &constructor,
                        |b, constructor| {
                            b.iter(|| black_box(constructor.cocone(None).unwrap()));
                        },
                    );
                    group.bench_with_input(
                        BenchmarkId::new("bound_cocone", n_points),
                        &constructor,
                        |b, constructor| {
                            b.iter(|| black_box(constructor.bound_cocone(RHO, ALPHA, None).unwrap()));
                        },
                    );
                    group.bench_with_input(
                        BenchmarkId::new("minimum_spanning_tree", n_points),
                        &constructor,
                        |b, constructor| {
                            b.iter(|| black_box(constructor.minimum_spanning_tree(None).unwrap()));
                        },
                    );
                }

                group.finish();
            }
        }
    };
}

generate_reconstruction_benchmarks!(2, [500, 2000]);
generate_reconstruction_benchmarks!(3, [1000, 5000]);
generate_reconstruction_benchmarks!(4, [2000]);

/// Constructor without the BoundCocone cell measures
fn benchmark_cocone_only_constructor(c: &mut Criterion) {
    let mut group = c.benchmark_group("cocone_only_constructor");
    group.sample_size(10);
    for n_points in [1000usize, 5000] {
        group.throughput(Throughput::Elements(n_points as u64));
        group.bench_function(BenchmarkId::from_parameter(n_points), |b| {
            b.iter_batched(
                || generate_sphere_with_notch::<3>(n_points, false).unwrap(),
                |points| black_box(ManifoldConstructor::new_cocone_only(&points, None).unwrap()),
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_reconstruction_2d,
    benchmark_reconstruction_3d,
    benchmark_reconstruction_4d,
    benchmark_cocone_only_constructor
);
criterion_main!(benches);
