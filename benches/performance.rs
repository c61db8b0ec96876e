// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Performance benchmarks

use compgeom::geometry::predicates::Tolerance;
use compgeom::geometry::primitives::{box_mesh, cylinder_mesh, sphere_mesh};
use compgeom::geometry::triangle_intersection::triangle_triangle_intersection;
use compgeom::{CompGeom, EngineConfig, TMesh};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::Point3;

fn fuselage_and_wing(segments: usize) -> Vec<TMesh> {
    vec![
        cylinder_mesh("fuselage", Point3::new(0.0, 0.0, 0.0), 10.0, 1.0, segments),
        box_mesh("wing", Point3::new(3.0, -6.0, -0.15), Point3::new(5.0, 6.0, 0.15)),
        sphere_mesh("nose", Point3::new(0.0, 0.0, 0.0), 1.0, segments, segments / 2),
    ]
}

fn bench_tri_tri(c: &mut Criterion) {
    let a = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
    ];
    let b = [
        Point3::new(0.25, 0.25, -1.0),
        Point3::new(0.25, 0.25, 1.0),
        Point3::new(1.0, 0.25, 0.0),
    ];
    let tol = Tolerance::default();
    c.bench_function("tri_tri_intersection", |bench| {
        bench.iter(|| triangle_triangle_intersection(black_box(&a), black_box(&b), &tol))
    });
}

fn bench_intersect_trim(c: &mut Criterion) {
    let mut group = c.benchmark_group("intersect_trim");
    group.sample_size(10);

    for segments in [16, 32, 64] {
        let meshes = fuselage_and_wing(segments);
        group.bench_with_input(BenchmarkId::from_parameter(segments), &meshes, |b, meshes| {
            b.iter(|| {
                let mut model = CompGeom::new(meshes.clone(), EngineConfig::default());
                black_box(model.intersect_trim())
            });
        });
    }

    group.finish();
}

fn bench_mass_and_slicing(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis");
    group.sample_size(10);
    let meshes = fuselage_and_wing(32);

    group.bench_function("mass_slice_x", |b| {
        b.iter(|| {
            let mut model = CompGeom::new(meshes.clone(), EngineConfig::default());
            black_box(model.mass_slice_x())
        });
    });

    group.bench_function("awave_slice", |b| {
        let mut config = EngineConfig::default();
        config.slice.mach = 1.6;
        b.iter(|| {
            let mut model = CompGeom::new(meshes.clone(), config.clone());
            black_box(model.awave_slice())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_tri_tri, bench_intersect_trim, bench_mass_and_slicing);
criterion_main!(benches);
