// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Open-mesh repair tests

use compgeom::engine::repair::{merge_remove_open_meshes, non_closed_tris, remove_degenerate_tris};
use compgeom::geometry::primitives::{box_mesh, sphere_mesh};
use compgeom::geometry::Tolerance;
use compgeom::{CompGeom, EngineConfig, MeshInfo};
use nalgebra::Point3;

fn unit_cube(name: &str) -> compgeom::TMesh {
    box_mesh(name, Point3::origin(), Point3::new(1.0, 1.0, 1.0))
}

#[test]
fn test_closed_set_is_untouched() {
    let mut meshes = vec![
        unit_cube("a"),
        sphere_mesh("s", Point3::new(3.0, 0.0, 0.0), 1.0, 16, 8),
    ];
    let info = merge_remove_open_meshes(&mut meshes, &Tolerance::default());
    assert_eq!(info, MeshInfo::default());
    assert_eq!(meshes.len(), 2);
}

#[test]
fn test_repair_is_idempotent() {
    let mut open = unit_cube("open");
    open.tris.pop();
    let mut model = CompGeom::new(vec![unit_cube("a"), open], EngineConfig::default());

    let first = model.check();
    assert_eq!(first.num_open_meshes_deleted, 1);
    let second = model.check();
    assert!(second.is_clean());
    assert_eq!(model.meshes.len(), 1);
}

#[test]
fn test_single_open_mesh_is_deleted() {
    let mut mesh = unit_cube("a");
    mesh.tris.truncate(11);
    let tol = Tolerance::default();
    assert_eq!(non_closed_tris(&mesh, &tol).len(), 3);

    let mut meshes = vec![mesh];
    let info = merge_remove_open_meshes(&mut meshes, &tol);
    assert_eq!(info.num_open_meshes_deleted, 1);
    assert_eq!(info.num_open_meshes_merged, 0);
    assert!(meshes.is_empty());
    assert_eq!(info.warnings(), vec!["WARNING: 1 open meshes removed".to_string()]);
}

#[test]
fn test_degenerate_triangles_are_removed() {
    let mut mesh = unit_cube("a");
    let p = Point3::new(0.5, 0.5, 0.5);
    mesh.add_tri(p, p, Point3::new(0.6, 0.5, 0.5));
    mesh.add_tri(p, Point3::new(0.7, 0.5, 0.5), Point3::new(0.9, 0.5, 0.5));

    let tol = Tolerance::default();
    assert_eq!(remove_degenerate_tris(&mut mesh.clone(), &tol), 2);

    let mut meshes = vec![mesh];
    let info = merge_remove_open_meshes(&mut meshes, &tol);
    assert_eq!(info.num_degen_tris_deleted, 2);
    assert_eq!(info.num_open_meshes_deleted, 0);
    assert_eq!(meshes[0].num_tris(), 12);
}

#[test]
fn test_open_pair_is_merged_and_trimmed() {
    // Two open halves of one cube, stored as separate components
    let whole = unit_cube("whole");
    let mut left = compgeom::TMesh::new("left", "left");
    let mut right = compgeom::TMesh::new("right", "right");
    for (i, tri) in whole.tris.iter().enumerate() {
        let [a, b, c] = whole.tri_points(tri);
        if i % 2 == 0 {
            left.add_tri(a, b, c);
        } else {
            right.add_tri(a, b, c);
        }
    }
    left.update_bbox();
    right.update_bbox();

    let mut model = CompGeom::new(vec![left, right], EngineConfig::default());
    let results = model.intersect_trim();
    assert_eq!(results.info.num_open_meshes_merged, 1);
    assert_eq!(results.components.len(), 1);
    assert!((results.totals.wet_vol - 1.0).abs() < 1e-9);
}
