// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Per-component geometry statistics

use super::predicates::{signed_volume, triangle_area, triangle_centroid, Tolerance};
use super::tmesh::TMesh;
use super::BoundingBox;
use ahash::AHashMap;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Geometry statistics of one component surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeometryStats {
    pub name: String,
    /// Enclosed volume
    pub volume: f64,
    /// Total surface area
    pub surface_area: f64,
    pub bbox: BoundingBox,
    /// Area-weighted centroid of the surface
    pub centroid: Point3<f64>,
    pub node_count: usize,
    pub triangle_count: usize,
    /// Every welded edge is shared by an even number of triangles
    pub is_watertight: bool,
}

/// Analyze a component surface
pub fn analyze(mesh: &TMesh, tol: &Tolerance) -> GeometryStats {
    let mut surface_area = 0.0;
    let mut volume = 0.0;
    let mut weighted = nalgebra::Vector3::zeros();

    for tri in &mesh.tris {
        let [a, b, c] = mesh.tri_points(tri);
        let area = triangle_area(&a, &b, &c);
        surface_area += area;
        volume += signed_volume(&a, &b, &c);
        weighted += triangle_centroid(&a, &b, &c).coords * area;
    }

    let centroid = if surface_area > 0.0 {
        Point3::from(weighted / surface_area)
    } else {
        Point3::origin()
    };

    GeometryStats {
        name: mesh.name.clone(),
        volume,
        surface_area,
        bbox: BoundingBox::from_points(mesh.nodes.iter().map(|n| &n.pnt)),
        centroid,
        node_count: mesh.nodes.len(),
        triangle_count: mesh.tris.len(),
        is_watertight: !mesh.tris.is_empty() && open_edge_count(mesh, tol) == 0,
    }
}

/// Number of welded edges used by an odd number of triangles
pub fn open_edge_count(mesh: &TMesh, tol: &Tolerance) -> usize {
    let cell = tol.dist * 2.0;
    let key = |p: &Point3<f64>| {
        (
            (p.x / cell).round() as i64,
            (p.y / cell).round() as i64,
            (p.z / cell).round() as i64,
        )
    };

    let mut edge_count: AHashMap<_, usize> = AHashMap::new();
    for tri in &mesh.tris {
        let keys = tri.nodes.map(|n| key(mesh.node(n)));
        for i in 0..3 {
            let (k1, k2) = (keys[i], keys[(i + 1) % 3]);
            let edge = if k1 < k2 { (k1, k2) } else { (k2, k1) };
            *edge_count.entry(edge).or_insert(0) += 1;
        }
    }

    edge_count.values().filter(|&&count| count % 2 == 1).count()
}
