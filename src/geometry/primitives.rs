// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Triangulated primitives
//!
//! Closed component surfaces used for fixtures and simple models, and the
//! open cutting surfaces (plane grids, cones) used by slicing and mass
//! properties. Closed surfaces are wound with outward normals.

use super::tmesh::{NodeId, TMesh};
use super::BoundingBox;
use nalgebra::{Point3, Vector3};
use std::f64::consts::PI;

/// Component id given to the auxiliary half-model box
pub const HALF_BOX_ID: &str = "__half_box__";

/// Axis-aligned box between two corners
pub fn box_mesh(name: &str, min: Point3<f64>, max: Point3<f64>) -> TMesh {
    let mut mesh = TMesh::new(name, name);

    let positions = [
        Point3::new(min.x, min.y, min.z),
        Point3::new(max.x, min.y, min.z),
        Point3::new(max.x, max.y, min.z),
        Point3::new(min.x, max.y, min.z),
        Point3::new(min.x, min.y, max.z),
        Point3::new(max.x, min.y, max.z),
        Point3::new(max.x, max.y, max.z),
        Point3::new(min.x, max.y, max.z),
    ];
    let ids: Vec<NodeId> = positions.iter().map(|p| mesh.add_node(*p)).collect();

    // Two triangles per face, counter-clockwise seen from outside
    let faces = [
        [4, 5, 6],
        [4, 6, 7], // z+
        [1, 0, 3],
        [1, 3, 2], // z-
        [5, 1, 2],
        [5, 2, 6], // x+
        [0, 4, 7],
        [0, 7, 3], // x-
        [7, 6, 2],
        [7, 2, 3], // y+
        [0, 1, 5],
        [0, 5, 4], // y-
    ];
    for [a, b, c] in faces {
        mesh.add_tri_nodes([ids[a], ids[b], ids[c]]);
    }

    mesh.update_bbox();
    mesh
}

/// Latitude/longitude sphere
pub fn sphere_mesh(name: &str, center: Point3<f64>, radius: f64, segments: usize, rings: usize) -> TMesh {
    let segments = segments.max(3);
    let rings = rings.max(2);
    let mut mesh = TMesh::new(name, name);

    let at = |theta: f64, phi: f64| {
        center + radius * Vector3::new(theta.sin() * phi.cos(), theta.sin() * phi.sin(), theta.cos())
    };

    let north = mesh.add_node(center + Vector3::new(0.0, 0.0, radius));
    let south = mesh.add_node(center - Vector3::new(0.0, 0.0, radius));
    let ring_nodes: Vec<Vec<NodeId>> = (1..rings)
        .map(|j| {
            let theta = PI * j as f64 / rings as f64;
            (0..segments)
                .map(|i| mesh.add_node(at(theta, 2.0 * PI * i as f64 / segments as f64)))
                .collect()
        })
        .collect();

    for i in 0..segments {
        let n = (i + 1) % segments;
        mesh.add_tri_nodes([north, ring_nodes[0][i], ring_nodes[0][n]]);
        for j in 0..ring_nodes.len() - 1 {
            let (upper, lower) = (&ring_nodes[j], &ring_nodes[j + 1]);
            mesh.add_tri_nodes([upper[i], lower[i], lower[n]]);
            mesh.add_tri_nodes([upper[i], lower[n], upper[n]]);
        }
        let last = &ring_nodes[ring_nodes.len() - 1];
        mesh.add_tri_nodes([last[i], south, last[n]]);
    }

    mesh.update_bbox();
    mesh
}

/// Closed circular cylinder running from `start` along +X
pub fn cylinder_mesh(name: &str, start: Point3<f64>, length: f64, radius: f64, segments: usize) -> TMesh {
    let segments = segments.max(3);
    let mut mesh = TMesh::new(name, name);

    let ring = |mesh: &mut TMesh, x: f64| -> Vec<NodeId> {
        (0..segments)
            .map(|i| {
                let phi = 2.0 * PI * i as f64 / segments as f64;
                mesh.add_node(start + Vector3::new(x, radius * phi.cos(), radius * phi.sin()))
            })
            .collect()
    };
    let front = ring(&mut mesh, 0.0);
    let back = ring(&mut mesh, length);
    let front_center = mesh.add_node(start);
    let back_center = mesh.add_node(start + Vector3::new(length, 0.0, 0.0));

    for i in 0..segments {
        let n = (i + 1) % segments;
        mesh.add_tri_nodes([front_center, front[n], front[i]]);
        mesh.add_tri_nodes([back_center, back[i], back[n]]);
        mesh.add_tri_nodes([front[i], front[n], back[i]]);
        mesh.add_tri_nodes([back[i], front[n], back[n]]);
    }

    mesh.update_bbox();
    mesh
}

/// Flat grid spanning `origin + s*u + t*v` for s, t in [0, 1]
///
/// The normal of every triangle is `u x v`.
pub fn plane_grid(name: &str, origin: Point3<f64>, u: Vector3<f64>, v: Vector3<f64>, resolution: usize) -> TMesh {
    let n = resolution.max(1);
    let mut mesh = TMesh::new(name, name);

    let mut ids = Vec::with_capacity((n + 1) * (n + 1));
    for j in 0..=n {
        for i in 0..=n {
            let s = i as f64 / n as f64;
            let t = j as f64 / n as f64;
            ids.push(mesh.add_node(origin + u * s + v * t));
        }
    }
    let idx = |i: usize, j: usize| ids[j * (n + 1) + i];
    for j in 0..n {
        for i in 0..n {
            mesh.add_tri_nodes([idx(i, j), idx(i + 1, j), idx(i + 1, j + 1)]);
            mesh.add_tri_nodes([idx(i, j), idx(i + 1, j + 1), idx(i, j + 1)]);
        }
    }

    mesh.update_bbox();
    mesh
}

/// Cone surface opening aft along +X from `apex`
///
/// Points satisfy `x = apex.x + r / tan(half_angle)` for radial distance
/// `r <= max_radius` from the X axis through the apex.
pub fn cone_surface(
    name: &str,
    apex: Point3<f64>,
    half_angle: f64,
    max_radius: f64,
    segments: usize,
    rings: usize,
) -> TMesh {
    let segments = segments.max(3);
    let rings = rings.max(1);
    let mut mesh = TMesh::new(name, name);
    let cot = 1.0 / half_angle.tan();

    let tip = mesh.add_node(apex);
    let ring_nodes: Vec<Vec<NodeId>> = (1..=rings)
        .map(|j| {
            let r = max_radius * j as f64 / rings as f64;
            (0..segments)
                .map(|i| {
                    let phi = 2.0 * PI * i as f64 / segments as f64;
                    mesh.add_node(apex + Vector3::new(r * cot, r * phi.cos(), r * phi.sin()))
                })
                .collect()
        })
        .collect();

    for i in 0..segments {
        let n = (i + 1) % segments;
        mesh.add_tri_nodes([tip, ring_nodes[0][i], ring_nodes[0][n]]);
        for j in 0..ring_nodes.len() - 1 {
            let (inner, outer) = (&ring_nodes[j], &ring_nodes[j + 1]);
            mesh.add_tri_nodes([inner[i], outer[i], outer[n]]);
            mesh.add_tri_nodes([inner[i], outer[n], inner[n]]);
        }
    }

    mesh.update_bbox();
    mesh
}

/// Box occupying the y < 0 side of a model, used to trim it to a half
pub fn half_box_mesh(model_bbox: &BoundingBox) -> TMesh {
    let margin = (model_bbox.diagonal() * 0.1).max(1.0e-3);
    let min = Point3::new(
        model_bbox.min.x - margin,
        model_bbox.min.y.min(0.0) - margin,
        model_bbox.min.z - margin,
    );
    let max = Point3::new(model_bbox.max.x + margin, 0.0, model_bbox.max.z + margin);

    let mut mesh = box_mesh("HalfBox", min, max);
    mesh.ptr_id = HALF_BOX_ID.to_string();
    mesh.half_box = true;
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_box_generation() {
        let mesh = box_mesh("b", Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        assert_eq!(mesh.num_tris(), 12);
        assert_eq!(mesh.nodes.len(), 8);
        assert_relative_eq!(mesh.theo_volume(), 8.0, epsilon = 1e-12);
        assert_relative_eq!(mesh.theo_area(), 24.0, epsilon = 1e-12);
        for tri in &mesh.tris {
            let c = mesh.tri_centroid(tri);
            assert!(tri.normal.dot(&c.coords) > 0.0, "normal must point outward");
        }
    }

    #[test]
    fn test_sphere_approximates_volume() {
        let mesh = sphere_mesh("s", Point3::new(1.0, 2.0, 3.0), 2.0, 48, 24);
        let exact = 4.0 / 3.0 * PI * 8.0;
        let volume = mesh.theo_volume();
        assert!(volume > 0.0);
        assert!((volume - exact).abs() < exact * 0.02, "volume {}", volume);
    }

    #[test]
    fn test_cylinder_outward() {
        let mesh = cylinder_mesh("c", Point3::new(0.0, 0.0, 0.0), 3.0, 1.0, 64);
        let exact = PI * 3.0;
        assert!((mesh.theo_volume() - exact).abs() < exact * 0.01);
        assert_relative_eq!(mesh.bbox.max.x, 3.0);
    }

    #[test]
    fn test_plane_grid() {
        let mesh = plane_grid(
            "p",
            Point3::new(0.0, -1.0, -1.0),
            Vector3::new(0.0, 2.0, 0.0),
            Vector3::new(0.0, 0.0, 2.0),
            3,
        );
        assert_eq!(mesh.num_tris(), 18);
        assert_relative_eq!(mesh.theo_area(), 4.0, epsilon = 1e-12);
        assert_relative_eq!(mesh.tris[0].normal, Vector3::x(), epsilon = 1e-12);
    }

    #[test]
    fn test_cone_surface_area() {
        // 45 degrees: lateral area = pi * r * slant
        let mesh = cone_surface("k", Point3::origin(), PI / 4.0, 1.0, 256, 4);
        let exact = PI * 2.0_f64.sqrt();
        assert!((mesh.theo_area() - exact).abs() < exact * 0.01);
        assert_relative_eq!(mesh.bbox.max.x, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_half_box_covers_negative_y() {
        let bbox = BoundingBox::new(Point3::new(0.0, -1.0, 0.0), Point3::new(2.0, 1.0, 1.0));
        let mesh = half_box_mesh(&bbox);
        assert!(mesh.half_box);
        assert_relative_eq!(mesh.bbox.max.y, 0.0);
        assert!(mesh.bbox.min.y < -1.0);
        assert!(mesh.bbox.min.x < 0.0 && mesh.bbox.max.x > 2.0);
    }
}
