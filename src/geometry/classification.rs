// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Interior/exterior classification of (split) triangles
//!
//! A triangle is interior when its centroid lies inside any other component.
//! Containment is decided by ray casting along three skewed directions with a
//! majority vote on crossing parity. Centroids lying on another component's
//! surface are resolved from the facing of the two surfaces.

use super::bvh::BVH;
use super::predicates::{point_triangle_distance, ray_triangle_intersection, Tolerance};
use super::tmesh::{TMesh, TriClass};
use super::BoundingBox;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Ray directions, skewed so rays rarely graze axis-aligned edges
const RAY_DIRECTIONS: [[f64; 3]; 3] = [
    [1.0, 0.1213, 0.0711],
    [0.0837, 1.0, 0.1379],
    [0.1123, 0.0597, 1.0],
];

/// Position of a point relative to one closed mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Inside the other solid
    Inside,
    /// Outside the other solid
    Outside,
    /// On the other surface; `same_facing` when both normals agree
    OnBoundary { same_facing: bool },
}

/// Region of a cutting surface relative to the solid it slices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolidRegion {
    /// Within the material of some component
    Inside,
    /// In free space
    OutsideSolid,
}

impl From<TriClass> for SolidRegion {
    fn from(class: TriClass) -> Self {
        match class {
            TriClass::Interior => SolidRegion::Inside,
            TriClass::Exterior | TriClass::Unclassified => SolidRegion::OutsideSolid,
        }
    }
}

/// Read-only acceleration structure for point queries against one mesh
#[derive(Debug, Clone)]
pub struct MeshLocator {
    /// Position of the mesh in the model
    pub index: usize,
    pub ptr_id: String,
    pub half_box: bool,
    bbox: BoundingBox,
    bvh: BVH,
    tris: Vec<[Point3<f64>; 3]>,
    normals: Vec<Vector3<f64>>,
}

impl MeshLocator {
    /// Index the top-level triangles of `mesh`
    pub fn new(index: usize, mesh: &TMesh) -> Self {
        Self {
            index,
            ptr_id: mesh.ptr_id.clone(),
            half_box: mesh.half_box,
            bbox: BoundingBox::from_points(mesh.tris.iter().flat_map(|t| t.nodes.iter().map(|n| mesh.node(*n)))),
            bvh: BVH::from_mesh(mesh),
            tris: mesh.tris.iter().map(|t| mesh.tri_points(t)).collect(),
            normals: mesh.tris.iter().map(|t| t.normal).collect(),
        }
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    /// Quick rejection before ray casting
    pub fn may_contain(&self, point: &Point3<f64>, tol: &Tolerance) -> bool {
        self.bbox.expanded(tol.dist).contains(point)
    }

    /// Ray-casting containment test with a majority vote over three directions
    pub fn contains_point(&self, point: &Point3<f64>, tol: &Tolerance) -> bool {
        if !self.may_contain(point, tol) {
            return false;
        }
        let votes = RAY_DIRECTIONS
            .iter()
            .filter(|dir| self.crossings(point, &Vector3::new(dir[0], dir[1], dir[2]), tol) % 2 == 1)
            .count();
        votes >= 2
    }

    /// Number of distinct surface crossings along a ray
    fn crossings(&self, origin: &Point3<f64>, direction: &Vector3<f64>, tol: &Tolerance) -> usize {
        let dir_len = direction.norm();
        let mut hits: Vec<f64> = self
            .bvh
            .query_ray(origin, direction)
            .into_iter()
            .filter_map(|idx| {
                let [v0, v1, v2] = &self.tris[idx];
                ray_triangle_intersection(origin, direction, v0, v1, v2)
            })
            .map(|t| t * dir_len)
            .filter(|&t| t > tol.dist)
            .collect();

        // A ray through a shared edge reports the same crossing twice
        hits.sort_by(f64::total_cmp);
        hits.dedup_by(|a, b| (*a - *b).abs() <= tol.dist);
        hits.len()
    }

    /// Normal of a surface triangle within tolerance of `point`, if any
    pub fn coincident_normal(&self, point: &Point3<f64>, tol: &Tolerance) -> Option<Vector3<f64>> {
        let probe = BoundingBox::new(*point, *point).expanded(tol.dist);
        self.bvh
            .query_triangles(&probe)
            .into_iter()
            .find(|&idx| {
                let [a, b, c] = &self.tris[idx];
                point_triangle_distance(point, a, b, c) <= tol.dist
            })
            .map(|idx| self.normals[idx])
    }

    /// Classify a point carrying a surface normal against this mesh
    pub fn classify_point(
        &self,
        point: &Point3<f64>,
        normal: &Vector3<f64>,
        tol: &Tolerance,
    ) -> Classification {
        if !self.may_contain(point, tol) {
            return Classification::Outside;
        }
        if let Some(other) = self.coincident_normal(point, tol) {
            return Classification::OnBoundary {
                same_facing: other.dot(normal) > 0.0,
            };
        }
        if self.contains_point(point, tol) {
            Classification::Inside
        } else {
            Classification::Outside
        }
    }
}

/// Classify one triangle of mesh `own` against every other component
///
/// Coincident same-facing surfaces keep only the copy of the lower mesh
/// index; coincident opposite-facing surfaces (touching solids) are both
/// interior. Components of the same id never hide each other.
pub fn classify_triangle(
    centroid: &Point3<f64>,
    normal: &Vector3<f64>,
    own: &MeshLocator,
    locators: &[MeshLocator],
    tol: &Tolerance,
) -> TriClass {
    for other in locators {
        if other.index == own.index || other.ptr_id == own.ptr_id {
            continue;
        }
        let interior = match other.classify_point(centroid, normal, tol) {
            Classification::Inside => true,
            Classification::Outside => false,
            Classification::OnBoundary { same_facing: false } => true,
            Classification::OnBoundary { same_facing: true } => {
                other.half_box || other.index < own.index
            }
        };
        if interior {
            return TriClass::Interior;
        }
    }
    TriClass::Exterior
}
