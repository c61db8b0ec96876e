// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Tolerance-aware geometric predicates
//!
//! Every tolerance is derived from the size of the model being processed, so
//! predicates behave the same whether geometry is modelled in inches or metres.

use super::BoundingBox;
use crate::config::ToleranceConfig;
use nalgebra::{Point3, Vector3};

/// Distance and area tolerances for one model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Points closer than this are coincident
    pub dist: f64,
    /// Triangles smaller than this are degenerate
    pub area: f64,
}

impl Tolerance {
    pub fn new(dist: f64, scale: f64) -> Self {
        Self {
            dist,
            area: dist * scale.max(dist),
        }
    }

    /// Scale the configured relative tolerance by the model's bounding-box diagonal
    pub fn from_bbox(bbox: &BoundingBox, config: &ToleranceConfig) -> Self {
        let scale = if bbox.is_empty() { 1.0 } else { bbox.diagonal().max(f64::MIN_POSITIVE) };
        let dist = (scale * config.relative).max(config.absolute_floor);
        Self::new(dist, scale)
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::new(1e-9, 1.0)
    }
}

/// Signed distance of `point` from the plane `normal . x = d`
pub fn point_plane_distance(point: &Point3<f64>, normal: &Vector3<f64>, d: f64) -> f64 {
    normal.dot(&point.coords) - d
}

/// Classification of point relative to plane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneClassification {
    Front,
    Back,
    OnPlane,
}

impl PlaneClassification {
    pub fn from_distance(dist: f64, tol: f64) -> Self {
        if dist > tol {
            Self::Front
        } else if dist < -tol {
            Self::Back
        } else {
            Self::OnPlane
        }
    }

    /// -1, 0 or 1
    pub fn sign(self) -> i8 {
        match self {
            Self::Front => 1,
            Self::Back => -1,
            Self::OnPlane => 0,
        }
    }
}

/// Classify point relative to plane (unit normal)
pub fn classify_point_plane(
    point: &Point3<f64>,
    normal: &Vector3<f64>,
    d: f64,
    tol: f64,
) -> PlaneClassification {
    PlaneClassification::from_distance(point_plane_distance(point, normal, d), tol)
}

/// Area-weighted normal (length is twice the area)
pub fn area_normal(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Vector3<f64> {
    (b - a).cross(&(c - a))
}

pub fn triangle_area(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    area_normal(a, b, c).norm() * 0.5
}

pub fn triangle_centroid(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Point3<f64> {
    Point3::from((a.coords + b.coords + c.coords) / 3.0)
}

/// Signed volume of the tetrahedron spanned by the origin and a triangle
///
/// Summed over a closed, outward-wound surface this gives the enclosed volume.
pub fn signed_volume(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    a.coords.dot(&b.coords.cross(&c.coords)) / 6.0
}

/// Oriented volume of tetrahedron (a, b, c, d)
pub fn tetra_volume(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>, d: &Point3<f64>) -> f64 {
    (b - a).dot(&(c - a).cross(&(d - a))) / 6.0
}

/// Shortest edge of a triangle
pub fn min_edge_length(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    (b - a).norm().min((c - b).norm()).min((a - c).norm())
}

/// Distance from `point` to the closest point of triangle (a, b, c)
pub fn point_triangle_distance(
    point: &Point3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
) -> f64 {
    (point - closest_point_on_triangle(point, a, b, c)).norm()
}

/// Closest point on a triangle (Ericson, Real-Time Collision Detection 5.1.5)
pub fn closest_point_on_triangle(
    p: &Point3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
) -> Point3<f64> {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;
    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return *a;
    }

    let bp = p - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return *b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return a + ab * v;
    }

    let cp = p - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return *c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return a + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + (c - b) * w;
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    a + ab * v + ac * w
}

/// Möller–Trumbore ray/triangle test returning the ray parameter of the hit
pub fn ray_triangle_intersection(
    origin: &Point3<f64>,
    direction: &Vector3<f64>,
    v0: &Point3<f64>,
    v1: &Point3<f64>,
    v2: &Point3<f64>,
) -> Option<f64> {
    const PARALLEL_EPS: f64 = 1e-14;
    const BARY_EPS: f64 = 1e-12;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = direction.cross(&edge2);
    let a = edge1.dot(&h);

    if a.abs() < PARALLEL_EPS * edge1.norm() * edge2.norm() {
        return None;
    }

    let f = 1.0 / a;
    let s = origin - v0;
    let u = f * s.dot(&h);
    if u < -BARY_EPS || u > 1.0 + BARY_EPS {
        return None;
    }

    let q = s.cross(&edge1);
    let v = f * direction.dot(&q);
    if v < -BARY_EPS || u + v > 1.0 + BARY_EPS {
        return None;
    }

    Some(f * edge2.dot(&q))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_tolerance_scales_with_model() {
        let small = BoundingBox::new(Point3::origin(), Point3::new(1.0, 0.0, 0.0));
        let large = BoundingBox::new(Point3::origin(), Point3::new(1000.0, 0.0, 0.0));
        let config = ToleranceConfig::default();

        let t_small = Tolerance::from_bbox(&small, &config);
        let t_large = Tolerance::from_bbox(&large, &config);
        assert_relative_eq!(t_large.dist / t_small.dist, 1000.0, epsilon = 1e-6);
        assert_relative_eq!(t_large.area / t_small.area, 1.0e6, max_relative = 1e-6);
    }

    #[test]
    fn test_classify_point_plane() {
        let normal = Vector3::new(0.0, 0.0, 1.0);

        assert_eq!(
            classify_point_plane(&Point3::new(0.0, 0.0, 1.0), &normal, 0.0, 1e-9),
            PlaneClassification::Front
        );
        assert_eq!(
            classify_point_plane(&Point3::new(0.0, 0.0, -1.0), &normal, 0.0, 1e-9),
            PlaneClassification::Back
        );
        assert_eq!(
            classify_point_plane(&Point3::new(5.0, 5.0, 1e-12), &normal, 0.0, 1e-9),
            PlaneClassification::OnPlane
        );
    }

    #[test]
    fn test_tetra_volume_sign() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(0.0, 1.0, 0.0);

        assert_relative_eq!(tetra_volume(&a, &b, &c, &Point3::new(0.0, 0.0, 1.0)), 1.0 / 6.0);
        assert_relative_eq!(tetra_volume(&a, &b, &c, &Point3::new(0.0, 0.0, -1.0)), -1.0 / 6.0);
    }

    #[test]
    fn test_closest_point_regions() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(0.0, 1.0, 0.0);

        // Above the face
        assert_relative_eq!(
            point_triangle_distance(&Point3::new(0.25, 0.25, 2.0), &a, &b, &c),
            2.0
        );
        // Beyond vertex b
        assert_relative_eq!(
            point_triangle_distance(&Point3::new(2.0, 0.0, 0.0), &a, &b, &c),
            1.0
        );
        // Beyond the hypotenuse
        let d = point_triangle_distance(&Point3::new(1.0, 1.0, 0.0), &a, &b, &c);
        assert_relative_eq!(d, 0.5_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_ray_triangle() {
        let v0 = Point3::new(1.0, -1.0, -1.0);
        let v1 = Point3::new(1.0, 1.0, -1.0);
        let v2 = Point3::new(1.0, 0.0, 1.0);
        let dir = Vector3::new(1.0, 0.0, 0.0);

        let t = ray_triangle_intersection(&Point3::origin(), &dir, &v0, &v1, &v2);
        assert_relative_eq!(t.unwrap(), 1.0);

        let miss = ray_triangle_intersection(&Point3::new(0.0, 5.0, 0.0), &dir, &v0, &v1, &v2);
        assert!(miss.is_none());
    }
}
