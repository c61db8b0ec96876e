// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Triangle-triangle intersection
//!
//! Signed vertex distances against both supporting planes decide whether two
//! triangles can meet; when they do, each triangle's span on the planes'
//! common line is computed and the overlap of the two spans is the
//! intersection segment.

use super::predicates::{area_normal, PlaneClassification, Tolerance};
use nalgebra::{Point3, Vector3};

/// Result of triangle-triangle intersection test
#[derive(Debug, Clone)]
pub struct IntersectionResult {
    /// Intersection type
    pub intersection_type: IntersectionType,
    /// Intersection points: one for `Point`, two for `Segment`, none otherwise
    pub intersection_points: Vec<Point3<f64>>,
}

impl IntersectionResult {
    fn none(intersection_type: IntersectionType) -> Self {
        Self {
            intersection_type,
            intersection_points: Vec::new(),
        }
    }

    /// Whether triangles intersect
    pub fn intersects(&self) -> bool {
        !matches!(
            self.intersection_type,
            IntersectionType::None | IntersectionType::Degenerate
        )
    }

    /// Segment end points when the triangles cross along a line
    pub fn segment(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        match (self.intersection_type, self.intersection_points.as_slice()) {
            (IntersectionType::Segment, [a, b]) => Some((*a, *b)),
            _ => None,
        }
    }
}

/// Type of triangle-triangle intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntersectionType {
    /// No intersection
    None,
    /// Triangles lie in a common plane (resolved by classification, not split)
    Coplanar,
    /// Triangles touch at a single point
    Point,
    /// Triangles intersect along a line segment
    Segment,
    /// One of the triangles has no usable area
    Degenerate,
}

/// Test if two triangles intersect
pub fn triangle_triangle_intersection(
    tri_a: &[Point3<f64>; 3],
    tri_b: &[Point3<f64>; 3],
    tol: &Tolerance,
) -> IntersectionResult {
    let normal_a = area_normal(&tri_a[0], &tri_a[1], &tri_a[2]);
    let normal_b = area_normal(&tri_b[0], &tri_b[1], &tri_b[2]);
    // Area normals have length 2A
    if normal_a.norm() <= 2.0 * tol.area || normal_b.norm() <= 2.0 * tol.area {
        return IntersectionResult::none(IntersectionType::Degenerate);
    }
    let normal_a = normal_a.normalize();
    let normal_b = normal_b.normalize();

    let dist_a = plane_distances(tri_a, &normal_b, &tri_b[0], tol.dist);
    let side_a = plane_sides(&dist_a, tol.dist);
    if side_a.iter().all(|&s| s == PlaneClassification::OnPlane) {
        return IntersectionResult::none(IntersectionType::Coplanar);
    }
    if one_sided(&side_a) {
        return IntersectionResult::none(IntersectionType::None);
    }

    let dist_b = plane_distances(tri_b, &normal_a, &tri_a[0], tol.dist);
    let side_b = plane_sides(&dist_b, tol.dist);
    if side_b.iter().all(|&s| s == PlaneClassification::OnPlane) {
        return IntersectionResult::none(IntersectionType::Coplanar);
    }
    if one_sided(&side_b) {
        return IntersectionResult::none(IntersectionType::None);
    }

    let line_dir = normal_a.cross(&normal_b);
    if line_dir.norm() < f64::EPSILON {
        return IntersectionResult::none(IntersectionType::None);
    }

    let (Some(span_a), Some(span_b)) = (
        line_span(tri_a, &dist_a, &line_dir),
        line_span(tri_b, &dist_b, &line_dir),
    ) else {
        return IntersectionResult::none(IntersectionType::None);
    };

    // Overlap of the two spans along the common line
    let lo = if span_a.0 .0 >= span_b.0 .0 { span_a.0 } else { span_b.0 };
    let hi = if span_a.1 .0 <= span_b.1 .0 { span_a.1 } else { span_b.1 };
    let scale = line_dir.norm();
    let overlap = (hi.0 - lo.0) / scale;

    if overlap < -tol.dist {
        return IntersectionResult::none(IntersectionType::None);
    }
    if overlap <= tol.dist {
        return IntersectionResult {
            intersection_type: IntersectionType::Point,
            intersection_points: vec![lo.1],
        };
    }

    IntersectionResult {
        intersection_type: IntersectionType::Segment,
        intersection_points: vec![lo.1, hi.1],
    }
}

fn plane_distances(
    tri: &[Point3<f64>; 3],
    normal: &Vector3<f64>,
    origin: &Point3<f64>,
    tol: f64,
) -> [f64; 3] {
    tri.map(|p| {
        let d = normal.dot(&(p - origin));
        if d.abs() <= tol {
            0.0
        } else {
            d
        }
    })
}

fn plane_sides(dist: &[f64; 3], tol: f64) -> [PlaneClassification; 3] {
    dist.map(|d| PlaneClassification::from_distance(d, tol))
}

/// All vertices strictly on one side
fn one_sided(sides: &[PlaneClassification; 3]) -> bool {
    let sum: i8 = sides.iter().map(|s| s.sign()).sum();
    sum.abs() == 3
}

type LinePoint = (f64, Point3<f64>);

/// Extent of a triangle along the line where it meets the other plane
///
/// Returns the (parameter, point) pairs of both ends, parameters measured
/// along the unnormalized `line_dir`.
fn line_span(
    tri: &[Point3<f64>; 3],
    dist: &[f64; 3],
    line_dir: &Vector3<f64>,
) -> Option<(LinePoint, LinePoint)> {
    let mut points: Vec<Point3<f64>> = Vec::with_capacity(3);
    for i in 0..3 {
        let j = (i + 1) % 3;
        if dist[i] == 0.0 {
            points.push(tri[i]);
        }
        if dist[i] * dist[j] < 0.0 {
            let t = dist[i] / (dist[i] - dist[j]);
            points.push(tri[i] + (tri[j] - tri[i]) * t);
        }
    }

    let mut iter = points.into_iter().map(|p| (line_dir.dot(&p.coords), p));
    let first = iter.next()?;
    let (mut lo, mut hi) = (first, first);
    for item in iter {
        if item.0 < lo.0 {
            lo = item;
        }
        if item.0 > hi.0 {
            hi = item;
        }
    }
    Some((lo, hi))
}
