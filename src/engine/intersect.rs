// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Intersect, split and classify passes over a set of component meshes

use crate::geometry::bvh::BVH;
use crate::geometry::classification::{classify_triangle, MeshLocator};
use crate::geometry::triangle_intersection::triangle_triangle_intersection;
use crate::geometry::triangle_splitting::split_mesh;
use crate::geometry::{ISectEdge, TMesh, TriClass, Tolerance};
use nalgebra::{Point3, Vector3};
use rayon::prelude::*;
use tracing::debug;

/// Whether two meshes take part in intersection with each other
fn should_intersect(a: &TMesh, b: &TMesh, tol: &Tolerance) -> bool {
    !a.delete_me
        && !b.delete_me
        && a.ptr_id != b.ptr_id
        && a.bbox.expanded(tol.dist).overlaps(&b.bbox)
}

/// Intersect one pair of meshes, recording segments on both
///
/// Returns the number of segments found.
pub fn intersect_pair(
    a: &mut TMesh,
    a_index: usize,
    b: &mut TMesh,
    b_index: usize,
    tol: &Tolerance,
) -> usize {
    let bvh = BVH::from_mesh(b);
    let mut found = 0;

    for ia in 0..a.tris.len() {
        let pts_a = a.tri_points(&a.tris[ia]);
        let query = a.tri_bbox(&a.tris[ia]).expanded(tol.dist);
        for ib in bvh.query_triangles(&query) {
            let pts_b = b.tri_points(&b.tris[ib]);
            let result = triangle_triangle_intersection(&pts_a, &pts_b, tol);
            if let Some((start, end)) = result.segment() {
                a.tris[ia].isect_edges.push(ISectEdge {
                    start,
                    end,
                    other_mesh: b_index,
                });
                b.tris[ib].isect_edges.push(ISectEdge {
                    start,
                    end,
                    other_mesh: a_index,
                });
                found += 1;
            }
        }
    }
    found
}

/// Intersect every eligible pair of meshes
///
/// Pairs with the same component id, deleted meshes and pairs whose bounding
/// boxes do not overlap are skipped.
pub fn intersect_meshes(meshes: &mut [TMesh], tol: &Tolerance) -> usize {
    for mesh in meshes.iter_mut() {
        mesh.update_bbox();
    }

    let mut total = 0;
    for j in 1..meshes.len() {
        let (head, tail) = meshes.split_at_mut(j);
        let b = &mut tail[0];
        for (i, a) in head.iter_mut().enumerate() {
            if !should_intersect(a, b, tol) {
                continue;
            }
            let found = intersect_pair(a, i, b, j, tol);
            if found > 0 {
                debug!("{} x {}: {} intersection segments", a.name, b.name, found);
            }
            total += found;
        }
    }
    total
}

/// Intersect a cutting surface against solids, recording segments on the surface only
pub fn intersect_one_way(target: &mut TMesh, others: &[&TMesh], tol: &Tolerance) -> usize {
    target.update_bbox();
    let mut total = 0;

    for (index, other) in others.iter().enumerate() {
        if other.delete_me || !target.bbox.expanded(tol.dist).overlaps(&other.bbox) {
            continue;
        }
        let bvh = BVH::from_mesh(other);
        for it in 0..target.tris.len() {
            let pts_t = target.tri_points(&target.tris[it]);
            let query = target.tri_bbox(&target.tris[it]).expanded(tol.dist);
            for io in bvh.query_triangles(&query) {
                let pts_o = other.tri_points(&other.tris[io]);
                if let Some((start, end)) = triangle_triangle_intersection(&pts_t, &pts_o, tol).segment() {
                    target.tris[it].isect_edges.push(ISectEdge {
                        start,
                        end,
                        other_mesh: index,
                    });
                    total += 1;
                }
            }
        }
    }
    total
}

/// Split every non-deleted mesh along its intersection segments
pub fn split_meshes(meshes: &mut [TMesh], tol: &Tolerance) -> usize {
    meshes
        .iter_mut()
        .filter(|m| !m.delete_me)
        .map(|m| split_mesh(m, tol))
        .sum()
}

/// Centroid and normal of every leaf triangle, in leaf order
fn leaf_probes(mesh: &TMesh) -> Vec<(Point3<f64>, Vector3<f64>)> {
    mesh.leaf_tris()
        .into_iter()
        .map(|t| (mesh.tri_centroid(t), t.normal))
        .collect()
}

/// Write classifications back in leaf order
fn apply_classes(mesh: &mut TMesh, classes: Vec<TriClass>) {
    let mut classes = classes.into_iter();
    for tri in &mut mesh.tris {
        tri.for_each_leaf_mut(&mut |leaf| {
            if let Some(class) = classes.next() {
                leaf.class = class;
            }
        });
    }
}

/// Classify every leaf triangle of every mesh as interior or exterior
///
/// Queries run against read-only locators, in parallel when requested; the
/// results are written back afterwards.
pub fn classify_meshes(meshes: &mut [TMesh], tol: &Tolerance, parallel: bool) -> (usize, usize) {
    let locators: Vec<MeshLocator> = meshes
        .iter()
        .enumerate()
        .filter(|(_, m)| !m.delete_me)
        .map(|(i, m)| MeshLocator::new(i, m))
        .collect();

    let mut interior = 0;
    let mut exterior = 0;
    for (index, mesh) in meshes.iter_mut().enumerate() {
        let Some(own) = locators.iter().find(|l| l.index == index) else {
            continue;
        };
        let probes = leaf_probes(mesh);
        let classify = |(c, n): &(Point3<f64>, Vector3<f64>)| classify_triangle(c, n, own, &locators, tol);
        let classes: Vec<TriClass> = if parallel {
            probes.par_iter().map(classify).collect()
        } else {
            probes.iter().map(classify).collect()
        };

        let n_interior = classes.iter().filter(|c| **c == TriClass::Interior).count();
        debug!(
            "{}: {} interior, {} exterior",
            mesh.name,
            n_interior,
            classes.len() - n_interior
        );
        interior += n_interior;
        exterior += classes.len() - n_interior;
        apply_classes(mesh, classes);
    }
    (interior, exterior)
}

/// Classify a cutting surface against solids: interior where any solid contains it
pub fn classify_cut_surface(surface: &mut TMesh, solids: &[MeshLocator], tol: &Tolerance, parallel: bool) {
    let probes = leaf_probes(surface);
    let classify = |(c, _): &(Point3<f64>, Vector3<f64>)| {
        if solids.iter().any(|s| s.contains_point(c, tol)) {
            TriClass::Interior
        } else {
            TriClass::Exterior
        }
    };
    let classes: Vec<TriClass> = if parallel {
        probes.par_iter().map(classify).collect()
    } else {
        probes.iter().map(classify).collect()
    };
    apply_classes(surface, classes);
}
