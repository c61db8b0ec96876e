// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Triangle splitting along intersection segments
//!
//! Each segment recorded on a triangle defines a cutting plane that contains
//! the segment and the triangle normal. Sub-triangles whose chord on that
//! plane overlaps the segment are cut in two or three; the rest are kept.
//! After every segment has been applied no sub-triangle interior crosses an
//! intersection curve, so each one can be classified by a single point.

use super::predicates::{point_plane_distance, triangle_area, Tolerance};
use super::tmesh::{NodeId, TMesh, TNode, TTri};
use ahash::AHashMap;
use nalgebra::{Point3, Vector3};

/// Deduplicating node allocator for cut points
///
/// Cut points created for neighbouring triangles along a shared edge land
/// on the same node.
pub struct NodeCache {
    cell: f64,
    tol: f64,
    index_map: AHashMap<(i64, i64, i64), Vec<NodeId>>,
}

impl NodeCache {
    pub fn new(tol: &Tolerance) -> Self {
        Self {
            cell: tol.dist * 4.0,
            tol: tol.dist,
            index_map: AHashMap::new(),
        }
    }

    fn key(&self, p: &Point3<f64>) -> (i64, i64, i64) {
        (
            (p.x / self.cell).floor() as i64,
            (p.y / self.cell).floor() as i64,
            (p.z / self.cell).floor() as i64,
        )
    }

    /// Return the node within tolerance of `p`, adding one if none exists
    pub fn get_or_add(&mut self, nodes: &mut Vec<TNode>, p: Point3<f64>) -> NodeId {
        let (kx, ky, kz) = self.key(&p);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    if let Some(ids) = self.index_map.get(&(kx + dx, ky + dy, kz + dz)) {
                        if let Some(&id) = ids
                            .iter()
                            .find(|id| (nodes[id.0].pnt - p).norm() <= self.tol)
                        {
                            return id;
                        }
                    }
                }
            }
        }

        let id = NodeId(nodes.len());
        nodes.push(TNode { pnt: p, id: id.0 });
        self.index_map.entry((kx, ky, kz)).or_default().push(id);
        id
    }
}

/// Cutting plane through an intersection segment
struct CutPlane {
    normal: Vector3<f64>,
    d: f64,
    start: Point3<f64>,
    dir: Vector3<f64>,
    len_sq: f64,
}

impl CutPlane {
    fn new(start: Point3<f64>, end: Point3<f64>, tri_normal: &Vector3<f64>, tol: &Tolerance) -> Option<Self> {
        let dir = end - start;
        let len_sq = dir.norm_squared();
        if len_sq <= tol.dist * tol.dist {
            return None;
        }
        let normal = dir.cross(tri_normal).try_normalize(f64::EPSILON)?;
        Some(Self {
            d: normal.dot(&start.coords),
            normal,
            start,
            dir,
            len_sq,
        })
    }

    /// Segment parameter of a point on the plane, 0 at start and 1 at end
    fn param(&self, p: &Point3<f64>) -> f64 {
        self.dir.dot(&(p - self.start)) / self.len_sq
    }
}

/// Split one triangle along its intersection edges
///
/// Returns the child triangles, or the unchanged triangle as a single child
/// when no segment actually crosses it. Children keep the parent winding
/// and normal; slivers below the area tolerance are dropped.
pub fn split_triangle(
    tri: &TTri,
    nodes: &mut Vec<TNode>,
    cache: &mut NodeCache,
    tol: &Tolerance,
) -> Vec<TTri> {
    let mut leaves: Vec<[NodeId; 3]> = vec![tri.nodes];

    for edge in &tri.isect_edges {
        let Some(plane) = CutPlane::new(edge.start, edge.end, &tri.normal, tol) else {
            continue;
        };

        let mut next = Vec::with_capacity(leaves.len() + 2);
        for leaf in leaves {
            match cut_leaf(leaf, &plane, nodes, cache, tol) {
                Some(children) => next.extend(children),
                None => next.push(leaf),
            }
        }
        leaves = next;
    }

    if leaves.len() == 1 {
        return vec![TTri::new(leaves[0], tri.normal)];
    }

    leaves
        .into_iter()
        .filter(|leaf| {
            let [a, b, c] = leaf.map(|n| nodes[n.0].pnt);
            triangle_area(&a, &b, &c) >= tol.area
        })
        .map(|leaf| TTri::new(leaf, tri.normal))
        .collect()
}

/// Cut a sub-triangle by the plane if its chord overlaps the segment
fn cut_leaf(
    leaf: [NodeId; 3],
    plane: &CutPlane,
    nodes: &mut Vec<TNode>,
    cache: &mut NodeCache,
    tol: &Tolerance,
) -> Option<Vec<[NodeId; 3]>> {
    let pts = leaf.map(|n| nodes[n.0].pnt);
    let dist = pts.map(|p| {
        let s = point_plane_distance(&p, &plane.normal, plane.d);
        if s.abs() <= tol.dist {
            0.0
        } else {
            s
        }
    });

    let front = dist.iter().filter(|&&s| s > 0.0).count();
    let back = dist.iter().filter(|&&s| s < 0.0).count();
    if front == 0 || back == 0 {
        return None;
    }

    // Chord of the sub-triangle on the plane, in segment parameters
    let mut u_min = f64::INFINITY;
    let mut u_max = f64::NEG_INFINITY;
    for i in 0..3 {
        let j = (i + 1) % 3;
        let mut visit = |p: Point3<f64>| {
            let u = plane.param(&p);
            u_min = u_min.min(u);
            u_max = u_max.max(u);
        };
        if dist[i] == 0.0 {
            visit(pts[i]);
        }
        if dist[i] * dist[j] < 0.0 {
            visit(edge_point(&pts[i], &pts[j], dist[i], dist[j]));
        }
    }
    let overlap = (u_max.min(1.0) - u_min.max(0.0)) * plane.len_sq.sqrt();
    if overlap <= tol.dist {
        return None;
    }

    // One vertex on the plane: cut from it to the opposite edge
    if let Some(k) = (0..3).find(|&k| dist[k] == 0.0) {
        let (i, j) = ((k + 1) % 3, (k + 2) % 3);
        let q = cache.get_or_add(nodes, edge_point(&pts[i], &pts[j], dist[i], dist[j]));
        return Some(vec![[leaf[k], leaf[i], q], [leaf[k], q, leaf[j]]]);
    }

    // Lone vertex on its side of the plane
    let lone_sign = if front == 1 { 1.0 } else { -1.0 };
    let k = (0..3).find(|&k| dist[k].signum() == lone_sign)?;
    let (i, j) = ((k + 1) % 3, (k + 2) % 3);
    let q1 = cache.get_or_add(nodes, edge_point(&pts[k], &pts[i], dist[k], dist[i]));
    let q2 = cache.get_or_add(nodes, edge_point(&pts[k], &pts[j], dist[k], dist[j]));
    Some(vec![
        [leaf[k], q1, q2],
        [q1, leaf[i], leaf[j]],
        [q1, leaf[j], q2],
    ])
}

fn edge_point(a: &Point3<f64>, b: &Point3<f64>, da: f64, db: f64) -> Point3<f64> {
    let t = da / (da - db);
    a + (b - a) * t
}

/// Split every triangle of a mesh that carries intersection edges
///
/// Returns the number of triangles that were subdivided.
pub fn split_mesh(mesh: &mut TMesh, tol: &Tolerance) -> usize {
    let mut cache = NodeCache::new(tol);
    let TMesh { tris, nodes, .. } = mesh;

    let mut count = 0;
    for tri in tris.iter_mut() {
        if tri.isect_edges.is_empty() || tri.is_split() {
            continue;
        }
        let children = split_triangle(tri, nodes, &mut cache, tol);
        if children.len() > 1 {
            tri.split = children;
            count += 1;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::tmesh::ISectEdge;
    use approx::assert_relative_eq;

    fn single_tri_mesh() -> TMesh {
        let mut mesh = TMesh::new("tri", "t");
        mesh.add_tri(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        );
        mesh.update_bbox();
        mesh
    }

    fn tol() -> Tolerance {
        Tolerance::new(1e-9, 1.0)
    }

    fn leaf_area(mesh: &TMesh) -> f64 {
        mesh.leaf_tris().into_iter().map(|t| mesh.tri_area(t)).sum()
    }

    #[test]
    fn test_no_segments_leaves_triangle_whole() {
        let mut mesh = single_tri_mesh();
        assert_eq!(split_mesh(&mut mesh, &tol()), 0);
        assert!(!mesh.tris[0].is_split());
    }

    #[test]
    fn test_full_crossing_segment_splits_in_three() {
        let mut mesh = single_tri_mesh();
        mesh.tris[0].isect_edges.push(ISectEdge {
            start: Point3::new(0.5, 0.0, 0.0),
            end: Point3::new(0.5, 1.5, 0.0),
            other_mesh: 1,
        });

        assert_eq!(split_mesh(&mut mesh, &tol()), 1);
        assert_eq!(mesh.tris[0].split.len(), 3);
        assert_relative_eq!(leaf_area(&mesh), 2.0, epsilon = 1e-12);

        // Children keep the parent orientation
        for leaf in mesh.leaf_tris() {
            let [a, b, c] = mesh.tri_points(leaf);
            let n = crate::geometry::predicates::area_normal(&a, &b, &c);
            assert!(n.z > 0.0);
        }
    }

    #[test]
    fn test_segment_through_vertex_splits_in_two() {
        let mut mesh = single_tri_mesh();
        mesh.tris[0].isect_edges.push(ISectEdge {
            start: Point3::new(0.0, 0.0, 0.0),
            end: Point3::new(1.0, 1.0, 0.0),
            other_mesh: 1,
        });

        split_mesh(&mut mesh, &tol());
        assert_eq!(mesh.tris[0].split.len(), 2);
        assert_relative_eq!(leaf_area(&mesh), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_segment_on_existing_edge_makes_no_sliver() {
        let mut mesh = single_tri_mesh();
        mesh.tris[0].isect_edges.push(ISectEdge {
            start: Point3::new(0.0, 0.0, 0.0),
            end: Point3::new(2.0, 0.0, 0.0),
            other_mesh: 1,
        });

        assert_eq!(split_mesh(&mut mesh, &tol()), 0);
        assert_eq!(mesh.num_leaf_tris(), 1);
    }

    #[test]
    fn test_partial_segment_and_crossing_segments() {
        let mut mesh = single_tri_mesh();
        // Two crossing cuts forming a plus sign inside the triangle
        mesh.tris[0].isect_edges.push(ISectEdge {
            start: Point3::new(0.5, 0.0, 0.0),
            end: Point3::new(0.5, 1.5, 0.0),
            other_mesh: 1,
        });
        mesh.tris[0].isect_edges.push(ISectEdge {
            start: Point3::new(0.0, 0.5, 0.0),
            end: Point3::new(1.5, 0.5, 0.0),
            other_mesh: 2,
        });

        split_mesh(&mut mesh, &tol());
        assert!(mesh.num_leaf_tris() >= 5);
        assert_relative_eq!(leaf_area(&mesh), 2.0, epsilon = 1e-12);

        // No leaf straddles either cut line
        for leaf in mesh.leaf_tris() {
            let pts = mesh.tri_points(leaf);
            let straddles_x = pts.iter().any(|p| p.x < 0.5 - 1e-9) && pts.iter().any(|p| p.x > 0.5 + 1e-9);
            let straddles_y = pts.iter().any(|p| p.y < 0.5 - 1e-9) && pts.iter().any(|p| p.y > 0.5 + 1e-9);
            assert!(!straddles_x && !straddles_y);
        }
    }

    #[test]
    fn test_node_cache_dedups_nearby_points() {
        let t = tol();
        let mut cache = NodeCache::new(&t);
        let mut nodes = Vec::new();
        let a = cache.get_or_add(&mut nodes, Point3::new(1.0, 1.0, 1.0));
        let b = cache.get_or_add(&mut nodes, Point3::new(1.0 + 1e-10, 1.0, 1.0));
        let c = cache.get_or_add(&mut nodes, Point3::new(1.5, 1.0, 1.0));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(nodes.len(), 2);
    }
}
