// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Input repair: degenerate triangle removal and open-mesh merge/delete
//!
//! Classification and volume integration assume closed solids. Meshes with
//! boundary edges are merged pairwise when their union closes, and deleted
//! otherwise. Nothing here fails; every repair is counted in [`MeshInfo`].

use crate::geometry::predicates::{min_edge_length, triangle_area};
use crate::geometry::{TMesh, Tolerance};
use ahash::AHashMap;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Repair counters surfaced as report warnings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshInfo {
    pub num_degen_tris_deleted: usize,
    pub num_open_meshes_merged: usize,
    pub num_open_meshes_deleted: usize,
}

impl MeshInfo {
    /// Accumulate another pass's counters
    pub fn merge(&mut self, other: &MeshInfo) {
        self.num_degen_tris_deleted += other.num_degen_tris_deleted;
        self.num_open_meshes_merged += other.num_open_meshes_merged;
        self.num_open_meshes_deleted += other.num_open_meshes_deleted;
    }

    pub fn is_clean(&self) -> bool {
        *self == MeshInfo::default()
    }

    /// Warning lines for reports, empty when nothing was repaired
    pub fn warnings(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if self.num_degen_tris_deleted > 0 {
            lines.push(format!(
                "WARNING: {} degenerate triangles removed",
                self.num_degen_tris_deleted
            ));
        }
        if self.num_open_meshes_merged > 0 {
            lines.push(format!(
                "WARNING: {} open meshes merged",
                self.num_open_meshes_merged
            ));
        }
        if self.num_open_meshes_deleted > 0 {
            lines.push(format!(
                "WARNING: {} open meshes removed",
                self.num_open_meshes_deleted
            ));
        }
        lines
    }
}

/// Spatial hash that maps nearby points to one welded id
pub struct Welder {
    cell: f64,
    radius: f64,
    cells: AHashMap<(i64, i64, i64), Vec<(Point3<f64>, usize)>>,
    next_id: usize,
}

impl Welder {
    pub fn new(tol: &Tolerance) -> Self {
        Self {
            cell: tol.dist * 2.0,
            radius: tol.dist,
            cells: AHashMap::new(),
            next_id: 0,
        }
    }

    fn key(&self, p: &Point3<f64>) -> (i64, i64, i64) {
        (
            (p.x / self.cell).floor() as i64,
            (p.y / self.cell).floor() as i64,
            (p.z / self.cell).floor() as i64,
        )
    }

    /// Welded id of a point, searching the 27 surrounding cells
    pub fn weld(&mut self, p: &Point3<f64>) -> usize {
        let (kx, ky, kz) = self.key(p);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    if let Some(entries) = self.cells.get(&(kx + dx, ky + dy, kz + dz)) {
                        if let Some((_, id)) = entries.iter().find(|(q, _)| (q - p).norm() <= self.radius) {
                            return *id;
                        }
                    }
                }
            }
        }
        let id = self.next_id;
        self.next_id += 1;
        self.cells.entry((kx, ky, kz)).or_default().push((*p, id));
        id
    }
}

type EdgeCounts = AHashMap<(usize, usize), u32>;

/// Use count of every welded edge of a mesh's top-level triangles
fn edge_counts(mesh: &TMesh, welder: &mut Welder) -> (EdgeCounts, Vec<[(usize, usize); 3]>) {
    let weld_ids: Vec<usize> = mesh.nodes.iter().map(|n| welder.weld(&n.pnt)).collect();
    let mut counts = EdgeCounts::default();
    let mut tri_edges = Vec::with_capacity(mesh.tris.len());

    for tri in &mesh.tris {
        let ids = tri.nodes.map(|n| weld_ids[n.0]);
        let edges = [0, 1, 2].map(|i| {
            let (a, b) = (ids[i], ids[(i + 1) % 3]);
            if a < b {
                (a, b)
            } else {
                (b, a)
            }
        });
        for edge in edges {
            *counts.entry(edge).or_insert(0) += 1;
        }
        tri_edges.push(edges);
    }
    (counts, tri_edges)
}

fn is_closed(counts: &EdgeCounts) -> bool {
    counts.values().all(|c| c % 2 == 0)
}

/// Remove triangles with an edge shorter than the distance tolerance or
/// an area below the area tolerance
pub fn remove_degenerate_tris(mesh: &mut TMesh, tol: &Tolerance) -> usize {
    let before = mesh.tris.len();
    let nodes = &mesh.nodes;
    mesh.tris.retain(|tri| {
        let [a, b, c] = tri.nodes.map(|n| nodes[n.0].pnt);
        min_edge_length(&a, &b, &c) >= tol.dist && triangle_area(&a, &b, &c) >= tol.area
    });
    before - mesh.tris.len()
}

/// Indices of triangles owning at least one boundary edge
pub fn non_closed_tris(mesh: &TMesh, tol: &Tolerance) -> Vec<usize> {
    let mut welder = Welder::new(tol);
    let (counts, tri_edges) = edge_counts(mesh, &mut welder);
    tri_edges
        .iter()
        .enumerate()
        .filter(|(_, edges)| edges.iter().any(|e| counts.get(e).is_some_and(|c| c % 2 == 1)))
        .map(|(i, _)| i)
        .collect()
}

/// Remove degenerate triangles, merge pairs of open meshes whose union is
/// closed, and delete the open meshes that remain
pub fn merge_remove_open_meshes(meshes: &mut Vec<TMesh>, tol: &Tolerance) -> MeshInfo {
    let mut info = MeshInfo::default();

    for mesh in meshes.iter_mut() {
        let removed = remove_degenerate_tris(mesh, tol);
        if removed > 0 {
            warn!("{}: removed {} degenerate triangles", mesh.name, removed);
        }
        info.num_degen_tris_deleted += removed;
    }

    let mut welder = Welder::new(tol);
    let mut counts: Vec<EdgeCounts> = meshes
        .iter()
        .map(|m| edge_counts(m, &mut welder).0)
        .collect();
    let mut open: Vec<bool> = meshes
        .iter()
        .zip(&counts)
        .map(|(m, c)| !m.delete_me && !m.half_box && !is_closed(c))
        .collect();

    for i in 0..meshes.len() {
        if !open[i] {
            continue;
        }
        for j in (i + 1)..meshes.len() {
            if !open[j] {
                continue;
            }
            let mut combined = counts[i].clone();
            for (edge, c) in &counts[j] {
                *combined.entry(*edge).or_insert(0) += c;
            }
            if !is_closed(&combined) {
                continue;
            }

            let (head, tail) = meshes.split_at_mut(j);
            let donor = &mut tail[0];
            head[i].merge(donor);
            donor.delete_me = true;
            warn!("merged open mesh {} into {}", donor.name, head[i].name);

            counts[i] = combined;
            open[i] = false;
            open[j] = false;
            info.num_open_meshes_merged += 1;
            break;
        }
    }

    for (mesh, is_open) in meshes.iter_mut().zip(&open) {
        if *is_open {
            warn!("removing open mesh {}", mesh.name);
            mesh.delete_me = true;
            info.num_open_meshes_deleted += 1;
        }
    }

    meshes.retain(|m| !m.delete_me);
    debug!("repair: {:?}", info);
    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::primitives;
    use approx::assert_relative_eq;

    fn unit_box(name: &str, x: f64) -> TMesh {
        primitives::box_mesh(name, Point3::new(x, 0.0, 0.0), Point3::new(x + 1.0, 1.0, 1.0))
    }

    #[test]
    fn test_closed_box_has_no_boundary() {
        let mesh = unit_box("a", 0.0);
        assert!(non_closed_tris(&mesh, &Tolerance::default()).is_empty());
    }

    #[test]
    fn test_missing_face_is_open() {
        let mut mesh = unit_box("a", 0.0);
        mesh.tris.truncate(10);
        assert_eq!(non_closed_tris(&mesh, &Tolerance::default()).len(), 4);
    }

    #[test]
    fn test_split_box_halves_merge() {
        let whole = unit_box("a", 0.0);
        let mut first = TMesh::new("first", "first");
        let mut second = TMesh::new("second", "second");
        for (i, tri) in whole.tris.iter().enumerate() {
            let [p, q, r] = whole.tri_points(tri);
            if i < 6 {
                first.add_tri(p, q, r);
            } else {
                second.add_tri(p, q, r);
            }
        }
        first.update_bbox();
        second.update_bbox();

        let mut meshes = vec![first, second];
        let info = merge_remove_open_meshes(&mut meshes, &Tolerance::default());
        assert_eq!(info.num_open_meshes_merged, 1);
        assert_eq!(info.num_open_meshes_deleted, 0);
        assert_eq!(meshes.len(), 1);
        assert_relative_eq!(meshes[0].theo_volume(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_warnings() {
        let info = MeshInfo {
            num_degen_tris_deleted: 2,
            num_open_meshes_merged: 0,
            num_open_meshes_deleted: 1,
        };
        let lines = info.warnings();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("2 degenerate"));
        assert!(MeshInfo::default().warnings().is_empty());
    }

    #[test]
    fn test_info_merge() {
        let mut a = MeshInfo {
            num_degen_tris_deleted: 1,
            ..Default::default()
        };
        a.merge(&MeshInfo {
            num_degen_tris_deleted: 2,
            num_open_meshes_merged: 1,
            num_open_meshes_deleted: 3,
        });
        assert_eq!(a.num_degen_tris_deleted, 3);
        assert_eq!(a.num_open_meshes_merged, 1);
        assert_eq!(a.num_open_meshes_deleted, 3);
        assert!(!a.is_clean());
    }
}
