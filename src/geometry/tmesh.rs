// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Triangle-soup component meshes
//!
//! A [`TMesh`] owns an arena of [`TNode`]s and a list of [`TTri`]s that refer
//! to nodes by [`NodeId`]. Triangles that have been split along intersection
//! curves keep their children in [`TTri::split`]; once split, only the
//! children describe the surface.

use super::predicates::{area_normal, signed_volume, triangle_area, triangle_centroid};
use super::BoundingBox;
use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Handle of a node inside its owning mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Mesh vertex
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TNode {
    pub pnt: Point3<f64>,
    /// Export index assigned when writing deduplicated output
    pub id: usize,
}

/// Classification state of a triangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TriClass {
    #[default]
    Unclassified,
    /// Hidden inside another component
    Interior,
    /// Exposed to the flow
    Exterior,
}

/// Intersection segment found on a triangle
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ISectEdge {
    pub start: Point3<f64>,
    pub end: Point3<f64>,
    /// Index of the mesh the segment was found against
    pub other_mesh: usize,
}

/// Mesh triangle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TTri {
    pub nodes: [NodeId; 3],
    pub normal: Vector3<f64>,
    pub class: TriClass,
    pub isect_edges: Vec<ISectEdge>,
    pub split: Vec<TTri>,
}

impl TTri {
    pub fn new(nodes: [NodeId; 3], normal: Vector3<f64>) -> Self {
        Self {
            nodes,
            normal,
            class: TriClass::Unclassified,
            isect_edges: Vec::new(),
            split: Vec::new(),
        }
    }

    pub fn is_split(&self) -> bool {
        !self.split.is_empty()
    }

    /// Visit the triangles that currently describe the surface
    pub fn for_each_leaf<'a>(&'a self, f: &mut impl FnMut(&'a TTri)) {
        if self.split.is_empty() {
            f(self);
        } else {
            for child in &self.split {
                child.for_each_leaf(f);
            }
        }
    }

    pub fn for_each_leaf_mut(&mut self, f: &mut impl FnMut(&mut TTri)) {
        if self.split.is_empty() {
            f(self);
        } else {
            for child in &mut self.split {
                child.for_each_leaf_mut(f);
            }
        }
    }
}

/// Mass inputs of a component
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MassInputs {
    /// Volumetric density of solid components
    pub density: f64,
    /// Mass per unit area of shell components
    pub shell_mass_area: f64,
    /// Overlapping volume is assigned to the highest priority
    pub priority: i32,
}

impl Default for MassInputs {
    fn default() -> Self {
        Self {
            density: 1.0,
            shell_mass_area: 0.0,
            priority: 0,
        }
    }
}

/// Drag build-up factors supplied with a component
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragFactors {
    pub min_chord: f64,
    pub avg_chord: f64,
    pub max_chord: f64,
    pub min_tc: f64,
    pub avg_tc: f64,
    pub max_tc: f64,
    pub avg_sweep: f64,
    pub length: f64,
    pub max_xsec_area: f64,
    pub length_to_diameter: f64,
}

/// Area and volume results of one component
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaVolume {
    pub theo_area: f64,
    pub wet_area: f64,
    pub theo_vol: f64,
    pub wet_vol: f64,
}

/// Triangulated surface of one component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TMesh {
    pub name: String,
    /// Id of the component the surface was generated from
    pub ptr_id: String,
    pub nodes: Vec<TNode>,
    pub tris: Vec<TTri>,
    pub bbox: BoundingBox,
    /// Auxiliary box used to trim the model to a half
    pub half_box: bool,
    /// Thin-walled component (mass from surface area)
    pub shell: bool,
    pub delete_me: bool,
    pub mass: MassInputs,
    pub drag: Option<DragFactors>,
    pub results: AreaVolume,
}

impl TMesh {
    pub fn new(name: impl Into<String>, ptr_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ptr_id: ptr_id.into(),
            nodes: Vec::new(),
            tris: Vec::new(),
            bbox: BoundingBox::empty(),
            half_box: false,
            shell: false,
            delete_me: false,
            mass: MassInputs::default(),
            drag: None,
            results: AreaVolume::default(),
        }
    }

    /// Add a node and return its handle
    pub fn add_node(&mut self, pnt: Point3<f64>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(TNode { pnt, id: id.0 });
        id
    }

    /// Add a triangle with its own three nodes (triangle soup)
    pub fn add_tri(&mut self, p0: Point3<f64>, p1: Point3<f64>, p2: Point3<f64>) {
        let n0 = self.add_node(p0);
        let n1 = self.add_node(p1);
        let n2 = self.add_node(p2);
        self.add_tri_nodes([n0, n1, n2]);
    }

    /// Add a triangle over existing nodes; the normal follows the winding
    pub fn add_tri_nodes(&mut self, nodes: [NodeId; 3]) {
        let [a, b, c] = nodes.map(|n| self.nodes[n.0].pnt);
        let normal = area_normal(&a, &b, &c);
        let len = normal.norm();
        let normal = if len > 0.0 { normal / len } else { Vector3::zeros() };
        self.tris.push(TTri::new(nodes, normal));
    }

    pub fn node(&self, id: NodeId) -> &Point3<f64> {
        &self.nodes[id.0].pnt
    }

    pub fn tri_points(&self, tri: &TTri) -> [Point3<f64>; 3] {
        tri.nodes.map(|n| self.nodes[n.0].pnt)
    }

    pub fn tri_area(&self, tri: &TTri) -> f64 {
        let [a, b, c] = self.tri_points(tri);
        triangle_area(&a, &b, &c)
    }

    pub fn tri_centroid(&self, tri: &TTri) -> Point3<f64> {
        let [a, b, c] = self.tri_points(tri);
        triangle_centroid(&a, &b, &c)
    }

    pub fn tri_bbox(&self, tri: &TTri) -> BoundingBox {
        BoundingBox::from_points(&self.tri_points(tri))
    }

    pub fn num_tris(&self) -> usize {
        self.tris.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tris.is_empty()
    }

    /// Triangles that currently describe the surface, split children included
    pub fn leaf_tris(&self) -> Vec<&TTri> {
        let mut leaves = Vec::with_capacity(self.tris.len());
        for tri in &self.tris {
            tri.for_each_leaf(&mut |leaf| leaves.push(leaf));
        }
        leaves
    }

    pub fn num_leaf_tris(&self) -> usize {
        let mut count = 0;
        for tri in &self.tris {
            tri.for_each_leaf(&mut |_| count += 1);
        }
        count
    }

    pub fn update_bbox(&mut self) {
        let mut bbox = BoundingBox::empty();
        for tri in &self.tris {
            for n in tri.nodes {
                bbox.expand_to_include(&self.nodes[n.0].pnt);
            }
        }
        self.bbox = bbox;
    }

    /// Surface area of the unsplit input surface
    pub fn theo_area(&self) -> f64 {
        self.tris.iter().map(|t| self.tri_area(t)).sum()
    }

    /// Enclosed volume of the unsplit input surface
    pub fn theo_volume(&self) -> f64 {
        self.tris
            .iter()
            .map(|t| {
                let [a, b, c] = self.tri_points(t);
                signed_volume(&a, &b, &c)
            })
            .sum()
    }

    /// Area of leaf triangles with the given classification
    pub fn class_area(&self, class: TriClass) -> f64 {
        self.leaf_tris()
            .into_iter()
            .filter(|t| t.class == class)
            .map(|t| self.tri_area(t))
            .sum()
    }

    /// Divergence-theorem volume contribution of leaf triangles with the given classification
    pub fn class_volume(&self, class: TriClass) -> f64 {
        self.leaf_tris()
            .into_iter()
            .filter(|t| t.class == class)
            .map(|t| {
                let [a, b, c] = self.tri_points(t);
                signed_volume(&a, &b, &c)
            })
            .sum()
    }

    /// Reset intersection and classification state
    pub fn clear_split(&mut self) {
        for tri in &mut self.tris {
            tri.split.clear();
            tri.isect_edges.clear();
            tri.class = TriClass::Unclassified;
        }
    }

    /// Absorb another mesh's triangles
    pub fn merge(&mut self, other: &TMesh) {
        let offset = self.nodes.len();
        self.nodes.extend(other.nodes.iter().map(|n| TNode {
            pnt: n.pnt,
            id: n.id + offset,
        }));
        for tri in &other.tris {
            let mut tri = tri.clone();
            shift_nodes(&mut tri, offset);
            self.tris.push(tri);
        }
        self.bbox = self.bbox.union(&other.bbox);
    }

    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        for node in &mut self.nodes {
            node.pnt = matrix.transform_point(&node.pnt);
        }
        let nodes = &self.nodes;
        for tri in &mut self.tris {
            tri.for_each_leaf_mut(&mut |leaf| {
                let [a, b, c] = leaf.nodes.map(|n| nodes[n.0].pnt);
                leaf.normal = area_normal(&a, &b, &c).try_normalize(0.0).unwrap_or_else(Vector3::zeros);
            });
        }
        self.update_bbox();
    }

    pub fn translate(&mut self, offset: &Vector3<f64>) {
        self.transform(&Matrix4::new_translation(offset));
    }

    /// Reverse the winding of every triangle
    pub fn flip_normals(&mut self) {
        for tri in &mut self.tris {
            flip_tri(tri);
        }
    }

    /// Renumber node export ids over the nodes used by leaf triangles of `class`
    ///
    /// Returns the number of distinct nodes.
    pub fn assign_export_ids(&mut self, class: TriClass) -> usize {
        let mut used = vec![false; self.nodes.len()];
        for tri in &self.tris {
            tri.for_each_leaf(&mut |leaf| {
                if leaf.class == class {
                    for n in leaf.nodes {
                        used[n.0] = true;
                    }
                }
            });
        }
        let mut next = 0;
        for (node, used) in self.nodes.iter_mut().zip(used) {
            if used {
                node.id = next;
                next += 1;
            }
        }
        next
    }
}

fn shift_nodes(tri: &mut TTri, offset: usize) {
    for n in &mut tri.nodes {
        n.0 += offset;
    }
    for child in &mut tri.split {
        shift_nodes(child, offset);
    }
}

fn flip_tri(tri: &mut TTri) {
    tri.nodes.swap(1, 2);
    tri.normal = -tri.normal;
    for child in &mut tri.split {
        flip_tri(child);
    }
}
