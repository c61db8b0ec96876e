// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bounding Volume Hierarchy (BVH) for spatial acceleration
//! Used for the broad phase of triangle-triangle intersection and for ray
//! casting during point containment.

use super::tmesh::TMesh;
use super::BoundingBox;
use nalgebra::{Point3, Vector3};

/// BVH node
#[derive(Debug, Clone)]
pub struct BVHNode {
    /// Bounding box of this node
    pub bbox: BoundingBox,
    /// Left child (None for leaf)
    pub left: Option<Box<BVHNode>>,
    /// Right child (None for leaf)
    pub right: Option<Box<BVHNode>>,
    /// Triangle indices (only for leaf nodes)
    pub triangle_indices: Vec<usize>,
}

impl BVHNode {
    fn leaf(bbox: BoundingBox, triangle_indices: Vec<usize>) -> Self {
        Self {
            bbox,
            left: None,
            right: None,
            triangle_indices,
        }
    }

    fn internal(left: Box<BVHNode>, right: Box<BVHNode>) -> Self {
        Self {
            bbox: left.bbox.union(&right.bbox),
            left: Some(left),
            right: Some(right),
            triangle_indices: Vec::new(),
        }
    }

    /// Check if this is a leaf node
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Bounding Volume Hierarchy over triangle boxes
#[derive(Debug, Clone)]
pub struct BVH {
    root: BVHNode,
}

impl BVH {
    /// Build BVH from (triangle_index, bbox) pairs
    pub fn build(triangles: Vec<(usize, BoundingBox)>) -> Self {
        if triangles.is_empty() {
            return Self {
                root: BVHNode::leaf(BoundingBox::empty(), Vec::new()),
            };
        }
        Self {
            root: Self::build_recursive(triangles, 0),
        }
    }

    /// Build over the top-level triangles of a mesh
    pub fn from_mesh(mesh: &TMesh) -> Self {
        let boxes = mesh
            .tris
            .iter()
            .enumerate()
            .map(|(idx, tri)| (idx, mesh.tri_bbox(tri)))
            .collect();
        Self::build(boxes)
    }

    fn build_recursive(mut triangles: Vec<(usize, BoundingBox)>, depth: usize) -> BVHNode {
        const MAX_DEPTH: usize = 48;
        const MIN_TRIANGLES: usize = 4;

        let bbox = triangles
            .iter()
            .fold(BoundingBox::empty(), |acc, (_, b)| acc.union(b));

        if triangles.len() <= MIN_TRIANGLES || depth >= MAX_DEPTH {
            let indices = triangles.iter().map(|(idx, _)| *idx).collect();
            return BVHNode::leaf(bbox, indices);
        }

        // Median split along the longest axis of the node
        let size = bbox.size();
        let axis = if size.x >= size.y && size.x >= size.z {
            0
        } else if size.y >= size.z {
            1
        } else {
            2
        };
        triangles.sort_by(|(_, a), (_, b)| a.center()[axis].total_cmp(&b.center()[axis]));

        let right_triangles = triangles.split_off(triangles.len() / 2);
        let left = Box::new(Self::build_recursive(triangles, depth + 1));
        let right = Box::new(Self::build_recursive(right_triangles, depth + 1));

        BVHNode::internal(left, right)
    }

    /// Bounds of everything in the tree
    pub fn bbox(&self) -> &BoundingBox {
        &self.root.bbox
    }

    /// Query triangles whose boxes overlap the given bounding box
    pub fn query_triangles(&self, bbox: &BoundingBox) -> Vec<usize> {
        let mut result = Vec::new();
        if !self.root.bbox.is_empty() {
            Self::query_recursive(&self.root, bbox, &mut result);
        }
        result
    }

    fn query_recursive(node: &BVHNode, bbox: &BoundingBox, result: &mut Vec<usize>) {
        if !node.bbox.overlaps(bbox) {
            return;
        }

        if node.is_leaf() {
            result.extend_from_slice(&node.triangle_indices);
            return;
        }
        if let Some(ref left) = node.left {
            Self::query_recursive(left, bbox, result);
        }
        if let Some(ref right) = node.right {
            Self::query_recursive(right, bbox, result);
        }
    }

    /// Query triangles whose boxes a ray from `origin` along `direction` may hit
    pub fn query_ray(&self, origin: &Point3<f64>, direction: &Vector3<f64>) -> Vec<usize> {
        let inv_dir = direction.map(|c| 1.0 / c);
        let mut result = Vec::new();
        if !self.root.bbox.is_empty() {
            Self::ray_recursive(&self.root, origin, &inv_dir, &mut result);
        }
        result
    }

    fn ray_recursive(
        node: &BVHNode,
        origin: &Point3<f64>,
        inv_dir: &Vector3<f64>,
        result: &mut Vec<usize>,
    ) {
        if !node.bbox.intersects_ray(origin, inv_dir) {
            return;
        }

        if node.is_leaf() {
            result.extend_from_slice(&node.triangle_indices);
            return;
        }
        if let Some(ref left) = node.left {
            Self::ray_recursive(left, origin, inv_dir, result);
        }
        if let Some(ref right) = node.right {
            Self::ray_recursive(right, origin, inv_dir, result);
        }
    }

    /// Get root node (for testing)
    #[cfg(test)]
    pub fn root(&self) -> &BVHNode {
        &self.root
    }
}
