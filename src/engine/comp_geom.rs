// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Component geometry model and the intersect/trim driver

use super::intersect::{classify_meshes, intersect_meshes, split_meshes};
use super::mass_props::{mass_slice_x, MassPropResults, PointMass};
use super::repair::{merge_remove_open_meshes, MeshInfo};
use super::slicing::{awave_slice, cone_slice, flat_slice, SliceResults};
use crate::config::EngineConfig;
use crate::geometry::analytics::{analyze, GeometryStats};
use crate::geometry::primitives::half_box_mesh;
use crate::geometry::{AreaVolume, BoundingBox, DragFactors, TMesh, TriClass, Tolerance};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

/// Area/volume results of one component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentResult {
    pub name: String,
    pub id: String,
    #[serde(flatten)]
    pub values: AreaVolume,
    pub num_tris: usize,
    pub drag: Option<DragFactors>,
}

/// Output of [`CompGeom::intersect_trim`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompGeomResults {
    pub components: Vec<ComponentResult>,
    pub totals: AreaVolume,
    pub info: MeshInfo,
    pub half_model: bool,
    /// Exterior triangles kept after trimming
    pub num_exterior_tris: usize,
    /// Distinct nodes used by the exterior triangles
    pub num_exterior_nodes: usize,
}

/// A set of component meshes with their analysis settings
#[derive(Debug, Clone)]
pub struct CompGeom {
    pub meshes: Vec<TMesh>,
    pub point_masses: Vec<PointMass>,
    pub config: EngineConfig,
}

impl CompGeom {
    pub fn new(meshes: Vec<TMesh>, config: EngineConfig) -> Self {
        Self {
            meshes,
            point_masses: Vec::new(),
            config,
        }
    }

    pub fn with_point_masses(mut self, point_masses: Vec<PointMass>) -> Self {
        self.point_masses = point_masses;
        self
    }

    /// Bounding box of the component meshes
    pub fn model_bbox(&self) -> BoundingBox {
        self.meshes
            .iter()
            .filter(|m| !m.half_box)
            .flat_map(|m| m.nodes.iter().map(|n| &n.pnt))
            .fold(BoundingBox::empty(), |mut acc, p| {
                acc.expand_to_include(p);
                acc
            })
    }

    /// Tolerances scaled to the model
    pub fn tolerance(&self) -> Tolerance {
        Tolerance::from_bbox(&self.model_bbox(), &self.config.tolerance)
    }

    /// Size and closedness of every component as loaded
    pub fn component_stats(&self) -> Vec<GeometryStats> {
        let tol = self.tolerance();
        self.meshes
            .iter()
            .filter(|m| !m.half_box)
            .map(|m| analyze(m, &tol))
            .collect()
    }

    /// Run the repair pass only
    pub fn check(&mut self) -> MeshInfo {
        let tol = self.tolerance();
        merge_remove_open_meshes(&mut self.meshes, &tol)
    }

    /// Intersect all components, trim hidden surface and integrate areas and volumes
    ///
    /// Theoretical values describe each component alone. Wetted values count
    /// only exterior triangles; with `half_model` the model is first cut at
    /// y = 0 and the symmetry-plane cap contributes to wetted volume only.
    pub fn intersect_trim(&mut self) -> CompGeomResults {
        let start = Instant::now();
        self.meshes.retain(|m| !m.half_box);

        let model_bbox = self.model_bbox();
        let tol = Tolerance::from_bbox(&model_bbox, &self.config.tolerance);
        debug!("tolerance: dist {:e}, area {:e}", tol.dist, tol.area);

        let info = merge_remove_open_meshes(&mut self.meshes, &tol);

        for mesh in &mut self.meshes {
            mesh.clear_split();
            mesh.update_bbox();
            mesh.results = AreaVolume {
                theo_area: mesh.theo_area(),
                theo_vol: mesh.theo_volume(),
                ..AreaVolume::default()
            };
        }

        let half_model = self.config.half_model && !model_bbox.is_empty();
        if half_model {
            self.meshes.push(half_box_mesh(&model_bbox));
        }

        let segments = intersect_meshes(&mut self.meshes, &tol);
        let split = split_meshes(&mut self.meshes, &tol);
        let (interior, exterior) = classify_meshes(&mut self.meshes, &tol, self.config.parallel);
        debug!(
            "{} segments, {} triangles split, {} interior / {} exterior leaves",
            segments, split, interior, exterior
        );

        let mut totals = AreaVolume::default();
        for mesh in self.meshes.iter_mut() {
            if mesh.half_box {
                // Cap on the symmetry plane, facing into the kept half
                totals.wet_vol -= mesh.class_volume(TriClass::Interior);
                continue;
            }
            mesh.results.wet_area = mesh.class_area(TriClass::Exterior);
            mesh.results.wet_vol = mesh.class_volume(TriClass::Exterior);
            totals.theo_area += mesh.results.theo_area;
            totals.theo_vol += mesh.results.theo_vol;
            totals.wet_area += mesh.results.wet_area;
            totals.wet_vol += mesh.results.wet_vol;
        }

        self.meshes.retain(|m| !m.half_box);

        let components: Vec<ComponentResult> = self
            .meshes
            .iter()
            .map(|m| ComponentResult {
                name: m.name.clone(),
                id: m.ptr_id.clone(),
                values: m.results,
                num_tris: m.num_tris(),
                drag: m.drag,
            })
            .collect();
        let num_exterior_tris = self
            .meshes
            .iter()
            .map(|m| {
                m.leaf_tris()
                    .into_iter()
                    .filter(|t| t.class == TriClass::Exterior)
                    .count()
            })
            .sum();
        let num_exterior_nodes = self
            .meshes
            .iter_mut()
            .map(|m| m.assign_export_ids(TriClass::Exterior))
            .sum();

        info!(
            "comp geom: {} components, wetted area {:.6}, wetted volume {:.6} ({:.2?})",
            components.len(),
            totals.wet_area,
            totals.wet_vol,
            start.elapsed()
        );

        CompGeomResults {
            components,
            totals,
            info,
            half_model,
            num_exterior_tris,
            num_exterior_nodes,
        }
    }

    /// Exterior surface left after [`Self::intersect_trim`], as one mesh
    pub fn exterior_mesh(&self) -> TMesh {
        let mut out = TMesh::new("exterior", "exterior");
        for mesh in self.meshes.iter().filter(|m| !m.half_box) {
            for leaf in mesh.leaf_tris() {
                if leaf.class == TriClass::Exterior {
                    let [a, b, c] = mesh.tri_points(leaf);
                    out.add_tri(a, b, c);
                }
            }
        }
        out.update_bbox();
        out
    }

    /// Mass properties of the components and point masses
    pub fn mass_slice_x(&mut self) -> MassPropResults {
        mass_slice_x(&mut self.meshes, &self.point_masses, &self.config)
    }

    /// Planar slices along the configured axis
    pub fn flat_slice(&mut self) -> SliceResults {
        flat_slice(&mut self.meshes, &self.config)
    }

    /// Conic slices
    pub fn cone_slice(&mut self) -> SliceResults {
        cone_slice(&mut self.meshes, &self.config)
    }

    /// AWAVE area-rule slices
    pub fn awave_slice(&mut self) -> SliceResults {
        awave_slice(&mut self.meshes, &self.config)
    }
}
