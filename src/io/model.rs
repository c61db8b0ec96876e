// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! JSON model files
//!
//! A model lists components and point masses:
//!
//! ```json
//! {
//!   "components": [
//!     { "name": "fuselage", "density": 2.7,
//!       "geometry": { "type": "cylinder", "start": [0, 0, 0], "length": 10, "radius": 1 } },
//!     { "name": "pod", "geometry": { "type": "stl", "path": "pod.stl" } }
//!   ],
//!   "point_masses": [ { "name": "engine", "mass": 120, "location": [2, 0, 0] } ]
//! }
//! ```
//!
//! STL paths are resolved relative to the model file.

use super::stl::read_stl_mesh;
use crate::config::EngineConfig;
use crate::engine::{CompGeom, PointMass};
use crate::error::{EngineError, EngineResult};
use crate::geometry::primitives::{box_mesh, cylinder_mesh, sphere_mesh};
use crate::geometry::{DragFactors, MassInputs, NodeId, TMesh};
use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

fn default_segments() -> usize {
    24
}

fn default_rings() -> usize {
    12
}

fn default_density() -> f64 {
    1.0
}

/// Surface description of a component
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeometrySpec {
    /// Indexed triangles, wound outward
    Triangles {
        vertices: Vec<[f64; 3]>,
        faces: Vec<[usize; 3]>,
    },
    /// ASCII or binary STL file
    Stl { path: PathBuf },
    Box { min: Point3<f64>, max: Point3<f64> },
    Sphere {
        center: Point3<f64>,
        radius: f64,
        #[serde(default = "default_segments")]
        segments: usize,
        #[serde(default = "default_rings")]
        rings: usize,
    },
    /// Circular cylinder along +X from `start`
    Cylinder {
        start: Point3<f64>,
        length: f64,
        radius: f64,
        #[serde(default = "default_segments")]
        segments: usize,
    },
}

/// One component of a model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentSpec {
    pub name: String,
    /// Component id; surfaces sharing an id are never intersected with each other
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default = "default_density")]
    pub density: f64,
    #[serde(default)]
    pub shell: bool,
    #[serde(default)]
    pub shell_mass_area: f64,
    #[serde(default)]
    pub mass_priority: i32,
    #[serde(default)]
    pub drag: Option<DragFactors>,
    /// Uniform scale applied before the translation
    #[serde(default)]
    pub scale: Option<f64>,
    #[serde(default)]
    pub translate: Option<Vector3<f64>>,
    /// Reverse the winding of inward-facing input
    #[serde(default)]
    pub flip_normals: bool,
    pub geometry: GeometrySpec,
}

/// Contents of a model file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelFile {
    pub components: Vec<ComponentSpec>,
    #[serde(default)]
    pub point_masses: Vec<PointMass>,
}

impl ModelFile {
    /// Parse a model file from disk
    pub fn from_file(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| EngineError::io(path, e))?;
        serde_json::from_str(&content).map_err(|source| EngineError::ModelParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the model as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> EngineResult<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self).map_err(|source| EngineError::ModelParse {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, content).map_err(|e| EngineError::io(path, e))
    }

    /// Build the component meshes; relative STL paths resolve against `base_dir`
    pub fn build_meshes(&self, base_dir: &Path) -> EngineResult<Vec<TMesh>> {
        self.components
            .iter()
            .map(|spec| build_component(spec, base_dir))
            .collect()
    }
}

/// Load a model file into a [`CompGeom`]
pub fn load_model(path: impl AsRef<Path>, config: EngineConfig) -> EngineResult<CompGeom> {
    let path = path.as_ref();
    let model = ModelFile::from_file(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let meshes = model.build_meshes(base_dir)?;

    info!(
        "loaded {} components and {} point masses from {}",
        meshes.len(),
        model.point_masses.len(),
        path.display()
    );
    Ok(CompGeom::new(meshes, config).with_point_masses(model.point_masses))
}

fn build_component(spec: &ComponentSpec, base_dir: &Path) -> EngineResult<TMesh> {
    if spec.name.trim().is_empty() {
        return Err(EngineError::invalid_component(&spec.name, "name must not be empty"));
    }
    if spec.density < 0.0 || spec.shell_mass_area < 0.0 {
        return Err(EngineError::invalid_component(&spec.name, "densities must not be negative"));
    }

    let mut mesh = match &spec.geometry {
        GeometrySpec::Triangles { vertices, faces } => triangles_mesh(&spec.name, vertices, faces)?,
        GeometrySpec::Stl { path } => {
            let path = if path.is_absolute() {
                path.clone()
            } else {
                base_dir.join(path)
            };
            read_stl_mesh(&path, &spec.name)?
        }
        GeometrySpec::Box { min, max } => {
            if (0..3).any(|i| min[i] >= max[i]) {
                return Err(EngineError::invalid_component(&spec.name, "box min must be below max"));
            }
            box_mesh(&spec.name, *min, *max)
        }
        GeometrySpec::Sphere {
            center,
            radius,
            segments,
            rings,
        } => {
            positive(&spec.name, "radius", *radius)?;
            sphere_mesh(&spec.name, *center, *radius, *segments, *rings)
        }
        GeometrySpec::Cylinder {
            start,
            length,
            radius,
            segments,
        } => {
            positive(&spec.name, "radius", *radius)?;
            positive(&spec.name, "length", *length)?;
            cylinder_mesh(&spec.name, *start, *length, *radius, *segments)
        }
    };

    mesh.ptr_id = spec.id.clone().unwrap_or_else(|| spec.name.clone());
    mesh.shell = spec.shell;
    mesh.mass = MassInputs {
        density: spec.density,
        shell_mass_area: spec.shell_mass_area,
        priority: spec.mass_priority,
    };
    mesh.drag = spec.drag;

    if let Some(scale) = spec.scale {
        positive(&spec.name, "scale", scale)?;
        mesh.transform(&Matrix4::new_scaling(scale));
    }
    if let Some(offset) = spec.translate {
        mesh.translate(&offset);
    }
    if spec.flip_normals {
        mesh.flip_normals();
    }
    mesh.update_bbox();

    debug!("{}: {} triangles", mesh.name, mesh.num_tris());
    Ok(mesh)
}

fn positive(component: &str, what: &str, value: f64) -> EngineResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(EngineError::invalid_component(
            component,
            format!("{} must be positive, got {}", what, value),
        ))
    }
}

fn triangles_mesh(name: &str, vertices: &[[f64; 3]], faces: &[[usize; 3]]) -> EngineResult<TMesh> {
    let mut mesh = TMesh::new(name, name);
    let ids: Vec<NodeId> = vertices
        .iter()
        .map(|v| mesh.add_node(Point3::new(v[0], v[1], v[2])))
        .collect();

    for face in faces {
        if let Some(bad) = face.iter().find(|&&i| i >= ids.len()) {
            return Err(EngineError::invalid_component(
                name,
                format!("face index {} out of range for {} vertices", bad, ids.len()),
            ));
        }
        mesh.add_tri_nodes(face.map(|i| ids[i]));
    }
    mesh.update_bbox();
    Ok(mesh)
}
