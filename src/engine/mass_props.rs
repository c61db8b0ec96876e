// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mass properties by X slicing and tetrahedral decomposition
//!
//! The solid components are cut by a family of planes at the centres of
//! equal-width X bins. Every cut triangle inside a solid is extruded to the
//! bin faces, the resulting prism is split into eight tetrahedra, and each
//! tetrahedron contributes mass, centroid and second moments. Thin-shell
//! components contribute their surface triangles and point masses their own
//! values. Everything is combined about the total centre of gravity.

use super::intersect::intersect_one_way;
use super::repair::{merge_remove_open_meshes, MeshInfo};
use crate::config::EngineConfig;
use crate::geometry::classification::MeshLocator;
use crate::geometry::predicates::{area_normal, tetra_volume, triangle_area, triangle_centroid};
use crate::geometry::primitives::plane_grid;
use crate::geometry::triangle_splitting::split_mesh;
use crate::geometry::{BoundingBox, TMesh, Tolerance};
use crate::utils::math::{covariance_from_inertia, inertia_from_covariance, outer};
use nalgebra::{Matrix3, Point3, Vector3};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Solid tetrahedron integration unit
#[derive(Debug, Clone, Copy)]
pub struct TetraMassProp {
    /// Index of the owning component
    pub comp: usize,
    pub volume: f64,
    pub mass: f64,
    pub cg: Point3<f64>,
    /// Second moments about `cg`
    pub cov: Matrix3<f64>,
}

impl TetraMassProp {
    pub fn new(comp: usize, density: f64, v: [Point3<f64>; 4]) -> Self {
        let volume = tetra_volume(&v[0], &v[1], &v[2], &v[3]).abs();
        let mass = density * volume;
        let cg = Point3::from((v[0].coords + v[1].coords + v[2].coords + v[3].coords) / 4.0);
        let cov = v
            .iter()
            .fold(Matrix3::zeros(), |acc, p| acc + outer(&(p - cg)))
            * (mass / 20.0);
        Self {
            comp,
            volume,
            mass,
            cg,
            cov,
        }
    }
}

/// Thin-shell triangle integration unit
#[derive(Debug, Clone, Copy)]
pub struct TriShellMassProp {
    pub comp: usize,
    pub area: f64,
    pub mass: f64,
    pub cg: Point3<f64>,
    /// Second moments about `cg`
    pub cov: Matrix3<f64>,
}

impl TriShellMassProp {
    pub fn new(comp: usize, mass_area: f64, p: [Point3<f64>; 3]) -> Self {
        let area = triangle_area(&p[0], &p[1], &p[2]);
        let mass = mass_area * area;
        let cg = triangle_centroid(&p[0], &p[1], &p[2]);
        let cov = p
            .iter()
            .fold(Matrix3::zeros(), |acc, q| acc + outer(&(q - cg)))
            * (mass / 12.0);
        Self {
            comp,
            area,
            mass,
            cg,
            cov,
        }
    }
}

/// Concentrated mass with optional inertia about its own location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointMass {
    pub name: String,
    pub mass: f64,
    pub location: Point3<f64>,
    /// Inertia about `location`, zero for a true point
    #[serde(default)]
    pub inertia: InertiaTensor,
}

/// Inertia components; products are reported as the integrals of xy, xz and yz dm
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InertiaTensor {
    pub ixx: f64,
    pub iyy: f64,
    pub izz: f64,
    pub ixy: f64,
    pub ixz: f64,
    pub iyz: f64,
}

impl InertiaTensor {
    /// From second moments about the reference point
    pub fn from_covariance(cov: &Matrix3<f64>) -> Self {
        let inertia = inertia_from_covariance(cov);
        Self {
            ixx: inertia[(0, 0)],
            iyy: inertia[(1, 1)],
            izz: inertia[(2, 2)],
            ixy: cov[(0, 1)],
            ixz: cov[(0, 2)],
            iyz: cov[(1, 2)],
        }
    }

    /// Second moments about the reference point
    pub fn to_covariance(&self) -> Matrix3<f64> {
        let inertia = Matrix3::new(
            self.ixx, -self.ixy, -self.ixz, //
            -self.ixy, self.iyy, -self.iyz, //
            -self.ixz, -self.iyz, self.izz,
        );
        covariance_from_inertia(&inertia)
    }
}

/// Mass properties of one component or of the whole model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentMassProps {
    pub name: String,
    pub mass: f64,
    pub cg: Point3<f64>,
    /// About the component's own centre of gravity
    pub inertia: InertiaTensor,
    /// Integrated solid volume
    pub volume: f64,
}

/// Output of [`mass_slice_x`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MassPropResults {
    pub total_mass: f64,
    pub cg: Point3<f64>,
    /// About the total centre of gravity
    pub inertia: InertiaTensor,
    pub components: Vec<ComponentMassProps>,
    pub point_masses: Vec<PointMass>,
    /// Total integrated solid volume
    pub total_volume: f64,
    pub num_slices: usize,
    pub info: MeshInfo,
}

/// Running sums of mass, first and second moments about the origin
#[derive(Debug, Clone, Copy)]
struct MassAccumulator {
    mass: f64,
    first: Vector3<f64>,
    second: Matrix3<f64>,
    volume: f64,
}

impl MassAccumulator {
    fn new() -> Self {
        Self {
            mass: 0.0,
            first: Vector3::zeros(),
            second: Matrix3::zeros(),
            volume: 0.0,
        }
    }

    /// Parallel-axis shift of a unit's own second moments to the origin
    fn add(&mut self, mass: f64, cg: &Point3<f64>, cov: &Matrix3<f64>, volume: f64) {
        self.mass += mass;
        self.first += cg.coords * mass;
        self.second += cov + outer(&cg.coords) * mass;
        self.volume += volume;
    }

    fn cg(&self) -> Point3<f64> {
        if self.mass.abs() > 0.0 {
            Point3::from(self.first / self.mass)
        } else {
            Point3::origin()
        }
    }

    /// Second moments about the accumulated centre of gravity
    fn central_cov(&self) -> Matrix3<f64> {
        let cg = self.cg();
        self.second - outer(&cg.coords) * self.mass
    }

    fn finish(&self, name: &str) -> ComponentMassProps {
        ComponentMassProps {
            name: name.to_string(),
            mass: self.mass,
            cg: self.cg(),
            inertia: InertiaTensor::from_covariance(&self.central_cov()),
            volume: self.volume,
        }
    }
}

/// Split the prism swept by `tri` over `[x - half, x + half]` into eight tetrahedra
///
/// The eight boundary triangles of the prism are fanned to its centroid.
pub fn prism_tetras(tri: &[Point3<f64>; 3], half_width: f64) -> [[Point3<f64>; 4]; 8] {
    let offset = Vector3::new(half_width, 0.0, 0.0);
    let a = tri.map(|p| p - offset);
    let b = tri.map(|p| p + offset);
    let centroid = Point3::from(
        (a[0].coords + a[1].coords + a[2].coords + b[0].coords + b[1].coords + b[2].coords) / 6.0,
    );

    let faces = [
        [a[0], a[2], a[1]],
        [b[0], b[1], b[2]],
        [a[0], a[1], b[1]],
        [a[0], b[1], b[0]],
        [a[1], a[2], b[2]],
        [a[1], b[2], b[1]],
        [a[2], a[0], b[0]],
        [a[2], b[0], b[2]],
    ];
    faces.map(|f| [centroid, f[0], f[1], f[2]])
}

/// Highest-priority solid containing `point`; ties go to the later component
fn owning_component(
    point: &Point3<f64>,
    locators: &[MeshLocator],
    meshes: &[TMesh],
    tol: &Tolerance,
) -> Option<usize> {
    let mut best: Option<usize> = None;
    for locator in locators {
        if !locator.contains_point(point, tol) {
            continue;
        }
        let priority = meshes[locator.index].mass.priority;
        match best {
            Some(b) if meshes[b].mass.priority > priority => {}
            _ => best = Some(locator.index),
        }
    }
    best
}

/// Tetrahedra from one X bin
fn slice_bin(
    x: f64,
    width: f64,
    bbox: &BoundingBox,
    meshes: &[TMesh],
    locators: &[MeshLocator],
    tol: &Tolerance,
    resolution: usize,
) -> Vec<TetraMassProp> {
    let size = bbox.size();
    let margin = 0.1 * size.y.max(size.z) + tol.dist;
    let mut plane = plane_grid(
        "slice",
        Point3::new(x, bbox.min.y - margin, bbox.min.z - margin),
        Vector3::new(0.0, size.y + 2.0 * margin, 0.0),
        Vector3::new(0.0, 0.0, size.z + 2.0 * margin),
        resolution,
    );

    let solids: Vec<&TMesh> = locators.iter().map(|l| &meshes[l.index]).collect();
    intersect_one_way(&mut plane, &solids, tol);
    split_mesh(&mut plane, tol);

    let mut tetras = Vec::new();
    for leaf in plane.leaf_tris() {
        let pts = plane.tri_points(leaf);
        if area_normal(&pts[0], &pts[1], &pts[2]).norm() * 0.5 < tol.area {
            continue;
        }
        let centroid = triangle_centroid(&pts[0], &pts[1], &pts[2]);
        let Some(comp) = owning_component(&centroid, locators, meshes, tol) else {
            continue;
        };
        let density = meshes[comp].mass.density;
        for tet in prism_tetras(&pts, width * 0.5) {
            tetras.push(TetraMassProp::new(comp, density, tet));
        }
    }
    tetras
}

/// Compute mass properties of the model
///
/// Meshes are repaired in place first. Solid components are integrated by
/// slicing into `config.mass.num_slices` X bins; shell components and point
/// masses are added directly.
pub fn mass_slice_x(
    meshes: &mut Vec<TMesh>,
    point_masses: &[PointMass],
    config: &EngineConfig,
) -> MassPropResults {
    meshes.retain(|m| !m.half_box);
    for mesh in meshes.iter_mut() {
        mesh.update_bbox();
    }
    let model_bbox = meshes
        .iter()
        .fold(BoundingBox::empty(), |acc, m| acc.union(&m.bbox));
    let tol = Tolerance::from_bbox(&model_bbox, &config.tolerance);
    let info = merge_remove_open_meshes(meshes, &tol);
    for mesh in meshes.iter_mut() {
        mesh.clear_split();
    }
    let meshes: &[TMesh] = meshes;

    let locators: Vec<MeshLocator> = meshes
        .iter()
        .enumerate()
        .filter(|(_, m)| !m.shell && !m.is_empty())
        .map(|(i, m)| MeshLocator::new(i, m))
        .collect();
    let solid_bbox = locators
        .iter()
        .fold(BoundingBox::empty(), |acc, l| acc.union(l.bbox()));

    let num_slices = config.mass.num_slices.max(1);
    let resolution = config.slice.plane_resolution;
    let mut tetras: Vec<TetraMassProp> = Vec::new();
    if !solid_bbox.is_empty() {
        let width = solid_bbox.size().x / num_slices as f64;
        let centres: Vec<f64> = (0..num_slices)
            .map(|k| solid_bbox.min.x + (k as f64 + 0.5) * width)
            .collect();
        let run = |x: &f64| slice_bin(*x, width, &solid_bbox, meshes, &locators, &tol, resolution);
        let per_bin: Vec<Vec<TetraMassProp>> = if config.parallel {
            centres.par_iter().map(run).collect()
        } else {
            centres.iter().map(run).collect()
        };
        tetras = per_bin.into_iter().flatten().collect();
    }
    debug!("mass properties: {} tetrahedra", tetras.len());

    let mut total = MassAccumulator::new();
    let mut per_comp = vec![MassAccumulator::new(); meshes.len()];

    for tet in &tetras {
        per_comp[tet.comp].add(tet.mass, &tet.cg, &tet.cov, tet.volume);
        total.add(tet.mass, &tet.cg, &tet.cov, tet.volume);
    }

    for (comp, mesh) in meshes.iter().enumerate().filter(|(_, m)| m.shell) {
        for tri in &mesh.tris {
            let shell = TriShellMassProp::new(comp, mesh.mass.shell_mass_area, mesh.tri_points(tri));
            per_comp[comp].add(shell.mass, &shell.cg, &shell.cov, 0.0);
            total.add(shell.mass, &shell.cg, &shell.cov, 0.0);
        }
    }

    for pm in point_masses {
        total.add(pm.mass, &pm.location, &pm.inertia.to_covariance(), 0.0);
    }

    let components: Vec<ComponentMassProps> = meshes
        .iter()
        .zip(&per_comp)
        .map(|(mesh, acc)| acc.finish(&mesh.name))
        .collect();
    let totals = total.finish("Total");

    info!(
        "mass properties: mass {:.6}, cg ({:.4}, {:.4}, {:.4}), volume {:.6}",
        totals.mass, totals.cg.x, totals.cg.y, totals.cg.z, totals.volume
    );

    MassPropResults {
        total_mass: totals.mass,
        cg: totals.cg,
        inertia: totals.inertia,
        components,
        point_masses: point_masses.to_vec(),
        total_volume: totals.volume,
        num_slices,
        info,
    }
}
