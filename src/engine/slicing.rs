// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Cross-section slicing: planar, conic and AWAVE (supersonic area rule)
//!
//! Every station builds a cutting surface, intersects it one way against the
//! components, splits it and keeps the pieces whose [`SolidRegion`] is
//! `Inside`. Conic and AWAVE areas are projected onto the YZ plane.

use super::intersect::{classify_cut_surface, intersect_one_way};
use super::repair::{merge_remove_open_meshes, MeshInfo};
use crate::config::{EngineConfig, SliceAxis};
use crate::geometry::classification::MeshLocator;
use crate::geometry::predicates::area_normal;
use crate::geometry::primitives::{cone_surface, plane_grid};
use crate::geometry::triangle_splitting::split_mesh;
use crate::geometry::{BoundingBox, SolidRegion, TMesh, Tolerance};
use crate::utils::math::{deg_to_rad, linspace, mach_angle, rad_to_deg};
use nalgebra::{Point3, Vector3};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Fraction of the station range kept clear of the model extremes
const AUTO_BOUND_INSET: f64 = 1e-3;

/// Facets around a conic cutting surface
const CONE_SEGMENTS: usize = 64;

/// Cutting-surface family
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SliceKind {
    /// Planes normal to an axis
    Planar { axis: SliceAxis },
    /// Aft-opening cones with apex on the X axis
    Conic { half_angle_deg: f64 },
    /// Mach planes rolled around the X axis
    Awave { mach: f64, mach_angle_deg: f64 },
}

/// Area table of one slicing run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SliceResults {
    pub kind: SliceKind,
    /// Station coordinate of each row
    pub stations: Vec<f64>,
    /// Roll angle of each column (a single 0 for planar and conic)
    pub section_angles_deg: Vec<f64>,
    /// `areas[station][section]`
    pub areas: Vec<Vec<f64>>,
    pub info: MeshInfo,
}

impl SliceResults {
    /// Sum of the section areas at a station
    pub fn station_total(&self, station: usize) -> f64 {
        self.areas[station].iter().sum()
    }

    /// Mean of the section areas at a station
    pub fn station_average(&self, station: usize) -> f64 {
        let n = self.areas[station].len();
        if n == 0 {
            0.0
        } else {
            self.station_total(station) / n as f64
        }
    }

    /// Largest average area over all stations
    pub fn max_average(&self) -> f64 {
        (0..self.stations.len())
            .map(|i| self.station_average(i))
            .fold(0.0, f64::max)
    }
}

/// How a cut area is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AreaMode {
    True,
    ProjectedYz,
}

/// Shared state of a slicing run
struct SliceContext {
    meshes: Vec<TMesh>,
    locators: Vec<MeshLocator>,
    bbox: BoundingBox,
    tol: Tolerance,
    info: MeshInfo,
    parallel: bool,
}

impl SliceContext {
    fn prepare(meshes: &mut Vec<TMesh>, config: &EngineConfig) -> Self {
        meshes.retain(|m| !m.half_box);
        for mesh in meshes.iter_mut() {
            mesh.update_bbox();
            mesh.clear_split();
        }
        let model_bbox = meshes
            .iter()
            .fold(BoundingBox::empty(), |acc, m| acc.union(&m.bbox));
        let tol = Tolerance::from_bbox(&model_bbox, &config.tolerance);
        let info = merge_remove_open_meshes(meshes, &tol);

        let locators: Vec<MeshLocator> = meshes
            .iter()
            .enumerate()
            .filter(|(_, m)| !m.is_empty())
            .map(|(i, m)| MeshLocator::new(i, m))
            .collect();
        let bbox = locators
            .iter()
            .fold(BoundingBox::empty(), |acc, l| acc.union(l.bbox()));

        Self {
            meshes: meshes.clone(),
            locators,
            bbox,
            tol,
            info,
            parallel: config.parallel,
        }
    }

    /// Area of a cutting surface lying inside the solids
    fn cut_area(&self, mut surface: TMesh, mode: AreaMode) -> f64 {
        let solids: Vec<&TMesh> = self.locators.iter().map(|l| &self.meshes[l.index]).collect();
        intersect_one_way(&mut surface, &solids, &self.tol);
        split_mesh(&mut surface, &self.tol);
        // Stations run in parallel already
        classify_cut_surface(&mut surface, &self.locators, &self.tol, false);

        surface
            .leaf_tris()
            .into_iter()
            .filter(|t| SolidRegion::from(t.class) == SolidRegion::Inside)
            .map(|t| {
                let [a, b, c] = surface.tri_points(t);
                let n = area_normal(&a, &b, &c);
                match mode {
                    AreaMode::True => n.norm() * 0.5,
                    AreaMode::ProjectedYz => n.x.abs() * 0.5,
                }
            })
            .sum()
    }

    fn run<T: Sync>(&self, items: &[T], f: impl Fn(&T) -> f64 + Sync + Send) -> Vec<f64> {
        if self.parallel {
            items.par_iter().map(f).collect()
        } else {
            items.iter().map(f).collect()
        }
    }

    /// Grid margin around the model
    fn margin(&self) -> f64 {
        0.1 * self.bbox.diagonal() + self.tol.dist
    }

    /// Largest distance of the model from the X axis
    fn radial_extent(&self) -> f64 {
        self.bbox
            .corners()
            .iter()
            .map(|p| p.y.hypot(p.z))
            .fold(0.0, f64::max)
    }
}

/// Evenly spaced stations, inset from automatic bounds
fn stations(lo: f64, hi: f64, config: &EngineConfig) -> Vec<f64> {
    let n = config.slice.num_slices;
    if config.slice.auto_bounds {
        let inset = (hi - lo) * AUTO_BOUND_INSET;
        linspace(lo + inset, hi - inset, n)
    } else {
        linspace(config.slice.start, config.slice.end, n)
    }
}

fn empty_results(kind: SliceKind, info: MeshInfo) -> SliceResults {
    SliceResults {
        kind,
        stations: Vec::new(),
        section_angles_deg: vec![0.0],
        areas: Vec::new(),
        info,
    }
}

/// Planar cross-sections normal to `config.slice.axis`
pub fn flat_slice(meshes: &mut Vec<TMesh>, config: &EngineConfig) -> SliceResults {
    let axis = config.slice.axis;
    let kind = SliceKind::Planar { axis };
    let ctx = SliceContext::prepare(meshes, config);
    if ctx.bbox.is_empty() {
        return empty_results(kind, ctx.info);
    }

    let a = axis.index();
    let (b, c) = ((a + 1) % 3, (a + 2) % 3);
    let stations = stations(ctx.bbox.min[a], ctx.bbox.max[a], config);
    let margin = ctx.margin();
    let size = ctx.bbox.size();

    let areas = ctx.run(&stations, |&s| {
        let mut origin = ctx.bbox.min - Vector3::repeat(margin);
        origin[a] = s;
        let mut u = Vector3::zeros();
        u[b] = size[b] + 2.0 * margin;
        let mut v = Vector3::zeros();
        v[c] = size[c] + 2.0 * margin;
        let plane = plane_grid("slice", origin, u, v, config.slice.plane_resolution);
        ctx.cut_area(plane, AreaMode::True)
    });

    info!("planar slicing: {} stations along {:?}", stations.len(), axis);
    SliceResults {
        kind,
        stations,
        section_angles_deg: vec![0.0],
        areas: areas.into_iter().map(|a| vec![a]).collect(),
        info: ctx.info,
    }
}

/// Conic cross-sections: aft-opening cones with apex at (station, 0, 0)
pub fn cone_slice(meshes: &mut Vec<TMesh>, config: &EngineConfig) -> SliceResults {
    let half_angle_deg = config.slice.cone_half_angle_deg;
    let kind = SliceKind::Conic { half_angle_deg };
    let ctx = SliceContext::prepare(meshes, config);
    if ctx.bbox.is_empty() {
        return empty_results(kind, ctx.info);
    }

    let half_angle = deg_to_rad(half_angle_deg);
    let cot = 1.0 / half_angle.tan();
    let radius = ctx.radial_extent();
    // Earliest apex whose cone still reaches the model
    let lo = ctx.bbox.min.x - radius * cot;
    let stations = stations(lo, ctx.bbox.max.x, config);
    let max_radius = radius + ctx.margin();
    let rings = config.slice.plane_resolution.max(1) * 4;

    let areas = ctx.run(&stations, |&s| {
        let cone = cone_surface(
            "cone",
            Point3::new(s, 0.0, 0.0),
            half_angle,
            max_radius,
            CONE_SEGMENTS,
            rings,
        );
        ctx.cut_area(cone, AreaMode::ProjectedYz)
    });

    info!("conic slicing: {} stations, half-angle {} deg", stations.len(), half_angle_deg);
    SliceResults {
        kind,
        stations,
        section_angles_deg: vec![0.0],
        areas: areas.into_iter().map(|a| vec![a]).collect(),
        info: ctx.info,
    }
}

/// Unit normal of the Mach plane for roll angle `theta`
pub fn awave_normal(mu: f64, theta: f64) -> Vector3<f64> {
    Vector3::new(mu.sin(), -mu.cos() * theta.cos(), -mu.cos() * theta.sin())
}

/// Station coordinate of a point on the Mach plane for roll angle `theta`
pub fn awave_station(p: &Point3<f64>, mu: f64, theta: f64) -> f64 {
    let cot = mu.cos() / mu.sin();
    p.x - cot * (p.y * theta.cos() + p.z * theta.sin())
}

/// AWAVE area-rule slicing with `num_sections` roll angles
pub fn awave_slice(meshes: &mut Vec<TMesh>, config: &EngineConfig) -> SliceResults {
    let mach = config.slice.mach;
    let mu = mach_angle(mach);
    let kind = SliceKind::Awave {
        mach,
        mach_angle_deg: rad_to_deg(mu),
    };
    let ctx = SliceContext::prepare(meshes, config);
    let num_sections = config.slice.num_sections.max(1);
    let thetas: Vec<f64> = (0..num_sections)
        .map(|k| 2.0 * std::f64::consts::PI * k as f64 / num_sections as f64)
        .collect();
    if ctx.bbox.is_empty() {
        let mut results = empty_results(kind, ctx.info);
        results.section_angles_deg = thetas.iter().map(|t| rad_to_deg(*t)).collect();
        return results;
    }

    // One station range covering every roll angle
    let corners = ctx.bbox.corners();
    let (lo, hi) = thetas
        .iter()
        .flat_map(|&theta| corners.iter().map(move |p| awave_station(p, mu, theta)))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| (lo.min(s), hi.max(s)));
    let stations = stations(lo, hi, config);

    let center = ctx.bbox.center();
    let half = 0.5 * ctx.bbox.diagonal() + ctx.margin();
    let cells: Vec<(f64, f64)> = stations
        .iter()
        .flat_map(|&s| thetas.iter().map(move |&theta| (s, theta)))
        .collect();

    let flat = ctx.run(&cells, |&(s, theta)| {
        let normal = awave_normal(mu, theta);
        let through = Point3::new(s, 0.0, 0.0);
        // Square on the plane centred on the model centre's projection
        let foot = center - normal * normal.dot(&(center - through));
        let e1 = Vector3::new(0.0, -theta.sin(), theta.cos());
        let e2 = normal.cross(&e1);
        let origin = foot - e1 * half - e2 * half;
        let plane = plane_grid("awave", origin, e1 * 2.0 * half, e2 * 2.0 * half, config.slice.plane_resolution);
        ctx.cut_area(plane, AreaMode::ProjectedYz)
    });

    debug!("awave slicing: {} cuts", flat.len());
    info!(
        "awave slicing: Mach {}, {} stations x {} sections",
        mach,
        stations.len(),
        num_sections
    );
    SliceResults {
        kind,
        stations,
        section_angles_deg: thetas.iter().map(|t| rad_to_deg(*t)).collect(),
        areas: flat.chunks(num_sections).map(|c| c.to_vec()).collect(),
        info: ctx.info,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_awave_plane_contains_station_point() {
        let mu = deg_to_rad(30.0);
        for k in 0..4 {
            let theta = k as f64 * 0.7;
            let n = awave_normal(mu, theta);
            assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-12);

            // A point on the plane through (2, 0, 0) has station 2
            let e1 = Vector3::new(0.0, -theta.sin(), theta.cos());
            let e2 = n.cross(&e1);
            let p = Point3::new(2.0, 0.0, 0.0) + e1 * 0.3 + e2 * 1.7;
            assert_relative_eq!(awave_station(&p, mu, theta), 2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_awave_normal_subsonic_is_x() {
        let n = awave_normal(mach_angle(0.9), 1.0);
        assert_relative_eq!(n, Vector3::x(), epsilon = 1e-12);
    }

    #[test]
    fn test_results_averages() {
        let results = SliceResults {
            kind: SliceKind::Awave {
                mach: 1.5,
                mach_angle_deg: 41.8,
            },
            stations: vec![0.0, 1.0],
            section_angles_deg: vec![0.0, 180.0],
            areas: vec![vec![1.0, 3.0], vec![2.0, 2.0]],
            info: MeshInfo::default(),
        };
        assert_relative_eq!(results.station_total(0), 4.0);
        assert_relative_eq!(results.station_average(0), 2.0);
        assert_relative_eq!(results.max_average(), 2.0);
    }

    #[test]
    fn test_manual_stations() {
        let mut config = EngineConfig::default();
        config.slice.auto_bounds = false;
        config.slice.start = 1.0;
        config.slice.end = 3.0;
        config.slice.num_slices = 3;
        assert_eq!(stations(0.0, 10.0, &config), vec![1.0, 2.0, 3.0]);
    }
}
