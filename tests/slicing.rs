// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Planar, conic and AWAVE slicing tests

use approx::assert_relative_eq;
use compgeom::config::SliceAxis;
use compgeom::engine::SliceKind;
use compgeom::geometry::primitives::{box_mesh, cylinder_mesh};
use compgeom::{CompGeom, EngineConfig, TMesh};
use nalgebra::Point3;

fn offset_cube() -> TMesh {
    box_mesh("cube", Point3::new(0.0, 0.5, 0.5), Point3::new(1.0, 1.5, 1.5))
}

fn config(num_slices: usize) -> EngineConfig {
    let mut config = EngineConfig::default();
    config.slice.num_slices = num_slices;
    config
}

#[test]
fn test_planar_cube_sections() {
    let mut model = CompGeom::new(vec![offset_cube()], config(5));
    let results = model.flat_slice();

    assert_eq!(results.kind, SliceKind::Planar { axis: SliceAxis::X });
    assert_eq!(results.stations.len(), 5);
    assert!(results.stations[0] > 0.0 && results.stations[4] < 1.0);
    for row in &results.areas {
        assert_eq!(row.len(), 1);
        assert_relative_eq!(row[0], 1.0, epsilon = 1e-6);
    }
}

#[test]
fn test_planar_along_y() {
    let mut config = config(3);
    config.slice.axis = SliceAxis::Y;
    let mut model = CompGeom::new(
        vec![box_mesh("bar", Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0))],
        config,
    );
    let results = model.flat_slice();
    for k in 0..results.stations.len() {
        assert_relative_eq!(results.station_total(k), 2.0, epsilon = 1e-6);
    }
}

#[test]
fn test_planar_outside_stations_are_empty() {
    let mut config = config(3);
    config.slice.auto_bounds = false;
    config.slice.start = 2.0;
    config.slice.end = 3.0;
    let mut model = CompGeom::new(vec![offset_cube()], config);
    let results = model.flat_slice();
    assert_eq!(results.stations, vec![2.0, 2.5, 3.0]);
    assert!(results.areas.iter().all(|row| row[0].abs() < 1e-12));
}

#[test]
fn test_cylinder_section_area() {
    let segments = 32;
    let radius = 0.5;
    let mut model = CompGeom::new(
        vec![cylinder_mesh("tube", Point3::new(0.0, 0.0, 0.0), 3.0, radius, segments)],
        config(4),
    );
    let results = model.flat_slice();

    // Regular polygon inscribed in the circle
    let n = segments as f64;
    let polygon = 0.5 * n * radius * radius * (2.0 * std::f64::consts::PI / n).sin();
    for row in &results.areas {
        assert_relative_eq!(row[0], polygon, epsilon = 1e-6);
    }
}

#[test]
fn test_awave_at_mach_one_matches_planar() {
    let mut planar = CompGeom::new(vec![offset_cube()], config(4));
    let planar = planar.flat_slice();

    let mut awave_config = config(4);
    awave_config.slice.mach = 1.0;
    awave_config.slice.num_sections = 4;
    let mut awave = CompGeom::new(vec![offset_cube()], awave_config);
    let awave = awave.awave_slice();

    assert_eq!(awave.section_angles_deg.len(), 4);
    assert_relative_eq!(awave.section_angles_deg[1], 90.0, epsilon = 1e-9);
    for (k, station) in planar.stations.iter().enumerate() {
        assert_relative_eq!(awave.stations[k], *station, epsilon = 1e-9);
        for area in &awave.areas[k] {
            assert_relative_eq!(*area, planar.areas[k][0], epsilon = 1e-6);
        }
        assert_relative_eq!(awave.station_average(k), planar.station_total(k), epsilon = 1e-6);
    }
}

#[test]
fn test_awave_supersonic_covers_model() {
    let mut config = config(6);
    config.slice.mach = 2.0;
    config.slice.num_sections = 3;
    let mut model = CompGeom::new(vec![offset_cube()], config);
    let results = model.awave_slice();

    match results.kind {
        SliceKind::Awave { mach_angle_deg, .. } => assert_relative_eq!(mach_angle_deg, 30.0, epsilon = 1e-9),
        other => panic!("unexpected kind {:?}", other),
    }
    // Oblique cuts start ahead of the nose and end behind the tail
    assert!(results.stations[0] < 0.0);
    assert!(*results.stations.last().unwrap() > 1.0);
    assert!(results.max_average() > 0.0);
    assert!(results.areas.iter().flatten().all(|a| *a >= 0.0));
}

#[test]
fn test_conic_right_angle_matches_planar() {
    let mut planar = CompGeom::new(vec![offset_cube()], config(4));
    let planar = planar.flat_slice();

    let mut conic_config = config(4);
    conic_config.slice.cone_half_angle_deg = 90.0;
    let mut conic = CompGeom::new(vec![offset_cube()], conic_config);
    let conic = conic.cone_slice();

    for k in 0..planar.stations.len() {
        assert_relative_eq!(conic.stations[k], planar.stations[k], epsilon = 1e-9);
        assert_relative_eq!(conic.areas[k][0], planar.areas[k][0], epsilon = 1e-6);
    }
}

#[test]
fn test_empty_model_slices() {
    let mut model = CompGeom::new(Vec::new(), config(4));
    let results = model.flat_slice();
    assert!(results.stations.is_empty());
    assert_eq!(results.max_average(), 0.0);
}
