// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Model, configuration, STL and report file tests

use anyhow::Result;
use compgeom::cli::{Runner, SliceMode};
use compgeom::geometry::primitives::box_mesh;
use compgeom::io::{self, report, ComponentSpec, GeometrySpec, ModelFile};
use compgeom::{EngineConfig, EngineError};
use nalgebra::Point3;
use std::path::PathBuf;
use tempfile::tempdir;

fn box_spec(name: &str, min: [f64; 3], max: [f64; 3]) -> ComponentSpec {
    ComponentSpec {
        name: name.to_string(),
        id: None,
        density: 1.0,
        shell: false,
        shell_mass_area: 0.0,
        mass_priority: 0,
        drag: None,
        scale: None,
        translate: None,
        flip_normals: false,
        geometry: GeometrySpec::Box {
            min: Point3::from(min),
            max: Point3::from(max),
        },
    }
}

#[test]
fn test_model_with_relative_stl() -> Result<()> {
    let dir = tempdir()?;
    let pod = box_mesh("pod", Point3::new(0.5, 0.25, 0.25), Point3::new(1.5, 0.75, 0.75));
    io::write_stl(&[&pod], &dir.path().join("pod.stl"))?;

    let mut pod_spec = box_spec("pod", [0.0; 3], [1.0; 3]);
    pod_spec.geometry = GeometrySpec::Stl {
        path: PathBuf::from("pod.stl"),
    };
    let model = ModelFile {
        components: vec![box_spec("body", [0.0; 3], [1.0; 3]), pod_spec],
        point_masses: Vec::new(),
    };
    let model_path = dir.path().join("model.json");
    model.save(&model_path)?;

    let results = compgeom::comp_geom_file(&model_path, EngineConfig::default())?;
    assert_eq!(results.components.len(), 2);
    assert!((results.totals.wet_vol - 1.125).abs() < 1e-6);
    assert!((results.totals.wet_area - 7.0).abs() < 1e-6);
    Ok(())
}

#[test]
fn test_config_roundtrip() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("compgeom.toml");

    let mut config = EngineConfig::default();
    config.half_model = true;
    config.slice.mach = 1.8;
    config.mass.num_slices = 33;
    config.output.csv_file = Some("geom.csv".to_string());
    config.save(&path)?;

    let loaded = EngineConfig::from_file(&path)?;
    assert!(loaded.half_model);
    assert_eq!(loaded.slice.mach, 1.8);
    assert_eq!(loaded.mass.num_slices, 33);
    assert_eq!(loaded.output.csv_file.as_deref(), Some("geom.csv"));
    Ok(())
}

#[test]
fn test_invalid_json_is_parse_error() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ \"components\": [ ")?;

    let err = io::load_model(&path, EngineConfig::default()).unwrap_err();
    assert!(matches!(err, EngineError::ModelParse { .. }));
    Ok(())
}

#[test]
fn test_reports_parse_back() -> Result<()> {
    let dir = tempdir()?;
    let model = ModelFile {
        components: vec![box_spec("cube", [0.0; 3], [1.0; 3])],
        point_masses: Vec::new(),
    };
    let model_path = dir.path().join("cube.json");
    model.save(&model_path)?;

    let mut config = EngineConfig::default();
    config.output.dir = dir.path().to_path_buf();
    config.output.csv_file = Some("cube.csv".to_string());
    config.slice.num_slices = 3;
    let runner = Runner::new(config);

    let geom = runner.comp_geom(&model_path)?;
    let csv = std::fs::read_to_string(dir.path().join("cube.csv"))?;
    assert_eq!(csv, report::comp_geom_csv(&geom.results));
    let totals: Vec<f64> = csv
        .lines()
        .last()
        .unwrap()
        .split(',')
        .skip(1)
        .map(|v| v.trim().parse().unwrap())
        .collect();
    assert_eq!(totals.len(), 4);
    assert!((totals[1] - 6.0).abs() < 1e-6);

    let slices = runner.slice(&model_path, SliceMode::Planar)?;
    let table = std::fs::read_to_string(&slices.files[0])?;
    let rows: Vec<Vec<f64>> = table
        .lines()
        .filter_map(|l| {
            let values: Option<Vec<f64>> = l.split_whitespace().map(|v| v.parse().ok()).collect();
            values.filter(|v| v.len() == 4)
        })
        .collect();
    assert_eq!(rows.len(), 3);
    for row in rows {
        assert!((row[1] - 1.0).abs() < 1e-6);
    }

    let mass = runner.mass_prop(&model_path)?;
    let text = std::fs::read_to_string(&mass.files[0])?;
    assert!(text.contains("Total Mass"));
    assert!((mass.results.total_mass - 1.0).abs() < 1e-6);
    Ok(())
}
