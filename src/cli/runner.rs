// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Analysis runs that load a model, execute one engine pass and write its reports

use crate::config::EngineConfig;
use crate::engine::{CompGeomResults, MassPropResults, MeshInfo, SliceResults};
use crate::geometry::analytics::GeometryStats;
use crate::io::{self, report};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::info;

/// Slicing family selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceMode {
    Planar,
    Conic,
    Awave,
}

/// Outcome of a run together with the files it wrote
#[derive(Debug)]
pub struct RunOutput<T> {
    pub results: T,
    pub files: Vec<PathBuf>,
    pub duration: Duration,
}

/// Component statistics before repair, and what the repair changed
#[derive(Debug)]
pub struct CheckResults {
    pub components: Vec<GeometryStats>,
    pub info: MeshInfo,
}

/// Runner for engine passes
pub struct Runner {
    config: EngineConfig,
}

impl Runner {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn write(&self, file: &str, content: &str, files: &mut Vec<PathBuf>) -> Result<()> {
        let path = self.config.output.path(file);
        report::write_report(&path, content)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        info!("wrote {}", path.display());
        files.push(path);
        Ok(())
    }

    /// Intersect and trim; writes the text report, optional CSV, drag build-up and STL
    pub fn comp_geom(&self, model: &Path) -> Result<RunOutput<CompGeomResults>> {
        let start = Instant::now();
        let mut geom = io::load_model(model, self.config.clone())
            .with_context(|| format!("Failed to load model {}", model.display()))?;
        let results = geom.intersect_trim();

        let output = &self.config.output;
        let mut files = Vec::new();
        self.write(&output.comp_geom_file, &report::comp_geom_text(&results), &mut files)?;
        if let Some(csv) = &output.csv_file {
            self.write(csv, &report::comp_geom_csv(&results), &mut files)?;
        }
        if let Some(tsv) = &output.drag_build_up_file {
            self.write(tsv, &report::drag_build_up_tsv(&results), &mut files)?;
        }
        if let Some(stl) = &output.stl_file {
            let path = output.path(stl);
            let exterior = geom.exterior_mesh();
            io::write_stl(&[&exterior], &path)
                .with_context(|| format!("Failed to write STL {}", path.display()))?;
            files.push(path);
        }

        Ok(RunOutput {
            results,
            files,
            duration: start.elapsed(),
        })
    }

    /// Mass properties; writes the mass property report
    pub fn mass_prop(&self, model: &Path) -> Result<RunOutput<MassPropResults>> {
        let start = Instant::now();
        let mut geom = io::load_model(model, self.config.clone())
            .with_context(|| format!("Failed to load model {}", model.display()))?;
        let results = geom.mass_slice_x();

        let mut files = Vec::new();
        self.write(
            &self.config.output.mass_prop_file,
            &report::mass_prop_text(&results),
            &mut files,
        )?;
        Ok(RunOutput {
            results,
            files,
            duration: start.elapsed(),
        })
    }

    /// Area slicing; writes the slice table
    pub fn slice(&self, model: &Path, mode: SliceMode) -> Result<RunOutput<SliceResults>> {
        let start = Instant::now();
        let mut geom = io::load_model(model, self.config.clone())
            .with_context(|| format!("Failed to load model {}", model.display()))?;
        let results = match mode {
            SliceMode::Planar => geom.flat_slice(),
            SliceMode::Conic => geom.cone_slice(),
            SliceMode::Awave => geom.awave_slice(),
        };

        let mut files = Vec::new();
        self.write(
            &self.config.output.slice_file,
            &report::slice_text(&results),
            &mut files,
        )?;
        Ok(RunOutput {
            results,
            files,
            duration: start.elapsed(),
        })
    }

    /// Repair pass only, no files written
    pub fn check(&self, model: &Path) -> Result<RunOutput<CheckResults>> {
        let start = Instant::now();
        let mut geom = io::load_model(model, self.config.clone())
            .with_context(|| format!("Failed to load model {}", model.display()))?;
        let components = geom.component_stats();
        let info = geom.check();
        Ok(RunOutput {
            results: CheckResults { components, info },
            files: Vec::new(),
            duration: start.elapsed(),
        })
    }
}
