// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Engine configuration system

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Axis along which planar slices are stacked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SliceAxis {
    #[default]
    X,
    Y,
    Z,
}

impl SliceAxis {
    /// Coordinate index of the axis
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

impl std::str::FromStr for SliceAxis {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x" => Ok(Self::X),
            "y" => Ok(Self::Y),
            "z" => Ok(Self::Z),
            other => Err(EngineError::InvalidConfig(format!(
                "unknown slice axis '{}'",
                other
            ))),
        }
    }
}

/// Numeric tolerance settings
///
/// Distances are relative to the model bounding-box diagonal so the same
/// settings work for models in millimetres or in feet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ToleranceConfig {
    /// Distance tolerance as a fraction of the bounding-box diagonal
    pub relative: f64,
    /// Lower bound on the distance tolerance in model units
    pub absolute_floor: f64,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            relative: 1e-9,
            absolute_floor: 1e-12,
        }
    }
}

/// Mass-property slicing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MassConfig {
    /// Number of X bins
    pub num_slices: usize,
}

impl Default for MassConfig {
    fn default() -> Self {
        Self { num_slices: 20 }
    }
}

/// Cross-section slicing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SliceConfig {
    /// Number of stations
    pub num_slices: usize,
    /// Stacking axis for planar slices
    pub axis: SliceAxis,
    /// Derive station bounds from the model bounding box
    pub auto_bounds: bool,
    /// First station when `auto_bounds` is off
    pub start: f64,
    /// Last station when `auto_bounds` is off
    pub end: f64,
    /// Half-angle of conic cutting surfaces, degrees
    pub cone_half_angle_deg: f64,
    /// Free-stream Mach number for AWAVE slicing
    pub mach: f64,
    /// Number of roll angles for AWAVE slicing
    pub num_sections: usize,
    /// Grid cells per side of a cutting plane
    pub plane_resolution: usize,
}

impl Default for SliceConfig {
    fn default() -> Self {
        Self {
            num_slices: 10,
            axis: SliceAxis::X,
            auto_bounds: true,
            start: 0.0,
            end: 0.0,
            cone_half_angle_deg: 45.0,
            mach: 1.0,
            num_sections: 4,
            plane_resolution: 2,
        }
    }
}

/// Report file names, relative to `dir`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub comp_geom_file: String,
    pub csv_file: Option<String>,
    pub drag_build_up_file: Option<String>,
    pub mass_prop_file: String,
    pub slice_file: String,
    pub stl_file: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            comp_geom_file: "comp_geom.txt".to_string(),
            csv_file: None,
            drag_build_up_file: None,
            mass_prop_file: "massprop.txt".to_string(),
            slice_file: "slice.txt".to_string(),
            stl_file: None,
        }
    }
}

impl OutputConfig {
    /// Resolve a report file name against the output directory
    pub fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Run the classification pass on the rayon thread pool
    pub parallel: bool,
    /// Trim the model to its y >= 0 half
    pub half_model: bool,
    pub tolerance: ToleranceConfig,
    pub mass: MassConfig,
    pub slice: SliceConfig,
    pub output: OutputConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            half_model: false,
            tolerance: ToleranceConfig::default(),
            mass: MassConfig::default(),
            slice: SliceConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| EngineError::io(path, e))?;
        let config: EngineConfig =
            toml::from_str(&content).map_err(|source| EngineError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn load(path: Option<&Path>) -> EngineResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new("compgeom.toml").exists() => Self::from_file("compgeom.toml")?,
            None => Self::default(),
        };

        if let Ok(parallel) = std::env::var("COMPGEOM_PARALLEL") {
            config.parallel = parallel.parse().unwrap_or(config.parallel);
        }

        if let Ok(relative) = std::env::var("COMPGEOM_TOLERANCE") {
            if let Ok(value) = relative.parse() {
                config.tolerance.relative = value;
            }
        }

        if let Ok(output_dir) = std::env::var("COMPGEOM_OUTPUT_DIR") {
            config.output.dir = PathBuf::from(output_dir);
        }

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> EngineResult<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| EngineError::io(path, e))
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> EngineResult<()> {
        if !(self.tolerance.relative > 0.0 && self.tolerance.relative < 1e-2) {
            return Err(EngineError::InvalidConfig(format!(
                "relative tolerance {} must lie in (0, 0.01)",
                self.tolerance.relative
            )));
        }
        if self.mass.num_slices == 0 {
            return Err(EngineError::InvalidConfig(
                "mass.num_slices must be at least 1".to_string(),
            ));
        }
        if self.slice.num_slices == 0 || self.slice.num_sections == 0 {
            return Err(EngineError::InvalidConfig(
                "slice counts must be at least 1".to_string(),
            ));
        }
        if !(self.slice.cone_half_angle_deg > 0.0 && self.slice.cone_half_angle_deg <= 90.0) {
            return Err(EngineError::InvalidConfig(format!(
                "cone half-angle {} must lie in (0, 90] degrees",
                self.slice.cone_half_angle_deg
            )));
        }
        Ok(())
    }
}
