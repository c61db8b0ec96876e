// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! compgeom
//!
//! Component-geometry engine for closed triangulated surfaces. Components are
//! intersected against each other, split along the intersection curves and
//! classified so that hidden surface can be trimmed. On top of that the crate
//! computes theoretical and wetted areas and volumes, mass properties by
//! X-slicing, and planar, conic and AWAVE cross-section area tables.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod io;
pub mod utils;

pub use config::EngineConfig;
pub use engine::{CompGeom, CompGeomResults, MassPropResults, MeshInfo, PointMass, SliceResults};
pub use error::{EngineError, EngineResult};
pub use geometry::{TMesh, TriClass};
pub use io::load_model;

use std::path::Path;

/// Load a model file and run intersect/trim with the given configuration
pub fn comp_geom_file(path: impl AsRef<Path>, config: EngineConfig) -> EngineResult<CompGeomResults> {
    let mut model = load_model(path, config)?;
    Ok(model.intersect_trim())
}
