// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - model loading, STL exchange and reports

mod model;
pub mod report;
mod stl;

pub use model::{load_model, ComponentSpec, GeometrySpec, ModelFile};
pub use stl::{read_stl_mesh, write_stl};
