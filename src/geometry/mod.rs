// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - triangle-soup meshes and the predicates that operate on them

pub mod analytics;
mod bbox;
pub mod bvh;
pub mod classification;
pub mod predicates;
pub mod primitives;
pub mod tmesh;
pub mod triangle_intersection;
pub mod triangle_splitting;

pub use bbox::BoundingBox;
pub use classification::{MeshLocator, SolidRegion};
pub use predicates::Tolerance;
pub use tmesh::{AreaVolume, DragFactors, ISectEdge, MassInputs, NodeId, TMesh, TNode, TTri, TriClass};
