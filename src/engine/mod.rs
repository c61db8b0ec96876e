// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Analysis engine - intersection, trimming, mass properties and slicing

pub mod comp_geom;
pub mod intersect;
pub mod mass_props;
pub mod repair;
pub mod slicing;

pub use comp_geom::{CompGeom, CompGeomResults, ComponentResult};
pub use mass_props::{mass_slice_x, ComponentMassProps, InertiaTensor, MassPropResults, PointMass};
pub use repair::{merge_remove_open_meshes, MeshInfo};
pub use slicing::{awave_slice, cone_slice, flat_slice, SliceKind, SliceResults};
