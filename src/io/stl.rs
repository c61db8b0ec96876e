// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! STL import and export

use crate::error::{EngineError, EngineResult};
use crate::geometry::{NodeId, TMesh};
use nalgebra::Point3;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use stl_io::{Normal, Triangle as StlTriangle, Vertex as StlVertex};

/// Read an ASCII or binary STL file as one component surface
pub fn read_stl_mesh(path: &Path, name: &str) -> EngineResult<TMesh> {
    let mut file = File::open(path).map_err(|e| EngineError::io(path, e))?;
    let stl = stl_io::read_stl(&mut file).map_err(|e| EngineError::Stl {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut mesh = TMesh::new(name, name);
    let ids: Vec<NodeId> = stl
        .vertices
        .iter()
        .map(|v| mesh.add_node(Point3::new(v[0] as f64, v[1] as f64, v[2] as f64)))
        .collect();
    for face in &stl.faces {
        mesh.add_tri_nodes(face.vertices.map(|i| ids[i]));
    }
    mesh.update_bbox();
    Ok(mesh)
}

/// Write the current leaf triangles of the meshes as binary STL
pub fn write_stl(meshes: &[&TMesh], path: &Path) -> EngineResult<()> {
    let to_vertex = |p: &Point3<f64>| StlVertex::new([p.x as f32, p.y as f32, p.z as f32]);

    let triangles: Vec<StlTriangle> = meshes
        .iter()
        .flat_map(|mesh| {
            mesh.leaf_tris().into_iter().map(move |tri| {
                let pts = mesh.tri_points(tri);
                StlTriangle {
                    normal: Normal::new([tri.normal.x as f32, tri.normal.y as f32, tri.normal.z as f32]),
                    vertices: [to_vertex(&pts[0]), to_vertex(&pts[1]), to_vertex(&pts[2])],
                }
            })
        })
        .collect();

    let file = File::create(path).map_err(|e| EngineError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    stl_io::write_stl(&mut writer, triangles.iter()).map_err(|e| EngineError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::primitives;
    use approx::assert_relative_eq;
    use tempfile::tempdir;

    #[test]
    fn test_stl_roundtrip_welds_vertices() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("box.stl");
        let mesh = primitives::box_mesh("b", Point3::origin(), Point3::new(2.0, 1.0, 1.0));

        write_stl(&[&mesh], &path).unwrap();
        let back = read_stl_mesh(&path, "b").unwrap();

        assert_eq!(back.num_tris(), 12);
        assert_eq!(back.nodes.len(), 8);
        assert_relative_eq!(back.theo_volume(), 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_stl_mesh(Path::new("/nonexistent/none.stl"), "x").unwrap_err();
        assert!(matches!(err, EngineError::Io { .. }));
    }
}
