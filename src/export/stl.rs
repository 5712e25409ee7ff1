// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! STL exporter, binary or ASCII

use super::{output_path, MeshWriter};
use crate::geometry::TriangleSet;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use stl_io::{Normal, Triangle as StlTriangle, Vertex as StlVertex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Binary,
    Ascii,
}

/// All lumps go into one STL solid
pub struct StlWriter {
    encoding: Encoding,
}

impl StlWriter {
    pub fn binary() -> Self {
        Self {
            encoding: Encoding::Binary,
        }
    }

    pub fn ascii() -> Self {
        Self {
            encoding: Encoding::Ascii,
        }
    }
}

impl MeshWriter for StlWriter {
    fn write(&self, mesh: &TriangleSet, base: &Path) -> Result<PathBuf> {
        let path = output_path(base, "stl");
        match self.encoding {
            Encoding::Binary => export_stl_binary(mesh, &path)?,
            Encoding::Ascii => export_stl_ascii(mesh, &path)?,
        }
        Ok(path)
    }
}

fn stl_triangles(mesh: &TriangleSet) -> Vec<StlTriangle> {
    mesh.iter()
        .flat_map(|lump| {
            lump.triangles.iter().map(move |tri| {
                let n = lump.triangle_normal(tri);
                let [v0, v1, v2] = lump.corners(tri);
                StlTriangle {
                    normal: Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                    vertices: [
                        StlVertex::new([v0.x as f32, v0.y as f32, v0.z as f32]),
                        StlVertex::new([v1.x as f32, v1.y as f32, v1.z as f32]),
                        StlVertex::new([v2.x as f32, v2.y as f32, v2.z as f32]),
                    ],
                }
            })
        })
        .collect()
}

fn export_stl_binary(mesh: &TriangleSet, path: &Path) -> Result<()> {
    let triangles = stl_triangles(mesh);
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create STL file: {}", path.display()))?;
    stl_io::write_stl(&mut file, triangles.iter()).context("Failed to write STL file")?;
    Ok(())
}

fn export_stl_ascii(mesh: &TriangleSet, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create STL file: {}", path.display()))?;
    let mut file = BufWriter::new(file);

    writeln!(file, "solid mesh")?;
    for lump in mesh.iter() {
        for tri in &lump.triangles {
            let n = lump.triangle_normal(tri);
            writeln!(file, "  facet normal {} {} {}", n.x, n.y, n.z)?;
            writeln!(file, "    outer loop")?;
            for v in lump.corners(tri) {
                writeln!(file, "      vertex {} {} {}", v.x, v.y, v.z)?;
            }
            writeln!(file, "    endloop")?;
            writeln!(file, "  endfacet")?;
        }
    }
    writeln!(file, "endsolid mesh")?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::fixtures::cube_set;
    use approx::assert_relative_eq;
    use tempfile::TempDir;

    #[test]
    fn test_export_stl_binary() -> Result<()> {
        let dir = TempDir::new()?;
        let path = StlWriter::binary().write(&cube_set(2.0), &dir.path().join("cube.xcsg"))?;

        // 80 byte header, triangle count, 50 bytes per triangle
        assert_eq!(std::fs::metadata(&path)?.len(), 84 + 12 * 50);

        let mut file = File::open(&path)?;
        let stl = stl_io::read_stl(&mut file)?;
        assert_eq!(stl.faces.len(), 12);
        assert_eq!(stl.vertices.len(), 8);
        for face in &stl.faces {
            let n = face.normal;
            assert_relative_eq!((n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt(), 1.0, epsilon = 1e-5);
        }
        Ok(())
    }

    #[test]
    fn test_export_stl_ascii() -> Result<()> {
        let dir = TempDir::new()?;
        let path = StlWriter::ascii().write(&cube_set(1.0), &dir.path().join("cube.xcsg"))?;
        let text = std::fs::read_to_string(&path)?;

        assert!(text.starts_with("solid mesh"));
        assert!(text.trim_end().ends_with("endsolid mesh"));
        assert_eq!(text.matches("facet normal").count(), 12);
        assert_eq!(text.matches("vertex ").count(), 36);
        Ok(())
    }
}
