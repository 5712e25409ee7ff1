// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Wavefront OBJ exporter

use super::{output_path, MeshWriter};
use crate::geometry::TriangleSet;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// One named object per lump; face indices are 1-based across the file
pub struct ObjWriter;

impl MeshWriter for ObjWriter {
    fn write(&self, mesh: &TriangleSet, base: &Path) -> Result<PathBuf> {
        let path = output_path(base, "obj");
        let file = File::create(&path)
            .with_context(|| format!("Failed to create OBJ file: {}", path.display()))?;
        let mut out = BufWriter::new(file);

        writeln!(out, "# xcsg")?;
        writeln!(
            out,
            "# {} lumps, {} vertices, {} triangles",
            mesh.len(),
            mesh.vertex_count(),
            mesh.triangle_count()
        )?;

        let mut offset = 1;
        for (index, lump) in mesh.iter().enumerate() {
            writeln!(out, "o lump_{index}")?;
            for v in &lump.vertices {
                writeln!(out, "v {} {} {}", v.x, v.y, v.z)?;
            }
            for triangle in &lump.triangles {
                let [a, b, c] = triangle.indices;
                writeln!(out, "f {} {} {}", a + offset, b + offset, c + offset)?;
            }
            offset += lump.vertices.len();
        }
        out.flush()?;
        Ok(path)
    }
}
