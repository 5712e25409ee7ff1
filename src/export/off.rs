// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Object File Format exporter

use super::{output_path, MeshWriter};
use crate::geometry::{Mesh, TriangleSet};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// OFF holds one body per file: a multi-lump result becomes `<stem>_<n>.off`
/// per lump, numbered from 1. Indices are 0-based.
pub struct OffWriter;

impl MeshWriter for OffWriter {
    /// All lumps in a single OFF body
    fn write(&self, mesh: &TriangleSet, base: &Path) -> Result<PathBuf> {
        let path = output_path(base, "off");
        export_off(mesh.lumps(), &path)?;
        Ok(path)
    }

    fn write_files(&self, mesh: &TriangleSet, base: &Path) -> Result<Vec<PathBuf>> {
        if mesh.len() <= 1 {
            return Ok(vec![self.write(mesh, base)?]);
        }

        let stem = base
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut paths = Vec::with_capacity(mesh.len());
        for (i, lump) in mesh.iter().enumerate() {
            let path = base.with_file_name(format!("{stem}_{}.off", i + 1));
            export_off(std::slice::from_ref(lump), &path)?;
            paths.push(path);
        }
        Ok(paths)
    }
}

fn export_off(lumps: &[Mesh], path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create OFF file: {}", path.display()))?;
    let mut out = BufWriter::new(file);

    let vertices: usize = lumps.iter().map(Mesh::vertex_count).sum();
    let triangles: usize = lumps.iter().map(Mesh::triangle_count).sum();
    writeln!(out, "OFF")?;
    writeln!(out, "{vertices} {triangles} 0")?;
    for lump in lumps {
        for v in &lump.vertices {
            writeln!(out, "{} {} {}", v.x, v.y, v.z)?;
        }
    }

    let mut offset = 0;
    for lump in lumps {
        for triangle in &lump.triangles {
            let [a, b, c] = triangle.indices;
            writeln!(out, "3 {} {} {}", a + offset, b + offset, c + offset)?;
        }
        offset += lump.vertices.len();
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::fixtures::cube_set;
    use tempfile::TempDir;

    #[test]
    fn test_export_off_header() -> Result<()> {
        let dir = TempDir::new()?;
        let path = OffWriter.write(&cube_set(1.0), &dir.path().join("cube.xcsg"))?;
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("off"));

        let text = std::fs::read_to_string(path)?;
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("OFF"));
        assert_eq!(lines.next(), Some("8 12 0"));
        assert_eq!(text.lines().filter(|l| l.starts_with("3 ")).count(), 12);
        Ok(())
    }

    #[test]
    fn test_single_lump_keeps_plain_name() -> Result<()> {
        let dir = TempDir::new()?;
        let paths = OffWriter.write_files(&cube_set(1.0), &dir.path().join("cube.xcsg"))?;
        assert_eq!(paths, vec![dir.path().join("cube.off")]);
        Ok(())
    }

    #[test]
    fn test_one_file_per_lump() -> Result<()> {
        let mut set = cube_set(1.0);
        for lump in cube_set(2.0).iter() {
            set.push(lump.clone());
        }

        let dir = TempDir::new()?;
        let paths = OffWriter.write_files(&set, &dir.path().join("two.xcsg"))?;
        assert_eq!(
            paths,
            vec![dir.path().join("two_1.off"), dir.path().join("two_2.off")]
        );
        assert!(!dir.path().join("two.off").exists());

        for path in &paths {
            let text = std::fs::read_to_string(path)?;
            assert_eq!(text.lines().nth(1), Some("8 12 0"));
            let max_index = text
                .lines()
                .filter_map(|l| l.strip_prefix("3 "))
                .flat_map(|l| l.split_whitespace().map(|i| i.parse::<usize>().unwrap()))
                .max();
            assert_eq!(max_index, Some(7));
        }
        Ok(())
    }
}
