// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Ordered multi-format export
//!
//! Each requested format is written by exactly one writer. STL (3D) and DXF (2D)
//! always come last so they carry the newest modification time.

mod amf;
mod dxf;
mod obj;
mod off;
mod stl;
mod svg;
mod xcsg;

pub use amf::AmfWriter;
pub use dxf::DxfWriter;
pub use obj::ObjWriter;
pub use off::OffWriter;
pub use stl::StlWriter;
pub use svg::SvgWriter;
pub use xcsg::{XcsgMeshWriter, XcsgProfileWriter};

use crate::error::{Result, XcsgError};
use crate::geometry::{PolygonSet, TriangleSet};
use crate::pipeline::{ProgressEvent, ProgressSink};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes a triangulated 3D result next to `base`
pub trait MeshWriter {
    fn write(&self, mesh: &TriangleSet, base: &Path) -> anyhow::Result<PathBuf>;

    /// Every file produced for `mesh`; formats without multi-body support split per lump
    fn write_files(&self, mesh: &TriangleSet, base: &Path) -> anyhow::Result<Vec<PathBuf>> {
        self.write(mesh, base).map(|path| vec![path])
    }
}

/// Writes a 2D result next to `base`
pub trait ProfileWriter {
    fn write(&self, polygons: &PolygonSet, base: &Path) -> anyhow::Result<PathBuf>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshFormat {
    Xcsg,
    Amf,
    Obj,
    Off,
    Stl,
    AsciiStl,
}

impl MeshFormat {
    pub fn label(self) -> &'static str {
        match self {
            Self::Xcsg => "XCSG",
            Self::Amf => "AMF",
            Self::Obj => "OBJ",
            Self::Off => "OFF",
            Self::Stl | Self::AsciiStl => "STL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileFormat {
    Xcsg,
    Svg,
    Dxf,
}

impl ProfileFormat {
    pub fn label(self) -> &'static str {
        match self {
            Self::Xcsg => "XCSG",
            Self::Svg => "SVG",
            Self::Dxf => "DXF",
        }
    }
}

/// Requested output formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportFlags {
    pub xcsg: bool,
    pub amf: bool,
    pub obj: bool,
    pub off: bool,
    pub stl: bool,
    pub astl: bool,
    pub svg: bool,
    pub dxf: bool,
}

impl ExportFlags {
    /// 3D formats in write order; binary STL wins over ASCII STL
    pub fn mesh_formats(&self) -> Vec<MeshFormat> {
        let mut formats = Vec::new();
        if self.xcsg {
            formats.push(MeshFormat::Xcsg);
        }
        if self.amf {
            formats.push(MeshFormat::Amf);
        }
        if self.obj {
            formats.push(MeshFormat::Obj);
        }
        if self.off {
            formats.push(MeshFormat::Off);
        }
        if self.stl {
            formats.push(MeshFormat::Stl);
        } else if self.astl {
            formats.push(MeshFormat::AsciiStl);
        }
        formats
    }

    /// 2D formats in write order
    pub fn profile_formats(&self) -> Vec<ProfileFormat> {
        let mut formats = Vec::new();
        if self.xcsg {
            formats.push(ProfileFormat::Xcsg);
        }
        if self.svg {
            formats.push(ProfileFormat::Svg);
        }
        if self.dxf {
            formats.push(ProfileFormat::Dxf);
        }
        formats
    }

    /// Formats requested by either set
    pub fn union(self, other: ExportFlags) -> ExportFlags {
        ExportFlags {
            xcsg: self.xcsg || other.xcsg,
            amf: self.amf || other.amf,
            obj: self.obj || other.obj,
            off: self.off || other.off,
            stl: self.stl || other.stl,
            astl: self.astl || other.astl,
            svg: self.svg || other.svg,
            dxf: self.dxf || other.dxf,
        }
    }
}

/// How created files are shown to the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PathDisplay {
    #[default]
    FileName,
    FullPath,
}

impl PathDisplay {
    pub fn format(self, path: &Path) -> String {
        match self {
            Self::FullPath => path.display().to_string(),
            Self::FileName => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
        }
    }
}

/// `base` with its extension replaced
pub fn output_path(base: &Path, extension: &str) -> PathBuf {
    base.with_extension(extension)
}

/// Declarative re-export path; `_out` keeps it from overwriting the input
pub fn xcsg_output_path(base: &Path) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    base.with_file_name(format!("{stem}_out.xcsg"))
}

/// Runs the writers for the requested formats in their fixed order
pub struct ExportOrchestrator {
    mesh_writers: HashMap<MeshFormat, Box<dyn MeshWriter>>,
    profile_writers: HashMap<ProfileFormat, Box<dyn ProfileWriter>>,
    display: PathDisplay,
}

impl ExportOrchestrator {
    /// Orchestrator without writers
    pub fn new(display: PathDisplay) -> Self {
        Self {
            mesh_writers: HashMap::new(),
            profile_writers: HashMap::new(),
            display,
        }
    }

    /// Orchestrator with the built-in writer for every format
    pub fn with_default_writers(display: PathDisplay, amf_compress: bool) -> Self {
        let mut orchestrator = Self::new(display);
        orchestrator.set_mesh_writer(MeshFormat::Xcsg, Box::new(XcsgMeshWriter));
        orchestrator.set_mesh_writer(MeshFormat::Amf, Box::new(AmfWriter::new(amf_compress)));
        orchestrator.set_mesh_writer(MeshFormat::Obj, Box::new(ObjWriter));
        orchestrator.set_mesh_writer(MeshFormat::Off, Box::new(OffWriter));
        orchestrator.set_mesh_writer(MeshFormat::Stl, Box::new(StlWriter::binary()));
        orchestrator.set_mesh_writer(MeshFormat::AsciiStl, Box::new(StlWriter::ascii()));
        orchestrator.set_profile_writer(ProfileFormat::Xcsg, Box::new(XcsgProfileWriter));
        orchestrator.set_profile_writer(ProfileFormat::Svg, Box::new(SvgWriter));
        orchestrator.set_profile_writer(ProfileFormat::Dxf, Box::new(DxfWriter));
        orchestrator
    }

    pub fn set_mesh_writer(&mut self, format: MeshFormat, writer: Box<dyn MeshWriter>) {
        self.mesh_writers.insert(format, writer);
    }

    pub fn set_profile_writer(&mut self, format: ProfileFormat, writer: Box<dyn ProfileWriter>) {
        self.profile_writers.insert(format, writer);
    }

    pub fn display(&self) -> PathDisplay {
        self.display
    }

    pub fn export_mesh(
        &self,
        mesh: &TriangleSet,
        base: &Path,
        flags: &ExportFlags,
        sink: &mut dyn ProgressSink,
    ) -> Result<Vec<PathBuf>> {
        let formats = flags.mesh_formats();
        if !formats.is_empty() {
            sink.report(ProgressEvent::ExportingResults);
        }

        let mut created = Vec::with_capacity(formats.len());
        for format in formats {
            let label = format.label();
            let writer = self.mesh_writers.get(&format).ok_or_else(|| missing_writer(label))?;
            let paths = writer
                .write_files(mesh, base)
                .map_err(|source| XcsgError::Export { format: label, source })?;
            for path in paths {
                self.created(label, &path, sink);
                created.push(path);
            }
        }
        Ok(created)
    }

    pub fn export_profile(
        &self,
        polygons: &PolygonSet,
        base: &Path,
        flags: &ExportFlags,
        sink: &mut dyn ProgressSink,
    ) -> Result<Vec<PathBuf>> {
        let formats = flags.profile_formats();
        if !formats.is_empty() {
            sink.report(ProgressEvent::ExportingResults);
        }

        let mut created = Vec::with_capacity(formats.len());
        for format in formats {
            let label = format.label();
            let writer = self
                .profile_writers
                .get(&format)
                .ok_or_else(|| missing_writer(label))?;
            let path = writer
                .write(polygons, base)
                .map_err(|source| XcsgError::Export { format: label, source })?;
            self.created(label, &path, sink);
            created.push(path);
        }
        Ok(created)
    }

    fn created(&self, label: &'static str, path: &Path, sink: &mut dyn ProgressSink) {
        debug!(format = label, path = %path.display(), "file written");
        sink.report(ProgressEvent::FileCreated {
            format: label,
            path: self.display.format(path),
        });
    }
}

fn missing_writer(label: &'static str) -> XcsgError {
    XcsgError::Export {
        format: label,
        source: anyhow::anyhow!("no writer registered"),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::engine::{EarcutTriangulator, Triangulator};
    use crate::geometry::{Primitive, SecantTolerance, TriangleSet};
    use geo::{polygon, MultiPolygon};
    use nalgebra::Vector3;

    /// One centered cube lump of edge `size`
    pub fn cube_set(size: f64) -> TriangleSet {
        let cube = Primitive::Cuboid {
            size: Vector3::new(size, size, size),
            center: true,
        }
        .to_polyhedron(&SecantTolerance::default());
        let mut set = TriangleSet::new();
        set.push(EarcutTriangulator::new().triangulate(cube));
        set
    }

    /// 4x4 square with a 2x2 hole
    pub fn framed_square() -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon!(
            exterior: [(x: 0.0, y: 0.0), (x: 4.0, y: 0.0), (x: 4.0, y: 4.0), (x: 0.0, y: 4.0)],
            interiors: [[(x: 1.0, y: 1.0), (x: 1.0, y: 3.0), (x: 3.0, y: 3.0), (x: 3.0, y: 1.0)]],
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_format_order() {
        let flags = ExportFlags {
            stl: true,
            xcsg: true,
            off: true,
            amf: true,
            obj: true,
            ..Default::default()
        };
        assert_eq!(
            flags.mesh_formats(),
            vec![
                MeshFormat::Xcsg,
                MeshFormat::Amf,
                MeshFormat::Obj,
                MeshFormat::Off,
                MeshFormat::Stl
            ]
        );
    }

    #[test]
    fn test_binary_stl_wins() {
        let both = ExportFlags {
            stl: true,
            astl: true,
            ..Default::default()
        };
        assert_eq!(both.mesh_formats(), vec![MeshFormat::Stl]);

        let ascii = ExportFlags {
            astl: true,
            ..Default::default()
        };
        assert_eq!(ascii.mesh_formats(), vec![MeshFormat::AsciiStl]);
    }

    #[test]
    fn test_profile_format_order() {
        let flags = ExportFlags {
            dxf: true,
            svg: true,
            xcsg: true,
            stl: true,
            ..Default::default()
        };
        assert_eq!(
            flags.profile_formats(),
            vec![ProfileFormat::Xcsg, ProfileFormat::Svg, ProfileFormat::Dxf]
        );
    }

    #[test]
    fn test_paths() {
        let base = Path::new("/models/part.xcsg");
        assert_eq!(output_path(base, "stl"), PathBuf::from("/models/part.stl"));
        assert_eq!(xcsg_output_path(base), PathBuf::from("/models/part_out.xcsg"));
        assert_eq!(PathDisplay::FileName.format(base), "part.xcsg");
        assert_eq!(PathDisplay::FullPath.format(base), "/models/part.xcsg");
    }

    #[test]
    fn test_missing_writer_is_export_error() {
        let orchestrator = ExportOrchestrator::new(PathDisplay::FileName);
        let flags = ExportFlags {
            obj: true,
            ..Default::default()
        };
        let err = orchestrator
            .export_mesh(
                &TriangleSet::new(),
                Path::new("a.xcsg"),
                &flags,
                &mut crate::pipeline::NullSink,
            )
            .unwrap_err();
        assert!(matches!(err, XcsgError::Export { format: "OBJ", .. }));
    }

    #[test]
    fn test_every_lump_file_is_reported() -> anyhow::Result<()> {
        let mut set = fixtures::cube_set(1.0);
        for lump in fixtures::cube_set(3.0).iter() {
            set.push(lump.clone());
        }
        let dir = tempfile::TempDir::new()?;
        let flags = ExportFlags {
            off: true,
            stl: true,
            ..Default::default()
        };

        let mut sink = crate::pipeline::RecordingSink::new();
        let created = ExportOrchestrator::with_default_writers(PathDisplay::FileName, false)
            .export_mesh(&set, &dir.path().join("pair.xcsg"), &flags, &mut sink)?;

        assert_eq!(created.len(), 3);
        assert_eq!(
            sink.created_files(),
            vec![
                ("OFF", "pair_1.off".to_string()),
                ("OFF", "pair_2.off".to_string()),
                ("STL", "pair.stl".to_string()),
            ]
        );
        Ok(())
    }
}
