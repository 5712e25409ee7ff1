// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Written files read back with independent readers

use anyhow::Result;
use approx::assert_relative_eq;
use std::fs::File;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use xcsg::document::load;
use xcsg::{Config, ExportFlags, RecordingSink, Runner};

fn run(dir: &TempDir, name: &str, text: &str, export: ExportFlags, amf_compress: bool) -> Result<Vec<PathBuf>> {
    let input = dir.path().join(name);
    std::fs::write(&input, text)?;
    let config = Config {
        export,
        amf_compress,
        ..Default::default()
    };
    Ok(Runner::new(config).run(&input, &mut RecordingSink::new())?.created)
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
}

#[test]
fn cuboid_in_every_mesh_format() -> Result<()> {
    let dir = TempDir::new()?;
    let export = ExportFlags {
        xcsg: true,
        amf: true,
        obj: true,
        off: true,
        stl: true,
        ..Default::default()
    };
    let created = run(
        &dir,
        "block.xcsg",
        r#"<xcsg><cuboid dx="2" dy="4" dz="6" center="true"/></xcsg>"#,
        export,
        false,
    )?;

    let names: Vec<&str> = created.iter().map(|p| file_name(p)).collect();
    assert_eq!(names, vec!["block_out.xcsg", "block.amf", "block.obj", "block.off", "block.stl"]);

    let mut stl = File::open(dir.path().join("block.stl"))?;
    let mesh = stl_io::read_stl(&mut stl)?;
    assert_eq!(mesh.faces.len(), 12);
    let max_z = mesh.vertices.iter().map(|v| v[2]).fold(f32::MIN, f32::max);
    assert_relative_eq!(max_z, 3.0, epsilon = 1e-5);

    let off = std::fs::read_to_string(dir.path().join("block.off"))?;
    assert!(off.lines().any(|line| line.trim() == "8 12 0"));

    let obj = std::fs::read_to_string(dir.path().join("block.obj"))?;
    assert_eq!(obj.lines().filter(|l| l.starts_with("f ")).count(), 12);

    let reloaded = load(&dir.path().join("block_out.xcsg"))?;
    assert_eq!(
        reloaded.root().geometry_children().next().map(|n| n.tag.as_str()),
        Some("polyhedron")
    );
    Ok(())
}

#[test]
fn compressed_amf_is_a_zip_archive() -> Result<()> {
    let dir = TempDir::new()?;
    let export = ExportFlags {
        amf: true,
        ..Default::default()
    };
    run(&dir, "ball.xcsg", r#"<xcsg><sphere r="1"/></xcsg>"#, export, true)?;

    let mut archive = zip::ZipArchive::new(File::open(dir.path().join("ball.amf"))?)?;
    assert_eq!(archive.len(), 1);
    let member = archive.by_index(0)?;
    assert_eq!(member.name(), "ball.amf");
    Ok(())
}

#[test]
fn ascii_stl_is_text() -> Result<()> {
    let dir = TempDir::new()?;
    let export = ExportFlags {
        astl: true,
        ..Default::default()
    };
    run(&dir, "die.xcsg", r#"<xcsg><cube size="1"/></xcsg>"#, export, false)?;

    let text = std::fs::read_to_string(dir.path().join("die.stl"))?;
    assert!(text.starts_with("solid"));
    assert_eq!(text.matches("facet normal").count(), 12);
    assert!(text.trim_end().ends_with("endsolid mesh"));
    Ok(())
}

#[test]
fn profile_to_svg_and_dxf() -> Result<()> {
    let dir = TempDir::new()?;
    let export = ExportFlags {
        svg: true,
        dxf: true,
        ..Default::default()
    };
    run(
        &dir,
        "frame.xcsg",
        r#"<xcsg><difference2d><square size="4" center="true"/><square size="2" center="true"/></difference2d></xcsg>"#,
        export,
        false,
    )?;

    let svg = std::fs::read_to_string(dir.path().join("frame.svg"))?;
    assert!(svg.contains("<svg"));
    assert!(svg.contains("evenodd"));

    let drawing = dxf::Drawing::load_file(&*dir.path().join("frame.dxf").to_string_lossy())?;
    assert_eq!(drawing.entities().count(), 8);
    Ok(())
}
