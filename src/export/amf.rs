// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! AMF (Additive Manufacturing File) exporter

use super::{output_path, MeshWriter};
use crate::geometry::{Mesh, TriangleSet};
use anyhow::{Context, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fs::File;
use std::io::{Cursor, Write as IoWrite};
use std::path::{Path, PathBuf};
use zip::write::{ExtendedFileOptions, FileOptions, ZipWriter};
use zip::CompressionMethod;

/// One `<object>` per lump; optionally stored inside a zip archive
pub struct AmfWriter {
    compress: bool,
}

impl AmfWriter {
    pub fn new(compress: bool) -> Self {
        Self { compress }
    }
}

impl MeshWriter for AmfWriter {
    fn write(&self, mesh: &TriangleSet, base: &Path) -> Result<PathBuf> {
        let path = output_path(base, "amf");
        let xml = generate_amf_xml(mesh)?;

        if self.compress {
            let file = File::create(&path)
                .with_context(|| format!("Failed to create AMF file: {}", path.display()))?;
            let mut zip = ZipWriter::new(file);
            let options: FileOptions<ExtendedFileOptions> =
                FileOptions::default().compression_method(CompressionMethod::Deflated);

            // archive member keeps the .amf name
            let member = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "model.amf".to_string());
            zip.start_file(member, options)?;
            zip.write_all(xml.as_bytes())?;
            zip.finish()?;
        } else {
            std::fs::write(&path, xml)
                .with_context(|| format!("Failed to write AMF file: {}", path.display()))?;
        }
        Ok(path)
    }
}

fn text_element(writer: &mut Writer<Cursor<Vec<u8>>>, tag: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn write_object(writer: &mut Writer<Cursor<Vec<u8>>>, id: usize, mesh: &Mesh) -> Result<()> {
    let mut object = BytesStart::new("object");
    object.push_attribute(("id", id.to_string().as_str()));
    writer.write_event(Event::Start(object))?;
    writer.write_event(Event::Start(BytesStart::new("mesh")))?;

    writer.write_event(Event::Start(BytesStart::new("vertices")))?;
    for vertex in &mesh.vertices {
        writer.write_event(Event::Start(BytesStart::new("vertex")))?;
        writer.write_event(Event::Start(BytesStart::new("coordinates")))?;
        text_element(writer, "x", &vertex.x.to_string())?;
        text_element(writer, "y", &vertex.y.to_string())?;
        text_element(writer, "z", &vertex.z.to_string())?;
        writer.write_event(Event::End(BytesEnd::new("coordinates")))?;
        writer.write_event(Event::End(BytesEnd::new("vertex")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("vertices")))?;

    writer.write_event(Event::Start(BytesStart::new("volume")))?;
    for triangle in &mesh.triangles {
        writer.write_event(Event::Start(BytesStart::new("triangle")))?;
        text_element(writer, "v1", &triangle.indices[0].to_string())?;
        text_element(writer, "v2", &triangle.indices[1].to_string())?;
        text_element(writer, "v3", &triangle.indices[2].to_string())?;
        writer.write_event(Event::End(BytesEnd::new("triangle")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("volume")))?;

    writer.write_event(Event::End(BytesEnd::new("mesh")))?;
    writer.write_event(Event::End(BytesEnd::new("object")))?;
    Ok(())
}

fn generate_amf_xml(mesh: &TriangleSet) -> Result<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 1);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut amf = BytesStart::new("amf");
    amf.push_attribute(("unit", "millimeter"));
    writer.write_event(Event::Start(amf))?;
    for (id, lump) in mesh.iter().enumerate() {
        write_object(&mut writer, id, lump)?;
    }
    writer.write_event(Event::End(BytesEnd::new("amf")))?;

    let result = writer.into_inner().into_inner();
    Ok(String::from_utf8(result)?)
}
