// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! SVG exporter for 2D results

use super::{output_path, ProfileWriter};
use crate::geometry::PolygonSet;
use anyhow::{Context, Result};
use geo::{BoundingRect, LineString, MultiPolygon, Rect};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::fmt::Write as _;
use std::io::Cursor;
use std::path::{Path, PathBuf};

const MARGIN: f64 = 1.0;

/// One `<path>` per polygon, holes cut with the even-odd rule.
///
/// SVG's Y axis points down, so coordinates are mirrored about the bounding box.
pub struct SvgWriter;

impl ProfileWriter for SvgWriter {
    fn write(&self, polygons: &PolygonSet, base: &Path) -> Result<PathBuf> {
        let path = output_path(base, "svg");
        let svg = generate_svg(polygons)?;
        std::fs::write(&path, svg)
            .with_context(|| format!("Failed to write SVG file: {}", path.display()))?;
        Ok(path)
    }
}

fn bounds(polygons: &PolygonSet) -> Rect<f64> {
    MultiPolygon::new(polygons.polygons().to_vec())
        .bounding_rect()
        .unwrap_or_else(|| Rect::new((0.0, 0.0), (0.0, 0.0)))
}

fn ring_path(d: &mut String, ring: &LineString<f64>, rect: &Rect<f64>) {
    let open = ring.0.len().saturating_sub(1);
    for (i, c) in ring.0.iter().take(open).enumerate() {
        let x = c.x - rect.min().x + MARGIN;
        let y = rect.max().y - c.y + MARGIN;
        let command = if i == 0 { 'M' } else { 'L' };
        // writing into a String cannot fail
        let _ = write!(d, "{command}{x} {y} ");
    }
    d.push_str("Z ");
}

fn generate_svg(polygons: &PolygonSet) -> Result<String> {
    let rect = bounds(polygons);
    let width = rect.width() + 2.0 * MARGIN;
    let height = rect.height() + 2.0 * MARGIN;

    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("no"))))?;

    let mut svg = BytesStart::new("svg");
    svg.push_attribute(("xmlns", "http://www.w3.org/2000/svg"));
    svg.push_attribute(("version", "1.1"));
    svg.push_attribute(("width", format!("{width}mm").as_str()));
    svg.push_attribute(("height", format!("{height}mm").as_str()));
    svg.push_attribute(("viewBox", format!("0 0 {width} {height}").as_str()));
    writer.write_event(Event::Start(svg))?;

    for polygon in polygons.iter() {
        let mut d = String::new();
        ring_path(&mut d, polygon.exterior(), &rect);
        for hole in polygon.interiors() {
            ring_path(&mut d, hole, &rect);
        }

        let mut path = BytesStart::new("path");
        path.push_attribute(("d", d.trim_end()));
        path.push_attribute(("fill", "lightgray"));
        path.push_attribute(("stroke", "black"));
        path.push_attribute(("stroke-width", "0.1"));
        path.push_attribute(("fill-rule", "evenodd"));
        writer.write_event(Event::Empty(path))?;
    }
    writer.write_event(Event::End(BytesEnd::new("svg")))?;

    let result = writer.into_inner().into_inner();
    Ok(String::from_utf8(result)?)
}
