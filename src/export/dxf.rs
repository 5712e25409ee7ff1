// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! DXF exporter for 2D results

use super::{output_path, ProfileWriter};
use crate::geometry::PolygonSet;
use anyhow::{Context, Result};
use dxf::entities::{Entity, EntityType, Line};
use dxf::{Drawing, Point};
use geo::LineString;
use std::path::{Path, PathBuf};

/// Every ring edge becomes a LINE entity at z = 0
pub struct DxfWriter;

impl ProfileWriter for DxfWriter {
    fn write(&self, polygons: &PolygonSet, base: &Path) -> Result<PathBuf> {
        let path = output_path(base, "dxf");
        let mut drawing = Drawing::new();
        for polygon in polygons.iter() {
            add_ring(&mut drawing, polygon.exterior());
            for hole in polygon.interiors() {
                add_ring(&mut drawing, hole);
            }
        }
        drawing
            .save_file(&*path.to_string_lossy())
            .with_context(|| format!("Failed to write DXF file: {}", path.display()))?;
        Ok(path)
    }
}

fn add_ring(drawing: &mut Drawing, ring: &LineString<f64>) {
    // rings are closed, so consecutive pairs cover every edge
    for edge in ring.lines() {
        let line = Line::new(
            Point::new(edge.start.x, edge.start.y, 0.0),
            Point::new(edge.end.x, edge.end.y, 0.0),
        );
        drawing.add_entity(Entity::new(EntityType::Line(line)));
    }
}
