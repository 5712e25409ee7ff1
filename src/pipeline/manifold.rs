// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Per-lump validation and triangulation

use super::{ProgressEvent, ProgressSink};
use crate::engine::Triangulator;
use crate::geometry::{Mesh, Polyhedron, TriangleSet};
use std::time::Instant;
use tracing::debug;

/// Check every lump and add it to the triangle set.
///
/// Lumps that already consist of triangles are added as they are; all others
/// go through the triangulator exactly once.
pub fn post_process(
    lumps: Vec<Polyhedron>,
    triangulator: &mut dyn Triangulator,
    sink: &mut dyn ProgressSink,
) -> TriangleSet {
    let mut set = TriangleSet::new();
    for (index, lump) in lumps.into_iter().enumerate() {
        let check = lump.check();
        debug!(index, ?check, "lump checked");
        sink.report(ProgressEvent::LumpChecked {
            index,
            vertices: check.vertices,
            faces: check.faces,
            diagnostics: check.diagnostics(),
        });

        if check.non_triangular > 0 {
            sink.report(ProgressEvent::TriangulationStarted {
                index,
                non_triangular: check.non_triangular,
            });
            let start = Instant::now();
            let mesh = triangulator.triangulate(lump);
            sink.report(ProgressEvent::TriangulationCompleted {
                index,
                triangles: mesh.triangle_count(),
                elapsed: start.elapsed(),
            });
            set.push(mesh);
        } else {
            set.push(Mesh::from_triangular(lump));
        }
    }
    set
}
