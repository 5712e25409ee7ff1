// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! xcsg: XML based Constructive Solid Geometry
//!
//! Reads a declarative CSG tree (or an OpenSCAD `.csg` export), evaluates the
//! first top-level solid or 2D shape into boundary geometry and writes it to
//! the requested interchange formats.

pub mod cli;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod export;
pub mod geometry;
pub mod legacy;
pub mod model;
pub mod pipeline;

pub use cli::{RunOutcome, RunSummary, Runner};
pub use config::Config;
pub use document::{Document, Node};
pub use error::{Result, XcsgError};
pub use export::{ExportFlags, ExportOrchestrator, PathDisplay};
pub use pipeline::{ProgressEvent, ProgressSink, RecordingSink};

use std::path::Path;

/// Process one file with the built-in engines and writers
pub fn process_file(path: &Path, config: Config, sink: &mut dyn ProgressSink) -> Result<RunSummary> {
    Runner::new(config).run(path, sink)
}
