// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! End-to-end processing of one input file

use crate::config::Config;
use crate::document::{load, prepare_input};
use crate::engine::{
    BooleanEngine, BspBooleanEngine, ClipEngine, EarcutTriangulator, GeoClipEngine,
    GeometryKernelWarning, Triangulator,
};
use crate::error::Result;
use crate::export::ExportOrchestrator;
use crate::model::TypeRegistry;
use crate::pipeline::{
    evaluate_shape, evaluate_solid, locate, post_process, Located, ProgressEvent, ProgressSink,
};
use std::path::{Path, PathBuf};
use tracing::info;

/// What a run produced
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The document had no top-level solid or shape
    NoGeometry,
    Solid {
        lumps: usize,
        triangles: usize,
        warning: Option<GeometryKernelWarning>,
    },
    Shape {
        polygons: usize,
    },
}

/// Result of [`Runner::run`]
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// The declarative file that was evaluated
    pub input: PathBuf,
    pub outcome: RunOutcome,
    /// Created files in write order
    pub created: Vec<PathBuf>,
}

/// Loads, evaluates and exports one model at a time
pub struct Runner {
    config: Config,
    registry: TypeRegistry,
    boolean_engine: Box<dyn BooleanEngine>,
    clip_engine: Box<dyn ClipEngine>,
    triangulator: Box<dyn Triangulator>,
    exporter: ExportOrchestrator,
}

impl Runner {
    /// Runner with the built-in engines and writers
    pub fn new(config: Config) -> Self {
        let exporter =
            ExportOrchestrator::with_default_writers(config.path_display(), config.amf_compress);
        Self {
            config,
            registry: TypeRegistry::new(),
            boolean_engine: Box::new(BspBooleanEngine::new()),
            clip_engine: Box::new(GeoClipEngine::new()),
            triangulator: Box::new(EarcutTriangulator::new()),
            exporter,
        }
    }

    pub fn with_registry(mut self, registry: TypeRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_boolean_engine(mut self, engine: Box<dyn BooleanEngine>) -> Self {
        self.boolean_engine = engine;
        self
    }

    pub fn with_clip_engine(mut self, engine: Box<dyn ClipEngine>) -> Self {
        self.clip_engine = engine;
        self
    }

    pub fn with_triangulator(mut self, triangulator: Box<dyn Triangulator>) -> Self {
        self.triangulator = triangulator;
        self
    }

    pub fn with_exporter(mut self, exporter: ExportOrchestrator) -> Self {
        self.exporter = exporter;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Process `input`: convert if legacy, load, evaluate the first top-level
    /// geometry node and write the requested formats next to it
    pub fn run(&mut self, input: &Path, sink: &mut dyn ProgressSink) -> Result<RunSummary> {
        let path = prepare_input(input, sink)?;
        let document = load(&path)?;
        sink.report(ProgressEvent::ProcessingFile { path: path.clone() });

        let tolerance = document.secant_tolerance()?;
        let budget = self.config.budget();
        let flags = self.config.export;

        let (outcome, created) = match locate(&document, &self.registry) {
            None => {
                sink.report(ProgressEvent::NoGeometry);
                (RunOutcome::NoGeometry, Vec::new())
            }
            Some(Located::Solid(node)) => {
                sink.report(ProgressEvent::ProcessingSolid {
                    tag: node.tag.clone(),
                });
                let object = self.registry.make_solid(node, tolerance)?;
                let result = evaluate_solid(object, &budget, self.boolean_engine.as_mut(), sink)?;
                let warning = result.warning;
                let mesh = post_process(result.components, self.triangulator.as_mut(), sink);
                let created = self.exporter.export_mesh(&mesh, &path, &flags, sink)?;
                let outcome = RunOutcome::Solid {
                    lumps: mesh.len(),
                    triangles: mesh.triangle_count(),
                    warning,
                };
                (outcome, created)
            }
            Some(Located::Shape(node)) => {
                sink.report(ProgressEvent::ProcessingShape {
                    tag: node.tag.clone(),
                });
                let object = self.registry.make_shape2d(node, tolerance)?;
                let result = evaluate_shape(object, &budget, self.clip_engine.as_mut(), sink)?;
                let created = self
                    .exporter
                    .export_profile(&result.polygons, &path, &flags, sink)?;
                let outcome = RunOutcome::Shape {
                    polygons: result.polygons.len(),
                };
                (outcome, created)
            }
        };

        info!(input = %path.display(), files = created.len(), "run finished");
        Ok(RunSummary {
            input: path,
            outcome,
            created,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::XcsgError;
    use crate::export::ExportFlags;
    use crate::pipeline::RecordingSink;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, text: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_solid_run_writes_stl() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let input = write(&dir, "cube.xcsg", r#"<xcsg version="1.0"><cube size="2"/></xcsg>"#);
        let config = Config {
            export: ExportFlags {
                stl: true,
                ..Default::default()
            },
            ..Default::default()
        };

        let mut sink = RecordingSink::new();
        let summary = Runner::new(config).run(&input, &mut sink)?;

        assert_eq!(
            summary.outcome,
            RunOutcome::Solid {
                lumps: 1,
                triangles: 12,
                warning: None
            }
        );
        assert_eq!(summary.created, vec![dir.path().join("cube.stl")]);
        assert_eq!(sink.created_files(), vec![("STL", "cube.stl".to_string())]);
        Ok(())
    }

    #[test]
    fn test_no_geometry() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let input = write(&dir, "empty.xcsg", "<xcsg><comment/></xcsg>");
        let mut sink = RecordingSink::new();
        let summary = Runner::new(Config::default()).run(&input, &mut sink)?;

        assert_eq!(summary.outcome, RunOutcome::NoGeometry);
        assert!(sink.events.contains(&ProgressEvent::NoGeometry));
        Ok(())
    }

    #[test]
    fn test_missing_input() {
        let err = Runner::new(Config::default())
            .run(Path::new("/no/such/file.xcsg"), &mut RecordingSink::new())
            .unwrap_err();
        assert!(matches!(err, XcsgError::NotFound(_)));
    }
}
