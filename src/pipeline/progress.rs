// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Progress events emitted while a model is evaluated and exported

use std::path::PathBuf;
use std::time::Duration;

/// One observable step of a run
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// A legacy script is being transliterated
    Converting { source: PathBuf },
    ProcessingFile { path: PathBuf },
    ProcessingSolid { tag: String },
    ProcessingShape { tag: String },
    /// The top-level document had no solid or shape
    NoGeometry,
    TreeCompleted { nbool: usize },
    BooleanStarted,
    BooleanCompleted { elapsed: Duration },
    KernelWarning { message: String },
    ResultLumps { count: usize },
    ResultProfiles { count: usize },
    LumpChecked {
        index: usize,
        vertices: usize,
        faces: usize,
        diagnostics: Vec<String>,
    },
    TriangulationStarted { index: usize, non_triangular: usize },
    TriangulationCompleted {
        index: usize,
        triangles: usize,
        elapsed: Duration,
    },
    ExportingResults,
    FileCreated { format: &'static str, path: String },
}

/// Receiver for progress events
pub trait ProgressSink {
    fn report(&mut self, event: ProgressEvent);
}

/// Sink that keeps every event, for inspection after a run
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<ProgressEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded events matching `predicate`
    pub fn count(&self, predicate: impl Fn(&ProgressEvent) -> bool) -> usize {
        self.events.iter().filter(|e| predicate(e)).count()
    }

    /// Labels and paths of created files, in write order
    pub fn created_files(&self) -> Vec<(&'static str, String)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::FileCreated { format, path } => Some((*format, path.clone())),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for RecordingSink {
    fn report(&mut self, event: ProgressEvent) {
        self.events.push(event);
    }
}

/// Sink that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn report(&mut self, _event: ProgressEvent) {}
}
