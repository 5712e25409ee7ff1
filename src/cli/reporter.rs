// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Console progress output with colored formatting

use crate::export::PathDisplay;
use crate::pipeline::{ProgressEvent, ProgressSink};
use colored::*;
use std::time::Duration;

/// Prints progress events to stdout
#[derive(Debug, Default)]
pub struct Reporter {
    display: PathDisplay,
}

impl Reporter {
    pub fn new(display: PathDisplay) -> Self {
        Self { display }
    }

    /// Plain text for an event; one line per entry
    pub fn lines(&self, event: &ProgressEvent) -> Vec<String> {
        match event {
            ProgressEvent::Converting { source } => {
                vec![format!("Converting from OpenSCAD {}", self.display.format(source))]
            }
            ProgressEvent::ProcessingFile { path } => {
                vec![format!("xcsg processing: {}", self.display.format(path))]
            }
            ProgressEvent::ProcessingSolid { tag } => vec![format!("processing solid: {tag}")],
            ProgressEvent::ProcessingShape { tag } => vec![format!("processing shape2d: {tag}")],
            ProgressEvent::NoGeometry => {
                vec!["...no solid or shape2d found, nothing to do.".to_string()]
            }
            ProgressEvent::TreeCompleted { nbool } => vec![format!(
                "...completed CSG tree: {nbool} boolean operations to process."
            )],
            ProgressEvent::BooleanStarted => vec!["...starting boolean operations".to_string()],
            ProgressEvent::BooleanCompleted { elapsed } => vec![format!(
                "...completed boolean operations in {} [sec]",
                Self::format_seconds(*elapsed)
            )],
            ProgressEvent::KernelWarning { message } => vec![format!("WARNING: {message}")],
            ProgressEvent::ResultLumps { count } | ProgressEvent::ResultProfiles { count } => {
                let noun = if *count == 1 { "lump" } else { "lumps" };
                vec![format!("...result model contains {count} {noun}.")]
            }
            ProgressEvent::LumpChecked {
                index,
                vertices,
                faces,
                diagnostics,
            } => {
                let mut lines = vec![format!(
                    "...lump {}: {vertices} vertices, {faces} polygon faces.",
                    index + 1
                )];
                lines.extend(
                    diagnostics
                        .iter()
                        .map(|d| format!("...lump {}: {d}", index + 1)),
                );
                lines
            }
            ProgressEvent::TriangulationStarted { .. } => {
                vec!["...Triangulating lump ... ".to_string()]
            }
            ProgressEvent::TriangulationCompleted {
                triangles, elapsed, ..
            } => vec![format!(
                "...Triangulation completed with {triangles} triangle faces in {} [sec]",
                Self::format_seconds(*elapsed)
            )],
            ProgressEvent::ExportingResults => vec!["...Exporting results ".to_string()],
            ProgressEvent::FileCreated { format, path } => {
                vec![format!("Created {:<9}: {path}", format!("{format} file"))]
            }
        }
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("{} {}", "error:".red().bold(), message);
    }

    /// Report warning
    pub fn report_warning(message: &str) {
        println!("{}", format!("WARNING: {message}").yellow().bold());
    }

    /// Seconds with millisecond resolution
    fn format_seconds(duration: Duration) -> String {
        format!("{:.3}", duration.as_millis() as f64 / 1000.0)
    }
}

impl ProgressSink for Reporter {
    fn report(&mut self, event: ProgressEvent) {
        for (i, line) in self.lines(&event).into_iter().enumerate() {
            match &event {
                ProgressEvent::KernelWarning { message } => Self::report_warning(message),
                // lines after the lump summary are diagnostics
                ProgressEvent::LumpChecked { .. } if i > 0 => println!("{}", line.yellow()),
                ProgressEvent::FileCreated { .. } => println!("{}", line.green()),
                ProgressEvent::ProcessingFile { .. } => println!("{}", line.bold()),
                _ => println!("{line}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_lump_plural() {
        let reporter = Reporter::default();
        assert_eq!(
            reporter.lines(&ProgressEvent::ResultLumps { count: 1 }),
            vec!["...result model contains 1 lump."]
        );
        assert_eq!(
            reporter.lines(&ProgressEvent::ResultProfiles { count: 3 }),
            vec!["...result model contains 3 lumps."]
        );
    }

    #[test]
    fn test_path_display() {
        let event = ProgressEvent::ProcessingFile {
            path: PathBuf::from("/work/models/part.xcsg"),
        };
        assert_eq!(
            Reporter::new(PathDisplay::FileName).lines(&event),
            vec!["xcsg processing: part.xcsg"]
        );
        assert_eq!(
            Reporter::new(PathDisplay::FullPath).lines(&event),
            vec!["xcsg processing: /work/models/part.xcsg"]
        );
    }

    #[test]
    fn test_lump_diagnostics_follow_summary() {
        let lines = Reporter::default().lines(&ProgressEvent::LumpChecked {
            index: 0,
            vertices: 8,
            faces: 6,
            diagnostics: vec!["4 open edges".into()],
        });
        assert_eq!(
            lines,
            vec![
                "...lump 1: 8 vertices, 6 polygon faces.",
                "...lump 1: 4 open edges"
            ]
        );
    }

    #[test]
    fn test_timings_and_created_files() {
        let reporter = Reporter::default();
        assert_eq!(
            reporter.lines(&ProgressEvent::BooleanCompleted {
                elapsed: Duration::from_millis(1250)
            }),
            vec!["...completed boolean operations in 1.250 [sec]"]
        );
        assert_eq!(
            reporter.lines(&ProgressEvent::FileCreated {
                format: "STL",
                path: "part.stl".into()
            }),
            vec!["Created STL file : part.stl"]
        );
    }
}
