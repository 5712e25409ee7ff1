// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Document loading, including legacy OpenSCAD `.csg` conversion

use super::xml::read_utf8;
use super::Document;
use crate::error::{Result, XcsgError};
use crate::legacy;
use crate::pipeline::{ProgressEvent, ProgressSink};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extension of declarative documents
pub const XCSG_EXTENSION: &str = "xcsg";

/// Extension of legacy OpenSCAD CSG scripts
pub const LEGACY_EXTENSION: &str = "csg";

/// Resolve the file to load.
///
/// Missing inputs fail with [`XcsgError::NotFound`] before anything else happens.
/// A legacy `.csg` script is transliterated and written next to the original with
/// the `.xcsg` extension; the returned path then points at that new file.
pub fn prepare_input(path: &Path, sink: &mut dyn ProgressSink) -> Result<PathBuf> {
    let path = normalize_separators(path);
    if !path.exists() {
        return Err(XcsgError::NotFound(path));
    }

    if !is_legacy(&path) {
        return Ok(path);
    }

    sink.report(ProgressEvent::Converting {
        source: path.clone(),
    });
    let script = read_utf8(&path)?;
    let document = legacy::transliterate(&script, &path)?;

    let target = legacy_target(&path);
    document
        .write(&target)
        .map_err(|e| XcsgError::Io(std::io::Error::other(format!("{e:#}"))))?;
    debug!(source = %path.display(), target = %target.display(), "transliterated legacy script");
    Ok(target)
}

/// Parse a declarative document and check its root tag
pub fn load(path: &Path) -> Result<Document> {
    if !path.exists() {
        return Err(XcsgError::NotFound(path.to_path_buf()));
    }
    let document = Document::read(path)?;
    document.validate_root(path)?;
    Ok(document)
}

/// Path of the declarative file written for a legacy script
pub fn legacy_target(path: &Path) -> PathBuf {
    path.with_extension(XCSG_EXTENSION)
}

fn is_legacy(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(LEGACY_EXTENSION))
}

fn normalize_separators(path: &Path) -> PathBuf {
    let text = path.to_string_lossy();
    if text.contains('\\') {
        PathBuf::from(text.replace('\\', "/"))
    } else {
        path.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::RecordingSink;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_not_found() {
        let mut sink = RecordingSink::default();
        let err = prepare_input(Path::new("/no/such/model.xcsg"), &mut sink).unwrap_err();
        assert!(matches!(err, XcsgError::NotFound(_)));
        assert!(matches!(load(Path::new("/no/such/model.xcsg")), Err(XcsgError::NotFound(_))));
        assert!(sink.events.is_empty());
    }

    #[test]
    fn test_wrong_root_tag() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("model.xcsg");
        std::fs::write(&path, "<csg><cube size=\"1\"/></csg>")?;

        let err = load(&path).unwrap_err();
        assert!(matches!(err, XcsgError::Parse { .. }));
        Ok(())
    }

    #[test]
    fn test_legacy_script_is_converted_alongside() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("part.csg");
        let mut file = std::fs::File::create(&path)?;
        writeln!(file, "cube(size = [1, 2, 3], center = false);")?;

        let mut sink = RecordingSink::default();
        let resolved = prepare_input(&path, &mut sink)?;

        assert_eq!(resolved, dir.path().join("part.xcsg"));
        assert!(resolved.exists());
        assert!(matches!(sink.events[0], ProgressEvent::Converting { .. }));

        let doc = load(&resolved)?;
        assert_eq!(doc.root().children[0].tag, "cuboid");
        Ok(())
    }

    #[test]
    fn test_declarative_input_is_untouched() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("model.xcsg");
        std::fs::write(&path, "<xcsg><sphere r=\"1\"/></xcsg>")?;

        let mut sink = RecordingSink::default();
        assert_eq!(prepare_input(&path, &mut sink)?, path);
        assert!(sink.events.is_empty());
        Ok(())
    }

    #[test]
    fn test_invalid_utf8_is_parse_error() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("model.xcsg");
        std::fs::write(&path, b"<xcsg><cube size=\"\xff\"/></xcsg>")?;
        assert!(matches!(load(&path), Err(XcsgError::Parse { .. })));

        let script = dir.path().join("part.csg");
        std::fs::write(&script, b"cube(size = 1); // \xfe\n")?;
        let err = prepare_input(&script, &mut RecordingSink::default()).unwrap_err();
        assert!(matches!(err, XcsgError::Parse { .. }));
        assert!(!dir.path().join("part.xcsg").exists());
        Ok(())
    }
}
