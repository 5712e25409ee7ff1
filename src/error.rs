// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for the xcsg pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised while loading, building, evaluating or exporting a model.
///
/// Every variant aborts processing of the current top-level object before any
/// file is exported. Recoverable geometry-kernel failures are not errors; they
/// travel as [`crate::engine::GeometryKernelWarning`] inside the boolean result.
#[derive(Error, Debug)]
pub enum XcsgError {
    /// Input path does not exist.
    #[error("File does not exist: {}", .0.display())]
    NotFound(PathBuf),

    /// Malformed document, wrong root tag or malformed legacy script.
    #[error("Parse error in {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    /// A geometry tag without a registered builder.
    #[error("Unknown xcsg tag <{0}>")]
    UnknownTag(String),

    /// A builder produced no geometry.
    #[error("xcsg tree contains no data (<{tag}> has no geometry)")]
    EmptyTree { tag: String },

    /// The resolved tree needs more boolean operations than configured.
    #[error("Max {limit} boolean operations allowed in this configuration, model requires {requested}")]
    BudgetExceeded { limit: usize, requested: usize },

    /// A property is missing or has an unusable value.
    #[error("Invalid property '{name}' on <{tag}>: {message}")]
    InvalidProperty {
        tag: String,
        name: String,
        message: String,
    },

    /// A file writer failed.
    #[error("Failed to export {format} file: {source:#}")]
    Export {
        format: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl XcsgError {
    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        XcsgError::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    pub(crate) fn invalid_property(
        tag: &str,
        name: &str,
        message: impl Into<String>,
    ) -> Self {
        XcsgError::InvalidProperty {
            tag: tag.to_string(),
            name: name.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T, E = XcsgError> = std::result::Result<T, E>;
