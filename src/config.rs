// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Run configuration

use crate::export::{ExportFlags, PathDisplay};
use crate::pipeline::OperationBudget;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File looked up in the working directory when no config is given
pub const DEFAULT_CONFIG_FILE: &str = "xcsg.toml";

/// Processing and export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Largest accepted number of boolean operations
    pub max_bool: usize,
    /// Show full paths of created files
    pub full_path: bool,
    /// Write AMF inside a zip archive
    pub amf_compress: bool,
    /// Formats written after evaluation
    pub export: ExportFlags,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_bool: OperationBudget::DEFAULT_MAX_BOOL,
            full_path: false,
            amf_compress: false,
            export: ExportFlags::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Explicit file, else `xcsg.toml` if present, else defaults; then environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if PathBuf::from(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `XCSG_MAX_BOOL` and `XCSG_FULLPATH` from `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(max_bool) = lookup("XCSG_MAX_BOOL") {
            self.max_bool = max_bool
                .trim()
                .parse()
                .with_context(|| format!("Invalid XCSG_MAX_BOOL: {max_bool:?}"))?;
        }

        if let Some(full_path) = lookup("XCSG_FULLPATH") {
            self.full_path = matches!(full_path.trim(), "1" | "true" | "yes");
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    pub fn budget(&self) -> OperationBudget {
        OperationBudget::new(self.max_bool)
    }

    pub fn path_display(&self) -> PathDisplay {
        if self.full_path {
            PathDisplay::FullPath
        } else {
            PathDisplay::FileName
        }
    }
}
