// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Engines driven by the evaluation pipeline
//!
//! The pipeline only sees the traits defined here; the default implementations
//! wrap the in-crate BSP kernel, `geo` polygon clipping and `earcutr`.

mod bsp;
mod clip;
mod triangulate;

pub use bsp::BspBooleanEngine;
pub use clip::GeoClipEngine;
pub use triangulate::EarcutTriangulator;

use crate::geometry::{Mesh, PolygonSet, Polyhedron, Profile};
use crate::model::{BooleanOp, CsgMesh};
use thiserror::Error;

/// Boolean kernel failure together with whatever the engine managed to produce
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct KernelFailure {
    pub message: String,
    pub partial: Vec<Polyhedron>,
}

/// Recoverable kernel problem carried alongside a boolean result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeometryKernelWarning {
    pub message: String,
}

impl std::fmt::Display for GeometryKernelWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "geometry kernel: {}", self.message)
    }
}

/// 3D boolean engine; returns the resulting lumps in order
pub trait BooleanEngine {
    fn compute(&mut self, mesh: CsgMesh, op: BooleanOp) -> Result<Vec<Polyhedron>, KernelFailure>;
}

/// 2D clip engine
pub trait ClipEngine {
    fn compute(&mut self, profile: Profile, op: BooleanOp) -> PolygonSet;
}

/// Polyhedron to triangle mesh conversion
pub trait Triangulator {
    fn triangulate(&mut self, lump: Polyhedron) -> Mesh;
}
