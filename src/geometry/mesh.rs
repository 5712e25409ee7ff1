// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Triangle mesh representation

use super::Polyhedron;
use nalgebra::{Point3, Vector3};
use tracing::warn;

/// Triangle defined by three vertex indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    pub indices: [usize; 3],
}

impl Triangle {
    pub fn new(indices: [usize; 3]) -> Self {
        Self { indices }
    }
}

/// Triangular mesh of one lump
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Point3<f64>>,
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            triangles: Vec::with_capacity(triangle_count),
        }
    }

    /// Adopt an all-triangle polyhedron as is.
    ///
    /// Faces that are not triangles are skipped; route such polyhedra through a
    /// triangulator first.
    pub fn from_triangular(polyhedron: Polyhedron) -> Self {
        let mut triangles = Vec::with_capacity(polyhedron.faces.len());
        let mut skipped = 0usize;
        for face in &polyhedron.faces {
            match face.as_slice() {
                &[a, b, c] => triangles.push(Triangle::new([a, b, c])),
                _ => skipped += 1,
            }
        }
        if skipped > 0 {
            warn!(skipped, "non-triangular faces dropped from mesh");
        }
        Self {
            vertices: polyhedron.vertices,
            triangles,
        }
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, point: Point3<f64>) -> usize {
        self.vertices.push(point);
        self.vertices.len() - 1
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Corner positions of a triangle
    pub fn corners(&self, triangle: &Triangle) -> [Point3<f64>; 3] {
        triangle.indices.map(|i| self.vertices[i])
    }

    /// Unit normal of a triangle, zero when degenerate
    pub fn triangle_normal(&self, triangle: &Triangle) -> Vector3<f64> {
        let [a, b, c] = self.corners(triangle);
        (b - a).cross(&(c - a)).try_normalize(1e-15).unwrap_or_else(Vector3::zeros)
    }

    /// Enclosed volume; positive when triangles face outward
    pub fn signed_volume(&self) -> f64 {
        self.triangles
            .iter()
            .map(|t| {
                let [a, b, c] = self.corners(t);
                a.coords.dot(&b.coords.cross(&c.coords)) / 6.0
            })
            .sum()
    }

    pub fn surface_area(&self) -> f64 {
        self.triangles
            .iter()
            .map(|t| {
                let [a, b, c] = self.corners(t);
                (b - a).cross(&(c - a)).norm() / 2.0
            })
            .sum()
    }
}

/// Triangulated result lumps, in the order they were produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleSet {
    lumps: Vec<Mesh>,
}

impl TriangleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mesh: Mesh) {
        self.lumps.push(mesh);
    }

    pub fn lumps(&self) -> &[Mesh] {
        &self.lumps
    }

    pub fn len(&self) -> usize {
        self.lumps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lumps.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.lumps.iter().map(Mesh::triangle_count).sum()
    }

    pub fn vertex_count(&self) -> usize {
        self.lumps.iter().map(Mesh::vertex_count).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mesh> {
        self.lumps.iter()
    }
}
