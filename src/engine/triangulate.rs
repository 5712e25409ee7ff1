// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

use super::Triangulator;
use crate::geometry::{triangulate_face, Mesh, Polyhedron, Triangle};
use nalgebra::Point3;

/// Ear-clipping triangulator; vertex indices of the lump are kept
#[derive(Debug, Default, Clone, Copy)]
pub struct EarcutTriangulator;

impl EarcutTriangulator {
    pub fn new() -> Self {
        Self
    }
}

impl Triangulator for EarcutTriangulator {
    fn triangulate(&mut self, lump: Polyhedron) -> Mesh {
        let mut mesh = Mesh::with_capacity(lump.vertex_count(), lump.face_count() * 2);
        for face in &lump.faces {
            if face.len() == 3 {
                mesh.add_triangle(Triangle::new([face[0], face[1], face[2]]));
                continue;
            }
            let points: Vec<Point3<f64>> = face.iter().map(|&i| lump.vertices[i]).collect();
            for [a, b, c] in triangulate_face(&points) {
                mesh.add_triangle(Triangle::new([face[a], face[b], face[c]]));
            }
        }
        mesh.vertices = lump.vertices;
        mesh
    }
}
