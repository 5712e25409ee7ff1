// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polygonal boundary representation

use ahash::AHashMap;
use nalgebra::{Matrix4, Point3, Vector3};

/// Grid size used when merging coincident vertices
pub const WELD_EPSILON: f64 = 1e-9;

/// Closed (or nearly closed) polyhedral surface.
///
/// Faces are vertex index loops ordered counter-clockwise when seen from
/// outside. Faces may have any number of vertices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polyhedron {
    pub vertices: Vec<Point3<f64>>,
    pub faces: Vec<Vec<usize>>,
}

/// Summary of a topology check over one polyhedron
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolyhedronCheck {
    pub vertices: usize,
    pub faces: usize,
    pub non_triangular: usize,
    pub degenerate_faces: usize,
    pub open_edges: usize,
    pub non_manifold_edges: usize,
}

impl PolyhedronCheck {
    /// Every edge is shared by exactly two faces
    pub fn is_closed(&self) -> bool {
        self.open_edges == 0 && self.non_manifold_edges == 0
    }

    /// Human readable diagnostic lines, empty when nothing is wrong
    pub fn diagnostics(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if self.degenerate_faces > 0 {
            lines.push(format!("{} degenerate faces", self.degenerate_faces));
        }
        if self.open_edges > 0 {
            lines.push(format!("{} open edges", self.open_edges));
        }
        if self.non_manifold_edges > 0 {
            lines.push(format!("{} non-manifold edges", self.non_manifold_edges));
        }
        lines
    }
}

impl Polyhedron {
    pub fn new(vertices: Vec<Point3<f64>>, faces: Vec<Vec<usize>>) -> Self {
        Self { vertices, faces }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, point: Point3<f64>) -> usize {
        self.vertices.push(point);
        self.vertices.len() - 1
    }

    pub fn add_face(&mut self, face: Vec<usize>) {
        self.faces.push(face);
    }

    /// Apply an affine transform. Mirroring transforms reverse the face loops
    /// so that faces stay outward oriented.
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        for vertex in &mut self.vertices {
            *vertex = matrix.transform_point(vertex);
        }
        if matrix.fixed_view::<3, 3>(0, 0).clone_owned().determinant() < 0.0 {
            for face in &mut self.faces {
                face.reverse();
            }
        }
    }

    /// Append another polyhedron without any boolean resolution
    pub fn merge(&mut self, other: Polyhedron) {
        let offset = self.vertices.len();
        self.vertices.extend(other.vertices);
        self.faces.extend(
            other
                .faces
                .into_iter()
                .map(|face| face.into_iter().map(|i| i + offset).collect()),
        );
    }

    /// Outward normal of a face, zero for degenerate faces
    pub fn face_normal(&self, face: &[usize]) -> Vector3<f64> {
        newell_normal(face.iter().filter_map(|&i| self.vertices.get(i)))
    }

    pub fn non_triangular_faces(&self) -> usize {
        self.faces.iter().filter(|face| face.len() != 3).count()
    }

    /// Merge vertices closer than `epsilon`, then drop repeated indices and
    /// faces left with fewer than three distinct vertices. Unused vertices are removed.
    pub fn weld(self, epsilon: f64) -> Polyhedron {
        let mut lookup: AHashMap<(i64, i64, i64), usize> = AHashMap::new();
        let mut remap = Vec::with_capacity(self.vertices.len());
        let mut vertices = Vec::new();

        for point in &self.vertices {
            let key = (
                (point.x / epsilon).round() as i64,
                (point.y / epsilon).round() as i64,
                (point.z / epsilon).round() as i64,
            );
            let index = *lookup.entry(key).or_insert_with(|| {
                vertices.push(*point);
                vertices.len() - 1
            });
            remap.push(index);
        }

        let mut faces = Vec::with_capacity(self.faces.len());
        for face in self.faces {
            let mut loop_: Vec<usize> = Vec::with_capacity(face.len());
            for i in face {
                let Some(&mapped) = remap.get(i) else { continue };
                if loop_.last() != Some(&mapped) {
                    loop_.push(mapped);
                }
            }
            while loop_.len() > 1 && loop_.first() == loop_.last() {
                loop_.pop();
            }
            if loop_.len() >= 3 {
                faces.push(loop_);
            }
        }

        Polyhedron { vertices, faces }.compact()
    }

    /// Drop vertices no face refers to
    fn compact(self) -> Polyhedron {
        let mut remap = vec![usize::MAX; self.vertices.len()];
        let mut vertices = Vec::new();
        let faces = self
            .faces
            .into_iter()
            .map(|face| {
                face.into_iter()
                    .map(|i| {
                        if remap[i] == usize::MAX {
                            remap[i] = vertices.len();
                            vertices.push(self.vertices[i]);
                        }
                        remap[i]
                    })
                    .collect()
            })
            .collect();
        Polyhedron { vertices, faces }
    }

    /// Count edge usage and face problems
    pub fn check(&self) -> PolyhedronCheck {
        let mut report = PolyhedronCheck {
            vertices: self.vertices.len(),
            faces: self.faces.len(),
            ..Default::default()
        };

        let mut edges: AHashMap<(usize, usize), u32> = AHashMap::new();
        for face in &self.faces {
            if face.len() != 3 {
                report.non_triangular += 1;
            }
            let in_range = face.iter().all(|&i| i < self.vertices.len());
            if face.len() < 3 || !in_range || self.face_normal(face).norm() < 1e-12 {
                report.degenerate_faces += 1;
            }
            if !in_range {
                continue;
            }
            for (k, &a) in face.iter().enumerate() {
                let b = face[(k + 1) % face.len()];
                if a != b {
                    *edges.entry((a.min(b), a.max(b))).or_insert(0) += 1;
                }
            }
        }

        for &count in edges.values() {
            match count {
                1 => report.open_edges += 1,
                2 => {}
                _ => report.non_manifold_edges += 1,
            }
        }
        report
    }

    /// Split into edge-connected components, in order of first appearance.
    /// Vertices are expected to be welded.
    pub fn split_lumps(self) -> Vec<Polyhedron> {
        let mut sets = DisjointSets::new(self.vertices.len());
        for face in &self.faces {
            for pair in face.windows(2) {
                sets.union(pair[0], pair[1]);
            }
        }

        let mut lump_of_root: AHashMap<usize, usize> = AHashMap::new();
        let mut lumps: Vec<Polyhedron> = Vec::new();
        let mut local: Vec<AHashMap<usize, usize>> = Vec::new();

        for face in self.faces {
            let Some(&first) = face.first() else { continue };
            let root = sets.find(first);
            let lump = *lump_of_root.entry(root).or_insert_with(|| {
                lumps.push(Polyhedron::default());
                local.push(AHashMap::new());
                lumps.len() - 1
            });

            let target = &mut lumps[lump];
            let map = &mut local[lump];
            let face = face
                .into_iter()
                .map(|i| {
                    *map.entry(i).or_insert_with(|| {
                        target.vertices.push(self.vertices[i]);
                        target.vertices.len() - 1
                    })
                })
                .collect();
            target.faces.push(face);
        }
        lumps
    }
}

/// Newell's method; robust for non-planar and concave loops
pub(crate) fn newell_normal<'a>(points: impl Iterator<Item = &'a Point3<f64>>) -> Vector3<f64> {
    let points: Vec<&Point3<f64>> = points.collect();
    let mut normal = Vector3::zeros();
    for (k, a) in points.iter().enumerate() {
        let b = points[(k + 1) % points.len()];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal
}

struct DisjointSets {
    parent: Vec<usize>,
}

impl DisjointSets {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[rb] = ra;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use approx::assert_relative_eq;

    fn unit_cube() -> Polyhedron {
        Primitive::Cuboid {
            size: Vector3::new(1.0, 1.0, 1.0),
            center: false,
        }
        .to_polyhedron(&Default::default())
    }

    #[test]
    fn test_cube_is_closed() {
        let check = unit_cube().check();
        assert_eq!(check.vertices, 8);
        assert_eq!(check.faces, 6);
        assert_eq!(check.non_triangular, 6);
        assert!(check.is_closed());
        assert!(check.diagnostics().is_empty());
    }

    #[test]
    fn test_open_surface_is_reported() {
        let mut cube = unit_cube();
        cube.faces.pop();
        let check = cube.check();
        assert_eq!(check.open_edges, 4);
        assert!(!check.is_closed());
        assert_eq!(check.diagnostics(), vec!["4 open edges".to_string()]);
    }

    #[test]
    fn test_mirror_transform_keeps_outward_faces() {
        let mut cube = unit_cube();
        let before = cube.face_normal(&cube.faces[1]).normalize();
        cube.transform(&Matrix4::new_nonuniform_scaling(&Vector3::new(-1.0, 1.0, 1.0)));
        let after = cube.face_normal(&cube.faces[1]).normalize();
        // top face keeps pointing up after mirroring in x
        assert_relative_eq!(before.z, 1.0, epsilon = 1e-12);
        assert_relative_eq!(after.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_weld_and_split_lumps() {
        let mut a = unit_cube();
        let mut b = unit_cube();
        b.transform(&Matrix4::new_translation(&Vector3::new(5.0, 0.0, 0.0)));
        // a duplicate copy of the shared vertices exercises welding
        a.merge(b.clone());
        a.merge(Polyhedron::new(b.vertices.clone(), Vec::new()));

        let lumps = a.weld(WELD_EPSILON).split_lumps();
        assert_eq!(lumps.len(), 2);
        for lump in &lumps {
            assert_eq!(lump.vertex_count(), 8);
            assert!(lump.check().is_closed());
        }
        assert!(lumps[1].vertices.iter().all(|p| p.x >= 5.0));
    }

    #[test]
    fn test_weld_drops_collapsed_faces() {
        let poly = Polyhedron::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 1e-12),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![vec![0, 1, 2], vec![0, 1, 3]],
        );
        let welded = poly.weld(WELD_EPSILON);
        assert_eq!(welded.face_count(), 1);
        assert_eq!(welded.vertex_count(), 3);
    }
}
