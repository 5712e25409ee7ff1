// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CSG (Constructive Solid Geometry) operations using BSP trees
//!
//! Nodes live in an arena and every traversal uses an explicit work stack:
//! a BSP built over a convex solid degenerates into a chain as long as its
//! face count.

use super::polyhedron::{newell_normal, WELD_EPSILON};
use super::Polyhedron;
use nalgebra::{Point3, Vector3};
use thiserror::Error;

const EPSILON: f64 = 1e-5;

/// Upper bound on BSP nodes per tree
const MAX_NODES: usize = 4_000_000;

const COPLANAR: u8 = 0;
const FRONT: u8 = 1;
const BACK: u8 = 2;
const SPANNING: u8 = 3;

/// Failure inside the boolean kernel
#[derive(Debug, Error, Clone, PartialEq)]
pub enum KernelError {
    #[error("non-finite coordinate in boolean operand")]
    NonFinite,

    #[error("BSP tree exceeded {limit} nodes")]
    TooComplex { limit: usize },
}

#[derive(Debug, Clone, PartialEq)]
struct Plane {
    normal: Vector3<f64>,
    w: f64,
}

impl Plane {
    fn from_points(points: &[Point3<f64>]) -> Option<Self> {
        let normal = newell_normal(points.iter()).try_normalize(1e-12)?;
        let w = normal.dot(&points[0].coords);
        Some(Self { normal, w })
    }

    fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    /// Sort `polygon` into one of four lists, splitting it when it spans the plane
    fn split_polygon(
        &self,
        polygon: Polygon,
        coplanar_front: &mut Vec<Polygon>,
        coplanar_back: &mut Vec<Polygon>,
        front: &mut Vec<Polygon>,
        back: &mut Vec<Polygon>,
    ) {
        let mut polygon_type = COPLANAR;
        let types: Vec<u8> = polygon
            .vertices
            .iter()
            .map(|v| {
                let t = self.normal.dot(&v.coords) - self.w;
                let kind = if t < -EPSILON {
                    BACK
                } else if t > EPSILON {
                    FRONT
                } else {
                    COPLANAR
                };
                polygon_type |= kind;
                kind
            })
            .collect();

        match polygon_type {
            COPLANAR => {
                if self.normal.dot(&polygon.plane.normal) > 0.0 {
                    coplanar_front.push(polygon);
                } else {
                    coplanar_back.push(polygon);
                }
            }
            FRONT => front.push(polygon),
            BACK => back.push(polygon),
            _ => {
                let n = polygon.vertices.len();
                let mut f = Vec::with_capacity(n + 1);
                let mut b = Vec::with_capacity(n + 1);
                for i in 0..n {
                    let j = (i + 1) % n;
                    let (ti, tj) = (types[i], types[j]);
                    let (vi, vj) = (polygon.vertices[i], polygon.vertices[j]);
                    if ti != BACK {
                        f.push(vi);
                    }
                    if ti != FRONT {
                        b.push(vi);
                    }
                    if (ti | tj) == SPANNING {
                        let t = (self.w - self.normal.dot(&vi.coords))
                            / self.normal.dot(&(vj - vi));
                        let v = vi + (vj - vi) * t;
                        f.push(v);
                        b.push(v);
                    }
                }
                if f.len() >= 3 {
                    front.push(Polygon::with_plane(f, polygon.plane.clone()));
                }
                if b.len() >= 3 {
                    back.push(Polygon::with_plane(b, polygon.plane));
                }
            }
        }
    }
}

/// Convex or concave planar polygon; splitting keeps the parent plane
#[derive(Debug, Clone)]
struct Polygon {
    vertices: Vec<Point3<f64>>,
    plane: Plane,
}

impl Polygon {
    fn new(vertices: Vec<Point3<f64>>) -> Option<Self> {
        let plane = Plane::from_points(&vertices)?;
        Some(Self { vertices, plane })
    }

    fn with_plane(vertices: Vec<Point3<f64>>, plane: Plane) -> Self {
        Self { vertices, plane }
    }

    fn flip(&mut self) {
        self.vertices.reverse();
        self.plane.flip();
    }
}

#[derive(Debug, Default)]
struct BspNode {
    plane: Option<Plane>,
    front: Option<usize>,
    back: Option<usize>,
    polygons: Vec<Polygon>,
}

/// BSP tree; node 0 is the root
#[derive(Debug)]
struct BspTree {
    nodes: Vec<BspNode>,
}

impl BspTree {
    fn new(polygons: Vec<Polygon>) -> Result<Self, KernelError> {
        let mut tree = Self {
            nodes: vec![BspNode::default()],
        };
        tree.build(polygons)?;
        Ok(tree)
    }

    fn add_node(&mut self) -> Result<usize, KernelError> {
        if self.nodes.len() >= MAX_NODES {
            return Err(KernelError::TooComplex { limit: MAX_NODES });
        }
        self.nodes.push(BspNode::default());
        Ok(self.nodes.len() - 1)
    }

    /// Insert polygons, creating nodes as needed
    fn build(&mut self, polygons: Vec<Polygon>) -> Result<(), KernelError> {
        let mut work = vec![(0usize, polygons)];
        while let Some((index, polygons)) = work.pop() {
            if polygons.is_empty() {
                continue;
            }
            let plane = self.nodes[index]
                .plane
                .get_or_insert_with(|| polygons[0].plane.clone())
                .clone();

            let (mut coplanar_front, mut coplanar_back) = (Vec::new(), Vec::new());
            let (mut front, mut back) = (Vec::new(), Vec::new());
            for polygon in polygons {
                plane.split_polygon(
                    polygon,
                    &mut coplanar_front,
                    &mut coplanar_back,
                    &mut front,
                    &mut back,
                );
            }
            let node = &mut self.nodes[index];
            node.polygons.append(&mut coplanar_front);
            node.polygons.append(&mut coplanar_back);

            if !front.is_empty() {
                let existing = self.nodes[index].front;
                let child = match existing {
                    Some(child) => child,
                    None => {
                        let child = self.add_node()?;
                        self.nodes[index].front = Some(child);
                        child
                    }
                };
                work.push((child, front));
            }
            if !back.is_empty() {
                let existing = self.nodes[index].back;
                let child = match existing {
                    Some(child) => child,
                    None => {
                        let child = self.add_node()?;
                        self.nodes[index].back = Some(child);
                        child
                    }
                };
                work.push((child, back));
            }
        }
        Ok(())
    }

    /// Remove the parts of `polygons` inside this tree's solid
    fn clip_polygons(&self, polygons: Vec<Polygon>) -> Vec<Polygon> {
        let mut kept = Vec::new();
        let mut work = vec![(0usize, polygons)];
        while let Some((index, polygons)) = work.pop() {
            let node = &self.nodes[index];
            let Some(plane) = &node.plane else {
                kept.extend(polygons);
                continue;
            };

            let (mut coplanar_front, mut coplanar_back) = (Vec::new(), Vec::new());
            let (mut front, mut back) = (Vec::new(), Vec::new());
            for polygon in polygons {
                plane.split_polygon(
                    polygon,
                    &mut coplanar_front,
                    &mut coplanar_back,
                    &mut front,
                    &mut back,
                );
            }
            front.append(&mut coplanar_front);
            back.append(&mut coplanar_back);

            match node.front {
                Some(child) => work.push((child, front)),
                None => kept.extend(front),
            }
            // polygons behind a leaf are inside the solid and dropped
            if let Some(child) = node.back {
                work.push((child, back));
            }
        }
        kept
    }

    /// Remove everything in this tree that lies inside `other`
    fn clip_to(&mut self, other: &BspTree) {
        for node in &mut self.nodes {
            let polygons = std::mem::take(&mut node.polygons);
            node.polygons = other.clip_polygons(polygons);
        }
    }

    /// Swap solid and empty space
    fn invert(&mut self) {
        for node in &mut self.nodes {
            for polygon in &mut node.polygons {
                polygon.flip();
            }
            if let Some(plane) = &mut node.plane {
                plane.flip();
            }
            std::mem::swap(&mut node.front, &mut node.back);
        }
    }

    fn into_polygons(self) -> Vec<Polygon> {
        self.nodes
            .into_iter()
            .flat_map(|node| node.polygons)
            .collect()
    }
}

/// Solid held as a polygon soup for BSP booleans
#[derive(Debug, Clone)]
pub struct Csg {
    polygons: Vec<Polygon>,
}

impl Csg {
    /// Convert a polyhedron; degenerate faces are dropped
    pub fn from_polyhedron(polyhedron: &Polyhedron) -> Result<Self, KernelError> {
        if polyhedron
            .vertices
            .iter()
            .any(|p| !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()))
        {
            return Err(KernelError::NonFinite);
        }
        let polygons = polyhedron
            .faces
            .iter()
            .filter_map(|face| {
                let points: Option<Vec<_>> =
                    face.iter().map(|&i| polyhedron.vertices.get(i).copied()).collect();
                points.filter(|p| p.len() >= 3).and_then(Polygon::new)
            })
            .collect();
        Ok(Self { polygons })
    }

    /// Welded polyhedron with one face per polygon
    pub fn into_polyhedron(self) -> Polyhedron {
        let mut polyhedron = Polyhedron::default();
        for polygon in self.polygons {
            let start = polyhedron.vertices.len();
            let count = polygon.vertices.len();
            polyhedron.vertices.extend(polygon.vertices);
            polyhedron.faces.push((start..start + count).collect());
        }
        polyhedron.weld(WELD_EPSILON)
    }

    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    pub fn union(self, other: Csg) -> Result<Csg, KernelError> {
        if self.is_empty() || !self.overlaps(&other) {
            let mut polygons = self.polygons;
            polygons.extend(other.polygons);
            return Ok(Csg { polygons });
        }
        let mut a = BspTree::new(self.polygons)?;
        let mut b = BspTree::new(other.polygons)?;
        a.clip_to(&b);
        b.clip_to(&a);
        b.invert();
        b.clip_to(&a);
        b.invert();
        a.build(b.into_polygons())?;
        Ok(Csg {
            polygons: a.into_polygons(),
        })
    }

    pub fn difference(self, other: Csg) -> Result<Csg, KernelError> {
        if self.is_empty() || !self.overlaps(&other) {
            return Ok(self);
        }
        let mut a = BspTree::new(self.polygons)?;
        let mut b = BspTree::new(other.polygons)?;
        a.invert();
        a.clip_to(&b);
        b.clip_to(&a);
        b.invert();
        b.clip_to(&a);
        b.invert();
        a.build(b.into_polygons())?;
        a.invert();
        Ok(Csg {
            polygons: a.into_polygons(),
        })
    }

    pub fn intersection(self, other: Csg) -> Result<Csg, KernelError> {
        if !self.overlaps(&other) {
            return Ok(Csg {
                polygons: Vec::new(),
            });
        }
        let mut a = BspTree::new(self.polygons)?;
        let mut b = BspTree::new(other.polygons)?;
        a.invert();
        b.clip_to(&a);
        b.invert();
        a.clip_to(&b);
        b.clip_to(&a);
        a.build(b.into_polygons())?;
        a.invert();
        Ok(Csg {
            polygons: a.into_polygons(),
        })
    }

    fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let mut points = self.polygons.iter().flat_map(|p| p.vertices.iter());
        let first = *points.next()?;
        Some(points.fold((first, first), |(lo, hi), p| (lo.inf(p), hi.sup(p))))
    }

    /// Bounding boxes touch or overlap
    fn overlaps(&self, other: &Csg) -> bool {
        match (self.bounds(), other.bounds()) {
            (Some((alo, ahi)), Some((blo, bhi))) => (0..3)
                .all(|k| alo[k] <= bhi[k] + EPSILON && blo[k] <= ahi[k] + EPSILON),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Mesh, Primitive, SecantTolerance};
    use approx::assert_relative_eq;
    use nalgebra::{Matrix4, Vector3};

    fn cube_at(size: f64, offset: Vector3<f64>) -> Csg {
        let mut poly = Primitive::Cuboid {
            size: Vector3::new(size, size, size),
            center: false,
        }
        .to_polyhedron(&SecantTolerance::default());
        poly.transform(&Matrix4::new_translation(&offset));
        Csg::from_polyhedron(&poly).unwrap()
    }

    fn volume(csg: Csg) -> f64 {
        let poly = csg.into_polyhedron();
        let mut mesh = Mesh::new();
        mesh.vertices = poly.vertices.clone();
        for face in &poly.faces {
            for k in 1..face.len() - 1 {
                mesh.add_triangle(crate::geometry::Triangle::new([face[0], face[k], face[k + 1]]));
            }
        }
        mesh.signed_volume()
    }

    #[test]
    fn test_union_of_overlapping_cubes() {
        let a = cube_at(2.0, Vector3::zeros());
        let b = cube_at(2.0, Vector3::new(1.0, 0.0, 0.0));
        let result = a.union(b).unwrap();
        assert_relative_eq!(volume(result), 12.0, epsilon = 1e-9);
    }

    #[test]
    fn test_difference_of_overlapping_cubes() {
        let a = cube_at(2.0, Vector3::zeros());
        let b = cube_at(2.0, Vector3::new(1.0, 0.0, 0.0));
        let result = a.difference(b).unwrap();
        assert_relative_eq!(volume(result), 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_intersection_of_overlapping_cubes() {
        let a = cube_at(2.0, Vector3::zeros());
        let b = cube_at(2.0, Vector3::new(1.0, 1.0, 1.0));
        let result = a.intersection(b).unwrap();
        assert_relative_eq!(volume(result), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_disjoint_operands_short_circuit() {
        let a = cube_at(1.0, Vector3::zeros());
        let b = cube_at(1.0, Vector3::new(5.0, 0.0, 0.0));
        assert_eq!(a.clone().union(b.clone()).unwrap().polygon_count(), 12);
        assert_eq!(a.clone().difference(b.clone()).unwrap().polygon_count(), 6);
        assert!(a.intersection(b).unwrap().is_empty());
    }

    #[test]
    fn test_non_finite_input_is_rejected() {
        let poly = Polyhedron::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(f64::NAN, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![vec![0, 1, 2]],
        );
        assert_eq!(Csg::from_polyhedron(&poly).unwrap_err(), KernelError::NonFinite);
    }

    #[test]
    fn test_deep_tree_from_fine_sphere() {
        let sphere = Primitive::Sphere { r: 10.0 }.to_polyhedron(&SecantTolerance::default());
        let csg = Csg::from_polyhedron(&sphere).unwrap();
        let faces = csg.polygon_count();
        assert!(faces > 2000);

        let tree = BspTree::new(csg.polygons.clone()).unwrap();
        assert!(tree.nodes.len() > 1000);
        assert_eq!(tree.into_polygons().len(), faces);
    }
}
