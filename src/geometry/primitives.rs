// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometric primitives and extrusions

use super::tessellate::triangulate_polygon_2d;
use super::polyhedron::newell_normal;
use super::{Polyhedron, SecantTolerance, WELD_EPSILON};
use geo::orient::Direction;
use geo::{MultiPolygon, Orient};
use nalgebra::{Point3, Vector3};
use std::f64::consts::PI;

/// Geometric primitives
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Cuboid { size: Vector3<f64>, center: bool },
    Sphere { r: f64 },
    /// Cylinder or cone along +z; one radius may be zero
    Frustum { h: f64, r1: f64, r2: f64, center: bool },
}

impl Primitive {
    pub fn to_polyhedron(&self, tolerance: &SecantTolerance) -> Polyhedron {
        match self {
            Self::Cuboid { size, center } => generate_cuboid(*size, *center),
            Self::Sphere { r } => generate_sphere(*r, tolerance.segments(*r)),
            Self::Frustum { h, r1, r2, center } => {
                generate_frustum(*h, *r1, *r2, *center, tolerance.segments(r1.max(*r2)))
            }
        }
    }
}

fn generate_cuboid(size: Vector3<f64>, center: bool) -> Polyhedron {
    let origin = if center { -size / 2.0 } else { Vector3::zeros() };
    let (x0, y0, z0) = (origin.x, origin.y, origin.z);
    let (x1, y1, z1) = (x0 + size.x, y0 + size.y, z0 + size.z);

    let vertices = vec![
        Point3::new(x0, y0, z0),
        Point3::new(x1, y0, z0),
        Point3::new(x1, y1, z0),
        Point3::new(x0, y1, z0),
        Point3::new(x0, y0, z1),
        Point3::new(x1, y0, z1),
        Point3::new(x1, y1, z1),
        Point3::new(x0, y1, z1),
    ];
    let faces = vec![
        vec![0, 3, 2, 1], // bottom
        vec![4, 5, 6, 7], // top
        vec![0, 1, 5, 4], // front
        vec![3, 7, 6, 2], // back
        vec![0, 4, 7, 3], // left
        vec![1, 2, 6, 5], // right
    ];
    Polyhedron::new(vertices, faces)
}

fn generate_sphere(radius: f64, slices: usize) -> Polyhedron {
    let stacks = (slices / 2).max(2);
    let mut poly = Polyhedron::default();

    let north = poly.add_vertex(Point3::new(0.0, 0.0, radius));
    let mut rings = Vec::with_capacity(stacks - 1);
    for i in 1..stacks {
        let phi = PI * i as f64 / stacks as f64;
        let (z, rho) = (radius * phi.cos(), radius * phi.sin());
        let ring: Vec<usize> = (0..slices)
            .map(|j| {
                let theta = 2.0 * PI * j as f64 / slices as f64;
                poly.add_vertex(Point3::new(rho * theta.cos(), rho * theta.sin(), z))
            })
            .collect();
        rings.push(ring);
    }
    let south = poly.add_vertex(Point3::new(0.0, 0.0, -radius));

    let first = &rings[0];
    for j in 0..slices {
        poly.add_face(vec![north, first[j], first[(j + 1) % slices]]);
    }
    for pair in rings.windows(2) {
        let (upper, lower) = (&pair[0], &pair[1]);
        for j in 0..slices {
            let k = (j + 1) % slices;
            poly.add_face(vec![upper[j], lower[j], lower[k], upper[k]]);
        }
    }
    let last = &rings[rings.len() - 1];
    for j in 0..slices {
        poly.add_face(vec![south, last[(j + 1) % slices], last[j]]);
    }
    poly
}

fn generate_frustum(height: f64, r1: f64, r2: f64, center: bool, segments: usize) -> Polyhedron {
    let z0 = if center { -height / 2.0 } else { 0.0 };
    let z1 = z0 + height;
    let mut poly = Polyhedron::default();

    let ring = |poly: &mut Polyhedron, r: f64, z: f64| -> Vec<usize> {
        if r <= 0.0 {
            return vec![poly.add_vertex(Point3::new(0.0, 0.0, z))];
        }
        (0..segments)
            .map(|i| {
                let theta = 2.0 * PI * i as f64 / segments as f64;
                poly.add_vertex(Point3::new(r * theta.cos(), r * theta.sin(), z))
            })
            .collect()
    };
    let bottom = ring(&mut poly, r1, z0);
    let top = ring(&mut poly, r2, z1);

    if bottom.len() > 1 {
        poly.add_face(bottom.iter().rev().copied().collect());
    }
    if top.len() > 1 {
        poly.add_face(top.clone());
    }
    for i in 0..segments {
        let k = (i + 1) % segments;
        match (bottom.len() > 1, top.len() > 1) {
            (true, true) => poly.add_face(vec![bottom[i], bottom[k], top[k], top[i]]),
            (true, false) => poly.add_face(vec![bottom[i], bottom[k], top[0]]),
            (false, true) => poly.add_face(vec![bottom[0], top[k], top[i]]),
            (false, false) => {}
        }
    }
    poly
}

/// Sweep a profile along +z by `height` (negative heights sweep downwards)
pub fn linear_extrude(profile: &MultiPolygon<f64>, height: f64) -> Polyhedron {
    let profile = profile.orient(Direction::Default);
    let (z0, z1) = if height < 0.0 { (height, 0.0) } else { (0.0, height) };
    let mut poly = Polyhedron::default();

    for polygon in &profile.0 {
        let (points, triangles) = triangulate_polygon_2d(polygon);
        let base = poly.vertices.len();
        let n = points.len();
        for p in &points {
            poly.add_vertex(Point3::new(p[0], p[1], z0));
        }
        for p in &points {
            poly.add_vertex(Point3::new(p[0], p[1], z1));
        }

        // caps: triangles are counter-clockwise seen from +z
        for [a, b, c] in &triangles {
            poly.add_face(vec![base + a, base + c, base + b]);
            poly.add_face(vec![base + n + a, base + n + b, base + n + c]);
        }

        // side walls, one quad per ring edge
        let mut start = 0;
        for len in ring_lengths(polygon) {
            for k in 0..len {
                let i = start + k;
                let j = start + (k + 1) % len;
                poly.add_face(vec![base + i, base + j, base + n + j, base + n + i]);
            }
            start += len;
        }
    }
    poly
}

/// Revolve a profile around the y axis. The profile's x becomes the radius and
/// its y the height of the resulting solid, which is built around +z.
pub fn rotate_extrude(profile: &MultiPolygon<f64>, angle: f64, tolerance: &SecantTolerance) -> Polyhedron {
    let profile = profile.orient(Direction::Default);
    let angle = angle.clamp(-2.0 * PI, 2.0 * PI);
    let full = (angle.abs() - 2.0 * PI).abs() < 1e-9;
    let max_radius = profile
        .0
        .iter()
        .flat_map(|p| p.exterior().0.iter())
        .fold(0.0f64, |acc, c| acc.max(c.x.abs()));
    let full_segments = tolerance.segments(max_radius);
    let steps = if full {
        full_segments
    } else {
        ((full_segments as f64 * angle.abs() / (2.0 * PI)).ceil() as usize).max(1)
    };
    let step_angle = |j: usize| {
        if !full && j == steps {
            angle
        } else {
            angle * (j % steps) as f64 / steps as f64
        }
    };
    let place = |p: [f64; 2], phi: f64| Point3::new(p[0] * phi.cos(), p[0] * phi.sin(), p[1]);

    let mut poly = Polyhedron::default();
    for polygon in &profile.0 {
        let (points, triangles) = triangulate_polygon_2d(polygon);
        let mut start = 0;
        for len in ring_lengths(polygon) {
            for k in 0..len {
                let (a, b) = (points[start + k], points[start + (k + 1) % len]);
                for j in 0..steps {
                    let (phi0, phi1) = (step_angle(j), step_angle(j + 1));
                    let mut face = vec![
                        poly.add_vertex(place(a, phi0)),
                        poly.add_vertex(place(a, phi1)),
                        poly.add_vertex(place(b, phi1)),
                        poly.add_vertex(place(b, phi0)),
                    ];
                    if angle < 0.0 {
                        face.reverse();
                    }
                    poly.add_face(face);
                }
            }
            start += len;
        }

        if !full {
            // end caps face away from the swept volume
            let caps = [
                (0.0, Vector3::new(0.0, -1.0, 0.0)),
                (angle, Vector3::new(-angle.sin(), angle.cos(), 0.0)),
            ];
            for (phi, outward) in caps {
                let outward = if angle < 0.0 { -outward } else { outward };
                for [a, b, c] in &triangles {
                    let corners = [place(points[*a], phi), place(points[*b], phi), place(points[*c], phi)];
                    let normal = newell_normal(corners.iter());
                    let ordered = if normal.dot(&outward) < 0.0 {
                        [corners[0], corners[2], corners[1]]
                    } else {
                        corners
                    };
                    let face = ordered.iter().map(|p| poly.add_vertex(*p)).collect();
                    poly.add_face(face);
                }
            }
        }
    }

    poly.weld(WELD_EPSILON)
}

/// Point counts of the exterior and interior rings, without closing duplicates
fn ring_lengths(polygon: &geo::Polygon<f64>) -> Vec<usize> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(|ring| {
            let n = ring.0.len();
            if n > 1 && ring.0.first() == ring.0.last() {
                n - 1
            } else {
                n
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Mesh, Shape2dPrimitive, Triangle};
    use approx::assert_relative_eq;

    fn volume(poly: &Polyhedron) -> f64 {
        let mut mesh = Mesh::new();
        mesh.vertices = poly.vertices.clone();
        for face in &poly.faces {
            for k in 1..face.len() - 1 {
                mesh.add_triangle(Triangle::new([face[0], face[k], face[k + 1]]));
            }
        }
        mesh.signed_volume()
    }

    #[test]
    fn test_cuboid() {
        let cube = Primitive::Cuboid {
            size: Vector3::new(1.0, 2.0, 3.0),
            center: true,
        }
        .to_polyhedron(&SecantTolerance::default());
        assert_eq!(cube.vertex_count(), 8);
        assert_eq!(cube.face_count(), 6);
        assert!(cube.check().is_closed());
        assert_relative_eq!(volume(&cube), 6.0, epsilon = 1e-12);
        assert_relative_eq!(cube.vertices[0].z, -1.5);
    }

    #[test]
    fn test_sphere_is_closed_and_outward() {
        let sphere = Primitive::Sphere { r: 2.0 }.to_polyhedron(&SecantTolerance::default());
        let check = sphere.check();
        assert!(check.is_closed());
        assert_eq!(check.degenerate_faces, 0);
        let exact = 4.0 / 3.0 * PI * 8.0;
        let v = volume(&sphere);
        assert!(v > 0.95 * exact && v < exact);
    }

    #[test]
    fn test_cylinder_and_cone() {
        let tol = SecantTolerance::default();
        let cylinder = Primitive::Frustum {
            h: 2.0,
            r1: 1.0,
            r2: 1.0,
            center: false,
        }
        .to_polyhedron(&tol);
        assert!(cylinder.check().is_closed());
        assert!((volume(&cylinder) - 2.0 * PI).abs() < 0.1);

        let cone = Primitive::Frustum {
            h: 3.0,
            r1: 1.0,
            r2: 0.0,
            center: true,
        }
        .to_polyhedron(&tol);
        assert!(cone.check().is_closed());
        assert!((volume(&cone) - PI).abs() < 0.1);

        let inverted = Primitive::Frustum {
            h: 3.0,
            r1: 0.0,
            r2: 1.0,
            center: false,
        }
        .to_polyhedron(&tol);
        assert!(inverted.check().is_closed());
        assert!(volume(&inverted) > 0.0);
    }

    #[test]
    fn test_linear_extrude_with_hole() {
        let tol = SecantTolerance::default();
        let outer = Shape2dPrimitive::Rectangle {
            dx: 4.0,
            dy: 4.0,
            center: true,
        }
        .to_multi_polygon(&tol);
        let inner = Shape2dPrimitive::Rectangle {
            dx: 2.0,
            dy: 2.0,
            center: true,
        }
        .to_multi_polygon(&tol);
        let ring = geo::BooleanOps::difference(&outer, &inner);

        let solid = linear_extrude(&ring, 2.0);
        assert!(solid.check().is_closed());
        assert_relative_eq!(volume(&solid), 24.0, epsilon = 1e-9);

        let down = linear_extrude(&outer, -1.0);
        assert_relative_eq!(volume(&down), 16.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rotate_extrude_torus_like_ring() {
        let tol = SecantTolerance::default();
        let square = Shape2dPrimitive::Polygon {
            points: vec![[1.0, 0.0], [2.0, 0.0], [2.0, 1.0], [1.0, 1.0]],
        }
        .to_multi_polygon(&tol);

        let full = rotate_extrude(&square, 2.0 * PI, &tol);
        assert!(full.check().is_closed());
        let exact = PI * (4.0 - 1.0);
        let v = volume(&full);
        assert!(v > 0.97 * exact && v <= exact + 1e-9);

        let half = rotate_extrude(&square, PI, &tol);
        assert!(half.check().is_closed());
        assert!((volume(&half) - v / 2.0).abs() < 0.05 * v);
    }
}
