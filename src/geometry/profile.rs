// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! 2D profiles backed by `geo` polygons

use super::SecantTolerance;
use geo::orient::Direction;
use geo::{Area, BooleanOps, Coord, LineString, MapCoords, MultiPolygon, Orient, Polygon};
use nalgebra::Matrix4;
use std::f64::consts::PI;

/// 2D primitive shapes
#[derive(Debug, Clone, PartialEq)]
pub enum Shape2dPrimitive {
    Circle { r: f64 },
    Rectangle { dx: f64, dy: f64, center: bool },
    Polygon { points: Vec<[f64; 2]> },
}

impl Shape2dPrimitive {
    /// Outline as an oriented multipolygon: exteriors counter-clockwise, holes clockwise
    pub fn to_multi_polygon(&self, tolerance: &SecantTolerance) -> MultiPolygon<f64> {
        let ring: Vec<Coord<f64>> = match self {
            Self::Circle { r } => {
                let n = tolerance.segments(*r);
                (0..n)
                    .map(|i| {
                        let theta = 2.0 * PI * i as f64 / n as f64;
                        Coord {
                            x: r * theta.cos(),
                            y: r * theta.sin(),
                        }
                    })
                    .collect()
            }
            Self::Rectangle { dx, dy, center } => {
                let (x0, y0) = if *center { (-dx / 2.0, -dy / 2.0) } else { (0.0, 0.0) };
                vec![
                    Coord { x: x0, y: y0 },
                    Coord { x: x0 + dx, y: y0 },
                    Coord {
                        x: x0 + dx,
                        y: y0 + dy,
                    },
                    Coord { x: x0, y: y0 + dy },
                ]
            }
            Self::Polygon { points } => points.iter().map(|p| Coord { x: p[0], y: p[1] }).collect(),
        };
        let polygon = Polygon::new(LineString::from(ring), Vec::new());
        MultiPolygon::new(vec![polygon.orient(Direction::Default)])
    }
}

/// Materialized 2D geometry whose parts still overlap
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    pub parts: Vec<MultiPolygon<f64>>,
}

impl Profile {
    pub fn new(parts: Vec<MultiPolygon<f64>>) -> Self {
        Self { parts }
    }

    pub fn is_empty(&self) -> bool {
        self.parts.iter().all(|part| part.0.is_empty())
    }

    /// Resolve overlaps into one region
    pub fn fused(self) -> MultiPolygon<f64> {
        fuse_profiles(self.parts)
    }
}

/// Final 2D result: disjoint polygons, each possibly with holes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolygonSet {
    polygons: Vec<Polygon<f64>>,
}

impl PolygonSet {
    pub fn new(polygons: Vec<Polygon<f64>>) -> Self {
        Self { polygons }
    }

    pub fn polygons(&self) -> &[Polygon<f64>] {
        &self.polygons
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Polygon<f64>> {
        self.polygons.iter()
    }

    pub fn area(&self) -> f64 {
        self.polygons.iter().map(|p| p.unsigned_area()).sum()
    }
}

impl From<MultiPolygon<f64>> for PolygonSet {
    fn from(value: MultiPolygon<f64>) -> Self {
        Self::new(value.orient(Direction::Default).0)
    }
}

/// Apply the XY part of an affine transform
pub fn transform_profile(profile: &MultiPolygon<f64>, matrix: &Matrix4<f64>) -> MultiPolygon<f64> {
    let m = *matrix;
    let mapped = profile.map_coords(|Coord { x, y }| Coord {
        x: m[(0, 0)] * x + m[(0, 1)] * y + m[(0, 3)],
        y: m[(1, 0)] * x + m[(1, 1)] * y + m[(1, 3)],
    });
    let det = m[(0, 0)] * m[(1, 1)] - m[(0, 1)] * m[(1, 0)];
    if det < 0.0 {
        mapped.orient(Direction::Default)
    } else {
        mapped
    }
}

/// Union of all parts, starting from the empty region
pub fn fuse_profiles(parts: Vec<MultiPolygon<f64>>) -> MultiPolygon<f64> {
    let mut parts = parts.into_iter().filter(|part| !part.0.is_empty());
    let Some(first) = parts.next() else {
        return MultiPolygon::new(Vec::new());
    };
    parts.fold(first, |acc, part| acc.union(&part))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    #[test]
    fn test_rectangle_and_circle_area() {
        let tol = SecantTolerance::default();
        let rect = Shape2dPrimitive::Rectangle {
            dx: 2.0,
            dy: 3.0,
            center: true,
        }
        .to_multi_polygon(&tol);
        assert_relative_eq!(rect.unsigned_area(), 6.0, epsilon = 1e-12);

        let circle = Shape2dPrimitive::Circle { r: 5.0 }.to_multi_polygon(&tol);
        assert!((circle.unsigned_area() - PI * 25.0).abs() < 0.5);
    }

    #[test]
    fn test_clockwise_polygon_is_reoriented() {
        let clockwise = Shape2dPrimitive::Polygon {
            points: vec![[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]],
        }
        .to_multi_polygon(&SecantTolerance::default());
        assert!(clockwise.signed_area() > 0.0);
    }

    #[test]
    fn test_fuse_overlapping_parts() {
        let tol = SecantTolerance::default();
        let a = Shape2dPrimitive::Rectangle {
            dx: 2.0,
            dy: 2.0,
            center: false,
        }
        .to_multi_polygon(&tol);
        let b = transform_profile(&a, &Matrix4::new_translation(&Vector3::new(1.0, 0.0, 0.0)));
        let fused = fuse_profiles(vec![a, b]);
        assert_eq!(fused.0.len(), 1);
        assert_relative_eq!(fused.unsigned_area(), 6.0, epsilon = 1e-9);

        assert!(fuse_profiles(Vec::new()).0.is_empty());
    }

    #[test]
    fn test_mirror_keeps_orientation() {
        let tol = SecantTolerance::default();
        let rect = Shape2dPrimitive::Rectangle {
            dx: 1.0,
            dy: 1.0,
            center: false,
        }
        .to_multi_polygon(&tol);
        let mirror = Matrix4::new_nonuniform_scaling(&Vector3::new(-1.0, 1.0, 1.0));
        let mirrored = transform_profile(&rect, &mirror);
        assert!(mirrored.signed_area() > 0.0);
    }
}
