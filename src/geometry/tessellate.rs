// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Ear-clipping helpers shared by extrusions and the triangulation engine

use super::polyhedron::newell_normal;
use geo::{Coord, LineString, Polygon};
use nalgebra::Point3;
use tracing::trace;

/// Triangulate a polygon with holes.
///
/// Returns the ring points (exterior first, then each interior, without the
/// closing duplicates) and counter-clockwise triangles indexing into them.
pub fn triangulate_polygon_2d(polygon: &Polygon<f64>) -> (Vec<[f64; 2]>, Vec<[usize; 3]>) {
    let mut points: Vec<[f64; 2]> = open_ring(polygon.exterior()).collect();
    let mut holes = Vec::with_capacity(polygon.interiors().len());
    for interior in polygon.interiors() {
        holes.push(points.len());
        points.extend(open_ring(interior));
    }
    if points.len() < 3 {
        return (points, Vec::new());
    }

    let data: Vec<f64> = points.iter().flat_map(|p| [p[0], p[1]]).collect();
    let indices = match earcutr::earcut(&data, &holes, 2) {
        Ok(indices) if !indices.is_empty() => indices,
        Ok(_) | Err(_) => {
            trace!(points = points.len(), "earcut gave no triangles, using a fan");
            let exterior = holes.first().copied().unwrap_or(points.len());
            fan(exterior)
        }
    };

    let triangles = indices
        .chunks_exact(3)
        .map(|t| {
            let (a, b, c) = (points[t[0]], points[t[1]], points[t[2]]);
            let cross = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);
            if cross < 0.0 {
                [t[0], t[2], t[1]]
            } else {
                [t[0], t[1], t[2]]
            }
        })
        .collect();
    (points, triangles)
}

/// Triangulate one planar face loop. Triangles index into `points` and share
/// the loop's winding.
pub fn triangulate_face(points: &[Point3<f64>]) -> Vec<[usize; 3]> {
    if points.len() < 3 {
        return Vec::new();
    }
    if points.len() == 3 {
        return vec![[0, 1, 2]];
    }

    let normal = newell_normal(points.iter());
    if normal.norm() < 1e-15 {
        return fan_triangles(points.len());
    }

    // drop the dominant axis, keeping a right-handed pair for the other two
    let axis = normal.iamax();
    let (u, v) = match axis {
        0 => (1, 2),
        1 => (2, 0),
        _ => (0, 1),
    };
    let flat = Polygon::new(
        LineString::from(
            points
                .iter()
                .map(|p| Coord { x: p[u], y: p[v] })
                .collect::<Vec<_>>(),
        ),
        Vec::new(),
    );
    let (_, triangles) = triangulate_polygon_2d(&flat);
    if triangles.is_empty() {
        return fan_triangles(points.len());
    }

    // counter-clockwise in the projection means the face points along +axis
    if normal[axis] < 0.0 {
        triangles.into_iter().map(|[a, b, c]| [a, c, b]).collect()
    } else {
        triangles
    }
}

fn open_ring(ring: &LineString<f64>) -> impl Iterator<Item = [f64; 2]> + '_ {
    let coords = &ring.0;
    let closed = coords.len() > 1 && coords.first() == coords.last();
    let len = if closed { coords.len() - 1 } else { coords.len() };
    coords[..len].iter().map(|c| [c.x, c.y])
}

fn fan(count: usize) -> Vec<usize> {
    (1..count.saturating_sub(1))
        .flat_map(|k| [0, k, k + 1])
        .collect()
}

fn fan_triangles(count: usize) -> Vec<[usize; 3]> {
    (1..count.saturating_sub(1)).map(|k| [0, k, k + 1]).collect()
}
