// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Re-export of evaluated results as declarative xcsg documents

use super::{xcsg_output_path, MeshWriter, ProfileWriter};
use crate::document::{Document, Node, ROOT_TAG};
use crate::geometry::{Mesh, PolygonSet, TriangleSet};
use anyhow::Result;
use geo::{LineString, Polygon};
use std::path::{Path, PathBuf};

/// Writes each lump as a `<polyhedron>`, wrapped in `<union3d>` when there are several
pub struct XcsgMeshWriter;

impl MeshWriter for XcsgMeshWriter {
    fn write(&self, mesh: &TriangleSet, base: &Path) -> Result<PathBuf> {
        let path = xcsg_output_path(base);
        mesh_document(mesh).write(&path)?;
        Ok(path)
    }
}

/// Writes each polygon as `<polygon>`, holes subtracted through `<difference2d>`
pub struct XcsgProfileWriter;

impl ProfileWriter for XcsgProfileWriter {
    fn write(&self, polygons: &PolygonSet, base: &Path) -> Result<PathBuf> {
        let path = xcsg_output_path(base);
        profile_document(polygons).write(&path)?;
        Ok(path)
    }
}

fn root() -> Node {
    Node::new(ROOT_TAG).with_property("version", "1.0")
}

fn wrap(mut nodes: Vec<Node>, union_tag: &str) -> Option<Node> {
    match nodes.len() {
        0 => None,
        1 => nodes.pop(),
        _ => {
            let mut union = Node::new(union_tag);
            union.children = nodes;
            Some(union)
        }
    }
}

pub(crate) fn mesh_document(mesh: &TriangleSet) -> Document {
    let lumps = mesh.iter().map(polyhedron_node).collect();
    let mut root = root();
    root.children.extend(wrap(lumps, "union3d"));
    Document::new(root)
}

pub(crate) fn profile_document(polygons: &PolygonSet) -> Document {
    let shapes = polygons.iter().map(shape_node).collect();
    let mut root = root();
    root.children.extend(wrap(shapes, "union2d"));
    Document::new(root)
}

fn polyhedron_node(mesh: &Mesh) -> Node {
    let mut vertices = Node::new("vertices");
    vertices.children = mesh
        .vertices
        .iter()
        .map(|p| {
            Node::new("vertex")
                .with_property("x", p.x)
                .with_property("y", p.y)
                .with_property("z", p.z)
        })
        .collect();

    let mut faces = Node::new("faces");
    faces.children = mesh
        .triangles
        .iter()
        .map(|triangle| {
            let mut face = Node::new("face");
            face.children = triangle
                .indices
                .iter()
                .map(|index| Node::new("fv").with_property("index", index))
                .collect();
            face
        })
        .collect();

    Node::new("polyhedron").with_child(vertices).with_child(faces)
}

fn ring_node(ring: &LineString<f64>) -> Node {
    let mut vertices = Node::new("vertices");
    // closing coordinate repeats the first one
    let open = ring.0.len().saturating_sub(1);
    vertices.children = ring
        .0
        .iter()
        .take(open)
        .map(|c| Node::new("vertex").with_property("x", c.x).with_property("y", c.y))
        .collect();
    Node::new("polygon").with_child(vertices)
}

fn shape_node(polygon: &Polygon<f64>) -> Node {
    let outer = ring_node(polygon.exterior());
    if polygon.interiors().is_empty() {
        return outer;
    }
    let mut difference = Node::new("difference2d").with_child(outer);
    difference
        .children
        .extend(polygon.interiors().iter().map(ring_node));
    difference
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Mesh, Triangle};
    use crate::model::TypeRegistry;
    use geo::{polygon, MultiPolygon};
    use nalgebra::Point3;

    fn tetrahedron() -> Mesh {
        let mut mesh = Mesh::new();
        for p in [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]] {
            mesh.add_vertex(Point3::new(p[0], p[1], p[2]));
        }
        for t in [[0, 2, 1], [0, 1, 3], [1, 2, 3], [0, 3, 2]] {
            mesh.add_triangle(Triangle::new(t));
        }
        mesh
    }

    #[test]
    fn test_single_lump_is_bare_polyhedron() {
        let mut set = TriangleSet::new();
        set.push(tetrahedron());
        let doc = mesh_document(&set);
        assert_eq!(doc.root().children.len(), 1);
        assert_eq!(doc.root().children[0].tag, "polyhedron");
    }

    #[test]
    fn test_written_mesh_rebuilds_as_solid() {
        let mut set = TriangleSet::new();
        set.push(tetrahedron());
        set.push(tetrahedron());
        let doc = mesh_document(&set);
        let top = &doc.root().children[0];
        assert_eq!(top.tag, "union3d");

        let registry = TypeRegistry::new();
        let solid = registry.build_solid(top).unwrap();
        assert_eq!(solid.nbool(), 1);
    }

    #[test]
    fn test_holes_become_difference() {
        let square = polygon!(
            exterior: [(x: 0.0, y: 0.0), (x: 4.0, y: 0.0), (x: 4.0, y: 4.0), (x: 0.0, y: 4.0)],
            interiors: [[(x: 1.0, y: 1.0), (x: 1.0, y: 3.0), (x: 3.0, y: 3.0), (x: 3.0, y: 1.0)]],
        );
        let set = PolygonSet::from(MultiPolygon::new(vec![square]));
        let doc = profile_document(&set);
        let top = &doc.root().children[0];
        assert_eq!(top.tag, "difference2d");
        assert_eq!(top.children.len(), 2);
        let outer = top.children[0].child("vertices").unwrap();
        assert_eq!(outer.children.len(), 4);

        let shape = TypeRegistry::new().build_shape(top).unwrap();
        assert_eq!(shape.nbool(), 1);
    }
}
