// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Built-in builders for the xcsg tag set

use super::{BooleanOp, Shape2d, ShapeKind, Solid, SolidKind, TypeRegistry};
use crate::document::Node;
use crate::error::{Result, XcsgError};
use crate::geometry::{Polyhedron, Primitive, Shape2dPrimitive};
use nalgebra::{Point3, Vector3};
use std::f64::consts::PI;

pub(super) fn register_defaults(registry: &mut TypeRegistry) {
    registry.register_solid("cube", cube);
    registry.register_solid("cuboid", cuboid);
    registry.register_solid("sphere", sphere);
    registry.register_solid("cylinder", cylinder);
    registry.register_solid("cone", cone);
    registry.register_solid("polyhedron", polyhedron);
    registry.register_solid("linear_extrude", linear_extrude);
    registry.register_solid("rotate_extrude", rotate_extrude);
    for tag in ["union3d", "difference3d", "intersection3d"] {
        registry.register_solid(tag, boolean3d);
    }

    registry.register_shape("circle", circle);
    registry.register_shape("square", square);
    registry.register_shape("rectangle", rectangle);
    registry.register_shape("polygon", polygon);
    for tag in ["union2d", "difference2d", "intersection2d"] {
        registry.register_shape(tag, boolean2d);
    }
}

fn positive(node: &Node, name: &str) -> Result<f64> {
    let value = node.number(name)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(XcsgError::invalid_property(&node.tag, name, "must be positive"))
    }
}

fn non_negative(node: &Node, name: &str) -> Result<f64> {
    let value = node.number(name)?;
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(XcsgError::invalid_property(&node.tag, name, "must not be negative"))
    }
}

fn primitive(primitive: Primitive) -> Solid {
    Solid::new(SolidKind::Primitive(primitive))
}

fn cube(node: &Node, _: &TypeRegistry) -> Result<Solid> {
    let size = positive(node, "size")?;
    Ok(primitive(Primitive::Cuboid {
        size: Vector3::new(size, size, size),
        center: node.flag_or("center", false)?,
    }))
}

fn cuboid(node: &Node, _: &TypeRegistry) -> Result<Solid> {
    Ok(primitive(Primitive::Cuboid {
        size: Vector3::new(
            positive(node, "dx")?,
            positive(node, "dy")?,
            positive(node, "dz")?,
        ),
        center: node.flag_or("center", false)?,
    }))
}

fn sphere(node: &Node, _: &TypeRegistry) -> Result<Solid> {
    Ok(primitive(Primitive::Sphere {
        r: positive(node, "r")?,
    }))
}

fn cylinder(node: &Node, _: &TypeRegistry) -> Result<Solid> {
    let r = positive(node, "r")?;
    Ok(primitive(Primitive::Frustum {
        h: positive(node, "h")?,
        r1: r,
        r2: r,
        center: node.flag_or("center", false)?,
    }))
}

fn cone(node: &Node, _: &TypeRegistry) -> Result<Solid> {
    let (r1, r2) = (non_negative(node, "r1")?, non_negative(node, "r2")?);
    if r1 == 0.0 && r2 == 0.0 {
        return Err(XcsgError::invalid_property(&node.tag, "r1", "both radii are zero"));
    }
    Ok(primitive(Primitive::Frustum {
        h: positive(node, "h")?,
        r1,
        r2,
        center: node.flag_or("center", false)?,
    }))
}

/// `<vertices><vertex x y z/>..</vertices><faces><face><fv index/>..</face>..</faces>`
fn polyhedron(node: &Node, _: &TypeRegistry) -> Result<Solid> {
    let vertices = node
        .child("vertices")
        .ok_or_else(|| XcsgError::invalid_property(&node.tag, "vertices", "missing"))?
        .children
        .iter()
        .filter(|v| v.tag == "vertex")
        .map(|v| Ok(Point3::new(v.number("x")?, v.number("y")?, v.number("z")?)))
        .collect::<Result<Vec<_>>>()?;

    let mut faces = Vec::new();
    let face_nodes = node
        .child("faces")
        .ok_or_else(|| XcsgError::invalid_property(&node.tag, "faces", "missing"))?;
    for face in face_nodes.children.iter().filter(|f| f.tag == "face") {
        let mut loop_ = Vec::with_capacity(face.children.len());
        for fv in face.children.iter().filter(|fv| fv.tag == "fv") {
            let index = fv
                .get::<usize>("index")?
                .ok_or_else(|| XcsgError::invalid_property("fv", "index", "missing"))?;
            if index >= vertices.len() {
                return Err(XcsgError::invalid_property(
                    "fv",
                    "index",
                    format!("{index} out of range for {} vertices", vertices.len()),
                ));
            }
            loop_.push(index);
        }
        if loop_.len() < 3 {
            return Err(XcsgError::invalid_property(
                "face",
                "fv",
                "a face needs at least 3 vertices",
            ));
        }
        faces.push(loop_);
    }

    if faces.is_empty() {
        return Err(XcsgError::EmptyTree {
            tag: node.tag.clone(),
        });
    }
    Ok(Solid::new(SolidKind::Polyhedron(Polyhedron::new(vertices, faces))))
}

/// The single 2D child of an extrusion
fn profile_child(node: &Node, registry: &TypeRegistry) -> Result<Box<Shape2d>> {
    let child = node.geometry_children().next().ok_or_else(|| XcsgError::EmptyTree {
        tag: node.tag.clone(),
    })?;
    Ok(Box::new(registry.build_shape(child)?))
}

fn linear_extrude(node: &Node, registry: &TypeRegistry) -> Result<Solid> {
    let height = node.number("dz")?;
    if height == 0.0 {
        return Err(XcsgError::invalid_property(&node.tag, "dz", "must not be zero"));
    }
    Ok(Solid::new(SolidKind::LinearExtrude {
        profile: profile_child(node, registry)?,
        height,
    }))
}

fn rotate_extrude(node: &Node, registry: &TypeRegistry) -> Result<Solid> {
    let angle = node.number_or("angle", 2.0 * PI)?;
    if angle == 0.0 || angle.abs() > 2.0 * PI + 1e-9 {
        return Err(XcsgError::invalid_property(
            &node.tag,
            "angle",
            "must be in (0, 2π] radians",
        ));
    }
    Ok(Solid::new(SolidKind::RotateExtrude {
        profile: profile_child(node, registry)?,
        angle,
    }))
}

fn boolean_op(node: &Node) -> Result<BooleanOp> {
    BooleanOp::from_tag(&node.tag).ok_or_else(|| XcsgError::UnknownTag(node.tag.clone()))
}

fn boolean3d(node: &Node, registry: &TypeRegistry) -> Result<Solid> {
    let children = node
        .geometry_children()
        .map(|child| registry.build_solid(child))
        .collect::<Result<Vec<_>>>()?;
    if children.is_empty() {
        return Err(XcsgError::EmptyTree {
            tag: node.tag.clone(),
        });
    }
    Ok(Solid::new(SolidKind::Boolean {
        op: boolean_op(node)?,
        children,
    }))
}

fn shape(primitive: Shape2dPrimitive) -> Shape2d {
    Shape2d::new(ShapeKind::Primitive(primitive))
}

fn circle(node: &Node, _: &TypeRegistry) -> Result<Shape2d> {
    Ok(shape(Shape2dPrimitive::Circle {
        r: positive(node, "r")?,
    }))
}

fn square(node: &Node, _: &TypeRegistry) -> Result<Shape2d> {
    let size = positive(node, "size")?;
    Ok(shape(Shape2dPrimitive::Rectangle {
        dx: size,
        dy: size,
        center: node.flag_or("center", false)?,
    }))
}

fn rectangle(node: &Node, _: &TypeRegistry) -> Result<Shape2d> {
    Ok(shape(Shape2dPrimitive::Rectangle {
        dx: positive(node, "dx")?,
        dy: positive(node, "dy")?,
        center: node.flag_or("center", false)?,
    }))
}

/// `<vertices><vertex x y/>..</vertices>`
fn polygon(node: &Node, _: &TypeRegistry) -> Result<Shape2d> {
    let points = node
        .child("vertices")
        .ok_or_else(|| XcsgError::invalid_property(&node.tag, "vertices", "missing"))?
        .children
        .iter()
        .filter(|v| v.tag == "vertex")
        .map(|v| Ok([v.number("x")?, v.number("y")?]))
        .collect::<Result<Vec<_>>>()?;
    if points.len() < 3 {
        return Err(XcsgError::invalid_property(
            &node.tag,
            "vertices",
            "a polygon needs at least 3 vertices",
        ));
    }
    Ok(shape(Shape2dPrimitive::Polygon { points }))
}

fn boolean2d(node: &Node, registry: &TypeRegistry) -> Result<Shape2d> {
    let children = node
        .geometry_children()
        .map(|child| registry.build_shape(child))
        .collect::<Result<Vec<_>>>()?;
    if children.is_empty() {
        return Err(XcsgError::EmptyTree {
            tag: node.tag.clone(),
        });
    }
    Ok(Shape2d::new(ShapeKind::Boolean {
        op: boolean_op(node)?,
        children,
    }))
}
