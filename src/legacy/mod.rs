// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! OpenSCAD `.csg` import
//!
//! OpenSCAD exports a fully evaluated tree: every transform is a `multmatrix`,
//! every boolean is explicit and all arguments are literals. That subset maps
//! directly onto xcsg tags. Dimensions are tracked per subtree so that 2D and
//! 3D booleans get the right tag and mixtures are rejected.

mod parser;

pub use parser::{parse_script, Modifier, Params, Statement, Value};

use crate::document::{Document, Node, ROOT_TAG};
use crate::error::{Result, XcsgError};
use crate::geometry::SecantTolerance;
use crate::model::read_transform;
use nalgebra::Matrix4;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dim {
    Two,
    Three,
}

impl Dim {
    fn suffix(self) -> &'static str {
        match self {
            Dim::Two => "2d",
            Dim::Three => "3d",
        }
    }
}

#[derive(Debug)]
struct Converted {
    node: Node,
    dim: Dim,
}

impl Converted {
    fn solid(node: Node) -> Option<Self> {
        Some(Self {
            node,
            dim: Dim::Three,
        })
    }

    fn shape(node: Node) -> Option<Self> {
        Some(Self { node, dim: Dim::Two })
    }
}

/// Convert an OpenSCAD CSG script into an xcsg document.
///
/// `path` only appears in error messages. Several top-level statements are
/// combined into one union.
pub fn transliterate(script: &str, path: &Path) -> Result<Document> {
    let statements = parse_script(script).map_err(|message| XcsgError::parse(path, message))?;
    let converter = Transliterator { path };

    let mut top = Vec::new();
    for statement in &statements {
        top.extend(converter.convert(statement)?);
    }
    let combined = converter.combine_nodes(None, "union", top)?;

    let mut root = Node::new(ROOT_TAG)
        .with_property("version", "1.0")
        .with_property("secant_tolerance", SecantTolerance::DEFAULT);
    root.children.extend(combined.map(|c| c.node));
    debug!(statements = statements.len(), "legacy script transliterated");
    Ok(Document::new(root))
}

struct Transliterator<'a> {
    path: &'a Path,
}

impl Transliterator<'_> {
    fn error(&self, statement: Option<&Statement>, message: impl std::fmt::Display) -> XcsgError {
        let message = match statement {
            Some(s) => format!("line {}: {}(): {message}", s.line, s.module),
            None => message.to_string(),
        };
        XcsgError::parse(self.path, message)
    }

    fn convert(&self, statement: &Statement) -> Result<Option<Converted>> {
        if statement.modifier.is_some_and(Modifier::drops_subtree) {
            return Ok(None);
        }
        match statement.module.as_str() {
            "group" | "union" | "render" | "color" => self.combine(statement, "union"),
            "difference" => self.combine(statement, "difference"),
            "intersection" => self.combine(statement, "intersection"),
            "multmatrix" => self.multmatrix(statement),
            "cube" => self.cube(statement),
            "sphere" => self.sphere(statement),
            "cylinder" => self.cylinder(statement),
            "polyhedron" => self.polyhedron(statement),
            "circle" => self.circle(statement),
            "square" => self.square(statement),
            "polygon" => self.polygon(statement),
            "linear_extrude" => self.linear_extrude(statement),
            "rotate_extrude" => self.rotate_extrude(statement),
            "hull" | "minkowski" => Err(self.error(Some(statement), "operation is not supported")),
            _ => Err(self.error(Some(statement), "unknown module")),
        }
    }

    fn combine(&self, statement: &Statement, op: &str) -> Result<Option<Converted>> {
        let mut children = Vec::with_capacity(statement.children.len());
        for child in &statement.children {
            children.extend(self.convert(child)?);
        }
        self.combine_nodes(Some(statement), op, children)
    }

    /// A single child is passed through; an empty list yields nothing
    fn combine_nodes(
        &self,
        statement: Option<&Statement>,
        op: &str,
        mut children: Vec<Converted>,
    ) -> Result<Option<Converted>> {
        let Some(dim) = children.first().map(|c| c.dim) else {
            return Ok(None);
        };
        if children.iter().any(|c| c.dim != dim) {
            return Err(self.error(statement, "mixes 2D and 3D objects"));
        }
        if children.len() == 1 {
            return Ok(children.pop());
        }

        let mut node = Node::new(format!("{op}{}", dim.suffix()));
        node.children = children.into_iter().map(|c| c.node).collect();
        Ok(Some(Converted { node, dim }))
    }

    fn multmatrix(&self, statement: &Statement) -> Result<Option<Converted>> {
        let rows = statement
            .params
            .get_or_positional("m", 0)
            .and_then(Value::as_rows)
            .filter(|rows| (3..=4).contains(&rows.len()) && rows.iter().all(|r| r.len() == 4))
            .ok_or_else(|| self.error(Some(statement), "expected a 4x4 matrix"))?;

        let mut matrix = Matrix4::identity();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                matrix[(r, c)] = *value;
            }
        }

        let Some(mut child) = self.combine(statement, "union")? else {
            return Ok(None);
        };
        if matrix != Matrix4::identity() {
            apply_matrix(&mut child.node, &matrix)?;
        }
        Ok(Some(child))
    }

    fn to_number(&self, statement: &Statement, name: &str, value: Option<&Value>) -> Result<Option<f64>> {
        match value {
            None | Some(Value::Undef) => Ok(None),
            Some(value) => value
                .as_number()
                .map(Some)
                .ok_or_else(|| self.error(Some(statement), format!("'{name}' must be a number"))),
        }
    }

    /// Named number, else the positional one at `index`
    fn number(&self, statement: &Statement, name: &str, index: usize) -> Result<Option<f64>> {
        self.to_number(statement, name, statement.params.get_or_positional(name, index))
    }

    fn named(&self, statement: &Statement, name: &str) -> Result<Option<f64>> {
        self.to_number(statement, name, statement.params.get(name))
    }

    fn flag(&self, statement: &Statement, name: &str) -> bool {
        statement
            .params
            .get(name)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Radius from `r` or half of `d`
    fn radius(&self, statement: &Statement, r: &str, d: &str) -> Result<Option<f64>> {
        match self.named(statement, r)? {
            Some(value) => Ok(Some(value)),
            None => Ok(self.named(statement, d)?.map(|d| d / 2.0)),
        }
    }

    fn cube(&self, statement: &Statement) -> Result<Option<Converted>> {
        let size = match statement.params.get_or_positional("size", 0) {
            None => [1.0; 3],
            Some(Value::Number(s)) => [*s; 3],
            Some(value) => match value.as_numbers().as_deref() {
                Some([x, y, z]) => [*x, *y, *z],
                _ => return Err(self.error(Some(statement), "size must be a number or a 3-vector")),
            },
        };
        Ok(Converted::solid(
            Node::new("cuboid")
                .with_property("dx", size[0])
                .with_property("dy", size[1])
                .with_property("dz", size[2])
                .with_property("center", self.flag(statement, "center")),
        ))
    }

    fn sphere(&self, statement: &Statement) -> Result<Option<Converted>> {
        let r = match self.radius(statement, "r", "d")? {
            Some(r) => r,
            None => self.number(statement, "r", 0)?.unwrap_or(1.0),
        };
        Ok(Converted::solid(Node::new("sphere").with_property("r", r)))
    }

    fn cylinder(&self, statement: &Statement) -> Result<Option<Converted>> {
        let h = self.number(statement, "h", 0)?.unwrap_or(1.0);
        let r = self.radius(statement, "r", "d")?.unwrap_or(1.0);
        let r1 = self.radius(statement, "r1", "d1")?.unwrap_or(r);
        let r2 = self.radius(statement, "r2", "d2")?.unwrap_or(r);
        let center = self.flag(statement, "center");

        let node = if r1 == r2 {
            Node::new("cylinder").with_property("r", r1)
        } else {
            Node::new("cone").with_property("r1", r1).with_property("r2", r2)
        };
        Ok(Converted::solid(
            node.with_property("h", h).with_property("center", center),
        ))
    }

    fn polyhedron(&self, statement: &Statement) -> Result<Option<Converted>> {
        let points = statement
            .params
            .get_or_positional("points", 0)
            .and_then(Value::as_rows)
            .filter(|rows| rows.iter().all(|p| p.len() == 3))
            .ok_or_else(|| self.error(Some(statement), "points must be a list of 3-vectors"))?;
        let faces = statement
            .params
            .get("faces")
            .or_else(|| statement.params.get("triangles"))
            .or_else(|| statement.params.positional.get(1))
            .and_then(Value::as_index_rows)
            .ok_or_else(|| self.error(Some(statement), "faces must be a list of index lists"))?;

        let mut vertices = Node::new("vertices");
        vertices.children = points
            .iter()
            .map(|p| {
                Node::new("vertex")
                    .with_property("x", p[0])
                    .with_property("y", p[1])
                    .with_property("z", p[2])
            })
            .collect();

        let mut face_list = Node::new("faces");
        for face in faces {
            if let Some(bad) = face.iter().find(|&&i| i >= points.len()) {
                return Err(self.error(Some(statement), format!("face index {bad} out of range")));
            }
            let mut node = Node::new("face");
            // clockwise seen from outside, xcsg expects counter-clockwise
            node.children = face
                .iter()
                .rev()
                .map(|index| Node::new("fv").with_property("index", index))
                .collect();
            face_list.children.push(node);
        }

        Ok(Converted::solid(
            Node::new("polyhedron").with_child(vertices).with_child(face_list),
        ))
    }

    fn circle(&self, statement: &Statement) -> Result<Option<Converted>> {
        let r = match self.radius(statement, "r", "d")? {
            Some(r) => r,
            None => self.number(statement, "r", 0)?.unwrap_or(1.0),
        };
        Ok(Converted::shape(Node::new("circle").with_property("r", r)))
    }

    fn square(&self, statement: &Statement) -> Result<Option<Converted>> {
        let size = match statement.params.get_or_positional("size", 0) {
            None => [1.0; 2],
            Some(Value::Number(s)) => [*s; 2],
            Some(value) => match value.as_numbers().as_deref() {
                Some([x, y]) => [*x, *y],
                _ => return Err(self.error(Some(statement), "size must be a number or a 2-vector")),
            },
        };
        Ok(Converted::shape(
            Node::new("rectangle")
                .with_property("dx", size[0])
                .with_property("dy", size[1])
                .with_property("center", self.flag(statement, "center")),
        ))
    }

    fn polygon(&self, statement: &Statement) -> Result<Option<Converted>> {
        let points = statement
            .params
            .get_or_positional("points", 0)
            .and_then(Value::as_rows)
            .filter(|rows| rows.iter().all(|p| p.len() >= 2))
            .ok_or_else(|| self.error(Some(statement), "points must be a list of 2-vectors"))?;

        let paths = match statement.params.get_or_positional("paths", 1) {
            None | Some(Value::Undef) => vec![(0..points.len()).collect()],
            Some(value) => value
                .as_index_rows()
                .ok_or_else(|| self.error(Some(statement), "paths must be a list of index lists"))?,
        };

        let mut rings = Vec::with_capacity(paths.len());
        for path in paths {
            let mut vertices = Node::new("vertices");
            for index in path {
                let p = points.get(index).ok_or_else(|| {
                    self.error(Some(statement), format!("path index {index} out of range"))
                })?;
                vertices
                    .children
                    .push(Node::new("vertex").with_property("x", p[0]).with_property("y", p[1]));
            }
            rings.push(Node::new("polygon").with_child(vertices));
        }

        // first path is the outline, the others are holes
        let node = if rings.len() == 1 {
            rings.remove(0)
        } else {
            let mut difference = Node::new("difference2d");
            difference.children = rings;
            difference
        };
        Ok(Converted::shape(node))
    }

    /// The 2D profile below an extrusion
    fn profile(&self, statement: &Statement) -> Result<Option<Node>> {
        match self.combine(statement, "union")? {
            None => Ok(None),
            Some(Converted { dim: Dim::Three, .. }) => {
                Err(self.error(Some(statement), "expects 2D children"))
            }
            Some(Converted { node, .. }) => Ok(Some(node)),
        }
    }

    fn linear_extrude(&self, statement: &Statement) -> Result<Option<Converted>> {
        let height = self.number(statement, "height", 0)?.unwrap_or(100.0);
        if self.named(statement, "twist")?.is_some_and(|t| t != 0.0) {
            return Err(self.error(Some(statement), "twisted extrusion is not supported"));
        }
        let unit_scale = match statement.params.get("scale") {
            None | Some(Value::Undef) => true,
            Some(Value::Number(s)) => *s == 1.0,
            Some(value) => value
                .as_numbers()
                .is_some_and(|s| s.iter().all(|&v| v == 1.0)),
        };
        if !unit_scale {
            return Err(self.error(Some(statement), "scaled extrusion is not supported"));
        }

        let Some(profile) = self.profile(statement)? else {
            return Ok(None);
        };
        let mut node = Node::new("linear_extrude")
            .with_property("dz", height)
            .with_child(profile);
        if self.flag(statement, "center") {
            let mut shift = Matrix4::identity();
            shift[(2, 3)] = -height / 2.0;
            apply_matrix(&mut node, &shift)?;
        }
        Ok(Converted::solid(node))
    }

    fn rotate_extrude(&self, statement: &Statement) -> Result<Option<Converted>> {
        let degrees = self.named(statement, "angle")?.unwrap_or(360.0);
        let Some(profile) = self.profile(statement)? else {
            return Ok(None);
        };
        Ok(Converted::solid(
            Node::new("rotate_extrude")
                .with_property("angle", degrees.to_radians())
                .with_child(profile),
        ))
    }
}

/// Prepend `matrix` to whatever transform the node already carries
fn apply_matrix(node: &mut Node, matrix: &Matrix4<f64>) -> Result<()> {
    let composed = match read_transform(node)? {
        Some(existing) => matrix * existing,
        None => *matrix,
    };

    let mut tmatrix = Node::new("tmatrix");
    for r in 0..4 {
        let mut row = Node::new("trow");
        for c in 0..4 {
            row.set_property(&format!("c{c}"), composed[(r, c)]);
        }
        tmatrix.children.push(row);
    }
    node.children.retain(|child| child.tag != "tmatrix");
    node.children.insert(0, tmatrix);
    Ok(())
}
