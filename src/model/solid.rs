// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! 3D boolean tree

use super::{BooleanOp, Shape2d};
use crate::geometry::{
    fuse_profiles, linear_extrude, rotate_extrude, Csg, KernelError, Polyhedron, Primitive,
    SecantTolerance,
};
use nalgebra::Matrix4;

#[derive(Debug, Clone, PartialEq)]
pub enum SolidKind {
    Primitive(Primitive),
    Polyhedron(Polyhedron),
    LinearExtrude { profile: Box<Shape2d>, height: f64 },
    RotateExtrude { profile: Box<Shape2d>, angle: f64 },
    Boolean { op: BooleanOp, children: Vec<Solid> },
}

/// Node of a resolved 3D tree with its optional placement
#[derive(Debug, Clone, PartialEq)]
pub struct Solid {
    pub kind: SolidKind,
    pub transform: Option<Matrix4<f64>>,
}

impl Solid {
    pub fn new(kind: SolidKind) -> Self {
        Self {
            kind,
            transform: None,
        }
    }

    pub fn with_transform(mut self, transform: Option<Matrix4<f64>>) -> Self {
        self.transform = transform;
        self
    }

    /// Boolean nodes in this subtree, 2D booleans inside extrusions included
    pub fn nbool(&self) -> usize {
        match &self.kind {
            SolidKind::Primitive(_) | SolidKind::Polyhedron(_) => 0,
            SolidKind::LinearExtrude { profile, .. } | SolidKind::RotateExtrude { profile, .. } => {
                profile.nbool()
            }
            SolidKind::Boolean { children, .. } => {
                1 + children.iter().map(Solid::nbool).sum::<usize>()
            }
        }
    }

    /// Produce the bodies of this subtree.
    ///
    /// Unions keep their children's bodies side by side; differences and
    /// intersections are resolved here with the BSP kernel.
    pub fn materialize(&self, tolerance: &SecantTolerance) -> Result<Vec<Polyhedron>, KernelError> {
        let mut bodies = match &self.kind {
            SolidKind::Primitive(primitive) => vec![primitive.to_polyhedron(tolerance)],
            SolidKind::Polyhedron(polyhedron) => vec![polyhedron.clone()],
            SolidKind::LinearExtrude { profile, height } => {
                let region = fuse_profiles(profile.materialize(tolerance));
                vec![linear_extrude(&region, *height)]
            }
            SolidKind::RotateExtrude { profile, angle } => {
                let region = fuse_profiles(profile.materialize(tolerance));
                vec![rotate_extrude(&region, *angle, tolerance)]
            }
            SolidKind::Boolean {
                op: BooleanOp::Union,
                children,
            } => {
                let mut bodies = Vec::new();
                for child in children {
                    bodies.extend(child.materialize(tolerance)?);
                }
                bodies
            }
            SolidKind::Boolean { op, children } => {
                let mut operands = children.iter();
                let Some(first) = operands.next() else {
                    return Ok(Vec::new());
                };
                let mut acc = fuse(first.materialize(tolerance)?)?;
                for child in operands {
                    let operand = fuse(child.materialize(tolerance)?)?;
                    acc = match op {
                        BooleanOp::Difference => acc.difference(operand)?,
                        _ => acc.intersection(operand)?,
                    };
                }
                vec![acc.into_polyhedron()]
            }
        };

        if let Some(matrix) = &self.transform {
            for body in &mut bodies {
                body.transform(matrix);
            }
        }
        Ok(bodies)
    }
}

/// Union of all bodies as one BSP operand
fn fuse(bodies: Vec<Polyhedron>) -> Result<Csg, KernelError> {
    let mut bodies = bodies.iter();
    let Some(first) = bodies.next() else {
        return Csg::from_polyhedron(&Polyhedron::default());
    };
    let mut acc = Csg::from_polyhedron(first)?;
    for body in bodies {
        acc = acc.union(Csg::from_polyhedron(body)?)?;
    }
    Ok(acc)
}
