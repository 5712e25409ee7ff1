// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! 2D boolean tree

use super::BooleanOp;
use crate::geometry::{fuse_profiles, transform_profile, SecantTolerance, Shape2dPrimitive};
use geo::{BooleanOps, MultiPolygon};
use nalgebra::Matrix4;

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    Primitive(Shape2dPrimitive),
    Boolean { op: BooleanOp, children: Vec<Shape2d> },
}

/// Node of a resolved 2D tree with its optional placement
#[derive(Debug, Clone, PartialEq)]
pub struct Shape2d {
    pub kind: ShapeKind,
    pub transform: Option<Matrix4<f64>>,
}

impl Shape2d {
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            transform: None,
        }
    }

    pub fn with_transform(mut self, transform: Option<Matrix4<f64>>) -> Self {
        self.transform = transform;
        self
    }

    pub fn nbool(&self) -> usize {
        match &self.kind {
            ShapeKind::Primitive(_) => 0,
            ShapeKind::Boolean { children, .. } => {
                1 + children.iter().map(Shape2d::nbool).sum::<usize>()
            }
        }
    }

    /// Produce the parts of this subtree; unions keep their parts side by side
    pub fn materialize(&self, tolerance: &SecantTolerance) -> Vec<MultiPolygon<f64>> {
        let parts = match &self.kind {
            ShapeKind::Primitive(primitive) => vec![primitive.to_multi_polygon(tolerance)],
            ShapeKind::Boolean {
                op: BooleanOp::Union,
                children,
            } => children
                .iter()
                .flat_map(|child| child.materialize(tolerance))
                .collect(),
            ShapeKind::Boolean { op, children } => {
                let mut operands = children
                    .iter()
                    .map(|child| fuse_profiles(child.materialize(tolerance)));
                let Some(first) = operands.next() else {
                    return Vec::new();
                };
                let region = operands.fold(first, |acc, operand| match op {
                    BooleanOp::Difference => acc.difference(&operand),
                    _ => acc.intersection(&operand),
                });
                vec![region]
            }
        };

        match &self.transform {
            Some(matrix) => parts
                .iter()
                .map(|part| transform_profile(part, matrix))
                .collect(),
            None => parts,
        }
    }
}
