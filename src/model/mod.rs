// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Boolean tree model built from document nodes
//!
//! The [`TypeRegistry`] maps tags to builder functions producing [`Solid`] and
//! [`Shape2d`] trees. Wrapped with a [`SecantTolerance`](crate::geometry::SecantTolerance)
//! they become [`SolidObject`] and [`ShapeObject`], which count their boolean
//! nodes and materialize geometry on demand.

mod builders;
mod object;
mod registry;
mod shape;
mod solid;
mod transform;

pub use object::{CsgMesh, ShapeObject, SolidObject};
pub use registry::{ShapeBuilder, SolidBuilder, TypeRegistry};
pub use shape::{Shape2d, ShapeKind};
pub use solid::{Solid, SolidKind};
pub use transform::read_transform;

/// Boolean set operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BooleanOp {
    Union,
    Difference,
    Intersection,
}

impl BooleanOp {
    /// Operation encoded in a tag such as `difference3d`
    pub fn from_tag(tag: &str) -> Option<Self> {
        let stem = tag.strip_suffix("3d").or_else(|| tag.strip_suffix("2d"))?;
        match stem {
            "union" => Some(Self::Union),
            "difference" => Some(Self::Difference),
            "intersection" => Some(Self::Intersection),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Union => "union",
            Self::Difference => "difference",
            Self::Intersection => "intersection",
        }
    }
}

impl std::fmt::Display for BooleanOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name().to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_op_from_tag() {
        assert_eq!(BooleanOp::from_tag("union3d"), Some(BooleanOp::Union));
        assert_eq!(BooleanOp::from_tag("difference2d"), Some(BooleanOp::Difference));
        assert_eq!(BooleanOp::from_tag("intersection3d"), Some(BooleanOp::Intersection));
        assert_eq!(BooleanOp::from_tag("union"), None);
        assert_eq!(BooleanOp::from_tag("hull3d"), None);
        assert_eq!(BooleanOp::Union.to_string(), "UNION");
    }
}
