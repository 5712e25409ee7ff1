// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

use super::{Shape2d, Solid};
use crate::geometry::{KernelError, Polyhedron, Profile, SecantTolerance};

/// Materialized 3D input for the boolean engine: one or more bodies that may overlap
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsgMesh {
    pub bodies: Vec<Polyhedron>,
}

impl CsgMesh {
    pub fn new(bodies: Vec<Polyhedron>) -> Self {
        Self { bodies }
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn face_count(&self) -> usize {
        self.bodies.iter().map(Polyhedron::face_count).sum()
    }

    pub fn into_bodies(self) -> Vec<Polyhedron> {
        self.bodies
    }
}

/// A resolved 3D tree together with the tolerance used to tessellate it
#[derive(Debug, Clone, PartialEq)]
pub struct SolidObject {
    solid: Solid,
    tolerance: SecantTolerance,
}

impl SolidObject {
    pub fn new(solid: Solid, tolerance: SecantTolerance) -> Self {
        Self { solid, tolerance }
    }

    pub fn solid(&self) -> &Solid {
        &self.solid
    }

    pub fn tolerance(&self) -> SecantTolerance {
        self.tolerance
    }

    /// Number of boolean nodes in the tree
    pub fn nbool(&self) -> usize {
        self.solid.nbool()
    }

    /// Materialize the tree into bodies for the terminal union
    pub fn create_mesh(&self) -> Result<CsgMesh, KernelError> {
        Ok(CsgMesh::new(self.solid.materialize(&self.tolerance)?))
    }
}

/// A resolved 2D tree together with the tolerance used to tessellate it
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeObject {
    shape: Shape2d,
    tolerance: SecantTolerance,
}

impl ShapeObject {
    pub fn new(shape: Shape2d, tolerance: SecantTolerance) -> Self {
        Self { shape, tolerance }
    }

    pub fn shape(&self) -> &Shape2d {
        &self.shape
    }

    pub fn nbool(&self) -> usize {
        self.shape.nbool()
    }

    /// Materialize the tree into profile parts for the terminal union
    pub fn create_profile(&self) -> Profile {
        Profile::new(self.shape.materialize(&self.tolerance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Node;
    use crate::model::TypeRegistry;

    #[test]
    fn test_solid_object_materializes_bodies() {
        let registry = TypeRegistry::new();
        let node = Node::new("union3d")
            .with_child(Node::new("cube").with_property("size", 1))
            .with_child(Node::new("sphere").with_property("r", 1));
        let object = registry.make_solid(&node, SecantTolerance::default()).unwrap();
        assert_eq!(object.nbool(), 1);

        let mesh = object.create_mesh().unwrap();
        assert_eq!(mesh.body_count(), 2);
        assert!(mesh.face_count() > 6);
    }

    #[test]
    fn test_shape_object_profile_parts() {
        let registry = TypeRegistry::new();
        let node = Node::new("circle").with_property("r", 2);
        let object = registry.make_shape2d(&node, SecantTolerance::default()).unwrap();
        assert_eq!(object.nbool(), 0);
        let profile = object.create_profile();
        assert_eq!(profile.parts.len(), 1);
        assert!(!profile.is_empty());
    }
}
