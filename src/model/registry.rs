// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Tag to builder dispatch

use super::builders;
use super::object::{ShapeObject, SolidObject};
use super::{read_transform, Shape2d, Solid};
use crate::document::Node;
use crate::error::{Result, XcsgError};
use crate::geometry::SecantTolerance;
use std::collections::HashMap;

/// Builds a 3D tree node; the node's `<tmatrix>` is applied by the registry
pub type SolidBuilder = fn(&Node, &TypeRegistry) -> Result<Solid>;

/// Builds a 2D tree node; the node's `<tmatrix>` is applied by the registry
pub type ShapeBuilder = fn(&Node, &TypeRegistry) -> Result<Shape2d>;

/// Registry of solid and shape builders keyed by tag
#[derive(Clone)]
pub struct TypeRegistry {
    solids: HashMap<String, SolidBuilder>,
    shapes: HashMap<String, ShapeBuilder>,
}

impl TypeRegistry {
    /// Registry with every built-in xcsg tag
    pub fn new() -> Self {
        let mut registry = Self::empty();
        builders::register_defaults(&mut registry);
        registry
    }

    pub fn empty() -> Self {
        Self {
            solids: HashMap::new(),
            shapes: HashMap::new(),
        }
    }

    pub fn register_solid(&mut self, tag: &str, builder: SolidBuilder) {
        self.solids.insert(tag.to_string(), builder);
    }

    pub fn register_shape(&mut self, tag: &str, builder: ShapeBuilder) {
        self.shapes.insert(tag.to_string(), builder);
    }

    pub fn is_solid(&self, node: &Node) -> bool {
        self.solids.contains_key(&node.tag)
    }

    pub fn is_shape2d(&self, node: &Node) -> bool {
        self.shapes.contains_key(&node.tag)
    }

    /// Resolve a 3D subtree
    pub fn build_solid(&self, node: &Node) -> Result<Solid> {
        let builder = self
            .solids
            .get(&node.tag)
            .ok_or_else(|| XcsgError::UnknownTag(node.tag.clone()))?;
        Ok(builder(node, self)?.with_transform(read_transform(node)?))
    }

    /// Resolve a 2D subtree
    pub fn build_shape(&self, node: &Node) -> Result<Shape2d> {
        let builder = self
            .shapes
            .get(&node.tag)
            .ok_or_else(|| XcsgError::UnknownTag(node.tag.clone()))?;
        Ok(builder(node, self)?.with_transform(read_transform(node)?))
    }

    pub fn make_solid(&self, node: &Node, tolerance: SecantTolerance) -> Result<SolidObject> {
        Ok(SolidObject::new(self.build_solid(node)?, tolerance))
    }

    pub fn make_shape2d(&self, node: &Node, tolerance: SecantTolerance) -> Result<ShapeObject> {
        Ok(ShapeObject::new(self.build_shape(node)?, tolerance))
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut solids: Vec<_> = self.solids.keys().collect();
        let mut shapes: Vec<_> = self.shapes.keys().collect();
        solids.sort();
        shapes.sort();
        f.debug_struct("TypeRegistry")
            .field("solids", &solids)
            .field("shapes", &shapes)
            .finish()
    }
}
