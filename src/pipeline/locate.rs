// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

use crate::document::{Document, Node};
use crate::model::TypeRegistry;

/// Top-level geometry node of a document
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Located<'a> {
    Solid(&'a Node),
    Shape(&'a Node),
}

impl<'a> Located<'a> {
    pub fn node(&self) -> &'a Node {
        match self {
            Located::Solid(node) | Located::Shape(node) => node,
        }
    }
}

/// First direct child of the root that is a solid or a 2D shape.
///
/// Attribute nodes and unregistered tags are skipped; later siblings are never
/// looked at once a match is found.
pub fn locate<'a>(document: &'a Document, registry: &TypeRegistry) -> Option<Located<'a>> {
    document
        .root()
        .geometry_children()
        .find_map(|child| {
            if registry.is_solid(child) {
                Some(Located::Solid(child))
            } else if registry.is_shape2d(child) {
                Some(Located::Shape(child))
            } else {
                None
            }
        })
}
