// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Declarative xcsg document model
//!
//! A [`Document`] is an ordered tree of [`Node`]s read from an XML file whose
//! root element is `<xcsg>`. Properties are kept as text in document order and
//! parsed on access, so a document can be re-serialized without loss.

mod loader;
mod xml;

pub use loader::{legacy_target, load, prepare_input, LEGACY_EXTENSION, XCSG_EXTENSION};

use crate::error::{Result, XcsgError};
use crate::geometry::SecantTolerance;
use std::str::FromStr;

/// Required tag of the document root.
pub const ROOT_TAG: &str = "xcsg";

/// Tags that carry data for their parent rather than geometry.
const ATTRIBUTE_TAGS: &[&str] = &[
    "tmatrix", "trow", "vertices", "vertex", "faces", "face", "fv", "color", "comment",
];

/// One element of the document tree
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub tag: String,
    pub properties: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style property setter
    pub fn with_property(mut self, name: &str, value: impl ToString) -> Self {
        self.set_property(name, value);
        self
    }

    /// Builder-style child append
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Set or replace a property, keeping the original position on replace
    pub fn set_property(&mut self, name: &str, value: impl ToString) {
        let value = value.to_string();
        match self.properties.iter_mut().find(|(key, _)| key == name) {
            Some(slot) => slot.1 = value,
            None => self.properties.push((name.to_string(), value)),
        }
    }

    /// Raw text of a property
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Parse an optional property
    pub fn get<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.property(name) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|e| XcsgError::invalid_property(&self.tag, name, format!("'{raw}': {e}"))),
        }
    }

    /// Required finite number
    pub fn number(&self, name: &str) -> Result<f64> {
        match self.get::<f64>(name)? {
            Some(value) => self.check_finite(name, value),
            None => Err(XcsgError::invalid_property(&self.tag, name, "missing")),
        }
    }

    /// Optional finite number with a default
    pub fn number_or(&self, name: &str, default: f64) -> Result<f64> {
        match self.get::<f64>(name)? {
            Some(value) => self.check_finite(name, value),
            None => Ok(default),
        }
    }

    /// Optional boolean flag; accepts `true`/`false` and `1`/`0`
    pub fn flag_or(&self, name: &str, default: bool) -> Result<bool> {
        match self.property(name).map(str::trim) {
            None => Ok(default),
            Some("true") | Some("1") => Ok(true),
            Some("false") | Some("0") => Ok(false),
            Some(other) => Err(XcsgError::invalid_property(
                &self.tag,
                name,
                format!("'{other}' is not a boolean"),
            )),
        }
    }

    fn check_finite(&self, name: &str, value: f64) -> Result<f64> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(XcsgError::invalid_property(&self.tag, name, "not a finite number"))
        }
    }

    /// True for metadata elements such as `<tmatrix>` or `<vertices>`
    pub fn is_attribute_node(&self) -> bool {
        ATTRIBUTE_TAGS.contains(&self.tag.as_str())
    }

    /// First direct child with the given tag
    pub fn child(&self, tag: &str) -> Option<&Node> {
        self.children.iter().find(|child| child.tag == tag)
    }

    /// Direct children that may describe geometry
    pub fn geometry_children(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().filter(|child| !child.is_attribute_node())
    }
}

/// A parsed xcsg document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Node,
}

impl Document {
    /// Wrap a root node; the tag is not checked here, see [`Document::validate_root`]
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn into_root(self) -> Node {
        self.root
    }

    /// Check that the root element is `<xcsg>`
    pub fn validate_root(&self, path: &std::path::Path) -> Result<()> {
        if self.root.tag == ROOT_TAG {
            Ok(())
        } else {
            Err(XcsgError::parse(
                path,
                format!("root element is <{}>, expected <{ROOT_TAG}>", self.root.tag),
            ))
        }
    }

    /// Tessellation accuracy declared on the root, or the default
    pub fn secant_tolerance(&self) -> Result<SecantTolerance> {
        let value = self
            .root
            .number_or("secant_tolerance", SecantTolerance::DEFAULT)?;
        SecantTolerance::new(value).ok_or_else(|| {
            XcsgError::invalid_property(ROOT_TAG, "secant_tolerance", "must be positive")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_access() {
        let node = Node::new("cylinder")
            .with_property("r", 5)
            .with_property("h", "10.5")
            .with_property("center", "true");

        assert_eq!(node.number("r").unwrap(), 5.0);
        assert_eq!(node.number_or("h", 1.0).unwrap(), 10.5);
        assert_eq!(node.number_or("missing", 2.0).unwrap(), 2.0);
        assert!(node.flag_or("center", false).unwrap());
        assert!(!node.flag_or("other", false).unwrap());
    }

    #[test]
    fn test_invalid_property() {
        let node = Node::new("sphere").with_property("r", "abc");
        let err = node.number("r").unwrap_err();
        assert!(matches!(err, XcsgError::InvalidProperty { ref name, .. } if name == "r"));

        let node = Node::new("sphere");
        assert!(node.number("r").is_err());

        let node = Node::new("sphere").with_property("r", "inf");
        assert!(node.number("r").is_err());
    }

    #[test]
    fn test_set_property_replaces_in_place() {
        let mut node = Node::new("cube").with_property("size", 1).with_property("center", false);
        node.set_property("size", 2);
        assert_eq!(node.properties[0], ("size".to_string(), "2".to_string()));
        assert_eq!(node.properties.len(), 2);
    }

    #[test]
    fn test_attribute_nodes() {
        assert!(Node::new("tmatrix").is_attribute_node());
        assert!(Node::new("vertices").is_attribute_node());
        assert!(!Node::new("cube").is_attribute_node());

        let node = Node::new("union3d")
            .with_child(Node::new("tmatrix"))
            .with_child(Node::new("cube"));
        let tags: Vec<_> = node.geometry_children().map(|c| c.tag.as_str()).collect();
        assert_eq!(tags, vec!["cube"]);
    }

    #[test]
    fn test_secant_tolerance_default_and_validation() {
        let doc = Document::new(Node::new(ROOT_TAG));
        assert_eq!(doc.secant_tolerance().unwrap().value(), SecantTolerance::DEFAULT);

        let doc = Document::new(Node::new(ROOT_TAG).with_property("secant_tolerance", 0.5));
        assert_eq!(doc.secant_tolerance().unwrap().value(), 0.5);

        let doc = Document::new(Node::new(ROOT_TAG).with_property("secant_tolerance", -1));
        assert!(doc.secant_tolerance().is_err());
    }
}
