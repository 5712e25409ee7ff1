// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! XML reader and writer for xcsg documents

use super::{Document, Node};
use crate::error::{Result, XcsgError};
use anyhow::Context;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::Cursor;
use std::path::Path;

/// File contents as text; undecodable bytes are a parse error, not an I/O error
pub(super) fn read_utf8(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    String::from_utf8(bytes).map_err(|e| XcsgError::parse(path, format!("not valid UTF-8: {e}")))
}

impl Document {
    /// Read and parse an xcsg file. The root tag is not validated here.
    pub fn read(path: &Path) -> Result<Self> {
        let text = read_utf8(path)?;
        Self::from_xml_str(&text, path)
    }

    /// Parse XML text; `origin` is only used in error messages
    pub fn from_xml_str(text: &str, origin: &Path) -> Result<Self> {
        parse_tree(text)
            .map(Document::new)
            .map_err(|message| XcsgError::parse(origin, message))
    }

    /// Serialize to indented XML text
    pub fn to_xml_string(&self) -> anyhow::Result<String> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 3);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        write_node(&mut writer, self.root())?;

        let mut bytes = writer.into_inner().into_inner();
        bytes.push(b'\n');
        Ok(String::from_utf8(bytes)?)
    }

    /// Write the document to a file
    pub fn write(&self, path: &Path) -> anyhow::Result<()> {
        let text = self.to_xml_string()?;
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write xcsg file: {}", path.display()))
    }
}

fn parse_tree(text: &str) -> std::result::Result<Node, String> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => stack.push(start_node(&start)?),
            Ok(Event::Empty(start)) => {
                let node = start_node(&start)?;
                attach(node, &mut stack, &mut root)?;
            }
            Ok(Event::End(_)) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| "unexpected closing tag".to_string())?;
                attach(node, &mut stack, &mut root)?;
            }
            Ok(Event::Eof) => break,
            // declarations, comments, text and processing instructions carry no tree data
            Ok(_) => {}
            Err(e) => {
                return Err(format!("{} at byte {}", e, reader.error_position()));
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(format!("unclosed element <{}>", open.tag));
    }
    root.ok_or_else(|| "document has no root element".to_string())
}

fn start_node(start: &BytesStart) -> std::result::Result<Node, String> {
    let mut node = Node::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(|e| e.to_string())?;
        node.properties.push((key, value.into_owned()));
    }
    Ok(node)
}

fn attach(
    node: Node,
    stack: &mut [Node],
    root: &mut Option<Node>,
) -> std::result::Result<(), String> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(node);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(node);
            Ok(())
        }
        None => Err(format!("second root element <{}>", node.tag)),
    }
}

fn write_node(writer: &mut Writer<Cursor<Vec<u8>>>, node: &Node) -> anyhow::Result<()> {
    let mut start = BytesStart::new(node.tag.as_str());
    for (key, value) in &node.properties {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if node.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
    } else {
        writer.write_event(Event::Start(start))?;
        for child in &node.children {
            write_node(writer, child)?;
        }
        writer.write_event(Event::End(BytesEnd::new(node.tag.as_str())))?;
    }
    Ok(())
}
