// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

use crate::document::Node;
use crate::error::{Result, XcsgError};
use nalgebra::Matrix4;

/// Read the optional `<tmatrix>` child: four `<trow c0 c1 c2 c3/>` rows, row-major
pub fn read_transform(node: &Node) -> Result<Option<Matrix4<f64>>> {
    let Some(tmatrix) = node.child("tmatrix") else {
        return Ok(None);
    };
    let rows: Vec<&Node> = tmatrix.children.iter().filter(|c| c.tag == "trow").collect();
    if rows.len() != 4 {
        return Err(XcsgError::invalid_property(
            &node.tag,
            "tmatrix",
            format!("expected 4 rows, found {}", rows.len()),
        ));
    }

    let mut matrix = Matrix4::identity();
    for (r, row) in rows.iter().enumerate() {
        for c in 0..4 {
            matrix[(r, c)] = row.number(&format!("c{c}"))?;
        }
    }
    Ok(Some(matrix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trow(values: [f64; 4]) -> Node {
        values
            .iter()
            .enumerate()
            .fold(Node::new("trow"), |row, (c, v)| row.with_property(&format!("c{c}"), v))
    }

    #[test]
    fn test_translation_matrix() {
        let node = Node::new("cube").with_child(
            Node::new("tmatrix")
                .with_child(trow([1.0, 0.0, 0.0, 5.0]))
                .with_child(trow([0.0, 1.0, 0.0, 0.0]))
                .with_child(trow([0.0, 0.0, 1.0, -2.0]))
                .with_child(trow([0.0, 0.0, 0.0, 1.0])),
        );
        let m = read_transform(&node).unwrap().unwrap();
        assert_eq!(m[(0, 3)], 5.0);
        assert_eq!(m[(2, 3)], -2.0);
    }

    #[test]
    fn test_missing_and_short_matrices() {
        assert!(read_transform(&Node::new("cube")).unwrap().is_none());

        let short = Node::new("cube").with_child(Node::new("tmatrix").with_child(trow([1.0; 4])));
        assert!(matches!(
            read_transform(&short),
            Err(XcsgError::InvalidProperty { .. })
        ));
    }
}
