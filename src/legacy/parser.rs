// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Syntax tree for OpenSCAD CSG scripts

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "legacy/csg.pest"]
struct CsgParser;

/// Argument value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Boolean(bool),
    String(String),
    Vector(Vec<Value>),
    Undef,
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            Value::Number(n) => Some(*n != 0.0),
            _ => None,
        }
    }

    /// Flat list of numbers, `None` if any element is not a number
    pub fn as_numbers(&self) -> Option<Vec<f64>> {
        match self {
            Value::Vector(items) => items.iter().map(Value::as_number).collect(),
            _ => None,
        }
    }

    /// List of number lists, e.g. points or a matrix
    pub fn as_rows(&self) -> Option<Vec<Vec<f64>>> {
        match self {
            Value::Vector(items) => items.iter().map(Value::as_numbers).collect(),
            _ => None,
        }
    }

    /// List of index lists, e.g. faces or paths
    pub fn as_index_rows(&self) -> Option<Vec<Vec<usize>>> {
        self.as_rows()?
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|v| (v >= 0.0 && v.fract() == 0.0).then_some(v as usize))
                    .collect()
            })
            .collect()
    }
}

/// Statement prefix character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    /// `%` background
    Background,
    /// `*` disable
    Disable,
    /// `#` highlight
    Highlight,
    /// `!` root
    Root,
}

impl Modifier {
    /// Background and disabled subtrees take no part in the result
    pub fn drops_subtree(self) -> bool {
        matches!(self, Modifier::Background | Modifier::Disable)
    }
}

/// Call arguments, named and positional
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    pub named: Vec<(String, Value)>,
    pub positional: Vec<Value>,
}

impl Params {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.named
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Named argument, else the positional one at `index`
    pub fn get_or_positional(&self, name: &str, index: usize) -> Option<&Value> {
        self.get(name).or_else(|| self.positional.get(index))
    }
}

/// One module instantiation with its children
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub module: String,
    pub modifier: Option<Modifier>,
    pub params: Params,
    pub children: Vec<Statement>,
    pub line: usize,
}

/// Parse a script into its top-level statements
pub fn parse_script(source: &str) -> Result<Vec<Statement>, String> {
    let mut pairs = CsgParser::parse(Rule::program, source).map_err(|e| e.to_string())?;

    let mut statements = Vec::new();
    if let Some(program) = pairs.next() {
        for pair in program.into_inner() {
            if pair.as_rule() == Rule::statement {
                statements.push(parse_statement(pair)?);
            }
        }
    }
    Ok(statements)
}

fn parse_statement(pair: Pair<Rule>) -> Result<Statement, String> {
    let line = pair.as_span().start_pos().line_col().0;
    let mut modifier = None;
    let mut module = String::new();
    let mut params = Params::default();
    let mut children = Vec::new();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::modifier => {
                modifier = Some(match inner.as_str() {
                    "%" => Modifier::Background,
                    "*" => Modifier::Disable,
                    "#" => Modifier::Highlight,
                    _ => Modifier::Root,
                });
            }
            Rule::ident => module = inner.as_str().to_string(),
            Rule::arg_list => params = parse_params(inner)?,
            Rule::body => {
                for child in inner.into_inner() {
                    children.push(parse_statement(child)?);
                }
            }
            _ => {}
        }
    }

    Ok(Statement {
        module,
        modifier,
        params,
        children,
        line,
    })
}

fn parse_params(pair: Pair<Rule>) -> Result<Params, String> {
    let mut params = Params::default();
    for argument in pair.into_inner() {
        let mut inner = argument.into_inner();
        let Some(first) = inner.next() else {
            continue;
        };
        if first.as_rule() == Rule::name {
            let name = first.as_str().to_string();
            let value = inner
                .next()
                .ok_or_else(|| format!("argument '{name}' has no value"))?;
            params.named.push((name, parse_value(value)?));
        } else {
            params.positional.push(parse_value(first)?);
        }
    }
    Ok(params)
}

fn parse_value(pair: Pair<Rule>) -> Result<Value, String> {
    let inner = match pair.as_rule() {
        Rule::value => pair
            .into_inner()
            .next()
            .ok_or_else(|| "empty value".to_string())?,
        _ => pair,
    };

    match inner.as_rule() {
        Rule::number => inner
            .as_str()
            .parse::<f64>()
            .map(Value::Number)
            .map_err(|e| format!("invalid number '{}': {e}", inner.as_str())),
        Rule::boolean => Ok(Value::Boolean(inner.as_str() == "true")),
        Rule::undef => Ok(Value::Undef),
        Rule::string => {
            let text = inner
                .into_inner()
                .next()
                .map(|chars| chars.as_str().to_string())
                .unwrap_or_default();
            Ok(Value::String(text))
        }
        Rule::vector => inner
            .into_inner()
            .map(parse_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Vector),
        other => Err(format!("unexpected {other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_groups() {
        let script = r#"
            group() {
                multmatrix([[1, 0, 0, 10], [0, 1, 0, 0], [0, 0, 1, 0], [0, 0, 0, 1]]) {
                    cube(size = [1, 2, 3], center = false);
                }
                sphere($fn = 0, $fa = 12, $fs = 2, r = 5);
            }
        "#;
        let statements = parse_script(script).unwrap();
        assert_eq!(statements.len(), 1);

        let group = &statements[0];
        assert_eq!(group.module, "group");
        assert_eq!(group.line, 2);
        assert_eq!(group.children.len(), 2);

        let cube = &group.children[0].children[0];
        assert_eq!(cube.module, "cube");
        assert_eq!(cube.params.get("size").unwrap().as_numbers(), Some(vec![1.0, 2.0, 3.0]));
        assert_eq!(cube.params.get("center"), Some(&Value::Boolean(false)));

        let sphere = &group.children[1];
        assert_eq!(sphere.params.get("$fn"), Some(&Value::Number(0.0)));
        assert_eq!(sphere.params.get("r").and_then(Value::as_number), Some(5.0));
    }

    #[test]
    fn test_modifiers_and_values() {
        let statements = parse_script(
            r#"%cube(1); #color("red") sphere(r = 1e-1); polygon(points = [[0, 0], [1, 0], [0, 1]], paths = undef);"#,
        )
        .unwrap();
        assert_eq!(statements.len(), 3);
        assert_eq!(statements[0].modifier, Some(Modifier::Background));
        assert_eq!(statements[0].params.positional, vec![Value::Number(1.0)]);

        assert_eq!(statements[1].modifier, Some(Modifier::Highlight));
        assert_eq!(statements[1].params.positional, vec![Value::String("red".into())]);
        assert_eq!(statements[1].children[0].params.get("r"), Some(&Value::Number(0.1)));

        assert_eq!(statements[2].params.get("paths"), Some(&Value::Undef));
        assert_eq!(
            statements[2].params.get("points").unwrap().as_rows().unwrap().len(),
            3
        );
    }

    #[test]
    fn test_syntax_error() {
        assert!(parse_script("cube(size = [1, 2, 3]").is_err());
        assert!(parse_script("cube(size = );").is_err());
    }
}
