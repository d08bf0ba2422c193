//! Builds an equality filter tree directly from a nested value, bypassing
//! the text compiler entirely. Used for PATCH-style value matching, where a
//! client supplies a JSON fragment rather than a filter string.

use scimpath_lang::Expr;
use serde_json::Value;

use crate::error::Error;

/// Builds an equality filter tree matching `value`.
///
/// A JSON object is a mapping of (possibly nested) leaf paths to literals:
/// each leaf emits `path(k_dotted) eq "v"` (the literal is always rendered
/// quoted, regardless of the leaf's own JSON type), and multiple leaves
/// combine under a right-leaning `and` ladder. A JSON array is a list of
/// such mappings, each built the same way and combined under a
/// right-leaning `or` ladder. An array nested inside a mapping is rejected;
/// lists of lists have no defined filter form.
pub fn build_value_filter(value: &Value) -> Result<Expr, Error> {
    match value {
        Value::Object(_) => build_mapping_filter(value),
        Value::Array(items) => {
            let mut subtrees = Vec::with_capacity(items.len());
            for item in items {
                subtrees.push(build_mapping_filter(item)?);
            }
            or_ladder(subtrees).ok_or_else(|| Error::InvalidValue("empty value list has no filter form".into()))
        }
        _ => Err(Error::InvalidValue(
            "value filter requires a mapping or a list of mappings".into(),
        )),
    }
}

fn build_mapping_filter(value: &Value) -> Result<Expr, Error> {
    let mut leaves = Vec::new();
    collect_leaves(value, String::new(), &mut leaves)?;
    and_ladder(leaves).ok_or_else(|| Error::InvalidValue("mapping has no leaves to filter on".into()))
}

/// Flattens `value` into `(dotted_path, quoted_literal)` pairs. A `null`
/// leaf is skipped; it contributes no comparison rather than an
/// unsatisfiable one.
fn collect_leaves(value: &Value, prefix: String, out: &mut Vec<(String, String)>) -> Result<(), Error> {
    match value {
        Value::Object(map) => {
            for (key, inner) in map {
                let next_prefix = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                collect_leaves(inner, next_prefix, out)?;
            }
            Ok(())
        }
        Value::Array(_) => Err(Error::InvalidValue(format!(
            "value filter cannot embed an array at \"{prefix}\""
        ))),
        Value::Null => Ok(()),
        scalar => {
            out.push((prefix, quote(&scalar_to_string(scalar))));
            Ok(())
        }
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => {
            unreachable!("collect_leaves only forwards scalars here")
        }
    }
}

fn quote(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('"');
    for c in raw.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// A `next`-linked chain of path segments, one per dot-separated component,
/// the same shape the path compiler produces.
fn path_chain(dotted: &str) -> Expr {
    let mut segments: Vec<&str> = dotted.split('.').collect();
    let mut iter = segments.drain(..).rev();
    let mut acc = Expr::path(iter.next().expect("a dotted path has at least one segment"));
    for segment in iter {
        let mut node = Expr::path(segment);
        node.next = Some(Box::new(acc));
        acc = node;
    }
    acc
}

fn eq_node(dotted_path: &str, literal: &str) -> Expr {
    let mut op = Expr::operator("eq").expect("\"eq\" is a recognised relational keyword");
    op.left = Some(Box::new(path_chain(dotted_path)));
    op.right = Some(Box::new(Expr::literal(literal)));
    op
}

fn and_ladder(leaves: Vec<(String, String)>) -> Option<Expr> {
    let nodes = leaves
        .into_iter()
        .map(|(path, literal)| eq_node(&path, &literal))
        .collect();
    fold_right(nodes, "and")
}

fn or_ladder(subtrees: Vec<Expr>) -> Option<Expr> {
    fold_right(subtrees, "or")
}

/// Combines `nodes` right-leaning: `op(n0, op(n1, op(n2, n3)))`.
fn fold_right(nodes: Vec<Expr>, op_token: &str) -> Option<Expr> {
    let mut iter = nodes.into_iter().rev();
    let mut acc = iter.next()?;
    for node in iter {
        let mut op = Expr::operator(op_token).expect("recognised logical keyword");
        op.left = Some(Box::new(node));
        op.right = Some(Box::new(acc));
        acc = op;
    }
    Some(acc)
}
