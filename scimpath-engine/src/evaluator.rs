//! Recursively reduces an operator tree to a boolean against a base
//! property, calling back into the traverser to walk a relational
//! operator's left-hand path.

use scimpath_lang::{Expr, LogicalOp, RelationalOp, Tag};
use scimpath_model::{AttributeType, Capability, LiteralValue, Navigator};
use tracing::{span, Level};

use crate::error::EngineError;
use crate::traverser::{traverse, Strategy};

/// Evaluates `tree` against `nav`'s current position, returning whether it
/// matches.
pub fn evaluate(nav: &mut dyn Navigator, tree: &Expr) -> Result<bool, EngineError> {
    let span = span!(Level::TRACE, "evaluate", op = %tree.token);
    let _span = span.enter();
    match tree.tag {
        Tag::LogicalOp => evaluate_logical(nav, tree),
        Tag::RelationalOp => evaluate_relational(nav, tree),
        _ => unreachable!("the evaluator only ever receives operator-tagged nodes"),
    }
}

fn evaluate_logical(nav: &mut dyn Navigator, tree: &Expr) -> Result<bool, EngineError> {
    match tree.logical_op().expect("Tag::LogicalOp always has a LogicalOp") {
        LogicalOp::And => {
            let left = evaluate(nav, tree.left.as_deref().expect("`and` has a left operand"))?;
            if !left {
                return Ok(false);
            }
            evaluate(nav, tree.right.as_deref().expect("`and` has a right operand"))
        }
        LogicalOp::Or => {
            let left = evaluate(nav, tree.left.as_deref().expect("`or` has a left operand"))?;
            if left {
                return Ok(true);
            }
            evaluate(nav, tree.right.as_deref().expect("`or` has a right operand"))
        }
        LogicalOp::Not => {
            let inner = evaluate(nav, tree.left.as_deref().expect("`not` has an operand"))?;
            Ok(!inner)
        }
    }
}

/// The left subtree is a path; it is walked with visit-all semantics and the
/// per-element booleans are combined with "any true". This does not
/// short-circuit; every comparison runs.
fn evaluate_relational(nav: &mut dyn Navigator, tree: &Expr) -> Result<bool, EngineError> {
    let op = tree
        .relational_op()
        .expect("Tag::RelationalOp always has a RelationalOp");
    let path = tree.left.as_deref().expect("relational operator has a left path");

    let mut any_true = false;
    traverse(nav, Some(path), Strategy::VisitAll, &mut |nav| {
        let property = nav
            .current()
            .ok_or_else(|| EngineError::NoTarget("no property at filter terminal".into()))?;
        let matched = if op == RelationalOp::Pr {
            property.present()
        } else {
            let capability = relational_capability(op).expect("Pr handled above");
            if !property.supports(capability) {
                false
            } else {
                let literal_expr = tree.right.as_deref().ok_or_else(|| {
                    EngineError::InvalidFilter(format!("`{}` requires a right-hand literal", tree.token))
                })?;
                let literal = normalize_literal(literal_expr, property.attribute().r#type)?;
                property.compare(capability, &literal)
            }
        };
        any_true = any_true || matched;
        Ok(())
    })
    .map_err(reclassify_inner_error)?;

    Ok(any_true)
}

/// Maps a failed inner traversal to a filter-scoped error: a `no-target`
/// becomes "bad path in filter", an `invalid-value` becomes "bad value", and
/// anything else collapses to a generic `invalid-filter`.
fn reclassify_inner_error(err: EngineError) -> EngineError {
    match err {
        EngineError::NoTarget(message) => EngineError::InvalidFilter(format!("bad path in filter: {message}")),
        EngineError::InvalidValue(message) => EngineError::InvalidFilter(format!("bad value: {message}")),
        EngineError::InvalidFilter(message) => EngineError::InvalidFilter(message),
    }
}

fn relational_capability(op: RelationalOp) -> Option<Capability> {
    Some(match op {
        RelationalOp::Eq => Capability::Eq,
        RelationalOp::Ne => Capability::Ne,
        RelationalOp::Sw => Capability::Sw,
        RelationalOp::Ew => Capability::Ew,
        RelationalOp::Co => Capability::Co,
        RelationalOp::Gt => Capability::Gt,
        RelationalOp::Ge => Capability::Ge,
        RelationalOp::Lt => Capability::Lt,
        RelationalOp::Le => Capability::Le,
        RelationalOp::Pr => return None,
    })
}

/// The terminal's attribute type selects the parse rule for the operator's
/// right-hand token.
///
/// Integer/decimal/boolean tokens are never legitimately quoted coming out
/// of the text scanner (the filter grammar's literal production is
/// `qstring | number | bool`, never a `qstring` wrapping a `number`/`bool`),
/// so stripping one optional surrounding pair of quotes before parsing is a
/// no-op for real filter text but lets the value-to-filter builder's
/// "always quoted" literals normalize against non-string attributes too.
fn normalize_literal(expr: &Expr, attribute_type: AttributeType) -> Result<LiteralValue, EngineError> {
    let token = expr.token.as_str();
    match attribute_type {
        AttributeType::String | AttributeType::DateTime | AttributeType::Binary | AttributeType::Reference => {
            unquote(token).map(LiteralValue::Str)
        }
        AttributeType::Integer => {
            let unquoted = strip_one_quote_pair(token);
            unquoted
                .parse::<i64>()
                .map(LiteralValue::Integer)
                .map_err(|_| EngineError::InvalidValue(format!("expected an integer literal, found `{token}`")))
        }
        AttributeType::Decimal => {
            let unquoted = strip_one_quote_pair(token);
            unquoted
                .parse::<f64>()
                .map(LiteralValue::Decimal)
                .map_err(|_| EngineError::InvalidValue(format!("expected a decimal literal, found `{token}`")))
        }
        AttributeType::Boolean => match strip_one_quote_pair(token) {
            "true" => Ok(LiteralValue::Boolean(true)),
            "false" => Ok(LiteralValue::Boolean(false)),
            _ => Err(EngineError::InvalidValue(format!(
                "expected `true` or `false`, found `{token}`"
            ))),
        },
        AttributeType::Complex => Err(EngineError::InvalidValue(
            "complex attributes have no filter literal form".into(),
        )),
    }
}

fn strip_one_quote_pair(token: &str) -> &str {
    token
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(token)
}

/// Unwraps a dquote-delimited literal and resolves its backslash escapes.
/// The scanner has already validated bracket/quote nesting; this only has to
/// decode what it accepted.
fn unquote(token: &str) -> Result<String, EngineError> {
    let inner = token
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or_else(|| EngineError::InvalidValue(format!("expected a quoted string literal, found `{token}`")))?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('/') => out.push('/'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let code = u32::from_str_radix(&hex, 16)
                    .map_err(|_| EngineError::InvalidValue("invalid \\u escape in string literal".into()))?;
                out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            Some(other) => out.push(other),
            None => return Err(EngineError::InvalidValue("dangling escape in string literal".into())),
        }
    }
    Ok(out)
}
