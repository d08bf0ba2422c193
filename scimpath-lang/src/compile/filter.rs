//! The shunting-yard filter compiler, consuming the filter scanner's event
//! stream and producing an operator tree. Re-invokes the path compiler on
//! every path operand.

use crate::compile::path::compile_path;
use crate::error::ScanError;
use crate::expr::Expr;
use crate::scanner::{Expect, FilterEvent, FilterScanner};
use crate::urn::Urn;

fn path_contains_filter(node: &Expr) -> bool {
    let mut cur = Some(node);
    while let Some(n) = cur {
        if n.is_filter_root() {
            return true;
        }
        cur = n.next.as_deref();
    }
    false
}

/// Pops operands for `op` according to its cardinality (for binary ops,
/// right is top-of-stack and left is below it) and pushes the assembled
/// node back onto `result_stack`.
fn assemble(mut op: Expr, result_stack: &mut Vec<Expr>) {
    if op.is_unary() {
        let left = result_stack
            .pop()
            .expect("unary operator missing its operand: algorithmic invariant violated");
        op.left = Some(Box::new(left));
    } else {
        let right = result_stack
            .pop()
            .expect("binary operator missing its right operand: algorithmic invariant violated");
        let left = result_stack
            .pop()
            .expect("binary operator missing its left operand: algorithmic invariant violated");
        op.left = Some(Box::new(left));
        op.right = Some(Box::new(right));
    }
    result_stack.push(op);
}

/// Drains operators from `op_stack` to `result_stack` while the pending
/// `new_op` has lower (or, for left-associative operators, equal) priority
/// than the stack's top.
fn reduce_for(op_stack: &mut Vec<Expr>, result_stack: &mut Vec<Expr>, new_op: &Expr) {
    let new_kind = new_op.op_kind().expect("operator node always has an op kind");
    while let Some(top) = op_stack.last() {
        if top.is_paren() {
            break;
        }
        let top_kind = top.op_kind().expect("operator node always has an op kind");
        let should_pop = if new_kind.is_right_associative() {
            top_kind.precedence() > new_kind.precedence()
        } else {
            top_kind.precedence() >= new_kind.precedence()
        };
        if !should_pop {
            break;
        }
        let popped = op_stack.pop().expect("just peeked");
        assemble(popped, result_stack);
    }
}

fn expect_after_op(text: &str) -> Expect {
    match text {
        "pr" => Expect::Operator,
        "and" | "or" | "not" => Expect::UnaryStart,
        _ => Expect::Literal,
    }
}

/// Compiles `source` (the text inside a path's `[...]`, or a top-level
/// standalone filter) into the root of an operator tree.
pub fn compile_filter(urn: &Urn, source: &str) -> Result<Expr, ScanError> {
    let bytes: Vec<u8> = source.bytes().chain([0, 0]).collect();
    let mut scanner = FilterScanner::new(source);
    scanner.expect(Expect::UnaryStart);

    let mut op_stack: Vec<Expr> = Vec::new();
    let mut result_stack: Vec<Expr> = Vec::new();
    let mut token_start = 0usize;

    let mut i = 0usize;
    loop {
        let byte = bytes[i];
        let raw_event = scanner.step(byte);
        let (event, replay) = if raw_event == FilterEvent::InsertSpace {
            (scanner.step(b' '), true)
        } else {
            (raw_event, false)
        };

        match &event {
            FilterEvent::BeginPath | FilterEvent::BeginAny | FilterEvent::BeginOp | FilterEvent::BeginLiteral => {
                token_start = i;
            }
            FilterEvent::EndPath => {
                let text = &source[token_start..i];
                let path = compile_path(urn, text)?;
                if path_contains_filter(&path) {
                    return Err(ScanError::new(
                        "nested filters are not allowed",
                        token_start,
                        "remove the bracketed filter from this path operand",
                        source,
                    ));
                }
                result_stack.push(path);
                scanner.expect(Expect::Operator);
            }
            FilterEvent::EndOp => {
                let text = source[token_start..i].to_ascii_lowercase();
                let new_op = Expr::operator(text.clone()).ok_or_else(|| {
                    ScanError::new(
                        "unknown operator",
                        token_start,
                        "expected a relational or logical keyword",
                        source,
                    )
                })?;
                reduce_for(&mut op_stack, &mut result_stack, &new_op);
                scanner.expect(expect_after_op(&text));
                op_stack.push(new_op);
            }
            FilterEvent::EndLiteral => {
                let text = &source[token_start..i];
                result_stack.push(Expr::literal(text));
                scanner.expect(Expect::Operator);
            }
            FilterEvent::Paren(b'(') => {
                op_stack.push(Expr::paren("("));
                scanner.expect(Expect::UnaryStart);
            }
            FilterEvent::Paren(b')') => {
                loop {
                    match op_stack.pop() {
                        Some(top) if top.is_paren() => break,
                        Some(top) => assemble(top, &mut result_stack),
                        None => {
                            return Err(ScanError::new(
                                "mismatched parenthesis",
                                i,
                                "no matching '(' for this ')'",
                                source,
                            ));
                        }
                    }
                }
                scanner.expect(Expect::Operator);
            }
            FilterEvent::Paren(_) => unreachable!("paren byte is always '(' or ')'"),
            FilterEvent::Error(err) => return Err(err.clone()),
            FilterEvent::End => break,
            FilterEvent::Continue | FilterEvent::SkipSpace | FilterEvent::InsertSpace => {}
        }

        if replay {
            // The byte that triggered `insert-space` has now had its
            // virtual space digested; feed it again, unconsumed, so it is
            // seen fresh at `Dispatch`.
            continue;
        }
        i += 1;
        if i >= bytes.len() {
            break;
        }
    }

    while let Some(top) = op_stack.pop() {
        assemble(top, &mut result_stack);
    }

    if result_stack.len() != 1 || !result_stack[0].is_operator() {
        panic!(
            "filter compiler produced {} result(s), expected exactly one operator root",
            result_stack.len()
        );
    }
    Ok(result_stack.pop().expect("checked above"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_relational_predicate() {
        let urn = Urn::new();
        let tree = compile_filter(&urn, r#"value eq "x""#).unwrap();
        assert_eq!(tree.token.to_ascii_lowercase(), "eq");
        assert_eq!(tree.left.as_ref().unwrap().token, "value");
        assert_eq!(tree.right.as_ref().unwrap().token, "\"x\"");
    }

    #[test]
    fn and_binds_looser_than_relational() {
        let urn = Urn::new();
        let tree = compile_filter(&urn, r#"a eq "1" and b eq "2""#).unwrap();
        assert_eq!(tree.token.to_ascii_lowercase(), "and");
        assert_eq!(tree.left.as_ref().unwrap().token.to_ascii_lowercase(), "eq");
        assert_eq!(tree.right.as_ref().unwrap().token.to_ascii_lowercase(), "eq");
    }

    #[test]
    fn explicit_parens_around_both_operands() {
        let urn = Urn::new();
        let tree = compile_filter(&urn, r#"(value eq "foo") and (primary ne true)"#).unwrap();
        assert_eq!(tree.token.to_ascii_lowercase(), "and");
        let left = tree.left.as_ref().unwrap();
        assert_eq!(left.token.to_ascii_lowercase(), "eq");
        assert_eq!(left.left.as_ref().unwrap().token, "value");
        let right = tree.right.as_ref().unwrap();
        assert_eq!(right.token.to_ascii_lowercase(), "ne");
        assert_eq!(right.left.as_ref().unwrap().token, "primary");
    }

    #[test]
    fn not_without_space_before_paren_compiles() {
        let urn = Urn::new();
        let tree = compile_filter(&urn, "not(active pr)").unwrap();
        assert_eq!(tree.token.to_ascii_lowercase(), "not");
        assert!(tree.right.is_none());
        let inner = tree.left.as_ref().unwrap();
        assert_eq!(inner.token.to_ascii_lowercase(), "pr");
    }

    #[test]
    fn pr_has_no_right_operand() {
        let urn = Urn::new();
        let tree = compile_filter(&urn, "active pr").unwrap();
        assert_eq!(tree.token.to_ascii_lowercase(), "pr");
        assert!(tree.right.is_none());
        assert_eq!(tree.left.as_ref().unwrap().token, "active");
    }

    #[test]
    fn dotted_path_operand_becomes_a_sub_list() {
        let urn = Urn::new();
        let tree = compile_filter(&urn, r#"emails.value sw "user1""#).unwrap();
        let left = tree.left.as_ref().unwrap();
        assert_eq!(left.token, "emails");
        assert_eq!(left.next.as_ref().unwrap().token, "value");
    }

    #[test]
    fn nested_filter_in_operand_is_rejected() {
        let urn = Urn::new();
        let result = compile_filter(&urn, r#"a[b eq "1"].c eq "2""#);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_operator_is_an_error() {
        let urn = Urn::new();
        assert!(compile_filter(&urn, r#"value zz "x""#).is_err());
    }

    #[test]
    fn mismatched_paren_is_an_error() {
        let urn = Urn::new();
        assert!(compile_filter(&urn, r#"(value eq "x""#).is_err());
    }

    #[test]
    fn no_tree_node_is_a_paren() {
        let urn = Urn::new();
        let tree = compile_filter(&urn, r#"(value eq "x") or (value eq "y")"#).unwrap();
        fn assert_no_paren(node: &Expr) {
            assert!(!node.is_paren());
            if let Some(left) = &node.left {
                assert_no_paren(left);
            }
            if let Some(right) = &node.right {
                assert_no_paren(right);
            }
        }
        assert_no_paren(&tree);
    }
}
