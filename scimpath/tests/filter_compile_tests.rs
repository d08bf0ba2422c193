//! Filter compilation: a logical combination of two relational operators,
//! the invariants on operator arity, the "no paren node survives
//! compilation" invariant, and two literal boundary behaviours.

use scimpath_lang::{compile_filter, compile_path, Tag, Urn};

#[test]
fn and_of_two_relational_ops() {
    let urn = Urn::new();
    let tree = compile_filter(&urn, r#"(value eq "foo") and (primary ne true)"#).unwrap();
    assert_eq!(tree.tag, Tag::LogicalOp);
    assert_eq!(tree.token.to_ascii_lowercase(), "and");
    let left = tree.left.as_ref().unwrap();
    assert_eq!(left.token.to_ascii_lowercase(), "eq");
    assert_eq!(left.left.as_ref().unwrap().token, "value");
    assert_eq!(left.right.as_ref().unwrap().token, "\"foo\"");
    let right = tree.right.as_ref().unwrap();
    assert_eq!(right.token.to_ascii_lowercase(), "ne");
    assert_eq!(right.left.as_ref().unwrap().token, "primary");
    assert_eq!(right.right.as_ref().unwrap().token, "true");
}

#[test]
fn binary_operators_have_both_children_unary_have_only_left() {
    let urn = Urn::new();
    let and_tree = compile_filter(&urn, r#"active eq true and name pr"#).unwrap();
    assert!(and_tree.left.is_some());
    assert!(and_tree.right.is_some());

    let pr_tree = compile_filter(&urn, "name pr").unwrap();
    assert!(pr_tree.left.is_some());
    assert!(pr_tree.right.is_none());

    let not_tree = compile_filter(&urn, "not(name pr)").unwrap();
    assert!(not_tree.left.is_some());
    assert!(not_tree.right.is_none());
}

#[test]
fn no_paren_node_survives_into_the_finished_tree() {
    let urn = Urn::new();
    let tree = compile_filter(&urn, r#"(value eq "foo") and (primary ne true)"#).unwrap();
    fn assert_no_paren(expr: &scimpath_lang::Expr) {
        assert!(!expr.is_paren());
        if let Some(left) = &expr.left {
            assert_no_paren(left);
        }
        if let Some(right) = &expr.right {
            assert_no_paren(right);
        }
    }
    assert_no_paren(&tree);
}

#[test]
fn not_immediately_followed_by_paren_compiles_like_not_space_paren() {
    let urn = Urn::new();
    let tight = compile_filter(&urn, "not(active pr)").unwrap();
    let spaced = compile_filter(&urn, "not (active pr)").unwrap();
    assert_eq!(tight.token.to_ascii_lowercase(), spaced.token.to_ascii_lowercase());
    assert_eq!(
        tight.left.unwrap().token.to_ascii_lowercase(),
        spaced.left.unwrap().token.to_ascii_lowercase()
    );
}

#[test]
fn escaped_bracket_inside_string_literal_does_not_close_the_filter() {
    let urn = Urn::new();
    let expr = compile_path(&urn, r#"emails[value eq "a\]b"]"#).unwrap();
    assert_eq!(expr.token, "emails");
    let filter_root = expr.next.unwrap();
    assert!(filter_root.is_filter_root());
    assert_eq!(filter_root.right.unwrap().token, r#""a\]b""#);
}
