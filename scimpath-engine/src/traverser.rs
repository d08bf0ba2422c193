//! Walks a resource tree guided by a compiled expression.
//!
//! The traverser never re-parses text and never owns a resource; it is
//! driven entirely through the [`Navigator`] cursor plus the already-built
//! [`Expr`] chain, and hands control back to a caller-supplied callback once
//! it reaches a terminal.

use scimpath_lang::Expr;
use scimpath_model::{Navigator, Property};
use tracing::{span, Level};

use crate::error::EngineError;
use crate::evaluator::evaluate;

/// Which element(s) of a multi-valued position a broadcast visits.
///
/// `filter-qualified` is not a variant here: it is an automatic consequence
/// of the expression being a filter root, not a strategy a caller picks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Visit every element.
    VisitAll,
    /// Visit the element whose `@Primary` boolean sub-attribute is `true`,
    /// or index 0 if no element qualifies or no such sub-attribute exists.
    PrimaryOrFirst,
}

type Callback<'a> = dyn FnMut(&mut dyn Navigator) -> Result<(), EngineError> + 'a;

/// Drives `nav` along `expr`, invoking `callback` once per terminal.
///
/// Retract-on-exit is mandatory on every descent this function makes, so the
/// navigator's position stack is always left exactly as found, whether or
/// not `callback`, or a nested step, errors.
pub fn traverse(
    nav: &mut dyn Navigator,
    expr: Option<&Expr>,
    strategy: Strategy,
    callback: &mut Callback<'_>,
) -> Result<(), EngineError> {
    let expr = match expr {
        None => return callback(nav),
        Some(expr) => expr,
    };
    let span = span!(Level::TRACE, "traverse", token = %expr.token);
    let _span = span.enter();

    let multi_valued = nav
        .current()
        .ok_or_else(|| EngineError::NoTarget("navigator has no current position".into()))?
        .attribute()
        .multi_valued;

    if expr.is_filter_root() {
        if !multi_valued {
            return Err(EngineError::InvalidFilter(
                "filter applied to singular attribute".into(),
            ));
        }
        traverse_filter_qualified(nav, expr, strategy, callback)
    } else if multi_valued {
        traverse_broadcast(nav, expr, strategy, callback)
    } else {
        traverse_step(nav, expr, strategy, callback)
    }
}

/// Evaluates the filter against every child, recursing with
/// `filter_root.next` for each one that qualifies.
fn traverse_filter_qualified(
    nav: &mut dyn Navigator,
    filter_root: &Expr,
    strategy: Strategy,
    callback: &mut Callback<'_>,
) -> Result<(), EngineError> {
    let len = nav.current().map(|property| property.len()).unwrap_or(0);
    for index in 0..len {
        nav.at(index);
        if let Some(err) = take_navigator_error(nav) {
            return Err(err);
        }
        let qualifies = evaluate(nav, filter_root);
        let result = match qualifies {
            Ok(true) => traverse(nav, filter_root.next.as_deref(), strategy, callback),
            Ok(false) => Ok(()),
            Err(err) => Err(err),
        };
        nav.retract();
        result?;
    }
    Ok(())
}

/// A one-level broadcast over the selected elements of a multi-valued
/// position, recursing with the *same* expression so each element gets a
/// chance to resolve `expr.token` as its own child.
fn traverse_broadcast(
    nav: &mut dyn Navigator,
    expr: &Expr,
    strategy: Strategy,
    callback: &mut Callback<'_>,
) -> Result<(), EngineError> {
    let indices = {
        let property = nav
            .current()
            .ok_or_else(|| EngineError::NoTarget("no current position to broadcast over".into()))?;
        selected_indices(property, strategy)
    };
    for index in indices {
        nav.at(index);
        if let Some(err) = take_navigator_error(nav) {
            return Err(err);
        }
        let result = traverse(nav, Some(expr), strategy, callback);
        nav.retract();
        result?;
    }
    Ok(())
}

/// The base case: descends one named step.
fn traverse_step(
    nav: &mut dyn Navigator,
    expr: &Expr,
    strategy: Strategy,
    callback: &mut Callback<'_>,
) -> Result<(), EngineError> {
    nav.dot(&expr.token);
    if let Some(err) = take_navigator_error(nav) {
        return Err(err);
    }
    let result = traverse(nav, expr.next.as_deref(), strategy, callback);
    nav.retract();
    result
}

/// Folds a sticky [`Navigator`] error into an [`EngineError::NoTarget`] and
/// clears it, so ancestor frames see a clean navigator and their own
/// `retract` calls are not silently skipped by the sticky-error early return
/// the [`Navigator`] contract documents.
fn take_navigator_error(nav: &mut dyn Navigator) -> Option<EngineError> {
    if !nav.has_error() {
        return None;
    }
    let message = nav
        .error()
        .map(ToString::to_string)
        .unwrap_or_else(|| "navigator error".to_string());
    nav.clear_error();
    Some(EngineError::NoTarget(message))
}

fn selected_indices(property: &dyn Property, strategy: Strategy) -> Vec<usize> {
    match strategy {
        Strategy::VisitAll => (0..property.len()).collect(),
        Strategy::PrimaryOrFirst => vec![primary_or_first_index(property)],
    }
}

/// The element whose `@Primary` boolean sub-attribute is `true`, or index 0
/// if none exists or no sub-attribute carries the annotation.
fn primary_or_first_index(property: &dyn Property) -> usize {
    let Some(primary_name) = property
        .attribute()
        .sub_attributes
        .iter()
        .find(|attribute| attribute.is_primary())
        .map(|attribute| attribute.name.clone())
    else {
        return 0;
    };
    for index in 0..property.len() {
        let Some(child) = property.child_at_index(index) else {
            continue;
        };
        let is_primary = child
            .find_child(&primary_name)
            .is_some_and(|primary| primary.raw() == serde_json::Value::Bool(true));
        if is_primary {
            return index;
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use scimpath_lang::{compile_path, Urn};
    use scimpath_model::json::JsonNavigator;
    use scimpath_model::{Attribute, AttributeType};
    use serde_json::json;

    fn emails_attr() -> Attribute {
        Attribute::complex(
            "emails",
            true,
            vec![
                Attribute::simple("value", AttributeType::String, false),
                Attribute::simple("primary", AttributeType::Boolean, false).with_primary_annotation(),
            ],
        )
    }

    fn resource_attr() -> Attribute {
        Attribute::complex(
            "",
            false,
            vec![Attribute::simple("id", AttributeType::String, false), emails_attr()],
        )
    }

    #[test]
    fn visit_all_calls_back_once_per_element() {
        let urn = Urn::new();
        let resource = json!({"emails": [{"value": "a@x.com"}, {"value": "b@x.com"}]});
        let mut nav = JsonNavigator::new(resource_attr(), resource);
        let expr = compile_path(&urn, "emails.value").unwrap();
        let mut seen = Vec::new();
        traverse(&mut nav, Some(&expr), Strategy::VisitAll, &mut |nav| {
            seen.push(nav.current().unwrap().raw());
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, vec![json!("a@x.com"), json!("b@x.com")]);
        assert!(!nav.has_error());
    }

    #[test]
    fn primary_or_first_picks_the_flagged_element() {
        let urn = Urn::new();
        let resource = json!({
            "emails": [
                {"value": "a@x.com", "primary": false},
                {"value": "b@x.com", "primary": true},
            ]
        });
        let mut nav = JsonNavigator::new(resource_attr(), resource);
        let expr = compile_path(&urn, "emails.value").unwrap();
        let mut seen = Vec::new();
        traverse(&mut nav, Some(&expr), Strategy::PrimaryOrFirst, &mut |nav| {
            seen.push(nav.current().unwrap().raw());
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, vec![json!("b@x.com")]);
    }

    #[test]
    fn primary_or_first_falls_back_to_index_zero() {
        let urn = Urn::new();
        let resource = json!({"emails": [{"value": "a@x.com"}, {"value": "b@x.com"}]});
        let mut nav = JsonNavigator::new(resource_attr(), resource);
        let expr = compile_path(&urn, "emails.value").unwrap();
        let mut seen = Vec::new();
        traverse(&mut nav, Some(&expr), Strategy::PrimaryOrFirst, &mut |nav| {
            seen.push(nav.current().unwrap().raw());
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, vec![json!("a@x.com")]);
    }

    #[test]
    fn filter_root_on_singular_attribute_is_invalid_filter() {
        let urn = Urn::new();
        let resource = json!({"id": "x", "emails": []});
        let mut nav = JsonNavigator::new(resource_attr(), resource);
        nav.dot("id");
        let filter = compile_path(&urn, r#"emails[value eq "x"]"#).unwrap();
        // `filter` itself is a path node; its `next` is the filter root we want.
        let filter_root = filter.next.as_ref().unwrap();
        let err = traverse(&mut nav, Some(filter_root), Strategy::VisitAll, &mut |_| Ok(())).unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidFilter("filter applied to singular attribute".into())
        );
    }

    #[test]
    fn retract_on_exit_keeps_stack_consistent_after_callback_error() {
        let urn = Urn::new();
        let resource = json!({"emails": [{"value": "a@x.com"}]});
        let mut nav = JsonNavigator::new(resource_attr(), resource);
        let expr = compile_path(&urn, "emails.value").unwrap();
        let err = traverse(&mut nav, Some(&expr), Strategy::VisitAll, &mut |_| {
            Err(EngineError::InvalidValue("boom".into()))
        })
        .unwrap_err();
        assert_eq!(err, EngineError::InvalidValue("boom".into()));
        assert!(!nav.has_error());
        // The navigator's position stack should be back at the root: `dot`
        // into "id" must succeed, which it would not if a frame leaked.
        nav.dot("id");
        assert!(!nav.has_error());
    }

    #[test]
    fn primary_or_first_on_empty_multivalue_is_no_target() {
        let urn = Urn::new();
        let resource = json!({"emails": []});
        let mut nav = JsonNavigator::new(resource_attr(), resource);
        let expr = compile_path(&urn, "emails.value").unwrap();
        let err = traverse(&mut nav, Some(&expr), Strategy::PrimaryOrFirst, &mut |_| Ok(())).unwrap_err();
        assert!(matches!(err, EngineError::NoTarget(_)));
    }
}
