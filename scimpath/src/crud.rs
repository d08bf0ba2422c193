//! Thin binding of path to traverser to navigator operation, for
//! add/replace/delete/evaluate/sort.

use std::cmp::Ordering;

use scimpath_engine::{evaluate as evaluate_tree, traverse, EngineError, Strategy};
use scimpath_lang::{compile_filter, compile_path, Expr};
use scimpath_model::{AttributeType, Navigator};
use serde_json::Value;
use tracing::{span, Level};

use crate::error::Error;
use crate::registry::Registry;

/// Sort direction for [`sort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}

/// A sort key captured at a resource's sort target: the raw value, plus
/// whether the property that produced it supports a less-than comparison.
/// Targets lacking a less-than capability are treated as equal.
#[derive(Debug, Clone, PartialEq)]
pub struct SortTarget {
    pub value: Value,
    pub comparable: bool,
}

/// Compiles `path` and applies namespace elision: when the head segment
/// names the registry's declared primary schema, that head is dropped, so
/// the remainder addresses the resource's own attributes rather than an
/// extension namespace keyed by the same URN.
///
/// An empty `path` compiles to `None`, meaning "operate on the root".
fn compile_for_crud(registry: &Registry, path: &str) -> Result<Option<Expr>, Error> {
    if path.is_empty() {
        return Ok(None);
    }
    let mut expr = compile_path(registry.urn(), path).map_err(Error::from_path_scan)?;
    if registry
        .primary_schema()
        .is_some_and(|schema| schema.eq_ignore_ascii_case(&expr.token))
    {
        return Ok(expr.next.take().map(|boxed| *boxed));
    }
    Ok(Some(expr))
}

/// Drives `op` over every terminal `path` resolves to (visit-all: add,
/// replace and delete do not themselves choose among multi-valued elements;
/// a filter-qualified segment in `path` narrows that automatically, per the
/// traverser's own rules). A navigator error raised inside `op` is folded
/// into a `no-target`. If `path` resolved to no terminal at all, that is
/// itself a `no-target`: when no matching element exists, a `no-target`
/// error surfaces to the caller.
fn apply(nav: &mut dyn Navigator, registry: &Registry, path: &str, mut op: impl FnMut(&mut dyn Navigator)) -> Result<(), Error> {
    let span = span!(Level::DEBUG, "crud_apply", path = %path);
    let _span = span.enter();

    let expr = compile_for_crud(registry, path)?;
    let mut hit = false;
    let result = traverse(nav, expr.as_ref(), Strategy::VisitAll, &mut |nav| {
        hit = true;
        op(nav);
        if nav.has_error() {
            let message = nav.error().map(ToString::to_string).unwrap_or_default();
            nav.clear_error();
            return Err(EngineError::NoTarget(message));
        }
        Ok(())
    });
    result?;
    if !hit {
        return Err(Error::NoTarget(format!("path \"{path}\" matched no element")));
    }
    Ok(())
}

/// Adds `value` at `path`; an empty `path` adds at the root.
pub fn add(nav: &mut dyn Navigator, registry: &Registry, path: &str, value: Value) -> Result<(), Error> {
    apply(nav, registry, path, move |nav| nav.add(value.clone()))
}

/// Replaces the value at `path`; an empty `path` replaces the root.
pub fn replace(nav: &mut dyn Navigator, registry: &Registry, path: &str, value: Value) -> Result<(), Error> {
    apply(nav, registry, path, move |nav| nav.replace(value.clone()))
}

/// Deletes the element(s) at `path`. An empty `path` is `invalid-path`: the
/// root cannot be deleted through this facade.
pub fn delete(nav: &mut dyn Navigator, registry: &Registry, path: &str) -> Result<(), Error> {
    if path.is_empty() {
        return Err(Error::InvalidPath("delete requires a non-empty path".into()));
    }
    apply(nav, registry, path, |nav| nav.delete())
}

/// Compiles `filter` and evaluates it against `nav`'s current position.
pub fn evaluate(nav: &mut dyn Navigator, registry: &Registry, filter: &str) -> Result<bool, Error> {
    let tree = compile_filter(registry.urn(), filter).map_err(Error::from_filter_scan)?;
    Ok(evaluate_tree(nav, &tree)?)
}

/// Traverses `by` from `nav`'s current position with primary-or-first
/// strategy, rejecting a complex terminal. `Ok(None)` means `by` resolved to
/// nothing, a legitimately missing sort key rather than a hard error;
/// [`sort`] places such resources per its `order`.
pub fn seek_sort_target(nav: &mut dyn Navigator, registry: &Registry, by: &str) -> Result<Option<SortTarget>, Error> {
    let expr = compile_path(registry.urn(), by).map_err(Error::from_path_scan)?;
    let mut found: Option<SortTarget> = None;
    let result = traverse(nav, Some(&expr), Strategy::PrimaryOrFirst, &mut |nav| {
        let property = nav
            .current()
            .ok_or_else(|| EngineError::NoTarget("no property at sort target".into()))?;
        if property.attribute().r#type == AttributeType::Complex {
            return Err(EngineError::InvalidValue(
                "sort target cannot be a complex attribute".into(),
            ));
        }
        found = Some(SortTarget {
            value: property.raw(),
            comparable: property.supports(scimpath_model::Capability::Lt),
        });
        Ok(())
    });
    match result {
        Ok(()) => Ok(found),
        Err(EngineError::NoTarget(_)) => Ok(None),
        Err(other) => Err(other.into()),
    }
}

/// Sorts `resources` in place by the target `by` resolves to on each one.
///
/// Missing targets sort to the end in ascending order and to the start in
/// descending order. Targets that cannot support a less-than comparison
/// compare equal to one another, so their relative order is left as found
/// (this sort is implemented as a stable key sort).
pub fn sort(resources: &mut [&mut dyn Navigator], registry: &Registry, by: &str, order: Order) -> Result<(), Error> {
    let mut keys = Vec::with_capacity(resources.len());
    for nav in resources.iter_mut() {
        keys.push(seek_sort_target(*nav, registry, by)?);
    }
    let mut indices: Vec<usize> = (0..resources.len()).collect();
    indices.sort_by(|&a, &b| compare_sort_keys(&keys[a], &keys[b], order));
    apply_permutation(resources, indices);
    Ok(())
}

fn compare_sort_keys(a: &Option<SortTarget>, b: &Option<SortTarget>, order: Order) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => match order {
            Order::Ascending => Ordering::Greater,
            Order::Descending => Ordering::Less,
        },
        (Some(_), None) => match order {
            Order::Ascending => Ordering::Less,
            Order::Descending => Ordering::Greater,
        },
        (Some(a), Some(b)) => {
            if !a.comparable || !b.comparable {
                return Ordering::Equal;
            }
            let natural = compare_json_values(&a.value, &b.value);
            match order {
                Order::Ascending => natural,
                Order::Descending => natural.reverse(),
            }
        }
    }
}

/// A total order across the JSON value kinds [`SortTarget::value`] can hold:
/// booleans compare `false < true`; numbers compare by their `f64`
/// projection using [`f64::total_cmp`] so `NaN` sorts greatest, never
/// panicking or reporting "unordered"; strings compare lexicographically by
/// Unicode scalar. Values of different kinds fall back to a fixed rank
/// (null < bool < number < string); nothing in `SortTarget::value` is ever
/// an array or object since `seek_sort_target` rejects complex targets.
fn compare_json_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) | Value::Object(_) => 4,
        }
    }
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => x.as_f64().unwrap_or(0.0).total_cmp(&y.as_f64().unwrap_or(0.0)),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Applies the permutation `indices` (the original position that should end
/// up at each output position) to `resources` in place, in O(n) swaps.
fn apply_permutation(resources: &mut [&mut dyn Navigator], mut indices: Vec<usize>) {
    for i in 0..indices.len() {
        while indices[i] != i {
            let j = indices[i];
            resources.swap(i, j);
            indices.swap(i, j);
        }
    }
}
