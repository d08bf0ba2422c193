//! Traversal-shaped invariants and boundary behaviours: visit-all/any-true
//! equivalence, primary-or-first falling back to element zero, and
//! filter-on-singular-attribute rejection.

use scimpath_engine::{evaluate, traverse, EngineError, Strategy};
use scimpath_lang::{compile_filter, compile_path, Urn};
use scimpath_model::json::JsonNavigator;
use scimpath_model::{Attribute, AttributeType, Navigator};
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
fn evaluating_a_filter_equals_visit_all_any_true() {
    let urn = Urn::new();
    let resource = json!({"emails": [{"value": "a@x"}, {"value": "b@x"}]});

    let mut via_evaluate = JsonNavigator::new(resource_attr(), resource.clone());
    let tree = compile_filter(&urn, r#"emails.value eq "b@x""#).unwrap();
    let via_evaluate_result = evaluate(&mut via_evaluate, &tree).unwrap();

    let mut via_manual_traversal = JsonNavigator::new(resource_attr(), resource);
    let path = compile_path(&urn, "emails.value").unwrap();
    let mut any_true = false;
    traverse(&mut via_manual_traversal, Some(&path), Strategy::VisitAll, &mut |nav| {
        any_true = any_true || nav.current().unwrap().raw() == json!("b@x");
        Ok(())
    })
    .unwrap();

    assert_eq!(via_evaluate_result, any_true);
}

#[test]
fn primary_or_first_without_primary_annotation_equals_element_zero() {
    let urn = Urn::new();
    let resource = json!({"emails": [{"value": "first@x"}, {"value": "second@x"}]});
    let mut nav = JsonNavigator::new(resource_attr(), resource);
    let path = compile_path(&urn, "emails.value").unwrap();
    let mut seen = None;
    traverse(&mut nav, Some(&path), Strategy::PrimaryOrFirst, &mut |nav| {
        seen = Some(nav.current().unwrap().raw());
        Ok(())
    })
    .unwrap();
    assert_eq!(seen, Some(json!("first@x")));
}

#[test]
fn filter_on_a_singular_attribute_is_invalid_filter() {
    let urn = Urn::new();
    let resource = json!({"id": "x", "emails": []});
    let mut nav = JsonNavigator::new(resource_attr(), resource);
    nav.dot("id");
    let embedded = compile_path(&urn, r#"emails[value eq "a"]"#).unwrap();
    let filter_root = embedded.next.unwrap();
    let err = traverse(&mut nav, Some(&filter_root), Strategy::VisitAll, &mut |_| Ok(())).unwrap_err();
    assert_eq!(err, EngineError::InvalidFilter("filter applied to singular attribute".into()));
}
