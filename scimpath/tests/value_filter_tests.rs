//! A value filter's round-trip: a filter built from `value` evaluated
//! against the resource obtained by adding `value` to an empty
//! multi-valued attribute returns true.

use scimpath::json::JsonNavigator;
use scimpath::{add, build_value_filter, Attribute, AttributeType, Error, Registry};
use scimpath_engine::evaluate as evaluate_tree;
use serde_json::json;

fn emails_attr() -> Attribute {
    Attribute::complex(
        "emails",
        true,
        vec![
            Attribute::simple("value", AttributeType::String, false),
            Attribute::simple("primary", AttributeType::Boolean, false),
        ],
    )
}

fn resource_attr() -> Attribute {
    Attribute::complex("", false, vec![emails_attr()])
}

#[test]
fn round_trip_added_element_matches_its_own_builder_filter() {
    let registry = Registry::new();
    let element = json!({"value": "bar@x", "primary": true});
    let tree = build_value_filter(&element).unwrap();

    let mut nav = JsonNavigator::new(resource_attr(), json!({"emails": []}));
    add(&mut nav, &registry, "emails", element).unwrap();

    // `tree` is a filter over a single element, not the whole resource; walk
    // to that one freshly-added element, matching what `emails[...]`'s
    // filter-qualified traversal would place the evaluator at.
    let value = nav.into_value();
    let mut element_nav = JsonNavigator::new(
        Attribute::complex(
            "",
            false,
            vec![
                Attribute::simple("value", AttributeType::String, false),
                Attribute::simple("primary", AttributeType::Boolean, false),
            ],
        ),
        value["emails"][0].clone(),
    );
    assert!(evaluate_tree(&mut element_nav, &tree).unwrap());
}

#[test]
fn mismatched_element_does_not_match_the_builder_filter() {
    let element = json!({"value": "bar@x", "primary": true});
    let tree = build_value_filter(&element).unwrap();
    let mut other = JsonNavigator::new(
        Attribute::complex(
            "",
            false,
            vec![
                Attribute::simple("value", AttributeType::String, false),
                Attribute::simple("primary", AttributeType::Boolean, false),
            ],
        ),
        json!({"value": "other@x", "primary": true}),
    );
    assert!(!evaluate_tree(&mut other, &tree).unwrap());
}

#[test]
fn nested_array_inside_a_mapping_is_rejected() {
    let value = json!({"value": ["a", "b"]});
    assert!(matches!(build_value_filter(&value), Err(Error::InvalidValue(_))));
}
