//! A reference [`Property`]/[`Navigator`] implementation over
//! [`serde_json::Value`], used by the rest of the workspace's tests and
//! available as a starting point for host applications that already keep
//! resources as JSON.
//!
//! Every node is fully owned (no borrowed lifetimes). The value subtree and
//! its schema are cloned into each [`JsonProperty`]. A production
//! implementation would likely borrow from a shared document instead, but
//! the contract in [`crate::Property`]/[`crate::Navigator`] does not care
//! which.

use serde_json::Value;

use crate::{Attribute, AttributeType, Capability, LiteralValue, ModelError, Navigator, Property};

/// An owned property node: a schema [`Attribute`] paired with the
/// [`serde_json::Value`] subtree it describes.
#[derive(Debug, Clone)]
pub struct JsonProperty {
    attribute: Attribute,
    value: Value,
    children: Vec<JsonProperty>,
}

impl JsonProperty {
    /// Builds a property node (and, recursively, its children) from a schema
    /// attribute and a value.
    pub fn new(attribute: Attribute, value: Value) -> Self {
        let children = if attribute.multi_valued {
            let mut element_attribute = attribute.clone();
            element_attribute.multi_valued = false;
            value
                .as_array()
                .map(|items| {
                    items
                        .iter()
                        .map(|item| JsonProperty::new(element_attribute.clone(), item.clone()))
                        .collect()
                })
                .unwrap_or_default()
        } else if attribute.r#type == AttributeType::Complex {
            attribute
                .sub_attributes
                .iter()
                .map(|sub| {
                    let child_value = value
                        .as_object()
                        .and_then(|obj| obj.get(&sub.name))
                        .cloned()
                        .unwrap_or(Value::Null);
                    JsonProperty::new(sub.clone(), child_value)
                })
                .collect()
        } else {
            Vec::new()
        };
        JsonProperty {
            attribute,
            value,
            children,
        }
    }
}

impl Property for JsonProperty {
    fn attribute(&self) -> &Attribute {
        &self.attribute
    }

    fn raw(&self) -> Value {
        self.value.clone()
    }

    fn supports(&self, capability: Capability) -> bool {
        use Capability::*;
        match self.attribute.r#type {
            AttributeType::String | AttributeType::Reference | AttributeType::Binary => {
                matches!(capability, Eq | Ne | Sw | Ew | Co)
            }
            AttributeType::DateTime | AttributeType::Integer | AttributeType::Decimal => {
                matches!(capability, Eq | Ne | Gt | Ge | Lt | Le)
            }
            AttributeType::Boolean => matches!(capability, Eq | Ne),
            AttributeType::Complex => false,
        }
    }

    fn compare(&self, capability: Capability, rhs: &LiteralValue) -> bool {
        use Capability::*;
        match (self.attribute.r#type, rhs) {
            (AttributeType::String | AttributeType::Reference | AttributeType::Binary, LiteralValue::Str(rhs)) => {
                let lhs = self.value.as_str().unwrap_or("");
                match capability {
                    Eq => lhs == rhs,
                    Ne => lhs != rhs,
                    Sw => lhs.starts_with(rhs.as_str()),
                    Ew => lhs.ends_with(rhs.as_str()),
                    Co => lhs.contains(rhs.as_str()),
                    _ => false,
                }
            }
            (AttributeType::DateTime, LiteralValue::Str(rhs)) => {
                let lhs = self.value.as_str().unwrap_or("");
                match capability {
                    Eq => lhs == rhs,
                    Ne => lhs != rhs,
                    Gt => lhs > rhs.as_str(),
                    Ge => lhs >= rhs.as_str(),
                    Lt => lhs < rhs.as_str(),
                    Le => lhs <= rhs.as_str(),
                    _ => false,
                }
            }
            (AttributeType::Integer, LiteralValue::Integer(rhs)) => {
                let lhs = self.value.as_i64().unwrap_or_default();
                match capability {
                    Eq => lhs == *rhs,
                    Ne => lhs != *rhs,
                    Gt => lhs > *rhs,
                    Ge => lhs >= *rhs,
                    Lt => lhs < *rhs,
                    Le => lhs <= *rhs,
                    _ => false,
                }
            }
            (AttributeType::Decimal, LiteralValue::Decimal(rhs)) => {
                let lhs = self.value.as_f64().unwrap_or_default();
                match capability {
                    Eq => lhs == *rhs,
                    Ne => lhs != *rhs,
                    Gt => lhs > *rhs,
                    Ge => lhs >= *rhs,
                    Lt => lhs < *rhs,
                    Le => lhs <= *rhs,
                    _ => false,
                }
            }
            (AttributeType::Boolean, LiteralValue::Boolean(rhs)) => {
                let lhs = self.value.as_bool().unwrap_or_default();
                match capability {
                    Eq => lhs == *rhs,
                    Ne => lhs != *rhs,
                    _ => false,
                }
            }
            _ => false,
        }
    }

    fn present(&self) -> bool {
        if self.value.is_null() {
            return false;
        }
        if self.attribute.multi_valued {
            return self.value.as_array().is_some_and(|a| !a.is_empty());
        }
        true
    }

    fn for_each_child(&self, f: &mut dyn FnMut(&dyn Property)) {
        for child in &self.children {
            f(child);
        }
    }

    fn child_at_index(&self, index: usize) -> Option<&dyn Property> {
        self.children.get(index).map(|c| c as &dyn Property)
    }

    fn find_child(&self, name: &str) -> Option<&dyn Property> {
        self.children
            .iter()
            .find(|c| c.attribute.name == name)
            .map(|c| c as &dyn Property)
    }
}

/// One step taken by a [`JsonNavigator`] away from its root.
#[derive(Debug, Clone)]
enum Step {
    Field(String),
    Index(usize),
}

/// A [`Navigator`] over an owned JSON document, guided by a root schema
/// attribute.
pub struct JsonNavigator {
    root_attribute: Attribute,
    root_value: Value,
    stack: Vec<Step>,
    error: Option<ModelError>,
    current: JsonProperty,
}

impl JsonNavigator {
    /// Constructs a navigator positioned at the root of `root_value`.
    pub fn new(root_attribute: Attribute, root_value: Value) -> Self {
        let current = JsonProperty::new(root_attribute.clone(), root_value.clone());
        JsonNavigator {
            root_attribute,
            root_value,
            stack: Vec::new(),
            error: None,
            current,
        }
    }

    /// The root value, after any mutations applied through this navigator.
    pub fn into_value(self) -> Value {
        self.root_value
    }

    fn resolve_attribute(&self) -> Attribute {
        let mut attribute = self.root_attribute.clone();
        for step in &self.stack {
            match step {
                Step::Field(name) => {
                    attribute = attribute
                        .sub_attribute(name)
                        .cloned()
                        .unwrap_or_else(|| Attribute::simple(name.clone(), AttributeType::String, false));
                }
                Step::Index(_) => {
                    attribute.multi_valued = false;
                }
            }
        }
        attribute
    }

    fn locate_value(&self) -> Value {
        let mut v = &self.root_value;
        for step in &self.stack {
            let next = match step {
                Step::Field(name) => v.as_object().and_then(|o| o.get(name)),
                Step::Index(i) => v.as_array().and_then(|a| a.get(*i)),
            };
            match next {
                Some(found) => v = found,
                None => return Value::Null,
            }
        }
        v.clone()
    }

    fn locate_value_mut(&mut self) -> Option<&mut Value> {
        let mut v = &mut self.root_value;
        for step in &self.stack {
            v = match step {
                Step::Field(name) => {
                    if v.is_null() {
                        *v = Value::Object(Default::default());
                    }
                    v.as_object_mut()?.entry(name.clone()).or_insert(Value::Null)
                }
                Step::Index(i) => v.as_array_mut()?.get_mut(*i)?,
            };
        }
        Some(v)
    }

    fn refresh(&mut self) {
        self.current = JsonProperty::new(self.resolve_attribute(), self.locate_value());
    }

    fn fail(&mut self, message: impl Into<String>) {
        if self.error.is_none() {
            self.error = Some(ModelError::new(message));
        }
    }
}

impl Navigator for JsonNavigator {
    fn dot(&mut self, name: &str) {
        if self.has_error() {
            return;
        }
        if self.current.attribute.multi_valued {
            self.fail(format!(
                "cannot dot into multi-valued attribute \"{}\"; select an element first",
                self.current.attribute.name
            ));
            return;
        }
        self.stack.push(Step::Field(name.to_string()));
        self.refresh();
    }

    fn at(&mut self, index: usize) {
        if self.has_error() {
            return;
        }
        let len = self.locate_value().as_array().map(|a| a.len()).unwrap_or(0);
        if index >= len {
            self.fail(format!("index {index} out of bounds (len {len})"));
            return;
        }
        self.stack.push(Step::Index(index));
        self.refresh();
    }

    fn r#where(&mut self, predicate: &mut dyn FnMut(&dyn Property) -> bool) {
        if self.has_error() {
            return;
        }
        let found = self
            .current
            .children
            .iter()
            .position(|child| predicate(child));
        match found {
            Some(index) => {
                self.stack.push(Step::Index(index));
                self.refresh();
            }
            None => self.fail("no element satisfies the given predicate"),
        }
    }

    fn add(&mut self, value: Value) {
        if self.has_error() {
            return;
        }
        let multi_valued = self.current.attribute.multi_valued;
        match self.locate_value_mut() {
            Some(slot) => {
                if multi_valued {
                    if !slot.is_array() {
                        *slot = Value::Array(Vec::new());
                    }
                    slot.as_array_mut().expect("just ensured array").push(value);
                } else {
                    *slot = value;
                }
                self.refresh();
            }
            None => self.fail("cannot add: current position has no parent container"),
        }
    }

    fn replace(&mut self, value: Value) {
        if self.has_error() {
            return;
        }
        match self.locate_value_mut() {
            Some(slot) => {
                *slot = value;
                self.refresh();
            }
            None => self.fail("cannot replace: current position has no parent container"),
        }
    }

    fn delete(&mut self) {
        if self.has_error() {
            return;
        }
        let Some(last) = self.stack.last().cloned() else {
            self.fail("cannot delete the root of a resource");
            return;
        };
        let parent_stack_len = self.stack.len() - 1;
        let mut parent = &mut self.root_value;
        for step in &self.stack[..parent_stack_len] {
            parent = match step {
                Step::Field(name) => match parent.as_object_mut().and_then(|o| o.get_mut(name)) {
                    Some(p) => p,
                    None => {
                        self.fail("cannot delete: parent path no longer exists");
                        return;
                    }
                },
                Step::Index(i) => match parent.as_array_mut().and_then(|a| a.get_mut(*i)) {
                    Some(p) => p,
                    None => {
                        self.fail("cannot delete: parent path no longer exists");
                        return;
                    }
                },
            };
        }
        match last {
            Step::Field(name) => {
                if let Some(obj) = parent.as_object_mut() {
                    obj.remove(&name);
                }
            }
            Step::Index(i) => {
                if let Some(arr) = parent.as_array_mut() {
                    if i < arr.len() {
                        arr.remove(i);
                    }
                }
            }
        }
        self.stack.pop();
        self.refresh();
    }

    fn retract(&mut self) {
        if self.has_error() {
            return;
        }
        self.stack.pop();
        self.refresh();
    }

    fn current(&self) -> Option<&dyn Property> {
        if self.has_error() {
            return None;
        }
        Some(&self.current)
    }

    fn error(&self) -> Option<&ModelError> {
        self.error.as_ref()
    }

    fn clear_error(&mut self) {
        self.error = None;
    }
}
