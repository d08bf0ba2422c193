use std::collections::HashMap;

/// The declared type of a schema attribute.
///
/// Determines the literal normalisation rule the evaluator uses when a
/// filter compares a path against a right-hand literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    String,
    Integer,
    Decimal,
    Boolean,
    DateTime,
    Reference,
    Binary,
    Complex,
}

/// Schema metadata for a single attribute.
///
/// An annotation such as `@Primary` is recorded as a key in `annotations`.
/// The [`Attribute::is_primary`] helper is the one place the traverser's
/// primary-or-first strategy needs to know about it.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub r#type: AttributeType,
    pub multi_valued: bool,
    pub sub_attributes: Vec<Attribute>,
    pub annotations: HashMap<String, bool>,
}

impl Attribute {
    /// Constructs a simple, non-complex attribute.
    pub fn simple(name: impl Into<String>, r#type: AttributeType, multi_valued: bool) -> Self {
        Attribute {
            name: name.into(),
            r#type,
            multi_valued,
            sub_attributes: Vec::new(),
            annotations: HashMap::new(),
        }
    }

    /// Constructs a complex attribute with the given sub-attributes.
    pub fn complex(
        name: impl Into<String>,
        multi_valued: bool,
        sub_attributes: Vec<Attribute>,
    ) -> Self {
        Attribute {
            name: name.into(),
            r#type: AttributeType::Complex,
            multi_valued,
            sub_attributes,
            annotations: HashMap::new(),
        }
    }

    /// Marks this attribute as bearing the `@Primary` annotation, true.
    pub fn with_primary_annotation(mut self) -> Self {
        self.annotations.insert("@Primary".to_string(), true);
        self
    }

    /// True if this attribute is annotated `@Primary` and is boolean-typed,
    /// the exact condition the primary-or-first strategy checks.
    pub fn is_primary(&self) -> bool {
        self.r#type == AttributeType::Boolean
            && self.annotations.get("@Primary").copied().unwrap_or(false)
    }

    /// Finds a direct sub-attribute by name.
    pub fn sub_attribute(&self, name: &str) -> Option<&Attribute> {
        self.sub_attributes.iter().find(|a| a.name == name)
    }
}
