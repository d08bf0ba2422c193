use crate::Attribute;

/// One comparison a [`Property`] may or may not be able to perform.
///
/// `pr` (presence) is intentionally not a variant here. It has no
/// right-hand literal and is tested through [`Property::present`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Eq,
    Ne,
    Sw,
    Ew,
    Co,
    Gt,
    Ge,
    Lt,
    Le,
}

/// A right-hand filter literal, already normalised against the type of the
/// attribute it is being compared to.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Str(String),
    Integer(i64),
    Decimal(f64),
    Boolean(bool),
}

/// A schema-typed node in the resource tree.
///
/// A property may implement some or none of the relational capabilities.
/// [`supports`](Property::supports) is consulted before
/// [`compare`](Property::compare) is ever called, and the evaluator treats
/// an unsupported capability as a `false` branch rather than an error.
pub trait Property {
    /// Schema metadata: type, multi-valued-ness, sub-attributes, annotations.
    fn attribute(&self) -> &Attribute;

    /// The language-neutral value held by this property.
    fn raw(&self) -> serde_json::Value;

    /// Whether this property can evaluate the given relational capability.
    fn supports(&self, capability: Capability) -> bool {
        let _ = capability;
        false
    }

    /// Evaluates `capability` against `rhs`. Only called when
    /// [`supports`](Property::supports) returned true for the same
    /// capability.
    fn compare(&self, capability: Capability, rhs: &LiteralValue) -> bool {
        let _ = (capability, rhs);
        false
    }

    /// Whether this property is present (non-null, populated). Backs `pr`.
    fn present(&self) -> bool;

    /// Invokes `f` once per child, in the property tree's own iteration
    /// order, which must equal insertion order.
    fn for_each_child(&self, f: &mut dyn FnMut(&dyn Property));

    /// The child at a zero-based index of a multi-valued property, if any.
    fn child_at_index(&self, index: usize) -> Option<&dyn Property>;

    /// A named sub-attribute child of a complex property, if any.
    fn find_child(&self, name: &str) -> Option<&dyn Property>;

    /// The number of children a multi-valued property currently has.
    fn len(&self) -> usize {
        let mut n = 0;
        self.for_each_child(&mut |_| n += 1);
        n
    }

    /// True if this multi-valued property currently has no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
