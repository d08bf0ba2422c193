//! External resource contracts consumed by the scimpath compiler and
//! traversal engine: [`Property`], [`Navigator`] and [`Attribute`].
//!
//! None of this crate is owned by the query engine itself. It is the
//! "language-neutral" surface a host application implements over its own
//! resource representation. [`json`] ships a reference implementation over
//! [`serde_json::Value`] that the rest of the workspace tests against, and
//! that downstream users may start from directly.
#![warn(missing_docs)]

mod attribute;
mod error;
mod navigator;
mod property;

pub mod json;

pub use self::{
    attribute::{Attribute, AttributeType},
    error::ModelError,
    navigator::Navigator,
    property::{Capability, LiteralValue, Property},
};
