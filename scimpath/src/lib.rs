//! Compiles SCIM path/filter strings (`scimpath-lang`) and drives them
//! against a resource (`scimpath-model`) via the traversal engine
//! (`scimpath-engine`), binding the three into the CRUD operations (C9) and
//! value→filter builder (C10) a client actually calls.
//!
//! None of the three lower crates know about each other's error taxonomies
//! or about registration; this crate is where those concerns meet.

pub mod crud;
pub mod error;
pub mod registry;
pub mod value_filter;

pub use crud::{add, delete, evaluate, replace, seek_sort_target, sort, Order, SortTarget};
pub use error::Error;
pub use registry::{global, Registry};
pub use value_filter::build_value_filter;

pub use scimpath_model::json;
pub use scimpath_model::{Attribute, AttributeType, Navigator, Property};
