//! Walks a compiled `scimpath-lang` expression against a `scimpath-model`
//! resource tree: the traverser (C7) descends the navigator along a path,
//! and the evaluator (C8) reduces a filter's operator tree to a boolean.
//!
//! Neither component parses text. Both consume the [`scimpath_lang::Expr`]
//! trees the compilers already built. See the `scimpath` facade crate for
//! the CRUD operations that tie path compilation, traversal, and this
//! crate's error taxonomy together.

pub mod error;
pub mod evaluator;
pub mod traverser;

pub use error::EngineError;
pub use evaluator::evaluate;
pub use traverser::{traverse, Strategy};
