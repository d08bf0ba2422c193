//! Path/filter scanners (C2, C3), the URN registry (C1), the expression
//! node (C4), and the compilers that drive them into a tree (C5, C6).
//!
//! This crate has no knowledge of resources, properties, or navigators.
//! See `scimpath-model` for those contracts and `scimpath-engine` for the
//! traverser/evaluator that walks a compiled tree against one.

pub mod compile;
pub mod error;
pub mod expr;
pub mod scanner;
pub mod urn;

pub use compile::{compile_filter, compile_path};
pub use error::ScanError;
pub use expr::{Expr, LogicalOp, RelationalOp, Tag};
pub use urn::Urn;
