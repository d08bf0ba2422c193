//! C5 (path compiler) and C6 (filter compiler): drive the scanners in
//! `scanner` to produce [`crate::expr::Expr`] trees.

pub mod filter;
pub mod path;

pub use filter::compile_filter;
pub use path::compile_path;
