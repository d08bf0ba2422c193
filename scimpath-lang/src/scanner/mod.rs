//! Byte-level state machine scanners (C2, C3).

mod filter;
mod path;

pub use filter::{Expect, FilterEvent, FilterScanner};
pub use path::{PathEvent, PathScanner};
