//! Drives the path scanner to build the segment linked list, delegating
//! bracketed filters to the filter compiler.

use crate::compile::filter::compile_filter;
use crate::error::ScanError;
use crate::expr::Expr;
use crate::scanner::{PathEvent, PathScanner};
use crate::urn::Urn;

/// Compiles `source` into the head of a path/filter linked list.
///
/// Feeds `source`'s bytes plus the two sentinel `\0` bytes the path scanner
/// expects through [`PathScanner`], accumulating segment tokens on
/// `begin-step`/`end-step` and delegating each `[...]` to
/// [`compile_filter`] on `begin-filter`/`end-filter`.
pub fn compile_path(urn: &Urn, source: &str) -> Result<Expr, ScanError> {
    let bytes: Vec<u8> = source.bytes().chain([0, 0]).collect();
    let mut scanner = PathScanner::new(urn, source);
    let mut nodes: Vec<Expr> = Vec::new();
    let mut seg_start = 0usize;
    let mut filter_start = 0usize;

    let mut i = 0usize;
    loop {
        let byte = bytes[i];
        let event = scanner.step(byte);
        match event {
            PathEvent::BeginStep => seg_start = i,
            PathEvent::EndStep => {
                let end = i.min(source.len());
                nodes.push(Expr::path(&source[seg_start..end]));
            }
            PathEvent::BeginFilter => filter_start = i + 1,
            PathEvent::EndFilter => {
                let inner = &source[filter_start..i];
                nodes.push(compile_filter(urn, inner)?);
            }
            PathEvent::Error(err) => return Err(err),
            PathEvent::End => break,
            PathEvent::Continue => {}
        }
        i += 1;
        if i >= bytes.len() {
            break;
        }
    }

    let mut iter = nodes.into_iter().rev();
    let mut node = iter.next().ok_or_else(|| {
        ScanError::new("empty path", 0, "a path must have at least one segment", source)
    })?;
    for mut prev in iter {
        prev.next = Some(Box::new(node));
        node = prev;
    }
    Ok(node)
}
