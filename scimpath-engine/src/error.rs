/// An error raised while traversing or evaluating a compiled expression.
///
/// This is narrower than scimpath's exported taxonomy on purpose: the
/// engine never re-parses text, so it has nothing to classify as
/// `invalid-path`. That variant only ever arises at the compiler boundary.
/// The mapping from a failed inner traversal to `invalid-filter` happens in
/// the evaluator, at the point where a relational operator's path walk
/// fails; the facade crate performs the final fold into its own `Error`.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid filter: {0}")]
    InvalidFilter(String),
    #[error("invalid value: {0}")]
    InvalidValue(String),
    #[error("no target: {0}")]
    NoTarget(String),
}
