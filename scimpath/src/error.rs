//! The coarse, exported error taxonomy: `invalid-path`, `invalid-filter`,
//! `invalid-value`, `no-target`. A [`scimpath_lang::ScanError`] is classified
//! into `InvalidPath` or `InvalidFilter` depending on which compiler raised
//! it. That distinction is context the scanner's own error type doesn't
//! carry, so the mapping lives here rather than as a blanket `From`.
//! A [`scimpath_engine::EngineError`] maps unconditionally, one variant to
//! the matching one, since the engine's taxonomy is already a strict subset
//! of this one.

use scimpath_engine::EngineError;
use scimpath_lang::ScanError;

/// An error surfaced by any `scimpath` operation.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("invalid filter: {0}")]
    InvalidFilter(String),
    #[error("invalid value: {0}")]
    InvalidValue(String),
    #[error("no target: {0}")]
    NoTarget(String),
}

impl Error {
    /// Classifies a [`ScanError`] raised while compiling a path.
    pub(crate) fn from_path_scan(err: ScanError) -> Self {
        Error::InvalidPath(err.to_string())
    }

    /// Classifies a [`ScanError`] raised while compiling a filter.
    pub(crate) fn from_filter_scan(err: ScanError) -> Self {
        Error::InvalidFilter(err.to_string())
    }
}

impl From<EngineError> for Error {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidFilter(message) => Error::InvalidFilter(message),
            EngineError::InvalidValue(message) => Error::InvalidValue(message),
            EngineError::NoTarget(message) => Error::NoTarget(message),
        }
    }
}
