use std::fmt;

/// A diagnostic raised by a scanner or compiler, carrying the byte offset it
/// was raised at and a short hint alongside a human-readable message.
///
/// Kept separate from the coarse `scimpath::Error` taxonomy. The facade maps
/// a `ScanError` into `InvalidPath` or `InvalidFilter` depending on which
/// compiler raised it, a distinction this type itself doesn't know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanError {
    pub message: String,
    pub offset: usize,
    pub hint: String,
    source: String,
}

impl ScanError {
    pub fn new(message: impl Into<String>, offset: usize, hint: impl Into<String>, source: &str) -> Self {
        ScanError {
            message: message.into(),
            offset,
            hint: hint.into(),
            source: source.to_string(),
        }
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} (at byte {})", self.message, self.offset)?;
        writeln!(f, "  {}", self.source)?;
        let column = self.offset.min(self.source.len());
        writeln!(f, "  {0:1$}^", "", column)?;
        write!(f, "  hint: {}", self.hint)
    }
}

impl std::error::Error for ScanError {}
