use std::fmt;

// ---------------------------------------------------------------------------
// Parameter errors
// ---------------------------------------------------------------------------

/// Errors produced by the connection-parameter model.
///
/// Parsing is deliberately lenient: missing optional URI segments, empty
/// query values, and bare query keys are all normalized silently. The only
/// raised condition is a URI whose scheme/authority structure cannot be
/// decomposed at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamsError {
    /// The URI string could not be decomposed into scheme + host or path.
    /// Carries the offending input verbatim.
    InvalidUri(String),
}

impl fmt::Display for ParamsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamsError::InvalidUri(uri) => {
                write!(f, "Invalid parameters URI: {}", uri)
            }
        }
    }
}

impl std::error::Error for ParamsError {}
