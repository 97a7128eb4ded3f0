//! Error types for the docnorm engine.

use thiserror::Error;

/// Result type alias for docnorm operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that fail an invocation as a whole.
///
/// Per-element failures inside a rule module are not errors: they are
/// reported as `RuleFailure` issues and the module continues with the rest
/// of the document.
#[derive(Error, Debug)]
pub enum Error {
    /// The requested processing mode is not recognized.
    #[error("Invalid mode: {0:?} (expected smart-one-click, diagnosis-only, or punctuation-fix)")]
    InvalidMode(String),

    /// The collaborator handed over a model violating its invariants.
    #[error("Malformed document model: {0}")]
    MalformedModel(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidMode("turbo".to_string());
        assert!(err.to_string().contains("turbo"));
        assert!(err.to_string().contains("smart-one-click"));

        let err = Error::MalformedModel("cell at section 0 has no paragraphs".to_string());
        assert!(err.to_string().starts_with("Malformed document model"));
    }
}
