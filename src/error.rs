//! Rule engine error types

use thiserror::Error;

/// Result type for rule operations
pub type Result<T> = std::result::Result<T, RuleError>;

/// Rule engine errors.
///
/// A lookup that finds no applicable rule is not an error; it is reported as
/// `Ok(None)` by [`RuleStore::lookup_rule`](crate::RuleStore::lookup_rule).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// Malformed rule text (bad marker, missing content, unbalanced quotes
    /// or parentheses).
    #[error("Rule parsing error: {0}")]
    Parse(String),

    /// Malformed definition arguments, e.g. a domain without a `.` separator.
    #[error("Invalid rule definition: {0}")]
    Definition(String),

    /// Alias or specialisation referring to a key with no atom.
    #[error("Rule alias error: {0}")]
    Alias(String),

    /// No `(domain, style)` fallback resolved, not even `default.default`.
    /// This points at a table that was never seeded, not at bad input.
    #[error("Rule resolution error: {0}")]
    Resolution(String),

    /// Rule tables that could not be deserialized.
    #[error("Rule table error: {0}")]
    Config(String),
}

impl RuleError {
    pub(crate) fn parse(msg: impl Into<String>) -> Self {
        RuleError::Parse(msg.into())
    }

    /// True for errors that indicate broken table construction rather than
    /// bad rule input.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, RuleError::Resolution(_))
    }
}

impl From<serde_json::Error> for RuleError {
    fn from(err: serde_json::Error) -> Self {
        RuleError::Config(err.to_string())
    }
}
