//! Rule load metrics.
//!
//! Rule definition never fails a batch: a broken rule is logged, skipped, and
//! remembered here so that embedders and tests can check how much of a table
//! actually loaded.
//!
//! ## Design notes
//!
//! - Counters only grow; there is no deletion API on the store.
//! - `errors` keeps the key next to each error because parse errors do not
//!   know which rule they came from.

use crate::RuleError;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadStats {
    /// Successful `define_rule` calls (including the MathML helpers).
    pub defined: usize,
    /// Successful `define_rule_alias` calls.
    pub aliases: usize,
    /// Mappings added without a precondition: specialised rules and tables.
    pub mappings: usize,
    /// Every skipped definition, with the key it was meant for.
    pub errors: Vec<(String, RuleError)>,
}

impl LoadStats {
    pub fn skipped(&self) -> usize {
        self.errors.len()
    }

    /// True when nothing was skipped.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Keys whose definitions failed, in failure order.
    pub fn failed_keys(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|(key, _)| key.as_str())
    }
}
