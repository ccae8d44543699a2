//! Default MathML speech rules.
//!
//! `rules.rs` defines the element rules for `default.default` (plus a few
//! specialised ones like "squared"), and `tables.json` adds `mathspeak`
//! variants for some of them through the bulk table loader.

pub mod rules;

#[cfg(test)]
mod tests;

pub use rules::{ALIASES, CUBE_CONSTRAINTS, SQUARE_CONSTRAINTS, get};

use crate::RuleStore;
use crate::engine::MATHML;

/// Extra domain/style mappings, `{ key: { domain: { style: text } } }`.
pub const TABLES: &str = include_str!("tables.json");

/// Build a store holding the default MathML rules.
pub fn store() -> RuleStore {
    let mut store = RuleStore::new();
    define_into(&mut store);
    store
}

/// Define the default MathML rules into an existing store.
///
/// Failures are logged and recorded in the store's stats, never fatal.
pub fn define_into(store: &mut RuleStore) {
    for def in get() {
        let _ = store.define(&def);
    }
    for (key, query) in ALIASES {
        let _ = store.define_rule_alias(key, query, &[]);
    }
    if let Err(err) = store.load_tables(MATHML, TABLES) {
        tracing::warn!(error = %err, "built-in MathML tables did not load");
    }
}

impl RuleStore {
    /// A store preloaded with the default MathML rules.
    pub fn mathml() -> Self {
        store()
    }
}
