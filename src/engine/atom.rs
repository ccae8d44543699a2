//! Atoms: keyed bundles of actions indexed by domain and style.
//!
//! Every rule key owns one [`Atom`]. Defining the same key again under a
//! different `domain.style` adds a mapping to the existing atom; defining it
//! under the same `domain.style` replaces that one mapping.
//!
//! ```text
//! Atom "msup" (Mathml)
//!   default  ─┬─ default  -> [n] ./*[1]; [t] "super"; [n] ./*[2]
//!             └─ short    -> [n] ./*[1]; [t] "sup"; [n] ./*[2]
//!   mathspeak ── brief    -> [n] ./*[1]; [t] "Sup"; [n] ./*[2]
//! ```
//!
//! ## Resolution
//!
//! [`Atom::resolve`] tries, in order:
//!
//! 1. `(domain, style)`
//! 2. `("default", style)`
//! 3. `("default", "default")`
//!
//! `(domain, "default")` is never tried on its own: a domain that wants a
//! default style has to define it. Failing all three is a table-construction
//! defect and yields [`RuleError::Resolution`].

use crate::{Action, Result, RuleError};
use std::collections::{BTreeMap, BTreeSet};

/// The catch-all domain and style name.
pub const DEFAULT: &str = "default";

bitflags::bitflags! {
    /// Which parts of a requested `(domain, style)` pair were replaced by
    /// `default` during resolution.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Fallback: u8 {
        const DOMAIN = 1 << 0;
        const STYLE  = 1 << 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atom {
    key: String,
    category: String,
    mappings: BTreeMap<String, BTreeMap<String, Action>>,
}

impl Atom {
    pub fn new(key: impl Into<String>, category: impl Into<String>) -> Self {
        Atom { key: key.into(), category: category.into(), mappings: BTreeMap::new() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Store `action` under `(domain, style)`, returning the action it
    /// replaced, if any.
    pub fn add_mapping(&mut self, domain: &str, style: &str, action: Action) -> Option<Action> {
        self.mappings.entry(domain.to_string()).or_default().insert(style.to_string(), action)
    }

    /// Merge every mapping of `other` into `self`. Same `(domain, style)`
    /// entries are overwritten; all others are added. `other`'s key and
    /// category are ignored.
    pub fn add_mappings(&mut self, other: Atom) {
        for (domain, styles) in other.mappings {
            self.mappings.entry(domain).or_default().extend(styles);
        }
    }

    /// Exact lookup without fallback.
    pub fn get(&self, domain: &str, style: &str) -> Option<&Action> {
        self.mappings.get(domain).and_then(|styles| styles.get(style))
    }

    pub fn has_default(&self) -> bool {
        self.get(DEFAULT, DEFAULT).is_some()
    }

    /// Resolve the action for `(domain, style)` through the fallback chain.
    pub fn resolve(&self, domain: &str, style: &str) -> Result<(&Action, Fallback)> {
        let chain = [(domain, style), (DEFAULT, style), (DEFAULT, DEFAULT)];
        for (d, s) in chain {
            if let Some(action) = self.get(d, s) {
                let mut fallback = Fallback::empty();
                fallback.set(Fallback::DOMAIN, d != domain);
                fallback.set(Fallback::STYLE, s != style);
                return Ok((action, fallback));
            }
        }
        Err(RuleError::Resolution(format!(
            "rule {} has no mapping for {domain}.{style} and no {DEFAULT}.{DEFAULT} fallback",
            self.key
        )))
    }

    /// Domain names this atom defines mappings for.
    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.mappings.keys().map(String::as_str)
    }

    /// Style names used under any of this atom's domains.
    pub fn styles(&self) -> BTreeSet<&str> {
        self.mappings.values().flat_map(|styles| styles.keys().map(String::as_str)).collect()
    }

    /// Every `(domain, style, action)` triple in domain/style order.
    pub fn mappings(&self) -> impl Iterator<Item = (&str, &str, &Action)> {
        self.mappings
            .iter()
            .flat_map(|(d, styles)| styles.iter().map(move |(s, a)| (d.as_str(), s.as_str(), a)))
    }

    /// Number of `(domain, style)` mappings.
    pub fn len(&self) -> usize {
        self.mappings.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
