//! Compiled, read-only view of a rule store.
//!
//! A [`RuleStore`] is built once (the bulk-load phase) and then only read.
//! `CompiledRules` is the steady-state side of that split: it borrows a
//! finished store and pre-indexes its applicability list so that a lookup
//! evaluates each distinct query once instead of once per entry.
//!
//! ```text
//! entries                         RuleIndex::groups
//! #0 self::msup                   "self::msup"  -> [#0, #1]
//! #1 self::msup & ./*[2]=2   ──▶  "self::mfrac" -> [#2]
//! #2 self::mfrac
//! ```
//!
//! Many rules share a query and differ only in their constraints (a general
//! `msup` rule plus specialised squares, cubes, primes), so the query
//! evaluator, typically the expensive part, runs far less often.
//!
//! ## Invariants
//!
//! - `RuleId` is an index into `RuleStore::entries`; the borrow on the store
//!   guarantees the list cannot change while the index exists.
//! - Groups are ordered by the first appearance of their query and ids
//!   inside a group are ascending. Selection does not rely on that order
//!   (ties are decided on the id itself), but it keeps debug output stable.
//! - A lookup through `CompiledRules` returns exactly what
//!   `RuleStore::lookup_rule` returns for the same arguments.

use super::selector::{most_specific, query_holds};
use super::store::RuleStore;
use crate::api::{Evaluator, Lookup};
use crate::{Action, Result};
use std::collections::HashMap;
use tracing::debug;

/// Rule identifier (index into the store's entry list).
pub(crate) type RuleId = usize;

/// Entries sharing one query expression.
#[derive(Debug, Clone)]
pub struct QueryGroup<'a> {
    pub query: &'a str,
    pub rules: Vec<RuleId>,
}

#[derive(Debug, Default, Clone)]
pub struct RuleIndex<'a> {
    pub groups: Vec<QueryGroup<'a>>,
}

impl<'a> RuleIndex<'a> {
    fn build(store: &'a RuleStore) -> Self {
        let mut slots: HashMap<&'a str, usize> = HashMap::new();
        let mut groups: Vec<QueryGroup<'a>> = Vec::new();
        for (id, entry) in store.entries().iter().enumerate() {
            let query = entry.precondition.query.as_str();
            let slot = *slots.entry(query).or_insert_with(|| {
                groups.push(QueryGroup { query, rules: Vec::new() });
                groups.len() - 1
            });
            groups[slot].rules.push(id);
        }
        RuleIndex { groups }
    }
}

/// A store plus its query index.
#[derive(Debug, Clone)]
pub struct CompiledRules<'a> {
    pub store: &'a RuleStore,
    pub index: RuleIndex<'a>,
}

impl<'a> CompiledRules<'a> {
    pub fn new(store: &'a RuleStore) -> Self {
        let index = RuleIndex::build(store);
        debug!(entries = store.len(), queries = index.groups.len(), "compiled rule index");
        CompiledRules { store, index }
    }

    /// Same contract as [`RuleStore::lookup_rule`].
    pub fn lookup_rule<N, E>(&self, node: &N, domain: &str, style: &str, eval: &E) -> Result<Option<&'a Action>>
    where
        N: PartialEq,
        E: Evaluator<N> + ?Sized,
    {
        Ok(self.lookup_rule_verbose(node, domain, style, eval)?.map(|found| found.action))
    }

    /// Same contract as [`RuleStore::lookup_rule_verbose`].
    pub fn lookup_rule_verbose<N, E>(
        &self,
        node: &N,
        domain: &str,
        style: &str,
        eval: &E,
    ) -> Result<Option<Lookup<'a>>>
    where
        N: PartialEq,
        E: Evaluator<N> + ?Sized,
    {
        let entries = self.store.entries();
        let mut candidates = Vec::new();
        for group in &self.index.groups {
            if !query_holds(node, group.query, eval) {
                continue;
            }
            for &id in &group.rules {
                let precondition = &entries[id].precondition;
                if precondition.constraints.iter().all(|c| eval.apply_constraint(node, c)) {
                    candidates.push((id, precondition.specificity()));
                }
            }
        }
        match most_specific(candidates) {
            Some(selection) => self.store.resolve_selection(selection, domain, style).map(Some),
            None => Ok(None),
        }
    }

    /// Number of distinct queries.
    pub fn query_count(&self) -> usize {
        self.index.groups.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{TestEval, node};
    use crate::rules::mathml;

    #[test]
    fn groups_entries_by_query() {
        let mut store = RuleStore::new();
        store.define_rule("msup", "Mathml", "default.default", "[n] ./*[1]", "self::msup", &[]).unwrap();
        store.define_rule("mfrac", "Mathml", "default.default", "[n] ./*[1]", "self::mfrac", &[]).unwrap();
        store.define_rule("square", "Mathml", "default.default", "[n] ./*[1]", "self::msup", &["sq"]).unwrap();

        let compiled = CompiledRules::new(&store);
        assert_eq!(compiled.query_count(), 2);
        assert_eq!(compiled.index.groups[0].query, "self::msup");
        assert_eq!(compiled.index.groups[0].rules, vec![0, 2]);
        assert_eq!(compiled.index.groups[1].rules, vec![1]);
    }

    #[test]
    fn agrees_with_plain_lookup() {
        let store = mathml::store();
        let compiled = CompiledRules::new(&store);
        let evals = [TestEval::holding(&[]), TestEval::holding(mathml::SQUARE_CONSTRAINTS)];
        let tags = ["math", "mi", "mn", "mo", "msup", "msub", "msubsup", "mfrac", "msqrt", "mroot", "mtable", "svg"];
        let styles = [("default", "default"), ("mathspeak", "brief"), ("geometry", "verbose")];

        for eval in &evals {
            for (id, tag) in tags.iter().enumerate() {
                for (domain, style) in styles {
                    let n = node(id as u32, tag);
                    let plain = store.lookup_rule_verbose(&n, domain, style, eval).unwrap();
                    let fast = compiled.lookup_rule_verbose(&n, domain, style, eval).unwrap();
                    assert_eq!(plain.map(|l| (l.position, l.candidates)), fast.map(|l| (l.position, l.candidates)));
                    assert_eq!(plain.map(|l| l.action), fast.map(|l| l.action), "{tag} {domain}.{style}");
                }
            }
        }
    }

    #[test]
    fn compiled_view_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CompiledRules<'static>>();
    }
}
