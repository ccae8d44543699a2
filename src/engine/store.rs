//! The rule store.
//!
//! ```text
//!              define_rule(key, category, "domain.style", text, query, cstrs)
//!                  │
//!   parse_action ◀─┤  (parser.rs)
//!                  ├──▶ codomain[key]  : Atom  (domain → style → Action)
//!                  └──▶ entries.push((Precondition, key))
//!
//!              lookup_rule(node, domain, style)
//!                  │
//!   select ◀───────┤  (selector.rs)   entries → winning key
//!                  └──▶ Atom::resolve (atom.rs)  → &Action
//! ```
//!
//! Definitions are best effort: a malformed rule is logged with its key,
//! recorded in [`LoadStats`] and skipped, and the store stays usable. The
//! `Result` returned by each definition call is informational; ignoring it
//! is fine.
//!
//! Construction takes `&mut self` and lookup takes `&self`, so a store that
//! is shared across threads (e.g. behind an `Arc`) is necessarily done
//! loading.

use super::atom::Atom;
use super::metrics::LoadStats;
use super::parser::parse_action_with;
use super::selector::{Selection, diagnose, select};
use crate::api::{Evaluator, Lookup, Options, PreconditionReport};
use crate::{Action, Precondition, Result, RuleDefinition, RuleEntry, RuleError};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Category used by the MathML helpers.
pub const MATHML: &str = "Mathml";

/// Nested `{ domain: { style: rule_text } }` table for one atom.
pub type MappingTable = BTreeMap<String, BTreeMap<String, String>>;

/// `{ key: { domain: { style: rule_text } } }`, the on-disk table format.
pub type RuleTables = BTreeMap<String, MappingTable>;

#[derive(Debug, Default, Clone)]
pub struct RuleStore {
    options: Options,
    codomain: BTreeMap<String, Atom>,
    entries: Vec<RuleEntry>,
    all_domains: BTreeSet<String>,
    all_styles: BTreeSet<String>,
    categories: BTreeSet<String>,
    stats: LoadStats,
}

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: Options) -> Self {
        RuleStore { options, ..Self::default() }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    // --- Definition ---------------------------------------------------------

    /// Define a rule from a static [`RuleDefinition`].
    pub fn define(&mut self, def: &RuleDefinition) -> Result<()> {
        self.define_rule(def.key, def.category, def.domain, def.text, def.query, def.constraints)
    }

    /// Define (or extend) rule `key`.
    ///
    /// `domain` has the form `"outer.style"`. The parsed action is stored
    /// under that pair in the atom for `key`, and `(query, constraints)` is
    /// appended to the applicability list.
    pub fn define_rule(
        &mut self,
        key: &str,
        category: &str,
        domain: &str,
        text: &str,
        query: &str,
        constraints: &[&str],
    ) -> Result<()> {
        let result = split_domain(domain).and_then(|(outer, style)| {
            let action = parse_action_with(text, self.options.dialect)?;
            self.insert_mapping(key, category, outer, style, action);
            self.entries.push(RuleEntry { precondition: Precondition::new(query, constraints), key: key.to_string() });
            debug!(key, domain, query, constraints = constraints.len(), "defined rule");
            Ok(())
        });
        self.record(key, result).map(|()| self.stats.defined += 1)
    }

    /// Define a MathML element rule: category `Mathml`, query
    /// `self::mathml:<key>`, no constraints.
    pub fn define_mathml_rule(&mut self, key: &str, domain: &str, text: &str) -> Result<()> {
        let query = format!("self::mathml:{key}");
        self.define_rule(key, MATHML, domain, text, &query, &[])
    }

    /// [`define_mathml_rule`](Self::define_mathml_rule) in `default.default`.
    pub fn define_default_mathml_rule(&mut self, key: &str, text: &str) -> Result<()> {
        self.define_mathml_rule(key, "default.default", text)
    }

    /// Make the existing rule `key` applicable under another precondition.
    ///
    /// Fails without touching the store if `key` has no atom yet.
    pub fn define_rule_alias(&mut self, key: &str, query: &str, constraints: &[&str]) -> Result<()> {
        let result = if self.codomain.contains_key(key) {
            self.entries.push(RuleEntry { precondition: Precondition::new(query, constraints), key: key.to_string() });
            debug!(key, query, constraints = constraints.len(), "defined rule alias");
            Ok(())
        } else {
            Err(RuleError::Alias(format!("cannot alias {key}: no rule with that key")))
        };
        self.record(key, result).map(|()| self.stats.aliases += 1)
    }

    /// Copy the action of `key` at `old_domain` to `new_domain`, or store
    /// `text` there instead when given. No precondition is added: the
    /// existing ones already point at `key`.
    pub fn define_specialised_rule(
        &mut self,
        key: &str,
        old_domain: &str,
        new_domain: &str,
        text: Option<&str>,
    ) -> Result<()> {
        let result = self.specialise(key, old_domain, new_domain, text);
        self.record(key, result).map(|()| self.stats.mappings += 1)
    }

    fn specialise(&mut self, key: &str, old_domain: &str, new_domain: &str, text: Option<&str>) -> Result<()> {
        let (old_outer, old_style) = split_domain(old_domain)?;
        let (new_outer, new_style) = split_domain(new_domain)?;
        let atom =
            self.codomain.get(key).ok_or_else(|| RuleError::Alias(format!("cannot specialise {key}: no such rule")))?;
        let existing = atom
            .get(old_outer, old_style)
            .ok_or_else(|| RuleError::Alias(format!("cannot specialise {key}: no {old_domain} mapping")))?;
        let action = match text {
            Some(text) => parse_action_with(text, self.options.dialect)?,
            None => existing.clone(),
        };
        let category = atom.category().to_string();
        self.insert_mapping(key, &category, new_outer, new_style, action);
        debug!(key, old_domain, new_domain, "specialised rule");
        Ok(())
    }

    /// Merge a `{ domain: { style: rule_text } }` table into atom `key`,
    /// creating it under `category` if needed. Broken entries are skipped
    /// individually. Returns the number of mappings stored.
    pub fn add_mappings(&mut self, key: &str, category: &str, table: &MappingTable) -> usize {
        let mut added = 0;
        for (domain, styles) in table {
            for (style, text) in styles {
                let result = check_name(domain)
                    .and_then(|()| check_name(style))
                    .and_then(|()| parse_action_with(text, self.options.dialect))
                    .map(|action| self.insert_mapping(key, category, domain, style, action));
                if self.record(key, result).is_ok() {
                    added += 1;
                }
            }
        }
        self.stats.mappings += added;
        added
    }

    /// Load a JSON document of the form `{ key: { domain: { style: text } } }`.
    ///
    /// Only a document that is not valid JSON of that shape fails as a
    /// whole; rule-level errors are skipped like in [`add_mappings`](Self::add_mappings).
    pub fn load_tables(&mut self, category: &str, json: &str) -> Result<usize> {
        let tables: RuleTables = serde_json::from_str(json)?;
        let added: usize = tables.iter().map(|(key, table)| self.add_mappings(key, category, table)).sum();
        debug!(category, atoms = tables.len(), mappings = added, "loaded rule tables");
        Ok(added)
    }

    fn insert_mapping(&mut self, key: &str, category: &str, domain: &str, style: &str, action: Action) {
        let atom = self.codomain.entry(key.to_string()).or_insert_with(|| Atom::new(key, category));
        if atom.category() != category {
            debug!(key, category = atom.category(), ignored = category, "keeping original category");
        }
        if atom.add_mapping(domain, style, action).is_some() {
            debug!(key, domain, style, "replaced mapping");
        }
        self.categories.insert(atom.category().to_string());
        self.all_domains.insert(domain.to_string());
        self.all_styles.insert(style.to_string());
    }

    fn record(&mut self, key: &str, result: Result<()>) -> Result<()> {
        if let Err(err) = &result {
            warn!(key, error = %err, "skipping rule definition");
            self.stats.errors.push((key.to_string(), err.clone()));
        }
        result
    }

    // --- Lookup -------------------------------------------------------------

    /// Find the action for `node` in `(domain, style)`.
    ///
    /// `Ok(None)`: no precondition matches the node. `Err`: a rule matched
    /// but its atom cannot resolve even `default.default`.
    pub fn lookup_rule<N, E>(&self, node: &N, domain: &str, style: &str, eval: &E) -> Result<Option<&Action>>
    where
        N: PartialEq,
        E: Evaluator<N> + ?Sized,
    {
        Ok(self.lookup_rule_verbose(node, domain, style, eval)?.map(|found| found.action))
    }

    /// [`lookup_rule`](Self::lookup_rule) that also reports which entry won,
    /// how many matched, and which fallback was taken.
    pub fn lookup_rule_verbose<N, E>(&self, node: &N, domain: &str, style: &str, eval: &E) -> Result<Option<Lookup<'_>>>
    where
        N: PartialEq,
        E: Evaluator<N> + ?Sized,
    {
        match select(&self.entries, node, eval) {
            Some(selection) => self.resolve_selection(selection, domain, style).map(Some),
            None => {
                debug!(domain, style, "no rule matches node");
                Ok(None)
            }
        }
    }

    pub(crate) fn resolve_selection(&self, selection: Selection, domain: &str, style: &str) -> Result<Lookup<'_>> {
        let entry = &self.entries[selection.position];
        let atom = self
            .codomain
            .get(&entry.key)
            .ok_or_else(|| RuleError::Resolution(format!("entry #{} names unknown rule {}", selection.position, entry.key)))?;
        let (action, fallback) = atom.resolve(domain, style)?;
        debug!(
            key = atom.key(),
            position = selection.position,
            candidates = selection.candidates,
            ?fallback,
            "selected rule"
        );
        Ok(Lookup {
            key: atom.key(),
            position: selection.position,
            candidates: selection.candidates,
            fallback,
            action,
        })
    }

    // --- Introspection ------------------------------------------------------

    /// Every mapping of every atom, one line each:
    /// `key domain.style: <rule text>`.
    pub fn print_all_rules(&self) -> Vec<String> {
        self.codomain
            .values()
            .flat_map(|atom| {
                atom.mappings().map(move |(domain, style, action)| format!("{} {domain}.{style}: {action}", atom.key()))
            })
            .collect()
    }

    /// Evaluate each precondition registered for `key` against `node`, query
    /// and constraints separately, to see why the rule did or did not fire.
    pub fn debug_precondition<N, E>(&self, key: &str, node: &N, eval: &E) -> Vec<PreconditionReport>
    where
        N: PartialEq,
        E: Evaluator<N> + ?Sized,
    {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.key == key)
            .map(|(pos, entry)| diagnose(pos, &entry.precondition, node, eval))
            .collect()
    }

    /// Keys of atoms without a `default.default` mapping. Lookups that
    /// select such an atom can fail with [`RuleError::Resolution`].
    pub fn missing_defaults(&self) -> Vec<&str> {
        self.codomain.values().filter(|atom| !atom.has_default()).map(Atom::key).collect()
    }

    /// Number of applicability entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[RuleEntry] {
        &self.entries
    }

    pub fn atom(&self, key: &str) -> Option<&Atom> {
        self.codomain.get(key)
    }

    pub fn atoms(&self) -> impl Iterator<Item = &Atom> {
        self.codomain.values()
    }

    pub fn all_domains(&self) -> &BTreeSet<String> {
        &self.all_domains
    }

    pub fn all_styles(&self) -> &BTreeSet<String> {
        &self.all_styles
    }

    pub fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    pub fn stats(&self) -> &LoadStats {
        &self.stats
    }
}

/// Split `"outer.style"`; both sides must be non-empty and dot-free.
fn split_domain(domain: &str) -> Result<(&str, &str)> {
    let caps = regex!(r"^\s*([^.\s]+)\.([^.\s]+)\s*$")
        .captures(domain)
        .ok_or_else(|| RuleError::Definition(format!("domain {domain:?} is not of the form outer.style")))?;
    match (caps.get(1), caps.get(2)) {
        (Some(outer), Some(style)) => Ok((outer.as_str(), style.as_str())),
        _ => Err(RuleError::Definition(format!("domain {domain:?} is not of the form outer.style"))),
    }
}

fn check_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains('.') || name.contains(char::is_whitespace) {
        return Err(RuleError::Definition(format!("invalid domain or style name {name:?}")));
    }
    Ok(())
}
