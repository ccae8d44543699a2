extern crate self as speech_rules;

#[macro_use]
mod macros;
mod api;
mod engine;
mod error;
pub mod rules;

pub use api::{Dialect, Evaluator, FnEvaluator, Lookup, Options, PreconditionReport, QueryOutcome};
pub use engine::{
    Atom, CompiledRules, DEFAULT, Fallback, LoadStats, MATHML, MappingTable, QueryGroup, RuleIndex, RuleStore,
    RuleTables, Selection, matches, parse_action, parse_action_with, parse_component, select,
};
pub use error::{Result, RuleError};

use std::fmt;
use std::str::FromStr;

// --- Rule data model --------------------------------------------------------

/// The kind of a single speech instruction.
///
/// ```text
/// [n] ./*[1]           Node         recurse into one sub-node
/// [m] ./*              Multi        recurse into every selected sub-node
/// [t] "super"          Text         speak a literal or evaluated text
/// [p] (pause:200)      Personality  paralinguistic change only
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Node,
    Multi,
    Text,
    Personality,
}

impl ComponentKind {
    /// Canonical three-character marker used when printing rules.
    pub fn marker(self) -> &'static str {
        match self {
            ComponentKind::Node => "[n]",
            ComponentKind::Multi => "[m]",
            ComponentKind::Text => "[t]",
            ComponentKind::Personality => "[p]",
        }
    }

    /// Map a marker back to a kind. `[s]` is the legacy string marker and
    /// reads as `Text`.
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "[n]" => Some(ComponentKind::Node),
            "[m]" => Some(ComponentKind::Multi),
            "[t]" | "[s]" => Some(ComponentKind::Text),
            "[p]" => Some(ComponentKind::Personality),
            _ => None,
        }
    }
}

/// One speech-rendering instruction within an [`Action`].
///
/// Attributes are kept as an ordered list so that unknown names survive a
/// print/parse cycle; the renderer only special-cases a handful of them
/// (`rate`, `pitch`, `pause`, `volume`, `ctxtfunc`, `separator`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub kind: ComponentKind,
    /// Query expression for `Node`/`Multi`/`Text`, empty for `Personality`.
    pub content: String,
    attributes: Vec<(String, String)>,
    /// Set when `content` is the unquoted body of a string literal
    /// (literal dialect only); printing re-adds the quotes.
    literal: bool,
}

impl Component {
    pub fn new(kind: ComponentKind, content: impl Into<String>) -> Self {
        Component { kind, content: content.into(), attributes: Vec::new(), literal: false }
    }

    /// A `Text` component holding the body of a string literal, printed
    /// back with quotes.
    pub fn literal_text(text: impl Into<String>) -> Self {
        Component { kind: ComponentKind::Text, content: text.into(), attributes: Vec::new(), literal: true }
    }

    pub fn personality() -> Self {
        Component::new(ComponentKind::Personality, "")
    }

    /// Builder-style attribute setter.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Set `name` to `value`, overwriting an existing entry in place.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn has_attributes(&self) -> bool {
        !self.attributes.is_empty()
    }

    /// True when the content was parsed from a string literal in the
    /// literal dialect.
    pub fn is_literal(&self) -> bool {
        self.literal
    }

    /// The text of a quoted `Text` component, without quotes, whatever
    /// dialect it was parsed in. `None` for expressions.
    pub fn literal(&self) -> Option<&str> {
        if self.kind != ComponentKind::Text {
            return None;
        }
        if self.literal {
            return Some(&self.content);
        }
        let c = self.content.as_str();
        if c.len() >= 2 && c.starts_with('"') && c.ends_with('"') { Some(&c[1..c.len() - 1]) } else { None }
    }

    /// Attribute-set equality, ignoring attribute order.
    pub fn same_as(&self, other: &Component) -> bool {
        self.kind == other.kind
            && self.content == other.content
            && self.literal == other.literal
            && self.attributes.len() == other.attributes.len()
            && self.attributes.iter().all(|(k, v)| other.attribute(k) == Some(v.as_str()))
    }

    pub(crate) fn mark_literal(&mut self) {
        self.literal = true;
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.marker())?;
        if self.literal {
            write!(f, " \"{}\"", self.content.replace('"', "\\\""))?;
        } else if !self.content.is_empty() {
            write!(f, " {}", self.content)?;
        }
        if self.kind == ComponentKind::Personality && self.attributes.is_empty() {
            f.write_str(" ()")?;
        } else if !self.attributes.is_empty() {
            let attrs: Vec<String> = self.attributes.iter().map(|(k, v)| format!("{k}:{v}")).collect();
            write!(f, " ({})", attrs.join(", "))?;
        }
        Ok(())
    }
}

/// An ordered list of components: the result of parsing one rule string and
/// the unit returned by a successful lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Action {
    pub components: Vec<Component>,
}

impl Action {
    pub fn new(components: Vec<Component>) -> Self {
        Action { components }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Component> {
        self.components.iter()
    }

    /// Component-wise equality with attribute order ignored.
    pub fn same_as(&self, other: &Action) -> bool {
        self.components.len() == other.components.len()
            && self.components.iter().zip(&other.components).all(|(a, b)| a.same_as(b))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, comp) in self.components.iter().enumerate() {
            if idx > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{comp}")?;
        }
        Ok(())
    }
}

impl FromStr for Action {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self> {
        parse_action(s)
    }
}

impl<'a> IntoIterator for &'a Action {
    type Item = &'a Component;
    type IntoIter = std::slice::Iter<'a, Component>;

    fn into_iter(self) -> Self::IntoIter {
        self.components.iter()
    }
}

/// Applicability test for a rule: a node query plus conjunctive constraints.
///
/// Both are opaque expression strings handed to an [`Evaluator`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Precondition {
    pub query: String,
    pub constraints: Vec<String>,
}

impl Precondition {
    pub fn new(query: impl Into<String>, constraints: &[&str]) -> Self {
        Precondition { query: query.into(), constraints: constraints.iter().map(|c| c.to_string()).collect() }
    }

    /// Number of constraints; the specificity used for rule selection.
    pub fn specificity(&self) -> usize {
        self.constraints.len()
    }
}

impl fmt::Display for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.query)?;
        for c in &self.constraints {
            write!(f, " & {c}")?;
        }
        Ok(())
    }
}

/// One row of the store's ordered applicability list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleEntry {
    pub precondition: Precondition,
    pub key: String,
}

/// Static rule definition, usually built with the [`rule!`] macro and fed to
/// [`RuleStore::define`].
#[derive(Debug, Clone, Copy)]
pub struct RuleDefinition {
    pub key: &'static str,
    pub category: &'static str,
    pub domain: &'static str,
    pub text: &'static str,
    pub query: &'static str,
    pub constraints: &'static [&'static str],
}
