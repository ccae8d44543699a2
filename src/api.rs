use crate::engine::Fallback;
use crate::{Action, Precondition};
use serde::Deserialize;

/// How quoted `Text` content is stored by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Keep the surrounding quotes in `content` (`"super"`).
    #[default]
    Quoted,
    /// Store the trimmed literal body (`super`) and flag the component as a
    /// literal so it is re-quoted when printed.
    Literal,
}

/// Options that affect rule parsing.
///
/// Deserializable so that embedders can ship them next to their rule
/// tables:
///
/// ```
/// let opts: speech_rules::Options = serde_json::from_str(r#"{ "dialect": "literal" }"#).unwrap();
/// assert_eq!(opts.dialect, speech_rules::Dialect::Literal);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Options {
    pub dialect: Dialect,
}

/// The environment a rule store needs from its host: a node query evaluator
/// and a constraint evaluator. Both must be side-effect free.
///
/// `N` is usually a cheap node handle (an arena index, an `Rc`), compared
/// with `==` to decide whether a query "resolved to the same node".
pub trait Evaluator<N> {
    /// Evaluate `query` with `node` as context. A precondition only matches
    /// when this returns the very node it was given.
    fn apply_query(&self, node: &N, query: &str) -> Option<N>;

    /// Evaluate a boolean constraint expression against `node`.
    fn apply_constraint(&self, node: &N, constraint: &str) -> bool;
}

/// An [`Evaluator`] made of two closures.
///
/// ```
/// use speech_rules::{Evaluator, FnEvaluator};
///
/// let eval = FnEvaluator::new(|n: &u32, q: &str| (q == "self::*").then_some(*n), |_: &u32, _: &str| true);
/// assert_eq!(eval.apply_query(&7, "self::*"), Some(7));
/// ```
pub struct FnEvaluator<Q, C> {
    query: Q,
    constraint: C,
}

impl<Q, C> FnEvaluator<Q, C> {
    pub fn new(query: Q, constraint: C) -> Self {
        FnEvaluator { query, constraint }
    }
}

impl<N, Q, C> Evaluator<N> for FnEvaluator<Q, C>
where
    Q: Fn(&N, &str) -> Option<N>,
    C: Fn(&N, &str) -> bool,
{
    fn apply_query(&self, node: &N, query: &str) -> Option<N> {
        (self.query)(node, query)
    }

    fn apply_constraint(&self, node: &N, constraint: &str) -> bool {
        (self.constraint)(node, constraint)
    }
}

/// Result of [`RuleStore::lookup_rule_verbose`](crate::RuleStore::lookup_rule_verbose).
#[derive(Debug, Clone, Copy)]
pub struct Lookup<'a> {
    /// Key of the atom whose precondition won.
    pub key: &'a str,
    /// Position of the winning entry in the store's applicability list.
    pub position: usize,
    /// Number of preconditions that matched the node.
    pub candidates: usize,
    /// Which parts of the requested `(domain, style)` were defaulted.
    pub fallback: Fallback,
    pub action: &'a Action,
}

/// What the query evaluator returned for a precondition's query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcome {
    /// The node itself: the query holds.
    SameNode,
    /// Some other node (an ancestor, a child); counts as a non-match.
    OtherNode,
    NoNode,
}

/// Per-precondition diagnosis produced by
/// [`RuleStore::debug_precondition`](crate::RuleStore::debug_precondition).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreconditionReport {
    pub position: usize,
    pub precondition: Precondition,
    pub query: QueryOutcome,
    /// Each constraint with its individual result, in definition order.
    pub constraints: Vec<(String, bool)>,
}

impl PreconditionReport {
    /// Whether this precondition, as a whole, matches the node.
    pub fn matched(&self) -> bool {
        self.query == QueryOutcome::SameNode && self.constraints.iter().all(|(_, ok)| *ok)
    }
}

impl std::fmt::Display for PreconditionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let q = match self.query {
            QueryOutcome::SameNode => "true",
            QueryOutcome::OtherNode => "false (other node)",
            QueryOutcome::NoNode => "false",
        };
        write!(f, "#{} {}: {}", self.position, self.precondition.query, q)?;
        for (c, ok) in &self.constraints {
            write!(f, "\n  {c}: {ok}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_default_to_quoted_dialect() {
        let opts: Options = serde_json::from_str("{}").unwrap();
        assert_eq!(opts.dialect, Dialect::Quoted);
    }

    #[test]
    fn report_matches_only_with_same_node_and_all_constraints() {
        let mut report = PreconditionReport {
            position: 0,
            precondition: Precondition::new("self::msup", &["a", "b"]),
            query: QueryOutcome::SameNode,
            constraints: vec![("a".into(), true), ("b".into(), true)],
        };
        assert!(report.matched());

        report.constraints[1].1 = false;
        assert!(!report.matched());

        report.constraints[1].1 = true;
        report.query = QueryOutcome::OtherNode;
        assert!(!report.matched());
    }
}
