//! Precondition matching and rule selection.
//!
//! ```text
//! entries ──filter(matches node)──▶ candidates ──most_specific──▶ winner
//!                                       │
//!                                       └─ empty: no rule (not an error)
//! ```
//!
//! A precondition matches when its query, evaluated with the node as
//! context, returns that very node, and every constraint holds. Among the
//! matches the one with the most constraints wins; equal counts go to the
//! entry registered first.

use crate::api::{Evaluator, PreconditionReport, QueryOutcome};
use crate::{Precondition, RuleEntry};

/// Winner of a selection round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// Index into the entry list.
    pub position: usize,
    /// How many entries matched the node.
    pub candidates: usize,
}

/// Whether `precondition` applies to `node`.
pub fn matches<N, E>(node: &N, precondition: &Precondition, eval: &E) -> bool
where
    N: PartialEq,
    E: Evaluator<N> + ?Sized,
{
    query_holds(node, &precondition.query, eval)
        && precondition.constraints.iter().all(|c| eval.apply_constraint(node, c))
}

pub(crate) fn query_holds<N, E>(node: &N, query: &str, eval: &E) -> bool
where
    N: PartialEq,
    E: Evaluator<N> + ?Sized,
{
    eval.apply_query(node, query).is_some_and(|found| found == *node)
}

/// Select the most specific entry applicable to `node`.
pub fn select<N, E>(entries: &[RuleEntry], node: &N, eval: &E) -> Option<Selection>
where
    N: PartialEq,
    E: Evaluator<N> + ?Sized,
{
    most_specific(
        entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| matches(node, &entry.precondition, eval))
            .map(|(pos, entry)| (pos, entry.precondition.specificity())),
    )
}

/// Pick the winner among `(position, specificity)` pairs. The input order
/// does not matter: ties are decided on position.
pub(crate) fn most_specific(candidates: impl IntoIterator<Item = (usize, usize)>) -> Option<Selection> {
    let mut best: Option<(usize, usize)> = None;
    let mut count = 0;
    for (pos, specificity) in candidates {
        count += 1;
        best = match best {
            Some((best_pos, best_spec)) if best_spec > specificity || (best_spec == specificity && best_pos < pos) => {
                Some((best_pos, best_spec))
            }
            _ => Some((pos, specificity)),
        };
    }
    best.map(|(position, _)| Selection { position, candidates: count })
}

/// Evaluate the query and each constraint of `precondition` separately.
pub(crate) fn diagnose<N, E>(position: usize, precondition: &Precondition, node: &N, eval: &E) -> PreconditionReport
where
    N: PartialEq,
    E: Evaluator<N> + ?Sized,
{
    let query = match eval.apply_query(node, &precondition.query) {
        Some(found) if found == *node => QueryOutcome::SameNode,
        Some(_) => QueryOutcome::OtherNode,
        None => QueryOutcome::NoNode,
    };
    let constraints = precondition.constraints.iter().map(|c| (c.clone(), eval.apply_constraint(node, c))).collect();
    PreconditionReport { position, precondition: precondition.clone(), query, constraints }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FnEvaluator;

    fn entry(key: &str, query: &str, constraints: &[&str]) -> RuleEntry {
        RuleEntry { precondition: Precondition::new(query, constraints), key: key.to_string() }
    }

    // Nodes are tag names; "self::<tag>" selects the node, "parent::*" returns another node.
    fn tag_evaluator() -> impl Evaluator<&'static str> {
        FnEvaluator::new(
            |node: &&'static str, query: &str| match query.strip_prefix("self::") {
                Some(tag) if tag == *node => Some(*node),
                _ if query == "parent::*" => Some("math"),
                _ => None,
            },
            |_: &&'static str, constraint: &str| constraint.starts_with("ok"),
        )
    }

    #[test]
    fn more_constraints_win_regardless_of_order() {
        let eval = tag_evaluator();
        let general_first = vec![entry("msup", "self::msup", &[]), entry("square", "self::msup", &["ok1", "ok2"])];
        let specific_first = vec![entry("square", "self::msup", &["ok1", "ok2"]), entry("msup", "self::msup", &[])];

        let a = select(&general_first, &"msup", &eval).unwrap();
        assert_eq!(general_first[a.position].key, "square");
        assert_eq!(a.candidates, 2);

        let b = select(&specific_first, &"msup", &eval).unwrap();
        assert_eq!(specific_first[b.position].key, "square");
    }

    #[test]
    fn equal_specificity_prefers_earlier_entry() {
        let eval = tag_evaluator();
        let entries = vec![
            entry("other", "self::mi", &[]),
            entry("first", "self::msup", &["ok"]),
            entry("second", "self::msup", &["ok-too"]),
        ];
        let sel = select(&entries, &"msup", &eval).unwrap();
        assert_eq!(entries[sel.position].key, "first");
    }

    #[test]
    fn failing_constraint_excludes_entry() {
        let eval = tag_evaluator();
        let entries = vec![entry("msup", "self::msup", &[]), entry("square", "self::msup", &["ok", "fails"])];
        let sel = select(&entries, &"msup", &eval).unwrap();
        assert_eq!(entries[sel.position].key, "msup");
        assert_eq!(sel.candidates, 1);
    }

    #[test]
    fn query_returning_another_node_is_no_match() {
        let eval = tag_evaluator();
        let entries = vec![entry("parent", "parent::*", &[])];
        assert_eq!(select(&entries, &"msup", &eval), None);

        let report = diagnose(0, &entries[0].precondition, &"msup", &eval);
        assert_eq!(report.query, QueryOutcome::OtherNode);
        assert!(!report.matched());
    }

    #[test]
    fn most_specific_is_order_independent() {
        assert_eq!(most_specific([(4, 1), (2, 1), (7, 0)]), Some(Selection { position: 2, candidates: 3 }));
        assert_eq!(most_specific([(7, 0), (4, 2), (2, 1)]), Some(Selection { position: 4, candidates: 3 }));
        assert_eq!(most_specific(std::iter::empty()), None);
    }
}
