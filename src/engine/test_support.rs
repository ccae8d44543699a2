//! Minimal node and evaluator used by the unit tests.
//!
//! Queries understood: `self::<tag>`, `self::mathml:<tag>`, `self::*`, and
//! `parent::*` (always returns a different node). A constraint holds iff it
//! is listed in the evaluator.

use crate::Evaluator;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TestNode {
    pub id: u32,
    pub tag: String,
}

pub(crate) fn node(id: u32, tag: &str) -> TestNode {
    TestNode { id, tag: tag.to_string() }
}

pub(crate) struct TestEval {
    holding: Vec<String>,
}

impl TestEval {
    pub(crate) fn holding(constraints: &[&str]) -> Self {
        TestEval { holding: constraints.iter().map(|c| c.to_string()).collect() }
    }
}

impl Evaluator<TestNode> for TestEval {
    fn apply_query(&self, node: &TestNode, query: &str) -> Option<TestNode> {
        if query == "parent::*" {
            return Some(TestNode { id: u32::MAX, tag: "math".to_string() });
        }
        let tag = query.strip_prefix("self::")?;
        let tag = tag.strip_prefix("mathml:").unwrap_or(tag);
        (tag == "*" || tag == node.tag).then(|| node.clone())
    }

    fn apply_constraint(&self, _node: &TestNode, constraint: &str) -> bool {
        self.holding.iter().any(|c| c == constraint)
    }
}
