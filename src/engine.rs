//! Rule definition and lookup engine.
//!
//! ## How the parts work together
//!
//! ```text
//! rule text ──▶ parse_action                (parser.rs)
//!                    │ Action
//!                    v
//! define_rule ──▶ RuleStore                 (store.rs)
//!                    ├─ codomain: key → Atom (atom.rs)
//!                    └─ entries:  [(Precondition, key)]
//!                    │
//!                    │  optional, read-only phase
//!                    v
//!               CompiledRules::new          (compiled_rules.rs)
//!                    │
//! node ──────────────┼─ select              (selector.rs)
//!                    │    - evaluate query + constraints via Evaluator
//!                    │    - most constraints wins, earlier entry on ties
//!                    v
//!               Atom::resolve(domain, style)
//!                    - exact → default.style → default.default
//!                    v
//!                 &Action
//! ```
//!
//! ## Responsibilities by module
//!
//! - `parser.rs`: rule strings to `Action`s (quote-aware splitting, markers,
//!   attribute blocks).
//! - `selector.rs`: precondition matching and most-specific selection.
//! - `atom.rs`: per-key domain/style map and its fallback chain.
//! - `store.rs`: definitions, aliases, bulk tables, lookup, introspection.
//! - `compiled_rules.rs`: query-grouped index for the lookup phase.
//! - `metrics.rs`: what a load defined and what it skipped.
//!
//! ## Debugging
//!
//! Every definition, skip, and selection is reported through `tracing`
//! (`debug` for traces, `warn` for skipped rules). With the CLI, set
//! `RUST_LOG=speech_rules=debug`.

#[path = "engine/atom.rs"]
mod atom;
#[path = "engine/compiled_rules.rs"]
mod compiled_rules;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/parser.rs"]
mod parser;
#[path = "engine/selector.rs"]
mod selector;
#[path = "engine/store.rs"]
mod store;
#[cfg(test)]
#[path = "engine/test_support.rs"]
pub(crate) mod test_support;

pub use atom::{Atom, DEFAULT, Fallback};
pub use compiled_rules::{CompiledRules, QueryGroup, RuleIndex};
pub use metrics::LoadStats;
pub use parser::{parse_action, parse_action_with, parse_component};
pub use selector::{Selection, matches, select};
pub use store::{MATHML, MappingTable, RuleStore, RuleTables};
