//! Built-in rule sets.

pub mod mathml;
