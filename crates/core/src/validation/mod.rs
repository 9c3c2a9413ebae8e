//! Requirement validation engine.
//!
//! Two entry points, both pure functions over caller-supplied data:
//! [`structure::validate_rule_structure`] gates a rule set's
//! publication, and [`engine::validate`] evaluates a student's course
//! history against a published version. No database access, no I/O.

pub mod codes;
pub mod criteria;
pub mod engine;
pub mod equivalency;
pub mod evaluator;
pub mod graph;
pub mod result;
pub mod rules;
pub mod structure;
