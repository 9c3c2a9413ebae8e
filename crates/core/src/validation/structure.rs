//! Admission-time rule set validation.
//!
//! A requirement version may only be published when this validator
//! returns a valid result, which is what lets the evaluator assume the
//! alternatives graph is acyclic. All violations are collected in one
//! pass so an author sees every problem at once; warnings flag soft
//! issues that do not block publication.

use std::collections::HashSet;

use super::codes;
use super::graph::RuleGraph;
use super::result::{ResultBuilder, ValidationIssue, ValidationResult};
use super::rules::RequirementRules;

/// Validate a rule set's structure ahead of publication.
pub fn validate_rule_structure(rules: &RequirementRules) -> ValidationResult {
    let mut builder = ResultBuilder::new();
    builder.check(codes::CHECK_STRUCTURE);

    check_thresholds(rules, &mut builder);
    check_equivalencies(rules, &mut builder);
    check_rule_graph(rules, &mut builder);

    builder.detail("rule_count", rules.rules.len().into());
    builder.detail("equivalency_count", rules.equivalencies.len().into());

    let result = builder.finish();
    tracing::debug!(
        is_valid = result.is_valid,
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "rule structure validated"
    );
    result
}

/// Total-credit and GPA threshold sanity.
fn check_thresholds(rules: &RequirementRules, builder: &mut ResultBuilder) {
    if !(rules.total_credits > 0.0) {
        builder.error(ValidationIssue::new(
            codes::INVALID_CREDITS,
            format!(
                "total_credits must be positive, got {}",
                rules.total_credits
            ),
        ));
    }

    if let Some(gpa) = rules.minimum_gpa {
        if !(0.0..=4.0).contains(&gpa) {
            builder.error(ValidationIssue::new(
                codes::INVALID_GPA,
                format!("minimum_gpa must be between 0.0 and 4.0, got {gpa}"),
            ));
        }
    }
}

/// Source-code uniqueness and per-entry credit sanity.
fn check_equivalencies(rules: &RequirementRules, builder: &mut ResultBuilder) {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut reported: HashSet<&str> = HashSet::new();

    for entry in &rules.equivalencies {
        if !seen.insert(entry.source_code.as_str())
            && reported.insert(entry.source_code.as_str())
        {
            builder.error(ValidationIssue::with_context(
                codes::DUPLICATE_COURSE,
                format!(
                    "Multiple equivalency entries share source code '{}'",
                    entry.source_code
                ),
                entry.source_code.clone(),
            ));
        }

        if !(entry.credits > 0.0) {
            builder.error(ValidationIssue::with_context(
                codes::INVALID_COURSE_CREDITS,
                format!(
                    "Equivalency '{}' -> '{}' must carry positive credits, got {}",
                    entry.source_code, entry.target_code, entry.credits
                ),
                entry.source_code.clone(),
            ));
        }
    }
}

/// Cycle detection and dangling-reference reporting over the
/// alternatives graph.
fn check_rule_graph(rules: &RequirementRules, builder: &mut ResultBuilder) {
    let graph = RuleGraph::build(&rules.rules);

    for cycle in graph.find_cycles() {
        builder.error(ValidationIssue::with_context(
            codes::CIRCULAR_DEPENDENCY,
            format!(
                "Rule alternatives form a cycle: {}",
                cycle.join(" -> ")
            ),
            cycle.join(","),
        ));
    }

    for (rule_id, missing) in graph.dangling_references() {
        builder.warning(ValidationIssue::with_context(
            codes::DANGLING_REFERENCE,
            format!("Rule '{rule_id}' lists unknown alternative '{missing}'"),
            rule_id.clone(),
        ));
    }
}
