//! Requirement evaluation against a resolved equivalency map.
//!
//! Pure logic: the caller resolves equivalencies first (see
//! [`super::equivalency`]) and passes the map in together with the
//! student's records and aggregate numbers. Rules are processed in
//! topological order over the alternatives graph, which the admission
//! gate guarantees is acyclic for published versions, so each rule's
//! alternatives are already decided when the rule itself is visited.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use regex::Regex;
use serde_json::Value;

use super::codes;
use super::criteria::{CriteriaRegistry, CriterionContext};
use super::equivalency::EquivalencyMap;
use super::graph::RuleGraph;
use super::result::{Severity, ValidationIssue};
use super::rules::{RequirementRule, RequirementRules};
use crate::student::{StudentAcademicInfo, StudentCourseRecord};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A `(target code, source code, credits)` articulation a rule matched.
type MatchedCourse = (String, String, f64);

/// Outcome of evaluating one rule set for one student.
#[derive(Debug)]
pub struct EvaluationOutcome {
    /// Rule id -> satisfied, for every rule in the set.
    pub per_rule: BTreeMap<String, bool>,
    /// All required rules satisfied, credit threshold met, GPA floor met.
    pub overall: bool,
    /// Satisfied share of all rules, 0-100.
    pub completion_pct: u8,
    /// Credits counted toward the total threshold.
    pub credits_applied: f64,
    /// Rule ids in the order they were evaluated.
    pub evaluated_rules: Vec<String>,
    pub issues: Vec<(Severity, ValidationIssue)>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Satisfied share of all rules as a 0-100 percentage.
///
/// An empty rule set is vacuously complete (100), unlike a set where
/// nothing is satisfied yet (0).
pub fn compute_completion_pct(total_rules: usize, satisfied_rules: usize) -> u8 {
    if total_rules == 0 {
        return 100;
    }
    let pct = (satisfied_rules as f64 / total_rules as f64 * 100.0).round() as u8;
    pct.min(100)
}

/// Resolved articulations a rule's criteria reference: targets named in
/// its `courses` criterion plus targets matching its `course_pattern`.
fn matched_courses(rule: &RequirementRule, map: &EquivalencyMap) -> Vec<MatchedCourse> {
    let mut targets: BTreeSet<&str> = BTreeSet::new();

    if let Some(config) = rule.criteria.get("courses") {
        let codes = match config {
            Value::Array(codes) => Some(codes),
            Value::Object(obj) => obj.get("codes").and_then(|c| c.as_array()),
            _ => None,
        };
        for code in codes.into_iter().flatten().filter_map(|c| c.as_str()) {
            targets.insert(code);
        }
    }

    if let Some(pattern) = rule.criteria.get("course_pattern").and_then(|p| p.as_str()) {
        if let Ok(re) = Regex::new(pattern) {
            targets.extend(map.keys().map(|k| k.as_str()).filter(|t| re.is_match(t)));
        }
    }

    let mut matched = Vec::new();
    for target in targets {
        if let Some(resolutions) = map.get(target) {
            for r in resolutions {
                matched.push((target.to_string(), r.source_course.clone(), r.resolved_credits));
            }
        }
    }
    matched
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Evaluate a rule set against the resolved equivalency map.
pub fn evaluate(
    rules: &RequirementRules,
    map: &EquivalencyMap,
    courses: &[StudentCourseRecord],
    academic: &StudentAcademicInfo,
) -> EvaluationOutcome {
    evaluate_with_registry(rules, map, courses, academic, &CriteriaRegistry::default())
}

/// Evaluate with a caller-extended criterion registry.
pub fn evaluate_with_registry(
    rules: &RequirementRules,
    map: &EquivalencyMap,
    courses: &[StudentCourseRecord],
    academic: &StudentAcademicInfo,
    registry: &CriteriaRegistry,
) -> EvaluationOutcome {
    let mut issues: Vec<(Severity, ValidationIssue)> = Vec::new();
    let ctx = CriterionContext {
        map,
        academic,
        courses,
    };

    let rule_by_id: HashMap<&str, &RequirementRule> =
        rules.rules.iter().map(|r| (r.id.as_str(), r)).collect();
    let order = RuleGraph::build(&rules.rules).topological_order();

    let mut per_rule: BTreeMap<String, bool> = BTreeMap::new();
    // Articulations each satisfied rule is backed by; a rule satisfied
    // through an alternative is backed by the alternative's courses.
    let mut backing: HashMap<&str, Vec<MatchedCourse>> = HashMap::new();

    for rule_id in &order {
        let rule = match rule_by_id.get(rule_id.as_str()) {
            Some(rule) => *rule,
            None => continue,
        };

        let matched = matched_courses(rule, map);
        let matched_credits: f64 = matched.iter().map(|(_, _, c)| c).sum();

        let mut satisfied_here = registry.evaluate(&rule.criteria, &ctx).unwrap_or(false);
        if satisfied_here {
            if let Some(min) = rule.min_credits {
                satisfied_here = matched_credits >= min;
            }
        }

        let mut satisfied = satisfied_here;
        if satisfied {
            backing.insert(rule.id.as_str(), matched);
        } else {
            let satisfying_alt = rule
                .alternatives
                .iter()
                .find(|alt| per_rule.get(alt.as_str()).copied().unwrap_or(false));
            if let Some(alt) = satisfying_alt {
                satisfied = true;
                let alt_backing = backing.get(alt.as_str()).cloned().unwrap_or_default();
                backing.insert(rule.id.as_str(), alt_backing);
                issues.push((
                    Severity::Info,
                    ValidationIssue::with_context(
                        codes::ALTERNATIVE_SATISFIED,
                        format!("Rule '{}' satisfied via alternative rule '{alt}'", rule.id),
                        rule.id.clone(),
                    ),
                ));
            }
        }

        if !satisfied && rule.required {
            issues.push((
                Severity::Error,
                ValidationIssue::with_context(
                    codes::RULE_NOT_SATISFIED,
                    format!("Required rule '{}' is not satisfied", rule.id),
                    rule.id.clone(),
                ),
            ));
        }

        per_rule.insert(rule.id.clone(), satisfied);
    }

    // Credit accounting: each articulation counts once across all
    // required rules, and a rule's contribution is capped by its
    // max_credits. A rule set with no rules at all is a plain credit
    // threshold, so every resolved articulation counts.
    let mut counted: BTreeSet<(String, String)> = BTreeSet::new();
    let mut credits_applied = 0.0;
    if rules.rules.is_empty() {
        for (target, resolutions) in map {
            for r in resolutions {
                if counted.insert((target.clone(), r.source_course.clone())) {
                    credits_applied += r.resolved_credits;
                }
            }
        }
    }
    for rule_id in &order {
        let rule = match rule_by_id.get(rule_id.as_str()) {
            Some(rule) => *rule,
            None => continue,
        };
        if !rule.required || !per_rule.get(rule_id).copied().unwrap_or(false) {
            continue;
        }
        let mut rule_credits = 0.0;
        for (target, source, credits) in backing.get(rule.id.as_str()).into_iter().flatten() {
            if counted.contains(&(target.clone(), source.clone())) {
                continue;
            }
            if let Some(max) = rule.max_credits {
                if rule_credits + credits > max {
                    continue;
                }
            }
            counted.insert((target.clone(), source.clone()));
            rule_credits += credits;
        }
        credits_applied += rule_credits;
    }

    if credits_applied < rules.total_credits {
        issues.push((
            Severity::Error,
            ValidationIssue::with_context(
                codes::INVALID_CREDITS,
                format!(
                    "Applied credits {credits_applied} do not meet the required total of {}",
                    rules.total_credits
                ),
                "total_credits".to_string(),
            ),
        ));
    }

    let mut gpa_ok = true;
    if let Some(minimum) = rules.minimum_gpa {
        match academic.gpa {
            None => {
                gpa_ok = false;
                issues.push((
                    Severity::Error,
                    ValidationIssue::with_context(
                        codes::DATA_INCOMPLETE,
                        format!(
                            "Student GPA was not supplied but the requirement sets a \
                             minimum_gpa of {minimum}"
                        ),
                        "minimum_gpa".to_string(),
                    ),
                ));
            }
            Some(gpa) if gpa < minimum => {
                gpa_ok = false;
                issues.push((
                    Severity::Error,
                    ValidationIssue::with_context(
                        codes::INVALID_GPA,
                        format!("Student GPA {gpa} is below the required minimum_gpa {minimum}"),
                        "minimum_gpa".to_string(),
                    ),
                ));
            }
            Some(_) => {}
        }
    }

    let satisfied_count = per_rule.values().filter(|s| **s).count();
    let required_ok = rules
        .rules
        .iter()
        .filter(|r| r.required)
        .all(|r| per_rule.get(&r.id).copied().unwrap_or(false));
    let credits_ok = credits_applied >= rules.total_credits;

    let outcome = EvaluationOutcome {
        completion_pct: compute_completion_pct(per_rule.len(), satisfied_count),
        overall: required_ok && credits_ok && gpa_ok,
        per_rule,
        credits_applied,
        evaluated_rules: order,
        issues,
    };

    tracing::debug!(
        overall = outcome.overall,
        completion_pct = outcome.completion_pct,
        credits_applied = outcome.credits_applied,
        "rules evaluated"
    );
    outcome
}
