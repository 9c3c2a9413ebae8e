//! The student-facing validation entry point.
//!
//! Ties the resolver and evaluator together against one pinned,
//! immutable requirement version and aggregates their diagnostics into
//! a single [`ValidationResult`]. Apart from the result timestamp the
//! output is a pure function of the inputs, so identical calls produce
//! identical serialized results.

use serde_json::Value;

use super::codes;
use super::equivalency::resolve_equivalencies;
use super::evaluator::evaluate;
use super::result::{ResultBuilder, ValidationResult};
use crate::requirement::RequirementVersion;
use crate::student::{StudentAcademicInfo, StudentCourseRecord};
use crate::types::Timestamp;

/// Validate a student's course history against a published version.
///
/// `as_of` is the date equivalency validity windows are checked
/// against — normally "now", but historical dates are accepted so past
/// decisions can be reproduced. All business outcomes come back as
/// data; this function does not fail.
pub fn validate(
    version: &RequirementVersion,
    courses: &[StudentCourseRecord],
    academic: &StudentAcademicInfo,
    as_of: Timestamp,
) -> ValidationResult {
    tracing::debug!(
        version_id = version.id,
        requirement_id = version.requirement_id,
        courses = courses.len(),
        "validating course plan"
    );

    let mut builder = ResultBuilder::new();
    let rules = &version.rules;

    builder.check(codes::CHECK_EQUIVALENCY);
    let resolution = resolve_equivalencies(courses, &rules.equivalencies, as_of);
    for (severity, issue) in resolution.issues {
        builder.push(severity, issue);
    }

    builder.check(codes::CHECK_RULES);
    builder.check(codes::CHECK_CREDITS);
    if rules.minimum_gpa.is_some() {
        builder.check(codes::CHECK_GPA);
    }
    let outcome = evaluate(rules, &resolution.map, courses, academic);
    for (severity, issue) in outcome.issues {
        builder.push(severity, issue);
    }

    builder.detail("requirement_id", version.requirement_id.into());
    builder.detail("version_id", version.id.into());
    builder.detail("version_number", version.version_number.into());
    builder.detail("overall", outcome.overall.into());
    builder.detail(
        "per_rule",
        serde_json::to_value(&outcome.per_rule).unwrap_or(Value::Null),
    );
    builder.detail("completion_pct", outcome.completion_pct.into());
    builder.detail("credits_applied", outcome.credits_applied.into());
    builder.evaluated_rules(outcome.evaluated_rules);

    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::rules::{CourseEquivalency, RequirementRule, RequirementRules};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn version() -> RequirementVersion {
        let mut criteria = serde_json::Map::new();
        criteria.insert("courses".to_string(), json!(["MATH1A"]));
        RequirementVersion {
            id: 10,
            requirement_id: 1,
            version_number: 2,
            rules: RequirementRules {
                equivalencies: vec![CourseEquivalency {
                    source_code: "MATH1".to_string(),
                    target_code: "MATH1A".to_string(),
                    credits: 4.0,
                    conditions: None,
                    effective_from: None,
                    effective_until: None,
                }],
                rules: vec![RequirementRule {
                    id: "math-core".to_string(),
                    rule_type: "core".to_string(),
                    criteria,
                    min_credits: None,
                    max_credits: None,
                    required: true,
                    alternatives: Vec::new(),
                }],
                total_credits: 4.0,
                minimum_gpa: Some(3.0),
                additional_criteria: serde_json::Map::new(),
            },
            published_by: 42,
            published_at: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
            change_summary: vec!["initial articulation".to_string()],
        }
    }

    fn completed(code: &str) -> StudentCourseRecord {
        StudentCourseRecord {
            course_code: code.to_string(),
            status: "completed".to_string(),
            term: "2025-FA".to_string(),
            grade: Some("B".to_string()),
            units: 4.0,
        }
    }

    fn as_of() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap()
    }

    #[test]
    fn passing_plan_is_valid() {
        let academic = StudentAcademicInfo {
            gpa: Some(3.2),
            total_units: 4.0,
        };
        let result = validate(&version(), &[completed("MATH1")], &academic, as_of());
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert_eq!(result.details["overall"], json!(true));
        assert_eq!(result.details["completion_pct"], json!(100));
    }

    #[test]
    fn metadata_names_checks_and_rules() {
        let academic = StudentAcademicInfo {
            gpa: Some(3.2),
            total_units: 4.0,
        };
        let result = validate(&version(), &[completed("MATH1")], &academic, as_of());
        assert_eq!(
            result.metadata.checks_run,
            vec![
                codes::CHECK_EQUIVALENCY,
                codes::CHECK_RULES,
                codes::CHECK_CREDITS,
                codes::CHECK_GPA,
            ]
        );
        assert_eq!(result.metadata.evaluated_rules, vec!["math-core".to_string()]);
    }

    #[test]
    fn gpa_check_skipped_without_minimum() {
        let mut v = version();
        v.rules.minimum_gpa = None;
        let academic = StudentAcademicInfo {
            gpa: None,
            total_units: 4.0,
        };
        let result = validate(&v, &[completed("MATH1")], &academic, as_of());
        assert!(result.is_valid);
        assert!(!result.metadata.checks_run.contains(&codes::CHECK_GPA));
    }

    #[test]
    fn details_pin_the_version() {
        let academic = StudentAcademicInfo {
            gpa: Some(3.2),
            total_units: 4.0,
        };
        let result = validate(&version(), &[completed("MATH1")], &academic, as_of());
        assert_eq!(result.details["requirement_id"], json!(1));
        assert_eq!(result.details["version_id"], json!(10));
        assert_eq!(result.details["version_number"], json!(2));
    }
}
