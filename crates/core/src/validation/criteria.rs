//! Pluggable rule criteria.
//!
//! A rule's `criteria` map is interpreted by a registry of
//! [`CriterionCheck`] implementations rather than hard-coded branching,
//! so new criterion types extend the evaluator without modifying its
//! core. Keys no check can evaluate are skipped — unknown criteria are
//! an extension point, never a failure.

use regex::Regex;
use serde_json::Value;

use super::equivalency::EquivalencyMap;
use crate::student::{grade_points, StudentAcademicInfo, StudentCourseRecord, COURSE_COMPLETED};

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Read-only view a criterion evaluates against.
pub struct CriterionContext<'a> {
    pub map: &'a EquivalencyMap,
    pub academic: &'a StudentAcademicInfo,
    pub courses: &'a [StudentCourseRecord],
}

impl CriterionContext<'_> {
    /// Target codes with at least one resolution.
    fn resolved_targets(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(|k| k.as_str())
    }

    /// Best grade points among the student's completed records of a
    /// source course (retakes keep the highest grade).
    fn best_grade_points(&self, source_code: &str) -> Option<f64> {
        self.courses
            .iter()
            .filter(|c| c.course_code == source_code && c.status == COURSE_COMPLETED)
            .filter_map(|c| c.grade.as_deref().and_then(grade_points))
            .fold(None, |best, p| Some(best.map_or(p, |b: f64| b.max(p))))
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// One criterion type the evaluator understands.
pub trait CriterionCheck {
    /// Whether this check knows how to evaluate the given criteria key.
    fn can_evaluate(&self, key: &str) -> bool;

    /// Evaluate the criterion configuration against the context.
    ///
    /// Returns `None` when the configuration is unusable (wrong shape,
    /// invalid pattern); the key is then skipped like an unknown one.
    fn evaluate(&self, key: &str, config: &Value, ctx: &CriterionContext) -> Option<bool>;
}

// ---------------------------------------------------------------------------
// Built-in criteria
// ---------------------------------------------------------------------------

/// `courses`: a list of target course codes that must resolve.
///
/// Config is either a plain array (any listed code resolving passes) or
/// `{ "codes": [...], "match": "any" | "all" }`.
struct CoursesCriterion;

impl CriterionCheck for CoursesCriterion {
    fn can_evaluate(&self, key: &str) -> bool {
        key == "courses"
    }

    fn evaluate(&self, _key: &str, config: &Value, ctx: &CriterionContext) -> Option<bool> {
        let (codes, match_all) = match config {
            Value::Array(codes) => (codes.as_slice(), false),
            Value::Object(obj) => {
                let codes = obj.get("codes")?.as_array()?.as_slice();
                let match_all = obj.get("match").and_then(|m| m.as_str()) == Some("all");
                (codes, match_all)
            }
            _ => return None,
        };

        let codes: Vec<&str> = codes.iter().filter_map(|c| c.as_str()).collect();
        if codes.is_empty() {
            return None;
        }

        let resolved = |code: &&str| ctx.map.contains_key(*code);
        Some(if match_all {
            codes.iter().all(resolved)
        } else {
            codes.iter().any(resolved)
        })
    }
}

/// `course_pattern`: a regex at least one resolved target code must
/// match, e.g. `^MATH1[AB]$`.
struct CoursePatternCriterion;

impl CriterionCheck for CoursePatternCriterion {
    fn can_evaluate(&self, key: &str) -> bool {
        key == "course_pattern"
    }

    fn evaluate(&self, _key: &str, config: &Value, ctx: &CriterionContext) -> Option<bool> {
        let pattern = config.as_str()?;
        let re = Regex::new(pattern).ok()?;
        Some(ctx.resolved_targets().any(|t| re.is_match(t)))
    }
}

/// `min_courses`: a minimum number of distinct resolved target codes.
///
/// Config is a plain number (counted over the whole map) or
/// `{ "count": n, "codes": [...] }` to count only the listed targets.
struct MinCoursesCriterion;

impl CriterionCheck for MinCoursesCriterion {
    fn can_evaluate(&self, key: &str) -> bool {
        key == "min_courses"
    }

    fn evaluate(&self, _key: &str, config: &Value, ctx: &CriterionContext) -> Option<bool> {
        let (needed, scope) = match config {
            Value::Number(n) => (n.as_u64()?, None),
            Value::Object(obj) => {
                let needed = obj.get("count")?.as_u64()?;
                let scope = obj.get("codes").and_then(|c| c.as_array());
                (needed, scope)
            }
            _ => return None,
        };

        let have = match scope {
            Some(codes) => codes
                .iter()
                .filter_map(|c| c.as_str())
                .filter(|c| ctx.map.contains_key(*c))
                .count(),
            None => ctx.map.len(),
        };
        Some(have as u64 >= needed)
    }
}

/// `min_grade`: a minimum letter grade on the source courses backing
/// the listed targets.
///
/// Config: `{ "grade": "C", "courses": [...] }`; with `courses` absent
/// the floor applies to every resolved course. Source records without
/// grade points (pass/no-pass) fail the floor.
struct MinGradeCriterion;

impl CriterionCheck for MinGradeCriterion {
    fn can_evaluate(&self, key: &str) -> bool {
        key == "min_grade"
    }

    fn evaluate(&self, _key: &str, config: &Value, ctx: &CriterionContext) -> Option<bool> {
        let obj = config.as_object()?;
        let floor = grade_points(obj.get("grade")?.as_str()?)?;
        let scope: Option<Vec<&str>> = obj
            .get("courses")
            .and_then(|c| c.as_array())
            .map(|codes| codes.iter().filter_map(|c| c.as_str()).collect());

        let mut checked_any = false;
        for (target, resolutions) in ctx.map {
            if let Some(scope) = &scope {
                if !scope.contains(&target.as_str()) {
                    continue;
                }
            }
            for resolution in resolutions {
                checked_any = true;
                match ctx.best_grade_points(&resolution.source_course) {
                    Some(points) if points >= floor => {}
                    _ => return Some(false),
                }
            }
        }
        Some(checked_any)
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// The set of criterion checks consulted for each rule.
pub struct CriteriaRegistry {
    checks: Vec<Box<dyn CriterionCheck>>,
}

impl Default for CriteriaRegistry {
    fn default() -> Self {
        Self {
            checks: vec![
                Box::new(CoursesCriterion),
                Box::new(CoursePatternCriterion),
                Box::new(MinCoursesCriterion),
                Box::new(MinGradeCriterion),
            ],
        }
    }
}

impl CriteriaRegistry {
    /// Register an additional criterion check (extension point).
    pub fn with_check(mut self, check: Box<dyn CriterionCheck>) -> Self {
        self.checks.push(check);
        self
    }

    /// Evaluate every evaluable criterion in a rule's criteria map.
    ///
    /// Returns `None` when no key could be evaluated (the rule cannot
    /// be satisfied through its criteria), otherwise `Some(true)` iff
    /// every evaluated criterion passed.
    pub fn evaluate(
        &self,
        criteria: &serde_json::Map<String, Value>,
        ctx: &CriterionContext,
    ) -> Option<bool> {
        let mut evaluated = false;
        let mut all_passed = true;

        for (key, config) in criteria {
            for check in &self.checks {
                if !check.can_evaluate(key) {
                    continue;
                }
                if let Some(passed) = check.evaluate(key, config, ctx) {
                    evaluated = true;
                    all_passed &= passed;
                }
                break;
            }
        }

        evaluated.then_some(all_passed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::equivalency::ResolvedCourse;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn map_with(targets: &[(&str, &str, f64)]) -> EquivalencyMap {
        let mut map: EquivalencyMap = BTreeMap::new();
        for (target, source, credits) in targets {
            map.entry(target.to_string()).or_default().push(ResolvedCourse {
                source_course: source.to_string(),
                resolved_credits: *credits,
            });
        }
        map
    }

    fn course(code: &str, grade: &str) -> StudentCourseRecord {
        StudentCourseRecord {
            course_code: code.to_string(),
            status: COURSE_COMPLETED.to_string(),
            term: "2025-FA".to_string(),
            grade: Some(grade.to_string()),
            units: 4.0,
        }
    }

    fn academic() -> StudentAcademicInfo {
        StudentAcademicInfo {
            gpa: Some(3.0),
            total_units: 12.0,
        }
    }

    fn criteria(pairs: &[(&str, serde_json::Value)]) -> serde_json::Map<String, serde_json::Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    // -- courses --------------------------------------------------------------

    #[test]
    fn courses_any_passes_with_one_resolved() {
        let map = map_with(&[("MATH1A", "MATH1", 4.0)]);
        let courses = [course("MATH1", "B")];
        let ctx = CriterionContext {
            map: &map,
            academic: &academic(),
            courses: &courses,
        };
        let result = CriteriaRegistry::default()
            .evaluate(&criteria(&[("courses", json!(["MATH1A", "STAT2"]))]), &ctx);
        assert_eq!(result, Some(true));
    }

    #[test]
    fn courses_all_requires_every_code() {
        let map = map_with(&[("MATH1A", "MATH1", 4.0)]);
        let courses = [course("MATH1", "B")];
        let ctx = CriterionContext {
            map: &map,
            academic: &academic(),
            courses: &courses,
        };
        let config = json!({ "codes": ["MATH1A", "STAT2"], "match": "all" });
        let result = CriteriaRegistry::default().evaluate(&criteria(&[("courses", config)]), &ctx);
        assert_eq!(result, Some(false));
    }

    #[test]
    fn courses_fails_with_none_resolved() {
        let map = map_with(&[]);
        let ctx = CriterionContext {
            map: &map,
            academic: &academic(),
            courses: &[],
        };
        let result =
            CriteriaRegistry::default().evaluate(&criteria(&[("courses", json!(["MATH1A"]))]), &ctx);
        assert_eq!(result, Some(false));
    }

    // -- course_pattern -------------------------------------------------------

    #[test]
    fn pattern_matches_resolved_target() {
        let map = map_with(&[("MATH1B", "MATH2", 4.0)]);
        let ctx = CriterionContext {
            map: &map,
            academic: &academic(),
            courses: &[],
        };
        let result = CriteriaRegistry::default()
            .evaluate(&criteria(&[("course_pattern", json!("^MATH1[AB]$"))]), &ctx);
        assert_eq!(result, Some(true));
    }

    #[test]
    fn invalid_pattern_is_skipped() {
        let map = map_with(&[("MATH1A", "MATH1", 4.0)]);
        let ctx = CriterionContext {
            map: &map,
            academic: &academic(),
            courses: &[],
        };
        let result = CriteriaRegistry::default()
            .evaluate(&criteria(&[("course_pattern", json!("([unclosed"))]), &ctx);
        assert_eq!(result, None);
    }

    // -- min_courses ----------------------------------------------------------

    #[test]
    fn min_courses_counts_map_entries() {
        let map = map_with(&[("MATH1A", "MATH1", 4.0), ("CS1A", "CS101", 4.0)]);
        let ctx = CriterionContext {
            map: &map,
            academic: &academic(),
            courses: &[],
        };
        let registry = CriteriaRegistry::default();
        assert_eq!(
            registry.evaluate(&criteria(&[("min_courses", json!(2))]), &ctx),
            Some(true)
        );
        assert_eq!(
            registry.evaluate(&criteria(&[("min_courses", json!(3))]), &ctx),
            Some(false)
        );
    }

    #[test]
    fn min_courses_scoped_to_listed_codes() {
        let map = map_with(&[("MATH1A", "MATH1", 4.0), ("CS1A", "CS101", 4.0)]);
        let ctx = CriterionContext {
            map: &map,
            academic: &academic(),
            courses: &[],
        };
        let config = json!({ "count": 2, "codes": ["MATH1A", "STAT2"] });
        let result =
            CriteriaRegistry::default().evaluate(&criteria(&[("min_courses", config)]), &ctx);
        assert_eq!(result, Some(false));
    }

    // -- min_grade ------------------------------------------------------------

    #[test]
    fn min_grade_passes_when_grades_meet_floor() {
        let map = map_with(&[("MATH1A", "MATH1", 4.0)]);
        let courses = [course("MATH1", "B")];
        let ctx = CriterionContext {
            map: &map,
            academic: &academic(),
            courses: &courses,
        };
        let config = json!({ "grade": "C" });
        let result = CriteriaRegistry::default().evaluate(&criteria(&[("min_grade", config)]), &ctx);
        assert_eq!(result, Some(true));
    }

    #[test]
    fn min_grade_fails_below_floor() {
        let map = map_with(&[("MATH1A", "MATH1", 4.0)]);
        let courses = [course("MATH1", "D")];
        let ctx = CriterionContext {
            map: &map,
            academic: &academic(),
            courses: &courses,
        };
        let config = json!({ "grade": "C" });
        let result = CriteriaRegistry::default().evaluate(&criteria(&[("min_grade", config)]), &ctx);
        assert_eq!(result, Some(false));
    }

    #[test]
    fn min_grade_retake_keeps_best_grade() {
        let map = map_with(&[("MATH1A", "MATH1", 4.0)]);
        let courses = [course("MATH1", "D"), course("MATH1", "B")];
        let ctx = CriterionContext {
            map: &map,
            academic: &academic(),
            courses: &courses,
        };
        let config = json!({ "grade": "C" });
        let result = CriteriaRegistry::default().evaluate(&criteria(&[("min_grade", config)]), &ctx);
        assert_eq!(result, Some(true));
    }

    #[test]
    fn min_grade_ungraded_course_fails_floor() {
        let map = map_with(&[("MATH1A", "MATH1", 4.0)]);
        let courses = [course("MATH1", "P")];
        let ctx = CriterionContext {
            map: &map,
            academic: &academic(),
            courses: &courses,
        };
        let config = json!({ "grade": "C" });
        let result = CriteriaRegistry::default().evaluate(&criteria(&[("min_grade", config)]), &ctx);
        assert_eq!(result, Some(false));
    }

    // -- registry -------------------------------------------------------------

    #[test]
    fn unknown_keys_are_skipped() {
        let map = map_with(&[("MATH1A", "MATH1", 4.0)]);
        let ctx = CriterionContext {
            map: &map,
            academic: &academic(),
            courses: &[],
        };
        let result = CriteriaRegistry::default()
            .evaluate(&criteria(&[("gpa_waiver", json!({ "petition": true }))]), &ctx);
        assert_eq!(result, None);
    }

    #[test]
    fn mixed_known_and_unknown_uses_known_only() {
        let map = map_with(&[("MATH1A", "MATH1", 4.0)]);
        let ctx = CriterionContext {
            map: &map,
            academic: &academic(),
            courses: &[],
        };
        let result = CriteriaRegistry::default().evaluate(
            &criteria(&[
                ("courses", json!(["MATH1A"])),
                ("gpa_waiver", json!(true)),
            ]),
            &ctx,
        );
        assert_eq!(result, Some(true));
    }

    #[test]
    fn all_known_criteria_must_pass() {
        let map = map_with(&[("MATH1A", "MATH1", 4.0)]);
        let ctx = CriterionContext {
            map: &map,
            academic: &academic(),
            courses: &[],
        };
        let result = CriteriaRegistry::default().evaluate(
            &criteria(&[
                ("courses", json!(["MATH1A"])),
                ("min_courses", json!(5)),
            ]),
            &ctx,
        );
        assert_eq!(result, Some(false));
    }

    #[test]
    fn custom_check_extends_registry() {
        struct AlwaysTrue;
        impl CriterionCheck for AlwaysTrue {
            fn can_evaluate(&self, key: &str) -> bool {
                key == "always"
            }
            fn evaluate(&self, _: &str, _: &Value, _: &CriterionContext) -> Option<bool> {
                Some(true)
            }
        }

        let map = map_with(&[]);
        let ctx = CriterionContext {
            map: &map,
            academic: &academic(),
            courses: &[],
        };
        let registry = CriteriaRegistry::default().with_check(Box::new(AlwaysTrue));
        let result = registry.evaluate(&criteria(&[("always", json!(null))]), &ctx);
        assert_eq!(result, Some(true));
    }
}
