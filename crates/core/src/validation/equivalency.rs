//! Course equivalency resolution.
//!
//! Maps a student's source-institution courses onto target-institution
//! course codes through the version's equivalency table, honoring each
//! entry's validity window at the evaluation date. Resolution never
//! short-circuits: every course is attempted and every problem is
//! reported.

use std::collections::BTreeMap;

use serde::Serialize;

use super::codes;
use super::result::{Severity, ValidationIssue};
use super::rules::CourseEquivalency;
use crate::student::{StudentCourseRecord, COURSE_COMPLETED};
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One resolved articulation of a student course.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedCourse {
    /// The student's source-institution course code.
    pub source_course: String,
    /// Credits granted at the target institution.
    pub resolved_credits: f64,
}

/// Target course code -> resolutions that satisfy it.
///
/// A `BTreeMap` so iteration (and thus downstream credit accounting and
/// serialization) is deterministic.
pub type EquivalencyMap = BTreeMap<String, Vec<ResolvedCourse>>;

/// Resolver output: the map plus severity-tagged diagnostics.
#[derive(Debug)]
pub struct EquivalencyResolution {
    pub map: EquivalencyMap,
    pub issues: Vec<(Severity, ValidationIssue)>,
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Whether an equivalency entry is in effect at `as_of`.
///
/// `effective_from` is inclusive and `effective_until` exclusive;
/// either bound absent means open-ended on that side.
fn in_window(entry: &CourseEquivalency, as_of: Timestamp) -> bool {
    if let Some(from) = entry.effective_from {
        if as_of < from {
            return false;
        }
    }
    if let Some(until) = entry.effective_until {
        if as_of >= until {
            return false;
        }
    }
    true
}

/// Resolve the student's courses against the equivalency table.
///
/// Only completed courses articulate; other statuses get an info note.
/// A completed course matching no in-window entry produces an
/// `UNRESOLVED_COURSE` warning. When several entries map the same
/// source course to the same target, the most recently effective one
/// wins; a tie on effective date with differing credit values is a
/// `CONFLICTING_EQUIVALENCY` error and yields no resolution for that
/// pair.
pub fn resolve_equivalencies(
    courses: &[StudentCourseRecord],
    equivalencies: &[CourseEquivalency],
    as_of: Timestamp,
) -> EquivalencyResolution {
    let mut map: EquivalencyMap = BTreeMap::new();
    let mut issues: Vec<(Severity, ValidationIssue)> = Vec::new();

    for course in courses {
        if course.status != COURSE_COMPLETED {
            issues.push((
                Severity::Info,
                ValidationIssue::with_context(
                    codes::UNRESOLVED_COURSE,
                    format!(
                        "Course '{}' is {} and does not articulate yet",
                        course.course_code, course.status
                    ),
                    course.course_code.clone(),
                ),
            ));
            continue;
        }

        let matches: Vec<&CourseEquivalency> = equivalencies
            .iter()
            .filter(|e| e.source_code == course.course_code && in_window(e, as_of))
            .collect();

        if matches.is_empty() {
            issues.push((
                Severity::Warning,
                ValidationIssue::with_context(
                    codes::UNRESOLVED_COURSE,
                    format!(
                        "Course '{}' has no equivalency at the target institution",
                        course.course_code
                    ),
                    course.course_code.clone(),
                ),
            ));
            continue;
        }

        // Group by target; a source course may articulate to several
        // target courses.
        let mut by_target: BTreeMap<&str, Vec<&CourseEquivalency>> = BTreeMap::new();
        for entry in matches {
            by_target.entry(entry.target_code.as_str()).or_default().push(entry);
        }

        for (target, mut entries) in by_target {
            // Most recently effective first; an undated entry never
            // beats a dated one.
            entries.sort_by(|a, b| b.effective_from.cmp(&a.effective_from));
            let winner = entries[0];

            let conflicting = entries.iter().skip(1).any(|e| {
                e.effective_from == winner.effective_from && e.credits != winner.credits
            });
            if conflicting {
                issues.push((
                    Severity::Error,
                    ValidationIssue::with_context(
                        codes::CONFLICTING_EQUIVALENCY,
                        format!(
                            "Equivalency entries for '{}' -> '{target}' tie on effective \
                             date with different credit values",
                            course.course_code
                        ),
                        format!("{}:{target}", course.course_code),
                    ),
                ));
                continue;
            }

            map.entry(target.to_string()).or_default().push(ResolvedCourse {
                source_course: course.course_code.clone(),
                resolved_credits: winner.credits,
            });
        }
    }

    tracing::debug!(
        courses = courses.len(),
        targets = map.len(),
        issues = issues.len(),
        "equivalencies resolved"
    );

    EquivalencyResolution { map, issues }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn completed(code: &str) -> StudentCourseRecord {
        StudentCourseRecord {
            course_code: code.to_string(),
            status: COURSE_COMPLETED.to_string(),
            term: "2025-FA".to_string(),
            grade: Some("B".to_string()),
            units: 4.0,
        }
    }

    fn entry(source: &str, target: &str, credits: f64) -> CourseEquivalency {
        CourseEquivalency {
            source_code: source.to_string(),
            target_code: target.to_string(),
            credits,
            conditions: None,
            effective_from: None,
            effective_until: None,
        }
    }

    fn at(year: i32) -> Timestamp {
        Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn simple_resolution() {
        let resolution = resolve_equivalencies(
            &[completed("MATH1")],
            &[entry("MATH1", "MATH1A", 4.0)],
            at(2026),
        );
        assert!(resolution.issues.is_empty());
        let resolved = &resolution.map["MATH1A"];
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].source_course, "MATH1");
        assert_eq!(resolved[0].resolved_credits, 4.0);
    }

    #[test]
    fn unmatched_course_warns_and_continues() {
        let resolution = resolve_equivalencies(
            &[completed("BIO10"), completed("MATH1")],
            &[entry("MATH1", "MATH1A", 4.0)],
            at(2026),
        );
        assert_eq!(resolution.issues.len(), 1);
        let (severity, issue) = &resolution.issues[0];
        assert_eq!(*severity, Severity::Warning);
        assert_eq!(issue.code, codes::UNRESOLVED_COURSE);
        assert_eq!(issue.context.as_deref(), Some("BIO10"));
        // MATH1 still resolved.
        assert!(resolution.map.contains_key("MATH1A"));
    }

    #[test]
    fn non_completed_course_gets_info_note() {
        let mut in_progress = completed("MATH1");
        in_progress.status = "in_progress".to_string();
        let resolution =
            resolve_equivalencies(&[in_progress], &[entry("MATH1", "MATH1A", 4.0)], at(2026));
        assert!(resolution.map.is_empty());
        assert_eq!(resolution.issues.len(), 1);
        assert_eq!(resolution.issues[0].0, Severity::Info);
    }

    // -- validity windows -----------------------------------------------------

    #[test]
    fn expired_entry_does_not_match() {
        let mut e = entry("MATH1", "MATH1A", 4.0);
        e.effective_until = Some(at(2024));
        let resolution = resolve_equivalencies(&[completed("MATH1")], &[e], at(2026));
        assert!(resolution.map.is_empty());
        assert_eq!(resolution.issues[0].1.code, codes::UNRESOLVED_COURSE);
    }

    #[test]
    fn not_yet_effective_entry_does_not_match() {
        let mut e = entry("MATH1", "MATH1A", 4.0);
        e.effective_from = Some(at(2027));
        let resolution = resolve_equivalencies(&[completed("MATH1")], &[e], at(2026));
        assert!(resolution.map.is_empty());
    }

    #[test]
    fn window_bounds_inclusive_from_exclusive_until() {
        let mut e = entry("MATH1", "MATH1A", 4.0);
        e.effective_from = Some(at(2025));
        e.effective_until = Some(at(2027));
        let on_start = resolve_equivalencies(&[completed("MATH1")], std::slice::from_ref(&e), at(2025));
        assert!(!on_start.map.is_empty());
        let on_end = resolve_equivalencies(&[completed("MATH1")], std::slice::from_ref(&e), at(2027));
        assert!(on_end.map.is_empty());
    }

    #[test]
    fn open_ended_entry_always_matches() {
        let resolution = resolve_equivalencies(
            &[completed("MATH1")],
            &[entry("MATH1", "MATH1A", 4.0)],
            at(1990),
        );
        assert!(!resolution.map.is_empty());
    }

    // -- precedence and conflicts ---------------------------------------------

    #[test]
    fn most_recently_effective_wins() {
        let mut old = entry("MATH1", "MATH1A", 3.0);
        old.effective_from = Some(at(2020));
        let mut new = entry("MATH1", "MATH1A", 4.0);
        new.effective_from = Some(at(2024));
        let resolution = resolve_equivalencies(&[completed("MATH1")], &[old, new], at(2026));
        assert!(resolution.issues.is_empty());
        assert_eq!(resolution.map["MATH1A"][0].resolved_credits, 4.0);
    }

    #[test]
    fn dated_entry_beats_undated() {
        let undated = entry("MATH1", "MATH1A", 3.0);
        let mut dated = entry("MATH1", "MATH1A", 4.0);
        dated.effective_from = Some(at(2020));
        let resolution = resolve_equivalencies(&[completed("MATH1")], &[undated, dated], at(2026));
        assert!(resolution.issues.is_empty());
        assert_eq!(resolution.map["MATH1A"][0].resolved_credits, 4.0);
    }

    #[test]
    fn tie_with_differing_credits_is_conflict() {
        let mut a = entry("MATH1", "MATH1A", 3.0);
        a.effective_from = Some(at(2024));
        let mut b = entry("MATH1", "MATH1A", 4.0);
        b.effective_from = Some(at(2024));
        let resolution = resolve_equivalencies(&[completed("MATH1")], &[a, b], at(2026));
        assert!(!resolution.map.contains_key("MATH1A"));
        let (severity, issue) = &resolution.issues[0];
        assert_eq!(*severity, Severity::Error);
        assert_eq!(issue.code, codes::CONFLICTING_EQUIVALENCY);
    }

    #[test]
    fn tie_with_same_credits_is_not_a_conflict() {
        let mut a = entry("MATH1", "MATH1A", 4.0);
        a.effective_from = Some(at(2024));
        let mut b = entry("MATH1", "MATH1A", 4.0);
        b.effective_from = Some(at(2024));
        let resolution = resolve_equivalencies(&[completed("MATH1")], &[a, b], at(2026));
        assert!(resolution.issues.is_empty());
        assert_eq!(resolution.map["MATH1A"].len(), 1);
    }

    #[test]
    fn one_source_can_articulate_to_multiple_targets() {
        let resolution = resolve_equivalencies(
            &[completed("PHYS10")],
            &[
                entry("PHYS10", "PHYS1A", 3.0),
                entry("PHYS10", "PHYS1AL", 1.0),
            ],
            at(2026),
        );
        assert_eq!(resolution.map.len(), 2);
        assert_eq!(resolution.map["PHYS1A"][0].resolved_credits, 3.0);
        assert_eq!(resolution.map["PHYS1AL"][0].resolved_credits, 1.0);
    }

    #[test]
    fn conflict_on_one_target_does_not_block_another() {
        let mut a = entry("PHYS10", "PHYS1A", 3.0);
        a.effective_from = Some(at(2024));
        let mut b = entry("PHYS10", "PHYS1A", 4.0);
        b.effective_from = Some(at(2024));
        let lab = entry("PHYS10", "PHYS1AL", 1.0);
        let resolution = resolve_equivalencies(&[completed("PHYS10")], &[a, b, lab], at(2026));
        assert!(!resolution.map.contains_key("PHYS1A"));
        assert!(resolution.map.contains_key("PHYS1AL"));
    }
}
