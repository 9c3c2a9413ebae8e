//! Well-known issue codes and check names surfaced in validation results.
//!
//! These must match the values the API layer serializes to callers and
//! the admin UI keys its messages on.

// ---------------------------------------------------------------------------
// Issue codes
// ---------------------------------------------------------------------------

/// Rule set's total credit threshold is zero or negative (authoring),
/// or the student's applied credits fall short of it (evaluation).
pub const INVALID_CREDITS: &str = "INVALID_CREDITS";

/// Minimum GPA is outside the `[0, 4]` scale (authoring), or the
/// student's GPA is below it (evaluation).
pub const INVALID_GPA: &str = "INVALID_GPA";

/// A required rule is not satisfied by the student's resolved courses
/// or any of its alternatives.
pub const RULE_NOT_SATISFIED: &str = "RULE_NOT_SATISFIED";

/// Informational: a rule was satisfied through one of its alternatives
/// rather than its own criteria.
pub const ALTERNATIVE_SATISFIED: &str = "ALTERNATIVE_SATISFIED";

/// Two equivalency entries share the same source course code.
pub const DUPLICATE_COURSE: &str = "DUPLICATE_COURSE";

/// An equivalency entry carries zero or negative credits.
pub const INVALID_COURSE_CREDITS: &str = "INVALID_COURSE_CREDITS";

/// The rule-alternatives graph contains a cycle.
pub const CIRCULAR_DEPENDENCY: &str = "CIRCULAR_DEPENDENCY";

/// An alternatives entry references a rule id not present in the set.
pub const DANGLING_REFERENCE: &str = "DANGLING_REFERENCE";

/// A student course matched no equivalency entry.
pub const UNRESOLVED_COURSE: &str = "UNRESOLVED_COURSE";

/// Two equivalency entries for the same source/target pair tie on
/// effective date with different credit values.
pub const CONFLICTING_EQUIVALENCY: &str = "CONFLICTING_EQUIVALENCY";

/// Required student data was not supplied (e.g. GPA missing while the
/// rule set sets a minimum).
pub const DATA_INCOMPLETE: &str = "DATA_INCOMPLETE";

/// Generic code for malformed-input structural failures, used by API
/// layers when [`crate::error::CoreError::Malformed`] crosses the wire.
pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";

// ---------------------------------------------------------------------------
// Check names (result metadata)
// ---------------------------------------------------------------------------

/// Admission-time structure checks (4.1).
pub const CHECK_STRUCTURE: &str = "structure";

/// Course equivalency resolution (4.2).
pub const CHECK_EQUIVALENCY: &str = "equivalency";

/// Per-rule satisfaction evaluation (4.3).
pub const CHECK_RULES: &str = "rules";

/// Total-credit threshold comparison.
pub const CHECK_CREDITS: &str = "credits";

/// Minimum-GPA comparison.
pub const CHECK_GPA: &str = "gpa";
