//! Student course history types supplied by the student-profile subsystem.
//!
//! The engine performs no lookups of its own; the caller pre-loads the
//! student's course records and aggregate academic numbers and passes
//! them in.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Course status constants
// ---------------------------------------------------------------------------

/// The course was completed with a grade.
pub const COURSE_COMPLETED: &str = "completed";

/// The course is currently being taken.
pub const COURSE_IN_PROGRESS: &str = "in_progress";

/// The course is planned for a future term.
pub const COURSE_PLANNED: &str = "planned";

/// The student withdrew from the course.
pub const COURSE_WITHDRAWN: &str = "withdrawn";

/// All valid course status values.
pub const VALID_COURSE_STATUSES: &[&str] = &[
    COURSE_COMPLETED,
    COURSE_IN_PROGRESS,
    COURSE_PLANNED,
    COURSE_WITHDRAWN,
];

/// Validate that a course status string is one of the accepted values.
pub fn validate_course_status(status: &str) -> Result<(), String> {
    if VALID_COURSE_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(format!(
            "Invalid course status '{status}'. Must be one of: {}",
            VALID_COURSE_STATUSES.join(", ")
        ))
    }
}

// ---------------------------------------------------------------------------
// Structs
// ---------------------------------------------------------------------------

/// A single course on the student's transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentCourseRecord {
    /// Source-institution course code, e.g. `MATH1`.
    pub course_code: String,
    /// One of [`VALID_COURSE_STATUSES`].
    pub status: String,
    /// Academic term the course was taken in, e.g. `2025-FA`.
    pub term: String,
    /// Letter grade, if graded, e.g. `B+`.
    pub grade: Option<String>,
    /// Credit units carried by the course at the source institution.
    pub units: f64,
}

/// Aggregate academic numbers from the student-profile subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentAcademicInfo {
    /// Cumulative GPA on a 4.0 scale. `None` when the profile has not
    /// computed one yet — the engine reports incomplete data rather
    /// than guessing.
    pub gpa: Option<f64>,
    /// Total completed units across the transcript.
    pub total_units: f64,
}

// ---------------------------------------------------------------------------
// Grade points
// ---------------------------------------------------------------------------

/// Convert a letter grade to 4.0-scale grade points.
///
/// Plus/minus steps are 0.3 from the base grade, capped at 4.0 (an A+
/// is worth 4.0, not 4.3). Returns `None` for non-letter grades such as
/// `P`, `NP`, `W`, or `I`, which carry no grade points.
pub fn grade_points(grade: &str) -> Option<f64> {
    let grade = grade.trim();
    let mut chars = grade.chars();
    let letter = chars.next()?;
    let modifier = chars.next();

    let base: f64 = match letter.to_ascii_uppercase() {
        'A' => 4.0,
        'B' => 3.0,
        'C' => 2.0,
        'D' => 1.0,
        'F' => 0.0,
        _ => return None,
    };

    let points = match modifier {
        Some('+') => base + 0.3,
        Some('-') => base - 0.3,
        Some(_) => return None,
        None => base,
    };

    Some(points.clamp(0.0, 4.0))
}
