//! Stable input fingerprints for caller-side result caching.
//!
//! The engine itself holds no cache (evaluations are pure), but callers
//! that layer a short-lived cache on top need a stable key over the
//! evaluation inputs. Course order must not affect the key, so records
//! are sorted before hashing.

use sha2::{Digest, Sha256};

use crate::student::{StudentAcademicInfo, StudentCourseRecord};
use crate::types::DbId;

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// Compute a stable cache key for one evaluation call.
///
/// The key covers the pinned version id, the student's course records
/// (sorted, so transcript ordering is irrelevant), and the aggregate
/// academic numbers. Two calls with the same key produce the same
/// result apart from the result timestamp.
pub fn evaluation_cache_key(
    version_id: DbId,
    courses: &[StudentCourseRecord],
    academic: &StudentAcademicInfo,
) -> String {
    let mut sorted: Vec<&StudentCourseRecord> = courses.iter().collect();
    sorted.sort_by(|a, b| {
        (&a.course_code, &a.term, &a.status).cmp(&(&b.course_code, &b.term, &b.status))
    });

    let mut canonical = format!("v{version_id}");
    for course in sorted {
        canonical.push_str(&format!(
            "|{}:{}:{}:{}:{}",
            course.course_code,
            course.term,
            course.status,
            course.grade.as_deref().unwrap_or("-"),
            course.units,
        ));
    }
    canonical.push_str(&format!(
        "|gpa:{}|units:{}",
        academic.gpa.map_or("-".to_string(), |g| g.to_string()),
        academic.total_units,
    ));

    sha256_hex(canonical.as_bytes())
}
