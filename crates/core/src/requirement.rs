//! Transfer requirement and version snapshot types.
//!
//! A requirement's rule payload is only ever edited by creating a new
//! [`RequirementVersion`]; published snapshots are immutable, so any
//! number of evaluations can read the same version concurrently without
//! coordination.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};
use crate::validation::rules::RequirementRules;

// ---------------------------------------------------------------------------
// Status constants
// ---------------------------------------------------------------------------

/// Requirement is being authored and has never been published.
pub const STATUS_DRAFT: &str = "draft";

/// Requirement has a published version available for evaluation.
pub const STATUS_PUBLISHED: &str = "published";

/// Requirement is retired and no longer offered for new plans.
pub const STATUS_ARCHIVED: &str = "archived";

/// Requirement is superseded; existing plans may still reference it.
pub const STATUS_DEPRECATED: &str = "deprecated";

/// All valid requirement status strings.
pub const VALID_REQUIREMENT_STATUSES: &[&str] = &[
    STATUS_DRAFT,
    STATUS_PUBLISHED,
    STATUS_ARCHIVED,
    STATUS_DEPRECATED,
];

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Lifecycle status of a transfer requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementStatus {
    Draft,
    Published,
    Archived,
    Deprecated,
}

impl RequirementStatus {
    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            STATUS_DRAFT => Ok(Self::Draft),
            STATUS_PUBLISHED => Ok(Self::Published),
            STATUS_ARCHIVED => Ok(Self::Archived),
            STATUS_DEPRECATED => Ok(Self::Deprecated),
            _ => Err(format!(
                "Invalid requirement status '{s}'. Must be one of: {}",
                VALID_REQUIREMENT_STATUSES.join(", ")
            )),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => STATUS_DRAFT,
            Self::Published => STATUS_PUBLISHED,
            Self::Archived => STATUS_ARCHIVED,
            Self::Deprecated => STATUS_DEPRECATED,
        }
    }
}

// ---------------------------------------------------------------------------
// Structs
// ---------------------------------------------------------------------------

/// A versioned rule set describing what a student must complete to move
/// from a source institution into a major at a target institution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequirement {
    pub id: DbId,
    pub source_institution_id: DbId,
    pub target_institution_id: DbId,
    /// Target-institution major code, e.g. `CS-BS`.
    pub major_code: String,
    pub status: RequirementStatus,
    pub effective_from: Option<Timestamp>,
    pub effective_until: Option<Timestamp>,
    /// The version evaluations run against. At most one version is
    /// active at a time.
    pub current_version_id: Option<DbId>,
}

/// An immutable snapshot of a requirement's rule payload.
///
/// Created by the admin publish workflow, never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementVersion {
    pub id: DbId,
    pub requirement_id: DbId,
    /// Monotonically increasing, gapless, per requirement.
    pub version_number: i32,
    pub rules: RequirementRules,
    pub published_by: DbId,
    pub published_at: Timestamp,
    /// Human-readable changes from the prior version.
    pub change_summary: Vec<String>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a status transition for the admin workflow.
///
/// Allowed: draft -> published, published -> archived,
/// published -> deprecated, archived -> deprecated. Everything else is
/// rejected (in particular, nothing ever returns to draft).
pub fn validate_status_transition(
    from: RequirementStatus,
    to: RequirementStatus,
) -> Result<(), CoreError> {
    use RequirementStatus::*;

    let allowed = matches!(
        (from, to),
        (Draft, Published) | (Published, Archived) | (Published, Deprecated) | (Archived, Deprecated)
    );

    if allowed {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid status transition: {} -> {}",
            from.as_str(),
            to.as_str()
        )))
    }
}

/// Validate that a new version number directly follows the previous one.
///
/// `previous` is `None` for a requirement's first version, which must be
/// number 1.
pub fn validate_version_number(previous: Option<i32>, next: i32) -> Result<(), CoreError> {
    let expected = previous.map_or(1, |p| p + 1);
    if next == expected {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Version number must be {expected}, got {next}"
        )))
    }
}
