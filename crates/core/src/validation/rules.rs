//! Requirement rule payload types.
//!
//! These mirror the JSON payload stored on a published version. The
//! criteria maps are deliberately open-ended (`serde_json`) so new
//! criterion types can ship without a schema migration; see
//! [`super::criteria`] for how they are interpreted.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Payload types
// ---------------------------------------------------------------------------

/// A statement that a source-institution course satisfies a
/// target-institution course, with a credit conversion and an optional
/// validity window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseEquivalency {
    /// Course code at the source institution, e.g. `MATH1`.
    pub source_code: String,
    /// Course code at the target institution, e.g. `MATH1A`.
    pub target_code: String,
    /// Credits granted at the target institution. Must be positive.
    pub credits: f64,
    /// Free-form articulation conditions, shown to advisors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<String>,
    /// Start of validity (inclusive). `None` means since forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_from: Option<Timestamp>,
    /// End of validity (exclusive). `None` means open-ended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_until: Option<Timestamp>,
}

/// A single requirement rule.
///
/// `alternatives` lists other rule ids that can satisfy this rule
/// instead (logical OR). Viewed as a directed graph over rule ids the
/// relation must be acyclic; that is enforced at admission time so the
/// evaluator can assume a DAG.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementRule {
    pub id: String,
    /// Free-form tag grouping rules in the authoring UI, e.g. `core`,
    /// `elective`. Not interpreted by the engine.
    pub rule_type: String,
    /// Criterion key -> configuration, interpreted by the criterion
    /// registry. Unknown keys are ignored.
    #[serde(default)]
    pub criteria: serde_json::Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_credits: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_credits: Option<f64>,
    /// Required rules gate the overall verdict; optional rules only
    /// feed progress reporting.
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub alternatives: Vec<String>,
}

/// The full rule payload of one requirement version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementRules {
    #[serde(default)]
    pub equivalencies: Vec<CourseEquivalency>,
    #[serde(default)]
    pub rules: Vec<RequirementRule>,
    /// Total transfer credits the student must accumulate. Must be
    /// positive.
    pub total_credits: f64,
    /// Minimum cumulative GPA on a 4.0 scale, if the requirement sets
    /// one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_gpa: Option<f64>,
    /// Requirement-level extension criteria. Carried but not yet
    /// interpreted by the built-in registry.
    #[serde(default)]
    pub additional_criteria: serde_json::Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Structural parse tier
// ---------------------------------------------------------------------------

/// Parse an untyped JSON value into a [`RequirementRules`] payload.
///
/// This is the structural tier of the error taxonomy: a value that is
/// not shaped like a rules payload at all is rejected here with
/// [`CoreError::Malformed`], before any business check runs. Business
/// violations (bad thresholds, cycles, duplicates) are *not* detected
/// here — they come back as itemized issues from
/// [`super::structure::validate_rule_structure`].
pub fn parse_rules(value: &Value) -> Result<RequirementRules, CoreError> {
    if !value.is_object() {
        return Err(CoreError::Malformed(
            "Rules payload must be a JSON object".to_string(),
        ));
    }
    serde_json::from_value(value.clone())
        .map_err(|e| CoreError::Malformed(format!("Rules payload does not match schema: {e}")))
}
