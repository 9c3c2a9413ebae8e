//! Validation result types and the aggregation builder.
//!
//! Every engine entry point reports through these types: pass/fail and
//! diagnostics are always returned as data, never raised. Given
//! identical inputs, a result is byte-identical apart from
//! `checked_at`, so callers can cache serialized results safely.

use serde::Serialize;
use serde_json::Value;

use crate::types::Timestamp;

/// Engine version tag stamped into result metadata for reproducibility.
pub const ENGINE_VERSION: &str = "0.1.0";

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// How serious an issue is.
///
/// Errors block (publication or overall validity), warnings flag soft
/// problems authoring/advising should look at, infos explain outcomes
/// (e.g. satisfaction via an alternative rule).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

// ---------------------------------------------------------------------------
// Issue
// ---------------------------------------------------------------------------

/// A single itemized diagnostic.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    /// One of the codes in [`super::codes`].
    pub code: &'static str,
    pub message: String,
    /// The rule id or course code the issue is about, when applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl ValidationIssue {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
        }
    }

    pub fn with_context(code: &'static str, message: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: Some(context.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// Audit metadata describing what actually ran.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationMetadata {
    pub engine_version: &'static str,
    /// Check names (see [`super::codes`]) in execution order.
    pub checks_run: Vec<&'static str>,
    /// Rule ids the evaluator visited, in evaluation order. Empty for
    /// admission-time calls.
    pub evaluated_rules: Vec<String>,
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// Aggregated, severity-tagged outcome of a validation call.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    /// `true` iff there are zero errors. Warnings and infos never
    /// affect validity.
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub infos: Vec<ValidationIssue>,
    /// Structured per-call details (per-rule outcomes, applied credits,
    /// completion percentage, ...). Keys are sorted by the map type, so
    /// serialization order is deterministic.
    pub details: serde_json::Map<String, Value>,
    pub checked_at: Timestamp,
    pub metadata: ValidationMetadata,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Accumulates issues, details, and metadata across the engine's
/// components and produces the final [`ValidationResult`].
///
/// Issues are kept in insertion order; components push them in a fixed
/// order, which is what makes results deterministic.
#[derive(Debug, Default)]
pub struct ResultBuilder {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
    infos: Vec<ValidationIssue>,
    details: serde_json::Map<String, Value>,
    checks_run: Vec<&'static str>,
    evaluated_rules: Vec<String>,
}

impl ResultBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a named check ran (once; repeats are ignored).
    pub fn check(&mut self, name: &'static str) {
        if !self.checks_run.contains(&name) {
            self.checks_run.push(name);
        }
    }

    pub fn push(&mut self, severity: Severity, issue: ValidationIssue) {
        match severity {
            Severity::Error => self.errors.push(issue),
            Severity::Warning => self.warnings.push(issue),
            Severity::Info => self.infos.push(issue),
        }
    }

    pub fn error(&mut self, issue: ValidationIssue) {
        self.push(Severity::Error, issue);
    }

    pub fn warning(&mut self, issue: ValidationIssue) {
        self.push(Severity::Warning, issue);
    }

    pub fn info(&mut self, issue: ValidationIssue) {
        self.push(Severity::Info, issue);
    }

    pub fn detail(&mut self, key: &str, value: Value) {
        self.details.insert(key.to_string(), value);
    }

    pub fn evaluated_rules(&mut self, rule_ids: Vec<String>) {
        self.evaluated_rules = rule_ids;
    }

    /// Finalize: compute validity, stamp the timestamp and metadata.
    pub fn finish(self) -> ValidationResult {
        ValidationResult {
            is_valid: self.errors.is_empty(),
            errors: self.errors,
            warnings: self.warnings,
            infos: self.infos,
            details: self.details,
            checked_at: chrono::Utc::now(),
            metadata: ValidationMetadata {
                engine_version: ENGINE_VERSION,
                checks_run: self.checks_run,
                evaluated_rules: self.evaluated_rules,
            },
        }
    }
}
