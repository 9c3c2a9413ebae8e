use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Input is not shaped like the expected payload at all. Unlike
    /// business-rule violations (which are returned as data inside a
    /// `ValidationResult`), this is non-recoverable for the current call.
    #[error("Malformed input: {0}")]
    Malformed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
