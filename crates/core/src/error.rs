use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// One or more field-level problems, in the order they were detected.
    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a validation failure carrying a single message.
    pub fn validation(msg: impl Into<String>) -> Self {
        CoreError::Validation(vec![msg.into()])
    }
}
