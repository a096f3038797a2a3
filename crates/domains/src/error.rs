//! # DomainError
//!
//! Centralized error handling for goalboard.
//! Maps domain-specific failures to actionable error types; adapters decide
//! how each variant is surfaced (HTTP status, exit code, log level).

use thiserror::Error;

use crate::validation::ValidationErrors;

/// The primary error type for all domain and port operations.
#[derive(Error, Debug)]
pub enum DomainError {
    /// Resource not found, or filtered out by scoping (soft-deleted, archived,
    /// owned by someone else on owner-scoped endpoints).
    #[error("{0} not found with ID {1}")]
    NotFound(&'static str, String),

    /// Payload rejected before any row was touched.
    #[error("validation error: {0}")]
    Validation(ValidationErrors),

    /// Missing or invalid credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but not allowed to mutate this resource.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Resource already exists (e.g., duplicate username)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Physical deletion refused by a delete-protect reference.
    #[error("protected: {0}")]
    Protected(String),

    /// Infrastructure failure (e.g., DB down, pool exhausted)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        DomainError::NotFound(entity, id.to_string())
    }

    /// Shorthand for a validation failure on a single field.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, message);
        DomainError::Validation(errors)
    }
}

impl From<ValidationErrors> for DomainError {
    fn from(errors: ValidationErrors) -> Self {
        DomainError::Validation(errors)
    }
}

/// A specialized Result type for goalboard logic.
pub type Result<T> = std::result::Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn not_found_names_entity_and_id() {
        let id = Uuid::nil();
        let err = DomainError::not_found("Goal", id);
        assert_eq!(err.to_string(), format!("Goal not found with ID {id}"));
    }

    #[test]
    fn field_error_carries_single_message() {
        match DomainError::field("title", "may not be blank") {
            DomainError::Validation(errors) => {
                assert_eq!(errors.get("title"), Some(&vec!["may not be blank".to_string()]));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DomainError>();
    }
}
