// src/application/error_handling.rs
//
// Service-boundary error taxonomy
//
// ARCHITECTURE:
// - Business-rule failures carry a stable message plus a detail string and
//   are safe to show to callers verbatim
// - Internal failures keep the underlying AppError for logging; callers only
//   ever see a generic detail (see ApiResponse::from_error)
// - ErrorKind is the tag the HTTP layer maps to a status code

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{DomainError, EntityId};
use crate::error::AppError;

/// Failure categories for the HTTP layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Entity absent or soft-deleted (404)
    NotFound,

    /// Foreign key target absent or soft-deleted (400)
    InvalidReference,

    /// Business rule violated, e.g. deleting a category that owns products (400)
    Conflict,

    /// Input breaks an entity invariant or paging limit (400)
    Validation,

    /// Caller went away before the work finished (499)
    Cancelled,

    /// Anything unclassified from the data layer (500)
    Internal,
}

impl ErrorKind {
    /// Suggested HTTP status.
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::InvalidReference | ErrorKind::Conflict | ErrorKind::Validation => 400,
            ErrorKind::Cancelled => 499,
            ErrorKind::Internal => 500,
        }
    }
}

/// Stable message plus one detail line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub message: String,
    pub detail: String,
}

impl Failure {
    pub fn new(message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{}: {}", .0.message, .0.detail)]
    NotFound(Failure),

    #[error("{}: {}", .0.message, .0.detail)]
    InvalidReference(Failure),

    #[error("{}: {}", .0.message, .0.detail)]
    Conflict(Failure),

    #[error("{}: {}", .0.message, .0.detail)]
    Validation(Failure),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(AppError),
}

impl ServiceError {
    /// `"<Entity> not found"` / `"<Entity> with ID <id> does not exist"`
    pub fn not_found(entity: &str, id: EntityId) -> Self {
        ServiceError::NotFound(Failure::new(
            format!("{} not found", entity),
            format!("{} with ID {} does not exist", entity, id),
        ))
    }

    pub fn invalid_category(category_id: EntityId) -> Self {
        ServiceError::InvalidReference(Failure::new(
            "Invalid category",
            format!("Category with ID {} does not exist", category_id),
        ))
    }

    pub fn conflict(message: impl Into<String>, detail: impl Into<String>) -> Self {
        ServiceError::Conflict(Failure::new(message, detail))
    }

    pub fn validation(detail: impl Into<String>) -> Self {
        ServiceError::Validation(Failure::new("Validation failed", detail))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::NotFound(_) => ErrorKind::NotFound,
            ServiceError::InvalidReference(_) => ErrorKind::InvalidReference,
            ServiceError::Conflict(_) => ErrorKind::Conflict,
            ServiceError::Validation(_) => ErrorKind::Validation,
            ServiceError::Cancelled => ErrorKind::Cancelled,
            ServiceError::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvariantViolation(detail) => ServiceError::validation(detail),
        }
    }
}

impl From<AppError> for ServiceError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Cancelled => ServiceError::Cancelled,
            AppError::Domain(domain) => domain.into(),
            AppError::InvalidArgument(detail) => ServiceError::validation(detail),
            AppError::StaleEntity { table, id } => ServiceError::conflict(
                "Concurrent modification",
                format!("Record {} in {} was changed or removed by someone else", id, table),
            ),
            other => ServiceError::Internal(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_wording() {
        let err = ServiceError::not_found("Product", 7);
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "Product not found: Product with ID 7 does not exist");
    }

    #[test]
    fn test_app_error_classification() {
        assert_eq!(
            ServiceError::from(AppError::Cancelled).kind(),
            ErrorKind::Cancelled
        );
        assert_eq!(
            ServiceError::from(AppError::InvalidArgument("page size".into())).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            ServiceError::from(AppError::StaleEntity {
                table: "products",
                id: 3
            })
            .kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            ServiceError::from(AppError::Pool("timed out".into())).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_domain_violation_keeps_detail() {
        let err = ServiceError::from(AppError::Domain(DomainError::InvariantViolation(
            "Price must be greater than 0".into(),
        )));
        match err {
            ServiceError::Validation(failure) => {
                assert_eq!(failure.message, "Validation failed");
                assert_eq!(failure.detail, "Price must be greater than 0");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ErrorKind::NotFound.status_code(), 404);
        assert_eq!(ErrorKind::Conflict.status_code(), 400);
        assert_eq!(ErrorKind::Internal.status_code(), 500);
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&ErrorKind::InvalidReference).unwrap();
        assert_eq!(json, "\"invalid_reference\"");
    }
}
