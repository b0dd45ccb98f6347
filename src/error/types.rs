// src/error/types.rs
//
// Data-layer error type.
//
// Everything below the service boundary reports failures as `AppError`.
// The service layer classifies these into business failures or internal
// failures (see application::error_handling).

use crate::domain::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(String),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// An UPDATE matched no row: the record vanished or was never persisted.
    #[error("Stale entity: no {table} row with id {id} to update")]
    StaleEntity { table: &'static str, id: i64 },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Resource not found")]
    NotFound,

    #[error("Other error: {0}")]
    Other(String),
}

impl From<r2d2::Error> for AppError {
    fn from(err: r2d2::Error) -> Self {
        AppError::Pool(err.to_string())
    }
}

impl From<rust_decimal::Error> for AppError {
    fn from(err: rust_decimal::Error) -> Self {
        AppError::Other(format!("Decimal conversion error: {}", err))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Other(format!("Blocking task failed: {}", err))
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_error_keeps_message() {
        let err = AppError::Pool("timed out waiting for connection".to_string());
        assert_eq!(err.to_string(), "Pool error: timed out waiting for connection");
    }

    #[test]
    fn test_stale_entity_message_names_table_and_id() {
        let err = AppError::StaleEntity { table: "products", id: 42 };
        assert!(err.to_string().contains("products"));
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn test_rusqlite_error_converts() {
        let err: AppError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, AppError::Database(_)));
    }
}
