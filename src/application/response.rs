// src/application/response.rs
//
// Result envelope and paged payload returned by every service operation.

use chrono::{DateTime, Utc};
use log::{error, info};
use serde::{Deserialize, Serialize};

use super::error_handling::{ErrorKind, ServiceError};

/// Generic detail shown for internal failures. The real cause is logged.
pub const INTERNAL_ERROR_DETAIL: &str = "An unexpected error occurred";

/// `{ success, message, data, errors, timestamp }`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
    pub errors: Vec<String>,
    pub timestamp: DateTime<Utc>,

    /// Failure category for status-code selection; not part of the JSON shape.
    #[serde(skip)]
    pub kind: Option<ErrorKind>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            errors: Vec::new(),
            timestamp: Utc::now(),
            kind: None,
        }
    }

    pub fn failure(kind: ErrorKind, message: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            errors,
            timestamp: Utc::now(),
            kind: Some(kind),
        }
    }

    /// Failure envelope for `err`. `context` names the operation
    /// ("Error creating product") and becomes the message of internal failures.
    pub fn from_error(err: ServiceError, context: &str) -> Self {
        let kind = err.kind();
        match err {
            ServiceError::NotFound(failure)
            | ServiceError::InvalidReference(failure)
            | ServiceError::Conflict(failure)
            | ServiceError::Validation(failure) => {
                Self::failure(kind, failure.message, vec![failure.detail])
            }
            ServiceError::Cancelled => {
                info!(
                    "event=service_cancelled module=services status=cancelled context=\"{}\"",
                    context
                );
                Self::failure(
                    kind,
                    "Operation cancelled",
                    vec!["The request was cancelled before it completed".to_string()],
                )
            }
            ServiceError::Internal(cause) => {
                error!(
                    "event=service_failure module=services status=error context=\"{}\" error={:?}",
                    context, cause
                );
                Self::failure(kind, context, vec![INTERNAL_ERROR_DETAIL.to_string()])
            }
        }
    }

    pub fn from_result(
        result: Result<T, ServiceError>,
        success_message: impl Into<String>,
        context: &str,
    ) -> Self {
        match result {
            Ok(data) => Self::success(data, success_message),
            Err(err) => Self::from_error(err, context),
        }
    }

    /// Suggested HTTP status: 200 on success, else per `ErrorKind`.
    pub fn status_code(&self) -> u16 {
        self.kind.map(|kind| kind.status_code()).unwrap_or(200)
    }
}

/// `{ items, pageNumber, pageSize, totalCount, totalPages }`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResponse<T> {
    pub items: Vec<T>,
    pub page_number: i64,
    pub page_size: i64,
    pub total_count: i64,
    pub total_pages: i64,
}

impl<T> PagedResponse<T> {
    pub fn new(items: Vec<T>, page_number: i64, page_size: i64, total_count: i64) -> Self {
        let total_pages = if page_size > 0 {
            (total_count + page_size - 1) / page_size
        } else {
            0
        };

        Self {
            items,
            page_number,
            page_size,
            total_count,
            total_pages,
        }
    }
}
