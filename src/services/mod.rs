// src/services/mod.rs
//
// Services Module - Orchestration Layer
//
// RULES:
// - One unit of work per operation, run start to finish on one blocking task
// - Cross-entity rules (category exists, category empty, unique name) live here
// - Every operation returns an ApiResponse; nothing escapes as a panic or Err

pub mod category_service;
pub mod product_service;

#[cfg(test)]
mod catalog_scenario_tests;
#[cfg(test)]
mod product_service_tests;

pub use category_service::{CategoryOperations, CategoryService};
pub use product_service::{ProductOperations, ProductService};

use std::sync::Arc;

use log::warn;

use crate::application::ServiceError;
use crate::cancellation::CancellationSignal;
use crate::config::PagingConfig;
use crate::error::AppError;
use crate::repositories::{UnitOfWork, UnitOfWorkFactory};

/// Run `work` inside a fresh unit of work on the blocking pool.
///
/// The unit of work is closed afterwards whatever the outcome, which rolls
/// back a transaction `work` left open.
pub(crate) async fn run_in_unit_of_work<R, F>(
    factory: &Arc<dyn UnitOfWorkFactory>,
    cancel: CancellationSignal,
    work: F,
) -> Result<R, ServiceError>
where
    R: Send + 'static,
    F: FnOnce(&mut UnitOfWork) -> Result<R, ServiceError> + Send + 'static,
{
    let factory = Arc::clone(factory);

    tokio::task::spawn_blocking(move || {
        let mut uow = factory.create(cancel)?;
        let result = work(&mut uow);

        if let Err(e) = uow.close() {
            warn!("event=uow_close module=services status=error error={}", e);
        }
        result
    })
    .await
    .map_err(|e| ServiceError::Internal(AppError::from(e)))?
}

/// The entity a unit of work just saved, by value.
pub(crate) fn saved<T: Clone>(entity: Option<&T>) -> Result<T, ServiceError> {
    entity.cloned().ok_or_else(|| {
        ServiceError::Internal(AppError::InvalidOperation(
            "saved entity is no longer tracked".to_string(),
        ))
    })
}

/// Reject pages outside `1..` and sizes outside `1..=max_page_size`.
pub(crate) fn check_page(
    paging: &PagingConfig,
    page_number: i64,
    page_size: i64,
) -> Result<(), ServiceError> {
    if page_number < 1 {
        return Err(ServiceError::validation("Page number must be at least 1"));
    }
    if page_size < 1 || page_size > i64::from(paging.max_page_size) {
        return Err(ServiceError::validation(format!(
            "Page size must be between 1 and {}",
            paging.max_page_size
        )));
    }
    Ok(())
}
