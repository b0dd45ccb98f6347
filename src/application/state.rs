// src/application/state.rs

use std::sync::Arc;

use crate::config::PagingConfig;
use crate::db::ConnectionPool;
use crate::repositories::{SqliteUnitOfWorkFactory, UnitOfWorkFactory};
use crate::services::{CategoryOperations, CategoryService, ProductOperations, ProductService};

/// Services shared by every request handler.
/// All fields are Arc-wrapped for thread-safe sharing across handlers.
#[derive(Clone)]
pub struct AppState {
    pub product_service: Arc<dyn ProductOperations>,
    pub category_service: Arc<dyn CategoryOperations>,
}

impl AppState {
    /// Wire both services to one unit-of-work factory over `pool`.
    pub fn new(pool: ConnectionPool, paging: PagingConfig) -> Self {
        let factory: Arc<dyn UnitOfWorkFactory> = Arc::new(SqliteUnitOfWorkFactory::new(pool));
        Self::with_factory(factory, paging)
    }

    pub fn with_factory(factory: Arc<dyn UnitOfWorkFactory>, paging: PagingConfig) -> Self {
        Self {
            product_service: Arc::new(ProductService::new(Arc::clone(&factory), paging.clone())),
            category_service: Arc::new(CategoryService::new(factory, paging)),
        }
    }
}
