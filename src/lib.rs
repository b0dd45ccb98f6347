// src/lib.rs
// Catalog - products and categories over a hybrid unit-of-work data layer
//
// Architecture:
// - Domain: entities and their invariants, no storage knowledge
// - Repositories: read port (direct, connection-per-call) + write port
//   (buffered, change-tracked), coordinated by a UnitOfWork
// - Services: one unit of work per operation, cross-entity rules, envelopes
// - Application: DTOs, mapping, ApiResponse, error taxonomy
// - Explicit: no implicit table naming, no hidden transactions

// ============================================================================
// FOUNDATION
// ============================================================================

pub mod cancellation;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod logging;
pub mod repositories;

// ============================================================================
// ORCHESTRATION & BOUNDARY
// ============================================================================

pub mod application;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;

// ============================================================================
// PUBLIC API - Domain Entities
// ============================================================================

pub use domain::{
    validate_category, validate_product, Category, DomainError, DomainResult, Entity, EntityId,
    EntityMeta, Product,
};

// ============================================================================
// PUBLIC API - Errors, Config, Cancellation
// ============================================================================

pub use cancellation::{CancellationSignal, CancellationSource};
pub use config::CatalogConfig;
pub use error::{AppError, AppResult};

// ============================================================================
// PUBLIC API - Database
// ============================================================================

pub use db::{create_connection_pool, initialize_database, ConnectionPool};

// ============================================================================
// PUBLIC API - Repositories
// ============================================================================

pub use repositories::{
    CategoryRepository, DirectReader, EntryKey, ProductRepository, Repository,
    SqliteUnitOfWorkFactory, UnitOfWork, UnitOfWorkFactory,
};

// ============================================================================
// PUBLIC API - Services & Application
// ============================================================================

pub use application::{
    ApiResponse, AppState, CategoryDto, ErrorKind, PagedResponse, ProductDto, ServiceError,
};
pub use services::{CategoryOperations, CategoryService, ProductOperations, ProductService};
