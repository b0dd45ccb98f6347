// src/repositories/mod.rs
//
// Repository layer
//
// CRITICAL RULES:
// - Repositories are data mappers: NO business rules, NO cross-entity checks
// - Explicit SQL only, explicit table mapping per entity
// - Reads go through the read port, writes through the write port
// - Soft-deleted rows never leave this layer through a default read
// - Only a UnitOfWork hands out repositories bound to a write scope

pub mod category_repository;
pub mod mapping;
pub mod product_repository;
pub mod read_port;
pub mod repository;
pub mod soft_delete;
pub mod unit_of_work;
pub mod write_port;

pub use category_repository::CategoryRepository;
pub use mapping::{JoinedProjection, Persistable, TableMapping};
pub use product_repository::ProductRepository;
pub use read_port::DirectReader;
pub use repository::Repository;
pub use unit_of_work::{SqliteUnitOfWorkFactory, UnitOfWork, UnitOfWorkFactory};
pub use write_port::{ChangeTracker, EntryKey, EntryState};

#[cfg(test)]
pub use unit_of_work::MockUnitOfWorkFactory;
