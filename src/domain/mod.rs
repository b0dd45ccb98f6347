// src/domain/mod.rs
//
// Domain Root - single source of truth for the catalog domain API.
// All other modules import from `crate::domain::*`

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod category;
pub mod entity;
pub mod product;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Base entity
pub use entity::{Entity, EntityId, EntityMeta, TRANSIENT_ID};

// Category Domain
pub use category::{validate_category, Category};

// Product Domain
pub use product::{validate_product, Product};

// ============================================================================
// DOMAIN ERROR TYPES
// ============================================================================

use thiserror::Error;

/// Domain-level errors
/// These represent violations of entity invariants
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

/// Domain result type
pub type DomainResult<T> = Result<T, DomainError>;

/// Shared text-field rule: required (non-blank) and at most `max` characters.
pub(crate) fn validate_text(field: &str, value: &str, max: usize) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::InvariantViolation(format!("{} is required", field)));
    }
    let len = value.chars().count();
    if len > max {
        return Err(DomainError::InvariantViolation(format!(
            "{} must not exceed {} characters (got {})",
            field, max, len
        )));
    }
    Ok(())
}
