use super::entity::Category;
use crate::domain::{validate_text, DomainResult};

pub const MAX_CATEGORY_NAME_LEN: usize = 100;
pub const MAX_CATEGORY_DESCRIPTION_LEN: usize = 500;

/// Validates all Category invariants that can be checked in isolation.
/// Name uniqueness needs the store and is checked by the service layer.
pub fn validate_category(category: &Category) -> DomainResult<()> {
    validate_text("Category name", &category.name, MAX_CATEGORY_NAME_LEN)?;
    validate_text(
        "Category description",
        &category.description,
        MAX_CATEGORY_DESCRIPTION_LEN,
    )?;
    Ok(())
}

/// Invariants that must hold true for Category domain:
///
/// 1. Name is required, at most 100 characters
/// 2. Description is required, at most 500 characters
/// 3. Name is unique among non-deleted categories (service + partial index)
/// 4. A category owning non-deleted products cannot be deleted (service)
