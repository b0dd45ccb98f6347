pub mod entity;
pub mod invariants;

pub use entity::Category;
pub use invariants::{validate_category, MAX_CATEGORY_DESCRIPTION_LEN, MAX_CATEGORY_NAME_LEN};
