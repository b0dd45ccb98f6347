pub mod entity;
pub mod invariants;

pub use entity::Product;
pub use invariants::{validate_product, MAX_PRODUCT_DESCRIPTION_LEN, MAX_PRODUCT_NAME_LEN, PRICE_SCALE};
