use rust_decimal::Decimal;

use super::entity::Product;
use crate::domain::{validate_text, DomainError, DomainResult};

pub const MAX_PRODUCT_NAME_LEN: usize = 200;
pub const MAX_PRODUCT_DESCRIPTION_LEN: usize = 1000;

/// Fractional digits stored for prices: decimal(18,2)
pub const PRICE_SCALE: u32 = 2;

/// Validates all Product invariants that can be checked in isolation.
/// Category existence needs the store and is checked by the service layer.
pub fn validate_product(product: &Product) -> DomainResult<()> {
    validate_text("Product name", &product.name, MAX_PRODUCT_NAME_LEN)?;
    validate_text(
        "Product description",
        &product.description,
        MAX_PRODUCT_DESCRIPTION_LEN,
    )?;
    validate_price(product.price)?;
    validate_stock(product.stock)?;
    validate_category_reference(product)?;
    Ok(())
}

fn validate_price(price: Decimal) -> DomainResult<()> {
    if price <= Decimal::ZERO {
        return Err(DomainError::InvariantViolation(
            "Price must be greater than 0".to_string(),
        ));
    }
    if price.normalize().scale() > PRICE_SCALE {
        return Err(DomainError::InvariantViolation(format!(
            "Price must have at most {} decimal places (got {})",
            PRICE_SCALE, price
        )));
    }
    Ok(())
}

fn validate_stock(stock: i32) -> DomainResult<()> {
    if stock < 0 {
        return Err(DomainError::InvariantViolation(
            "Stock cannot be negative".to_string(),
        ));
    }
    Ok(())
}

fn validate_category_reference(product: &Product) -> DomainResult<()> {
    if product.category_id <= 0 {
        return Err(DomainError::InvariantViolation(
            "Valid category must be selected".to_string(),
        ));
    }
    Ok(())
}

/// Invariants that must hold true for Product domain:
///
/// 1. Name is required, at most 200 characters
/// 2. Description is required, at most 1000 characters
/// 3. Price > 0 with at most two decimal places
/// 4. Stock >= 0
/// 5. category_id references a non-deleted category (service layer)

#[cfg(test)]
mod tests {
    use super::*;

    fn laptop() -> Product {
        Product::new(
            "Laptop".to_string(),
            "15-inch".to_string(),
            Decimal::new(99999, 2),
            5,
            1,
        )
    }

    #[test]
    fn test_valid_product() {
        assert!(validate_product(&laptop()).is_ok());
    }

    #[test]
    fn test_zero_price_fails() {
        let mut product = laptop();
        product.price = Decimal::ZERO;
        assert!(validate_product(&product).is_err());
    }

    #[test]
    fn test_three_decimal_places_fails() {
        let mut product = laptop();
        product.price = Decimal::new(9999, 3);
        assert!(validate_product(&product).is_err());
    }

    #[test]
    fn test_trailing_zero_scale_is_accepted() {
        let mut product = laptop();
        product.price = Decimal::new(9990, 3);
        assert!(validate_product(&product).is_ok());
    }

    #[test]
    fn test_negative_stock_fails() {
        let mut product = laptop();
        product.stock = -1;
        let err = validate_product(&product).unwrap_err();
        assert!(err.to_string().contains("Stock"));
    }

    #[test]
    fn test_missing_category_fails() {
        let mut product = laptop();
        product.category_id = 0;
        assert!(validate_product(&product).is_err());
    }

    #[test]
    fn test_name_too_long_fails() {
        let mut product = laptop();
        product.name = "x".repeat(201);
        assert!(validate_product(&product).is_err());
    }
}
