// src/application/mapping.rs
//
// Entity -> DTO projections.
//
// Derived fields:
// - ProductDto.category_name: the joined category name, `None` when the
//   read path did not load it
// - CategoryDto.product_count: size of the loaded product collection, else the
//   aggregated count, else 0

use super::dto::{CategoryDto, ProductDto};
use crate::domain::{Category, Entity, Product};

impl From<&Product> for ProductDto {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            stock: product.stock,
            category_id: product.category_id,
            category_name: product.category_name.clone(),
            created_at: product.meta.created_at,
            updated_at: product.meta.updated_at,
        }
    }
}

impl From<Product> for ProductDto {
    fn from(product: Product) -> Self {
        Self::from(&product)
    }
}

impl From<&Category> for CategoryDto {
    fn from(category: &Category) -> Self {
        let product_count = category
            .products
            .as_ref()
            .map(|products| products.len() as i64)
            .or(category.product_count)
            .unwrap_or(0);

        Self {
            id: category.id(),
            name: category.name.clone(),
            description: category.description.clone(),
            product_count,
            created_at: category.meta.created_at,
            updated_at: category.meta.updated_at,
            products: category
                .products
                .as_ref()
                .map(|products| products.iter().map(ProductDto::from).collect()),
        }
    }
}

impl From<Category> for CategoryDto {
    fn from(category: Category) -> Self {
        Self::from(&category)
    }
}

/// Map a list of entities.
pub fn map_all<'a, E, D>(entities: &'a [E]) -> Vec<D>
where
    D: From<&'a E>,
{
    entities.iter().map(D::from).collect()
}
