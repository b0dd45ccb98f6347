use serde::{Deserialize, Serialize};

use crate::domain::entity::{Entity, EntityMeta};
use crate::domain::product::Product;

/// A named grouping of products.
/// Owns the inverse side of `Product::category_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    #[serde(flatten)]
    pub meta: EntityMeta,

    /// Unique among non-deleted categories
    pub name: String,

    pub description: String,

    /// Non-deleted products, only when loaded through the navigational path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<Product>>,

    /// Materialized by the product-count aggregation query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_count: Option<i64>,
}

impl Category {
    /// Create a new, not yet persisted category
    pub fn new(name: String, description: String) -> Self {
        Self {
            meta: EntityMeta::transient(),
            name,
            description,
            products: None,
            product_count: None,
        }
    }

    /// Replace the scalar fields. Timestamps are stamped by the write path.
    pub fn update_details(&mut self, name: String, description: String) {
        self.name = name;
        self.description = description;
    }
}

impl Entity for Category {
    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
}
