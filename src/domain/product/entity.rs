use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::entity::{Entity, EntityId, EntityMeta};

/// A sellable catalog item. Always belongs to exactly one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(flatten)]
    pub meta: EntityMeta,

    pub name: String,

    pub description: String,

    /// Positive, two fractional digits
    pub price: Decimal,

    /// Units on hand, never negative
    pub stock: i32,

    /// Must reference a non-deleted category at write time
    pub category_id: EntityId,

    /// Display name of the owning category, filled by joined read queries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
}

impl Product {
    /// Create a new, not yet persisted product
    pub fn new(
        name: String,
        description: String,
        price: Decimal,
        stock: i32,
        category_id: EntityId,
    ) -> Self {
        Self {
            meta: EntityMeta::transient(),
            name,
            description,
            price: price.normalize(),
            stock,
            category_id,
            category_name: None,
        }
    }

    /// Replace the mutable fields. Timestamps are stamped by the write path.
    pub fn update_details(
        &mut self,
        name: String,
        description: String,
        price: Decimal,
        stock: i32,
        category_id: EntityId,
    ) {
        if self.category_id != category_id {
            self.category_name = None;
        }
        self.name = name;
        self.description = description;
        self.price = price.normalize();
        self.stock = stock;
        self.category_id = category_id;
    }

    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

impl Entity for Product {
    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
}
