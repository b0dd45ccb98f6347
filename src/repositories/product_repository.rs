// src/repositories/product_repository.rs
//
// Product persistence: column mapping plus product-specific queries.
// Prices are stored as 2-dp decimal text, never as floating point.

use std::str::FromStr;

use rust_decimal::Decimal;
use rusqlite::types::{Type, Value};
use rusqlite::{params, Row};

use super::mapping::{meta_from_row, optional_column, JoinedProjection, Persistable, TableMapping};
use super::read_port::{contains_pattern, DirectReader};
use super::repository::Repository;
use super::soft_delete::LiveSelect;
use crate::domain::product::PRICE_SCALE;
use crate::domain::{EntityId, Product};
use crate::error::AppResult;

pub type ProductRepository<'uow> = Repository<'uow, Product>;

/// Joined projection for the owning category's display name.
const CATEGORY_NAME_COLUMN: &str = ", c.name AS category_name";
const CATEGORY_JOIN: &str = "LEFT JOIN categories c ON c.id = p.category_id";

impl Persistable for Product {
    const MAPPING: TableMapping = TableMapping {
        table: "products",
        columns: &["name", "description", "price", "stock", "category_id"],
        soft_delete: true,
    };

    const PROJECTION: JoinedProjection = JoinedProjection {
        columns: ", c.name AS category_name",
        joins: "LEFT JOIN categories c ON c.id = t.category_id",
    };

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let price_raw: String = row.get("price")?;
        let price = Decimal::from_str(&price_raw)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))?;

        Ok(Product {
            meta: meta_from_row(row)?,
            name: row.get("name")?,
            description: row.get("description")?,
            price: price.normalize(),
            stock: row.get("stock")?,
            category_id: row.get("category_id")?,
            category_name: optional_column(row, "category_name")?,
        })
    }

    fn column_values(&self) -> Vec<Value> {
        let mut price = self.price;
        price.rescale(PRICE_SCALE);

        vec![
            Value::Text(self.name.clone()),
            Value::Text(self.description.clone()),
            Value::Text(price.to_string()),
            Value::Integer(i64::from(self.stock)),
            Value::Integer(self.category_id),
        ]
    }
}

impl DirectReader<Product> {
    /// Live products of one category, by name, with the category name.
    pub fn get_by_category(&self, category_id: EntityId) -> AppResult<Vec<Product>> {
        self.query(
            &LiveSelect::new("p")
                .extra_columns(CATEGORY_NAME_COLUMN)
                .joins(CATEGORY_JOIN)
                .conditions(&["p.category_id = ?1"])
                .tail("ORDER BY p.name"),
            params![category_id],
        )
    }

    pub fn get_in_stock(&self) -> AppResult<Vec<Product>> {
        self.query(
            &LiveSelect::new("p")
                .extra_columns(CATEGORY_NAME_COLUMN)
                .joins(CATEGORY_JOIN)
                .conditions(&["p.stock > 0"])
                .tail("ORDER BY p.name"),
            &[],
        )
    }

    /// Case-insensitive substring match on name or description.
    /// A blank term matches nothing and never reaches the store.
    pub fn search(&self, term: &str) -> AppResult<Vec<Product>> {
        let Some(pattern) = contains_pattern(term) else {
            return Ok(Vec::new());
        };

        self.query(
            &LiveSelect::new("p")
                .extra_columns(CATEGORY_NAME_COLUMN)
                .joins(CATEGORY_JOIN)
                .conditions(&[r"p.name LIKE ?1 ESCAPE '\' OR p.description LIKE ?1 ESCAPE '\'"])
                .tail("ORDER BY p.name"),
            params![pattern],
        )
    }
}

impl<'uow> Repository<'uow, Product> {
    pub fn get_by_category(&self, category_id: EntityId) -> AppResult<Vec<Product>> {
        self.check_cancelled()?;
        self.reader().get_by_category(category_id)
    }

    pub fn get_in_stock(&self) -> AppResult<Vec<Product>> {
        self.check_cancelled()?;
        self.reader().get_in_stock()
    }

    pub fn search(&self, term: &str) -> AppResult<Vec<Product>> {
        self.check_cancelled()?;
        self.reader().search(term)
    }
}
