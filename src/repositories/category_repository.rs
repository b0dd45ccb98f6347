// src/repositories/category_repository.rs
//
// Category persistence: column mapping plus category-specific queries.

use rusqlite::types::Value;
use rusqlite::{params, Row, ToSql};

use super::mapping::{meta_from_row, optional_column, Persistable, TableMapping};
use super::read_port::{contains_pattern, page_window, DirectReader};
use super::repository::Repository;
use super::soft_delete::{count_live, live_predicate, select_live, LiveSelect};
use crate::domain::{Category, EntityId, Product, TRANSIENT_ID};
use crate::error::AppResult;

pub type CategoryRepository<'uow> = Repository<'uow, Category>;

impl Persistable for Category {
    const MAPPING: TableMapping = TableMapping {
        table: "categories",
        columns: &["name", "description"],
        soft_delete: true,
    };

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Category {
            meta: meta_from_row(row)?,
            name: row.get("name")?,
            description: row.get("description")?,
            products: None,
            product_count: optional_column(row, "product_count")?,
        })
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            Value::Text(self.description.clone()),
        ]
    }
}

impl DirectReader<Category> {
    /// Live categories with their live product count materialized.
    fn counted(
        &self,
        conditions: &[&str],
        order_and_limit: &str,
        params: &[&dyn ToSql],
    ) -> AppResult<Vec<Category>> {
        let product_scope = live_predicate(&Product::MAPPING, "p")
            .map(|predicate| format!(" AND {}", predicate))
            .unwrap_or_default();
        let joins = format!(
            "LEFT JOIN products p ON p.category_id = c.id{}",
            product_scope
        );
        let tail = format!("GROUP BY c.id {}", order_and_limit);

        self.query(
            &LiveSelect::new("c")
                .extra_columns(", COUNT(p.id) AS product_count")
                .joins(&joins)
                .conditions(conditions)
                .tail(&tail),
            params,
        )
    }

    /// Live categories ordered by name, each with its live product count.
    pub fn get_with_product_count(&self) -> AppResult<Vec<Category>> {
        self.counted(&[], "ORDER BY c.name", &[])
    }

    /// `get_paged` with product counts.
    pub fn get_paged_with_product_count(
        &self,
        page_number: i64,
        page_size: i64,
    ) -> AppResult<(Vec<Category>, i64)> {
        let (limit, offset) = page_window(page_number, page_size)?;

        let total = self.count()?;
        let items = self.counted(&[], "ORDER BY c.id LIMIT ?1 OFFSET ?2", params![limit, offset])?;

        Ok((items, total))
    }

    /// Whether a live category already uses `name` (case-sensitive),
    /// ignoring the category `excluding`.
    pub fn exists_by_name(&self, name: &str, excluding: Option<EntityId>) -> AppResult<bool> {
        let conn = self.connection()?;
        let count = count_live::<Category>(
            &conn,
            &["t.name = ?1", "t.id <> ?2"],
            params![name, excluding.unwrap_or(TRANSIENT_ID)],
        )?;
        Ok(count > 0)
    }

    /// Case-insensitive substring match on name or description, by name.
    pub fn search(&self, term: &str) -> AppResult<Vec<Category>> {
        let Some(pattern) = contains_pattern(term) else {
            return Ok(Vec::new());
        };

        self.counted(
            &[r"c.name LIKE ?1 ESCAPE '\' OR c.description LIKE ?1 ESCAPE '\'"],
            "ORDER BY c.name",
            params![pattern],
        )
    }
}

impl<'uow> Repository<'uow, Category> {
    pub fn get_with_product_count(&self) -> AppResult<Vec<Category>> {
        self.check_cancelled()?;
        self.reader().get_with_product_count()
    }

    pub fn get_paged_with_product_count(
        &self,
        page_number: i64,
        page_size: i64,
    ) -> AppResult<(Vec<Category>, i64)> {
        self.check_cancelled()?;
        self.reader().get_paged_with_product_count(page_number, page_size)
    }

    pub fn exists_by_name(&self, name: &str, excluding: Option<EntityId>) -> AppResult<bool> {
        self.check_cancelled()?;
        self.reader().exists_by_name(name, excluding)
    }

    pub fn search(&self, term: &str) -> AppResult<Vec<Category>> {
        self.check_cancelled()?;
        self.reader().search(term)
    }

    /// The category plus its live products (by name), loaded through the
    /// unit of work's connection.
    pub fn get_with_products(&self, id: EntityId) -> AppResult<Option<Category>> {
        self.check_cancelled()?;

        let Some(mut category) = self.load_live(id)? else {
            return Ok(None);
        };

        let products: Vec<Product> = select_live(
            self.connection(),
            &LiveSelect::new("p")
                .extra_columns(", c.name AS category_name")
                .joins("JOIN categories c ON c.id = p.category_id")
                .conditions(&["p.category_id = ?1"])
                .tail("ORDER BY p.name"),
            params![id],
        )?;

        category.product_count = Some(products.len() as i64);
        category.products = Some(products);
        Ok(Some(category))
    }
}
