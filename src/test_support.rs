// src/test_support.rs
//
// Shared fixtures for tests: a throw-away file-backed database (so the read
// port and the unit of work really use different connections) and seeders.

use rust_decimal::Decimal;
use tempfile::TempDir;

use crate::cancellation::CancellationSignal;
use crate::config::DatabaseConfig;
use crate::db::{create_connection_pool, get_connection, initialize_database, ConnectionPool};
use crate::domain::{Category, EntityId, Product};
use crate::repositories::{SqliteUnitOfWorkFactory, UnitOfWork};

pub struct TestDb {
    pub pool: ConnectionPool,
    _dir: TempDir,
}

impl TestDb {
    pub fn new() -> Self {
        Self::with_max_connections(4)
    }

    /// `max_connections` per pool (unit-of-work side and read side).
    pub fn with_max_connections(max_connections: u32) -> Self {
        let dir = TempDir::new().unwrap();
        let config = DatabaseConfig {
            path: dir.path().join("catalog.db"),
            max_connections,
            ..DatabaseConfig::default()
        };
        let pool = create_connection_pool(&config).unwrap();
        initialize_database(&get_connection(&pool).unwrap()).unwrap();

        Self { pool, _dir: dir }
    }

    pub fn factory(&self) -> SqliteUnitOfWorkFactory {
        SqliteUnitOfWorkFactory::new(self.pool.clone())
    }

    /// Persist a category and return it as tracked after save.
    pub fn seed_category(&self, name: &str) -> Category {
        let mut uow = UnitOfWork::begin(&self.pool, CancellationSignal::never()).unwrap();
        let key = uow
            .categories()
            .add(Category::new(name.to_string(), format!("{} description", name)))
            .unwrap();
        uow.save_changes().unwrap();
        let category = uow.categories().entry(key).unwrap().clone();
        uow.close().unwrap();
        category
    }

    /// Persist `count` products named `Product 01`, `Product 02`, ... in id order.
    pub fn seed_products(&self, category_id: EntityId, count: usize) -> Vec<Product> {
        let mut uow = UnitOfWork::begin(&self.pool, CancellationSignal::never()).unwrap();
        let keys: Vec<_> = (1..=count)
            .map(|n| {
                uow.products()
                    .add(Product::new(
                        format!("Product {:02}", n),
                        format!("Fixture product number {}", n),
                        Decimal::new(1000 + n as i64, 2),
                        n as i32,
                        category_id,
                    ))
                    .unwrap()
            })
            .collect();
        uow.save_changes().unwrap();

        let products = keys
            .into_iter()
            .map(|key| uow.products().entry(key).unwrap().clone())
            .collect();
        uow.close().unwrap();
        products
    }
}

/// The round-trip fixture: Laptop, 15-inch, 999.99, stock 5.
pub fn laptop(category_id: EntityId) -> Product {
    Product::new(
        "Laptop".to_string(),
        "15-inch".to_string(),
        Decimal::new(99999, 2),
        5,
        category_id,
    )
}
