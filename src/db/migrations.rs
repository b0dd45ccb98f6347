// src/db/migrations.rs
//
// Catalog schema and its version table.
//
// Versions only move forward; an unknown version is refused, never guessed at.

use log::info;
use rusqlite::Connection;

use crate::error::{AppError, AppResult};

/// Bumped with every new SCHEMA_Vn block.
const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Version 1: categories + products with soft-delete columns.
///
/// - Category names are unique among non-deleted rows only (partial index),
///   so a soft-deleted name can be reused.
/// - products.category_id is RESTRICT: a category referenced by any product,
///   deleted or not, cannot be physically removed.
const SCHEMA_V1: &str = "
CREATE TABLE IF NOT EXISTS schema_version (
    version     INTEGER PRIMARY KEY,
    applied_at  TEXT NOT NULL
);

CREATE TABLE categories (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL CHECK (length(name) BETWEEN 1 AND 100),
    description TEXT NOT NULL CHECK (length(description) BETWEEN 1 AND 500),
    created_at  TEXT NOT NULL,
    updated_at  TEXT,
    is_deleted  INTEGER NOT NULL DEFAULT 0 CHECK (is_deleted IN (0, 1))
);

CREATE UNIQUE INDEX ux_categories_name_live
    ON categories (name) WHERE is_deleted = 0;

CREATE TABLE products (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL CHECK (length(name) BETWEEN 1 AND 200),
    description TEXT NOT NULL CHECK (length(description) BETWEEN 1 AND 1000),
    price       TEXT NOT NULL,
    stock       INTEGER NOT NULL CHECK (stock >= 0),
    category_id INTEGER NOT NULL REFERENCES categories (id) ON DELETE RESTRICT,
    created_at  TEXT NOT NULL,
    updated_at  TEXT,
    is_deleted  INTEGER NOT NULL DEFAULT 0 CHECK (is_deleted IN (0, 1))
);

CREATE INDEX ix_products_name ON products (name);
CREATE INDEX ix_products_category_id ON products (category_id);
";

/// Bring a fresh database to the current schema. A database already at the
/// current version is left alone; any other version is an error.
pub fn initialize_database(conn: &Connection) -> AppResult<()> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        apply_initial_schema(conn)?;
        info!(
            "event=db_migrate module=db status=ok from_version=0 to_version={}",
            CURRENT_SCHEMA_VERSION
        );
    } else if current_version < CURRENT_SCHEMA_VERSION {
        return Err(AppError::Other(format!(
            "Schema version {} is outdated. Expected {}. Manual migration required.",
            current_version, CURRENT_SCHEMA_VERSION
        )));
    } else if current_version > CURRENT_SCHEMA_VERSION {
        return Err(AppError::Other(format!(
            "Schema version {} is newer than supported {}. Update the application.",
            current_version, CURRENT_SCHEMA_VERSION
        )));
    }

    Ok(())
}

/// 0 for a database without a `schema_version` table.
fn get_schema_version(conn: &Connection) -> AppResult<i32> {
    let table_exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !table_exists {
        return Ok(0);
    }

    let version: Option<i32> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get(0)
        })?;

    Ok(version.unwrap_or(0))
}

/// Apply initial schema (version 1) and record it, atomically.
fn apply_initial_schema(conn: &Connection) -> AppResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(SCHEMA_V1)
        .map_err(|e| AppError::Other(format!("Failed to apply initial schema: {}", e)))?;

    tx.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?1, datetime('now'))",
        [CURRENT_SCHEMA_VERSION],
    )?;

    tx.commit()?;
    Ok(())
}

/// `PRAGMA integrity_check`, failing on anything but `ok`.
pub fn verify_database_integrity(conn: &Connection) -> AppResult<()> {
    let result: String = conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;

    if result != "ok" {
        return Err(AppError::Other(format!(
            "Database integrity check failed: {}",
            result
        )));
    }

    Ok(())
}

/// File size and row counts. Row counts include soft-deleted rows; the split is reported separately.
pub fn get_database_stats(conn: &Connection) -> AppResult<DatabaseStats> {
    let page_count: i64 = conn.query_row("PRAGMA page_count", [], |row| row.get(0))?;
    let page_size: i64 = conn.query_row("PRAGMA page_size", [], |row| row.get(0))?;

    let (category_count, deleted_category_count): (i64, i64) = conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(is_deleted), 0) FROM categories",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    let (product_count, deleted_product_count): (i64, i64) = conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(is_deleted), 0) FROM products",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    Ok(DatabaseStats {
        size_bytes: page_count * page_size,
        page_count,
        page_size,
        category_count,
        deleted_category_count,
        product_count,
        deleted_product_count,
    })
}

/// Snapshot returned by [`get_database_stats`].
#[derive(Debug)]
pub struct DatabaseStats {
    pub size_bytes: i64,
    pub page_count: i64,
    pub page_size: i64,
    pub category_count: i64,
    pub deleted_category_count: i64,
    pub product_count: i64,
    pub deleted_product_count: i64,
}
