// src/db/connection.rs
//
// Pooled SQLite connections for the catalog store.
//
// Every connection handed out by the pool has foreign keys, WAL and the
// configured busy timeout applied before first use.
//
// WAL mode matters here: the direct read path runs on its own pooled
// connection and must never observe a unit of work's uncommitted writes.
// Units of work and direct reads draw from separate pools.

use log::{error, info};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::time::Instant;

use crate::config::{DatabaseConfig, MIN_POOL_CONNECTIONS};
use crate::error::{AppError, AppResult};

type SqlitePool = Pool<SqliteConnectionManager>;

/// Returned to its pool on drop.
pub type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Two pools over the same database file.
///
/// A unit of work pins one connection from `units` for its whole life and
/// may read through the direct port meanwhile; those reads always come from
/// `reads`, whose connections are never held across another checkout. So a
/// full `units` pool can delay new units of work but never starve their reads.
#[derive(Clone)]
pub struct ConnectionPool {
    units: SqlitePool,
    reads: SqlitePool,
}

impl ConnectionPool {
    /// Connection pinned by a unit of work.
    pub fn unit_of_work_connection(&self) -> AppResult<PooledConn> {
        checkout(&self.units, "unit of work")
    }

    /// Short-lived connection for one direct read.
    pub fn read_connection(&self) -> AppResult<PooledConn> {
        checkout(&self.reads, "read")
    }

    /// Connections per pool.
    pub fn max_size(&self) -> u32 {
        self.units.max_size()
    }
}

fn checkout(pool: &SqlitePool, side: &str) -> AppResult<PooledConn> {
    pool.get().map_err(|e| {
        AppError::Pool(format!(
            "Failed to get database connection ({}): {}",
            side, e
        ))
    })
}

fn build_pool(config: &DatabaseConfig, init_sql: &str) -> AppResult<SqlitePool> {
    let init_sql = init_sql.to_string();
    let manager = SqliteConnectionManager::file(&config.path)
        .with_init(move |conn| conn.execute_batch(&init_sql));

    Pool::builder()
        .max_size(config.max_connections)
        .build(manager)
        .map_err(|e| AppError::Pool(format!("Failed to create connection pool: {}", e)))
}

/// Create the unit-of-work and read pools, `max_connections` each.
///
/// Every connection is initialised with:
/// - Foreign keys enabled (not default in SQLite)
/// - WAL journal for reader/writer isolation
/// - Busy timeout from configuration
pub fn create_connection_pool(config: &DatabaseConfig) -> AppResult<ConnectionPool> {
    let started_at = Instant::now();

    if config.max_connections < MIN_POOL_CONNECTIONS {
        return Err(AppError::InvalidArgument(format!(
            "connection pool needs at least {} connections, got {}",
            MIN_POOL_CONNECTIONS, config.max_connections
        )));
    }

    if let Some(parent) = config.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let init_sql = format!(
        "PRAGMA foreign_keys = ON;
         PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA busy_timeout = {};",
        config.busy_timeout_ms
    );

    let pool = build_pool(config, &init_sql)
        .and_then(|units| {
            Ok(ConnectionPool {
                units,
                reads: build_pool(config, &init_sql)?,
            })
        })
        .map_err(|e| {
            error!(
                "event=pool_create module=db status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                e
            );
            e
        })?;

    info!(
        "event=pool_create module=db status=ok path={} max_size={} pools=2 duration_ms={}",
        config.path.display(),
        config.max_connections,
        started_at.elapsed().as_millis()
    );

    Ok(pool)
}

/// Borrow a short-lived connection (schema setup, stats, direct reads).
pub fn get_connection(pool: &ConnectionPool) -> AppResult<PooledConn> {
    pool.read_connection()
}

/// In-memory connection for schema and flush tests.
/// Not usable for read/write path tests: every in-memory connection is
/// its own database.
pub fn create_test_connection() -> AppResult<Connection> {
    let conn = Connection::open_in_memory().map_err(AppError::Database)?;

    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(AppError::Database)?;

    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> DatabaseConfig {
        DatabaseConfig {
            path: dir.path().join("nested").join("catalog.db"),
            ..DatabaseConfig::default()
        }
    }

    #[test]
    fn test_connection_pool_creation() {
        let dir = TempDir::new().unwrap();
        let pool = create_connection_pool(&config_in(&dir)).unwrap();
        let conn = get_connection(&pool).unwrap();

        let fk_enabled: i32 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk_enabled, 1);

        let journal: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(journal.to_lowercase(), "wal");
    }

    #[test]
    fn test_pool_rejects_zero_connections() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(&dir);
        config.max_connections = 0;
        assert!(matches!(
            create_connection_pool(&config),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_full_unit_of_work_pool_still_reads() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(&dir);
        config.max_connections = 1;
        let pool = create_connection_pool(&config).unwrap();

        let _pinned = pool.unit_of_work_connection().unwrap();
        let conn = pool.read_connection().unwrap();
        let result: i32 = conn.query_row("SELECT 1", [], |row| row.get(0)).unwrap();

        assert_eq!(result, 1);
        assert_eq!(pool.max_size(), 1);
    }

    #[test]
    fn test_test_connection() {
        let conn = create_test_connection().unwrap();

        let result: i32 = conn
            .query_row("SELECT 1 + 1", [], |row| row.get(0))
            .unwrap();
        assert_eq!(result, 2);

        let fk_enabled: i32 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk_enabled, 1);
    }
}
