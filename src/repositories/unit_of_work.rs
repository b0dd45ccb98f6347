// src/repositories/unit_of_work.rs
//
// Unit of Work
//
// RULES:
// - One unit of work per logical operation; never shared across threads
// - Pins ONE pooled connection for its whole lifetime; that connection is the
//   only one the write port ever writes on
// - save_changes is atomic: everything staged is written inside one
//   savepoint, or nothing is
// - A cancelled unit of work discards what it staged and rolls back
// - The pooled connection is returned exactly once, never inside an open
//   transaction

use log::{debug, info, warn};

use super::category_repository::CategoryRepository;
use super::product_repository::ProductRepository;
use super::read_port::DirectReader;
use super::repository::Repository;
use super::write_port::ChangeTracker;
use crate::cancellation::CancellationSignal;
use crate::db::{ConnectionPool, PooledConn};
use crate::domain::{Category, Product};
use crate::error::{AppError, AppResult};

const SAVEPOINT: &str = "uow_save_changes";

pub struct UnitOfWork {
    conn: PooledConn,
    category_reader: DirectReader<Category>,
    product_reader: DirectReader<Product>,
    category_changes: ChangeTracker<Category>,
    product_changes: ChangeTracker<Product>,
    cancel: CancellationSignal,
    closed: bool,
}

impl UnitOfWork {
    /// Pin a unit-of-work connection from `pool`. Direct reads made through
    /// this unit of work borrow from the pool's separate read side.
    pub fn begin(pool: &ConnectionPool, cancel: CancellationSignal) -> AppResult<Self> {
        cancel.check()?;
        let conn = pool.unit_of_work_connection()?;

        Ok(Self {
            conn,
            category_reader: DirectReader::new(pool.clone()),
            product_reader: DirectReader::new(pool.clone()),
            category_changes: ChangeTracker::new(),
            product_changes: ChangeTracker::new(),
            cancel,
            closed: false,
        })
    }

    pub fn categories(&mut self) -> CategoryRepository<'_> {
        Repository::new(
            &self.category_reader,
            &mut self.category_changes,
            &self.conn,
            &self.cancel,
        )
    }

    pub fn products(&mut self) -> ProductRepository<'_> {
        Repository::new(
            &self.product_reader,
            &mut self.product_changes,
            &self.conn,
            &self.cancel,
        )
    }

    pub fn cancellation(&self) -> &CancellationSignal {
        &self.cancel
    }

    pub fn has_changes(&self) -> bool {
        self.category_changes.has_changes() || self.product_changes.has_changes()
    }

    pub fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }

    /// Write every staged mutation in one atomic step and return how many
    /// rows were written.
    ///
    /// Inside an explicit transaction the writes become durable on `commit`;
    /// otherwise they are committed here. Categories are written before
    /// products.
    pub fn save_changes(&mut self) -> AppResult<usize> {
        if let Err(e) = self.cancel.check() {
            self.discard_changes();
            return Err(e);
        }
        if !self.has_changes() {
            return Ok(0);
        }

        self.conn.execute_batch(&format!("SAVEPOINT {}", SAVEPOINT))?;

        let flushed = (|| {
            let categories = self.category_changes.flush(&self.conn)?;
            let products = self.product_changes.flush(&self.conn)?;
            self.cancel.check()?;
            Ok::<_, AppError>((categories, products))
        })();

        let (categories, products) = match flushed {
            Ok(outcomes) => outcomes,
            Err(e) => {
                self.rollback_savepoint();
                if matches!(e, AppError::Cancelled) {
                    self.discard_changes();
                }
                warn!("event=uow_save module=repositories status=error error={}", e);
                return Err(e);
            }
        };

        if let Err(e) = self.conn.execute_batch(&format!("RELEASE {}", SAVEPOINT)) {
            self.rollback_savepoint();
            warn!("event=uow_save module=repositories status=error error={}", e);
            return Err(e.into());
        }

        let affected = categories.affected() + products.affected();
        self.category_changes.accept(categories);
        self.product_changes.accept(products);

        debug!(
            "event=uow_save module=repositories status=ok rows={} in_transaction={}",
            affected,
            self.in_transaction()
        );
        Ok(affected)
    }

    /// Open an explicit transaction spanning several saves.
    pub fn begin_transaction(&mut self) -> AppResult<()> {
        self.cancel.check()?;
        if self.in_transaction() {
            return Err(AppError::InvalidOperation(
                "a transaction is already open on this unit of work".to_string(),
            ));
        }

        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        debug!("event=uow_begin module=repositories status=ok");
        Ok(())
    }

    /// Save anything still staged, then commit. Any failure (cancellation
    /// included) rolls the whole transaction back.
    pub fn commit(&mut self) -> AppResult<()> {
        if !self.in_transaction() {
            return Err(AppError::InvalidOperation(
                "no transaction is open on this unit of work".to_string(),
            ));
        }

        let committed = self
            .save_changes()
            .and_then(|_| self.cancel.check())
            .and_then(|_| self.conn.execute_batch("COMMIT").map_err(AppError::from));

        match committed {
            Ok(()) => {
                info!("event=uow_commit module=repositories status=ok");
                Ok(())
            }
            Err(e) => {
                warn!(
                    "event=uow_commit module=repositories status=error error={}",
                    e
                );
                if let Err(rollback_err) = self.rollback() {
                    warn!(
                        "event=uow_rollback module=repositories status=error error={}",
                        rollback_err
                    );
                }
                Err(e)
            }
        }
    }

    /// Drop everything staged and undo everything written since
    /// `begin_transaction`.
    pub fn rollback(&mut self) -> AppResult<()> {
        self.discard_changes();
        if !self.in_transaction() {
            return Ok(());
        }

        self.conn.execute_batch("ROLLBACK")?;
        info!("event=uow_rollback module=repositories status=ok");
        Ok(())
    }

    /// Release the unit of work, rolling back an open transaction.
    pub fn close(mut self) -> AppResult<()> {
        self.closed = true;
        self.rollback()
    }

    fn discard_changes(&mut self) {
        self.category_changes.discard();
        self.product_changes.discard();
    }

    fn rollback_savepoint(&self) {
        let sql = format!("ROLLBACK TO {0}; RELEASE {0}", SAVEPOINT);
        if let Err(e) = self.conn.execute_batch(&sql) {
            warn!(
                "event=uow_savepoint_rollback module=repositories status=error error={}",
                e
            );
        }
    }
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        if self.closed || !self.in_transaction() {
            return;
        }

        match self.conn.execute_batch("ROLLBACK") {
            Ok(()) => warn!("event=uow_drop module=repositories status=rolled_back"),
            Err(e) => warn!("event=uow_drop module=repositories status=error error={}", e),
        }
    }
}

/// Creates units of work. The seam services depend on.
#[cfg_attr(test, mockall::automock)]
pub trait UnitOfWorkFactory: Send + Sync {
    fn create(&self, cancel: CancellationSignal) -> AppResult<UnitOfWork>;
}

#[derive(Clone)]
pub struct SqliteUnitOfWorkFactory {
    pool: ConnectionPool,
}

impl SqliteUnitOfWorkFactory {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }
}

impl UnitOfWorkFactory for SqliteUnitOfWorkFactory {
    fn create(&self, cancel: CancellationSignal) -> AppResult<UnitOfWork> {
        UnitOfWork::begin(&self.pool, cancel)
    }
}
