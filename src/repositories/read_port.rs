// src/repositories/read_port.rs
//
// Read port: direct queries, connection-per-call.
//
// RULES:
// - Every call borrows its own read-pool connection and returns it immediately
// - Never participates in a unit of work's transaction: writes staged or
//   flushed-but-uncommitted by a unit of work are NOT visible here
// - Stateless apart from the pool handle; cheap to clone

use std::marker::PhantomData;

use rusqlite::{params, ToSql};

use super::mapping::Persistable;
use super::soft_delete::{count_live, select_live, LiveSelect};
use crate::db::{ConnectionPool, PooledConn};
use crate::domain::EntityId;
use crate::error::{AppError, AppResult};

pub struct DirectReader<T> {
    pool: ConnectionPool,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for DirectReader<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: Persistable> DirectReader<T> {
    pub fn new(pool: ConnectionPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }

    pub(crate) fn connection(&self) -> AppResult<PooledConn> {
        self.pool.read_connection()
    }

    /// Live rows matching `select`, on a fresh connection.
    pub(crate) fn query(
        &self,
        select: &LiveSelect<'_>,
        params: &[&dyn ToSql],
    ) -> AppResult<Vec<T>> {
        let conn = self.connection()?;
        select_live(&conn, select, params)
    }

    pub fn get_by_id(&self, id: EntityId) -> AppResult<Option<T>> {
        let rows = self.query(
            &LiveSelect::entity::<T>().conditions(&["t.id = ?1"]),
            params![id],
        )?;
        Ok(rows.into_iter().next())
    }

    /// Bypasses the soft-delete scope. Audits and tests only.
    pub fn get_by_id_including_deleted(&self, id: EntityId) -> AppResult<Option<T>> {
        let conn = self.connection()?;
        let sql = format!(
            "SELECT {} FROM {} t WHERE t.id = ?1",
            T::MAPPING.select_list("t"),
            T::MAPPING.table
        );
        let mut stmt = conn.prepare_cached(&sql)?;
        let mut rows = stmt.query(params![id])?;

        match rows.next()? {
            Some(row) => Ok(Some(T::from_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn get_all(&self) -> AppResult<Vec<T>> {
        self.query(&LiveSelect::entity::<T>(), &[])
    }

    /// One page ordered by id, plus the live row count.
    ///
    /// Count and page are two separate statements with no shared snapshot;
    /// a concurrent write between them can make `total` disagree with the page.
    pub fn get_paged(&self, page_number: i64, page_size: i64) -> AppResult<(Vec<T>, i64)> {
        let (limit, offset) = page_window(page_number, page_size)?;

        let total = self.count()?;
        let items = self.query(
            &LiveSelect::entity::<T>().tail("ORDER BY t.id LIMIT ?1 OFFSET ?2"),
            params![limit, offset],
        )?;

        Ok((items, total))
    }

    pub fn exists(&self, id: EntityId) -> AppResult<bool> {
        let conn = self.connection()?;
        Ok(count_live::<T>(&conn, &["t.id = ?1"], params![id])? > 0)
    }

    pub fn count(&self) -> AppResult<i64> {
        let conn = self.connection()?;
        count_live::<T>(&conn, &[], &[])
    }
}

/// `(LIMIT, OFFSET)` for a 1-based page.
pub(crate) fn page_window(page_number: i64, page_size: i64) -> AppResult<(i64, i64)> {
    if page_number < 1 {
        return Err(AppError::InvalidArgument(format!(
            "page number must be at least 1, got {}",
            page_number
        )));
    }
    if page_size < 1 {
        return Err(AppError::InvalidArgument(format!(
            "page size must be at least 1, got {}",
            page_size
        )));
    }
    Ok((page_size, (page_number - 1).saturating_mul(page_size)))
}

/// `%term%` with LIKE metacharacters escaped (use with `ESCAPE '\'`).
/// `None` for a blank term: an empty search matches nothing.
pub fn contains_pattern(term: &str) -> Option<String> {
    let term = term.trim();
    if term.is_empty() {
        return None;
    }

    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    Some(pattern)
}
