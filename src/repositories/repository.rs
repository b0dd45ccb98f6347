// src/repositories/repository.rs
//
// Hybrid repository: one handle, two explicit ports.
//
// - Reads (`get_by_id`, `get_all`, `get_paged`, `exists`, `count`) go through
//   the read port on their own connection.
// - `find`, `delete` and the navigational loads go through the unit of work's
//   connection with the change tracker overlaid.
// - `add` / `update` / `delete` only stage; the unit of work flushes.
//
// A `Repository` borrows its unit of work, so it cannot outlive it or be
// handed to another one.

use rusqlite::{params, Connection};

use super::mapping::{storage_now, Persistable};
use super::read_port::DirectReader;
use super::soft_delete::{select_live, LiveSelect};
use super::write_port::{ChangeTracker, EntryKey};
use crate::cancellation::CancellationSignal;
use crate::domain::EntityId;
use crate::error::AppResult;

pub struct Repository<'uow, T: Persistable> {
    reader: &'uow DirectReader<T>,
    tracker: &'uow mut ChangeTracker<T>,
    conn: &'uow Connection,
    cancel: &'uow CancellationSignal,
}

impl<'uow, T: Persistable> Repository<'uow, T> {
    pub(crate) fn new(
        reader: &'uow DirectReader<T>,
        tracker: &'uow mut ChangeTracker<T>,
        conn: &'uow Connection,
        cancel: &'uow CancellationSignal,
    ) -> Self {
        Self {
            reader,
            tracker,
            conn,
            cancel,
        }
    }

    // ------------------------------------------------------------------
    // Read port
    // ------------------------------------------------------------------

    pub fn get_by_id(&self, id: EntityId) -> AppResult<Option<T>> {
        self.cancel.check()?;
        self.reader.get_by_id(id)
    }

    pub fn get_all(&self) -> AppResult<Vec<T>> {
        self.cancel.check()?;
        self.reader.get_all()
    }

    pub fn get_paged(&self, page_number: i64, page_size: i64) -> AppResult<(Vec<T>, i64)> {
        self.cancel.check()?;
        self.reader.get_paged(page_number, page_size)
    }

    pub fn exists(&self, id: EntityId) -> AppResult<bool> {
        self.cancel.check()?;
        self.reader.exists(id)
    }

    pub fn count(&self) -> AppResult<i64> {
        self.cancel.check()?;
        self.reader.count()
    }

    // ------------------------------------------------------------------
    // Buffered path
    // ------------------------------------------------------------------

    /// Live rows as this unit of work sees them, filtered by `predicate`.
    ///
    /// Staged updates replace the stored row before the predicate runs;
    /// staged deletes hide it. Staged inserts are not visible until saved.
    pub fn find<P>(&self, predicate: P) -> AppResult<Vec<T>>
    where
        P: Fn(&T) -> bool,
    {
        self.cancel.check()?;

        let rows: Vec<T> = select_live(
            self.conn,
            &LiveSelect::entity::<T>().tail("ORDER BY t.id"),
            &[],
        )?;

        Ok(rows
            .into_iter()
            .filter_map(|row| self.overlay(row))
            .filter(|entity| predicate(entity))
            .collect())
    }

    /// Stage an insert. The assigned id is visible through `entry(key)`
    /// once the unit of work has saved.
    pub fn add(&mut self, entity: T) -> AppResult<EntryKey> {
        self.cancel.check()?;
        self.tracker.add(entity, storage_now())
    }

    pub fn update(&mut self, entity: T) -> AppResult<EntryKey> {
        self.cancel.check()?;
        self.tracker.update(entity, storage_now())
    }

    /// Stage a soft delete. Absent (or already deleted) ids are a silent
    /// no-op; callers needing a not-found signal must check first.
    pub fn delete(&mut self, id: EntityId) -> AppResult<()> {
        self.cancel.check()?;

        let Some(entity) = self.load_live(id)? else {
            return Ok(());
        };

        self.tracker.stage_delete(entity, storage_now())?;
        Ok(())
    }

    /// Tracked entity behind `key`, if still attached.
    pub fn entry(&self, key: EntryKey) -> Option<&T> {
        self.tracker.entry(key)
    }

    /// One live entity through the unit of work's connection, tracker
    /// overlaid.
    pub(crate) fn load_live(&self, id: EntityId) -> AppResult<Option<T>> {
        if let Some(tracked) = self.tracker.tracked(id) {
            return Ok((!tracked.meta().is_deleted).then(|| tracked.clone()));
        }

        let rows: Vec<T> = select_live(
            self.conn,
            &LiveSelect::entity::<T>().conditions(&["t.id = ?1"]),
            params![id],
        )?;
        Ok(rows.into_iter().next())
    }

    pub(crate) fn reader(&self) -> &DirectReader<T> {
        self.reader
    }

    pub(crate) fn connection(&self) -> &Connection {
        self.conn
    }

    pub(crate) fn check_cancelled(&self) -> AppResult<()> {
        self.cancel.check()
    }

    fn overlay(&self, row: T) -> Option<T> {
        match self.tracker.tracked(row.id()) {
            Some(tracked) if tracked.meta().is_deleted => None,
            Some(tracked) => Some(tracked.clone()),
            None => Some(row),
        }
    }
}
