// src/repositories/write_port.rs
//
// Write port: buffered, change-tracked mutations.
//
// Nothing here touches the store until the owning unit of work flushes.
// A flush only reports what it did; tracked state changes in `accept`, after
// the surrounding savepoint was released. A failed flush therefore leaves the
// tracker exactly as it was.

use chrono::{DateTime, Utc};
use rusqlite::{params_from_iter, Connection};

use super::mapping::{insert_values, update_values, Persistable};
use crate::domain::{EntityId, TRANSIENT_ID};
use crate::error::{AppError, AppResult};

/// Handle to a tracked entry, valid for the lifetime of its tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryKey(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Staged for INSERT
    Added,
    /// Staged for UPDATE (includes soft deletes)
    Modified,
    /// Matches the store as of the last flush
    Unchanged,
    /// Dropped by a rollback; no longer reachable through its key
    Detached,
}

#[derive(Debug)]
struct TrackedEntry<T> {
    entity: T,
    state: EntryState,
}

/// Result of writing pending entries inside a savepoint.
#[derive(Debug, Default)]
pub struct FlushOutcome {
    assigned: Vec<(usize, EntityId)>,
    flushed: Vec<usize>,
}

impl FlushOutcome {
    pub fn affected(&self) -> usize {
        self.flushed.len()
    }
}

#[derive(Debug)]
pub struct ChangeTracker<T> {
    entries: Vec<TrackedEntry<T>>,
}

impl<T> Default for ChangeTracker<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T: Persistable> ChangeTracker<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage an insert. Stamps `created_at`; `updated_at` stays empty.
    pub fn add(&mut self, mut entity: T, now: DateTime<Utc>) -> AppResult<EntryKey> {
        if !entity.meta().is_transient() {
            return Err(AppError::InvalidOperation(format!(
                "cannot add {} row with id {}: already persisted",
                T::MAPPING.table,
                entity.id()
            )));
        }

        entity.meta_mut().stamp_created(now);
        Ok(self.push(entity, EntryState::Added))
    }

    /// Stage an update of a persisted entity and stamp `updated_at`.
    pub fn update(&mut self, mut entity: T, now: DateTime<Utc>) -> AppResult<EntryKey> {
        if entity.meta().is_transient() {
            return Err(AppError::InvalidOperation(format!(
                "cannot update {} row without an id; add it first",
                T::MAPPING.table
            )));
        }

        if let Some(index) = self.position(entity.id()) {
            // The tracked copy is authoritative for identity and history.
            let tracked = self.entries[index].entity.meta();
            let created_at = tracked.created_at;
            let updated_at = tracked.updated_at.max(entity.meta().updated_at);
            let is_deleted = tracked.is_deleted || entity.meta().is_deleted;

            let meta = entity.meta_mut();
            meta.created_at = created_at;
            meta.updated_at = updated_at;
            meta.is_deleted = is_deleted;
            meta.touch(now);

            self.entries[index] = TrackedEntry {
                entity,
                state: EntryState::Modified,
            };
            return Ok(EntryKey(index));
        }

        entity.meta_mut().touch(now);
        Ok(self.push(entity, EntryState::Modified))
    }

    /// Stage a soft delete of a persisted entity.
    pub fn stage_delete(&mut self, mut entity: T, now: DateTime<Utc>) -> AppResult<EntryKey> {
        if entity.meta().is_transient() {
            return Err(AppError::InvalidOperation(format!(
                "cannot delete {} row without an id",
                T::MAPPING.table
            )));
        }

        entity.meta_mut().mark_deleted(now);
        self.update(entity, now)
    }

    pub fn entry(&self, key: EntryKey) -> Option<&T> {
        self.entries
            .get(key.0)
            .filter(|e| e.state != EntryState::Detached)
            .map(|e| &e.entity)
    }

    pub fn state(&self, key: EntryKey) -> Option<EntryState> {
        self.entries.get(key.0).map(|e| e.state)
    }

    /// The tracked copy of a persisted entity, if any.
    pub fn tracked(&self, id: EntityId) -> Option<&T> {
        self.position(id).map(|index| &self.entries[index].entity)
    }

    pub fn has_changes(&self) -> bool {
        self.entries
            .iter()
            .any(|e| matches!(e.state, EntryState::Added | EntryState::Modified))
    }

    /// Forget everything staged or flushed in this scope.
    pub fn discard(&mut self) {
        for entry in &mut self.entries {
            entry.state = EntryState::Detached;
        }
    }

    /// Write pending entries on `conn`. Does not change tracked state.
    pub fn flush(&self, conn: &Connection) -> AppResult<FlushOutcome> {
        let mut outcome = FlushOutcome::default();
        if !self.has_changes() {
            return Ok(outcome);
        }

        let mapping = T::MAPPING;
        let insert_sql = mapping.insert_sql();
        let update_sql = mapping.update_sql();

        for (index, entry) in self.entries.iter().enumerate() {
            match entry.state {
                EntryState::Added => {
                    let mut stmt = conn.prepare_cached(&insert_sql)?;
                    stmt.execute(params_from_iter(insert_values(&entry.entity)))?;
                    outcome.assigned.push((index, conn.last_insert_rowid()));
                    outcome.flushed.push(index);
                }
                EntryState::Modified => {
                    let mut stmt = conn.prepare_cached(&update_sql)?;
                    let affected = stmt.execute(params_from_iter(update_values(&entry.entity)))?;
                    if affected == 0 {
                        return Err(AppError::StaleEntity {
                            table: mapping.table,
                            id: entry.entity.id(),
                        });
                    }
                    outcome.flushed.push(index);
                }
                EntryState::Unchanged | EntryState::Detached => {}
            }
        }

        Ok(outcome)
    }

    /// Record a flush that reached the store: assign ids, mark clean.
    pub fn accept(&mut self, outcome: FlushOutcome) {
        for (index, id) in outcome.assigned {
            if let Some(entry) = self.entries.get_mut(index) {
                entry.entity.meta_mut().id = id;
            }
        }
        for index in outcome.flushed {
            if let Some(entry) = self.entries.get_mut(index) {
                entry.state = EntryState::Unchanged;
            }
        }
    }

    fn push(&mut self, entity: T, state: EntryState) -> EntryKey {
        self.entries.push(TrackedEntry { entity, state });
        EntryKey(self.entries.len() - 1)
    }

    fn position(&self, id: EntityId) -> Option<usize> {
        if id == TRANSIENT_ID {
            return None;
        }
        self.entries
            .iter()
            .position(|e| e.state != EntryState::Detached && e.entity.id() == id)
    }
}
