// src/domain/entity.rs
//
// Base shape shared by every persisted record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Integer surrogate key.
pub type EntityId = i64;

/// Id carried by an entity that has not been persisted yet.
pub const TRANSIENT_ID: EntityId = 0;

/// Identity, timestamps and soft-delete marker.
///
/// Invariants:
/// 1. `id` is assigned once by the store and never changes afterwards
/// 2. `created_at` is set exactly once, when the entity is staged for insert
/// 3. `updated_at` is `None` until the first accepted mutation
/// 4. `updated_at` never moves backwards relative to `created_at` or itself
/// 5. `is_deleted` is never reset to `false`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMeta {
    pub id: EntityId,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
}

impl EntityMeta {
    /// Metadata for a new, not yet persisted entity.
    pub fn transient() -> Self {
        Self {
            id: TRANSIENT_ID,
            created_at: Utc::now(),
            updated_at: None,
            is_deleted: false,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.id == TRANSIENT_ID
    }

    /// Stamp creation time. Clears any caller-supplied update/delete state.
    pub fn stamp_created(&mut self, now: DateTime<Utc>) {
        self.created_at = now;
        self.updated_at = None;
        self.is_deleted = false;
    }

    /// Record a mutation at `now`, clamped so the timestamp never regresses.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        let floor = self.updated_at.unwrap_or(self.created_at);
        self.updated_at = Some(now.max(floor));
    }

    /// Flip the soft-delete flag and record the mutation.
    pub fn mark_deleted(&mut self, now: DateTime<Utc>) {
        self.is_deleted = true;
        self.touch(now);
    }
}

/// Anything carrying `EntityMeta`.
pub trait Entity {
    fn meta(&self) -> &EntityMeta;
    fn meta_mut(&mut self) -> &mut EntityMeta;

    fn id(&self) -> EntityId {
        self.meta().id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_transient_meta() {
        let meta = EntityMeta::transient();
        assert!(meta.is_transient());
        assert!(meta.updated_at.is_none());
        assert!(!meta.is_deleted);
    }

    #[test]
    fn test_touch_never_regresses() {
        let mut meta = EntityMeta::transient();
        let created = meta.created_at;

        meta.touch(created - Duration::seconds(30));
        assert_eq!(meta.updated_at, Some(created));

        let later = created + Duration::seconds(5);
        meta.touch(later);
        meta.touch(created);
        assert_eq!(meta.updated_at, Some(later));
        assert_eq!(meta.created_at, created);
    }

    #[test]
    fn test_stamp_created_resets_mutation_state() {
        let mut meta = EntityMeta::transient();
        meta.mark_deleted(Utc::now());

        let now = Utc::now();
        meta.stamp_created(now);
        assert_eq!(meta.created_at, now);
        assert!(meta.updated_at.is_none());
        assert!(!meta.is_deleted);
    }

    #[test]
    fn test_mark_deleted_sets_flag_and_timestamp() {
        let mut meta = EntityMeta::transient();
        meta.mark_deleted(Utc::now());
        assert!(meta.is_deleted);
        assert!(meta.updated_at.is_some());
    }
}
