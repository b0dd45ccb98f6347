// src/repositories/mapping.rs
//
// Explicit per-entity schema mapping.
//
// Every persisted type declares its table and entity-specific columns here;
// storage names are never derived from type names.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::Row;

use crate::domain::{Entity, EntityMeta};

/// Columns every table carries, in select order.
pub const META_COLUMNS: [&str; 4] = ["id", "created_at", "updated_at", "is_deleted"];

/// Table name plus the entity-specific (non-meta) columns, in the order
/// `Persistable::column_values` produces them.
#[derive(Debug, Clone, Copy)]
pub struct TableMapping {
    pub table: &'static str,
    pub columns: &'static [&'static str],
    /// Soft-deletable tables get the `is_deleted = 0` scope on every read.
    pub soft_delete: bool,
}

impl TableMapping {
    /// `alias.id, alias.created_at, ..., alias.<column>` for SELECT lists.
    pub fn select_list(&self, alias: &str) -> String {
        META_COLUMNS
            .iter()
            .chain(self.columns.iter())
            .map(|column| format!("{}.{}", alias, column))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn insert_sql(&self) -> String {
        let columns: Vec<&str> = ["created_at", "updated_at", "is_deleted"]
            .into_iter()
            .chain(self.columns.iter().copied())
            .collect();
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            columns.join(", "),
            placeholders.join(", ")
        )
    }

    /// `created_at` is deliberately absent: it is written once, on insert.
    /// `is_deleted` can only move from 0 to 1.
    pub fn update_sql(&self) -> String {
        let mut assignments = vec![
            "updated_at = ?1".to_string(),
            "is_deleted = MAX(is_deleted, ?2)".to_string(),
        ];
        for (offset, column) in self.columns.iter().enumerate() {
            assignments.push(format!("{} = ?{}", column, offset + 3));
        }
        format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            self.table,
            assignments.join(", "),
            self.columns.len() + 3
        )
    }
}

/// Joined columns carried by every entity-wide read, where the entity's own
/// table is aliased `t` (a parent's display name, for instance).
#[derive(Debug, Clone, Copy)]
pub struct JoinedProjection {
    /// Appended to the select list, leading comma included.
    pub columns: &'static str,
    pub joins: &'static str,
}

impl JoinedProjection {
    pub const NONE: Self = Self {
        columns: "",
        joins: "",
    };
}

/// A domain entity the hybrid repository can read and write.
pub trait Persistable: Entity + Clone + Send + 'static {
    const MAPPING: TableMapping;

    /// Read-only projection joined onto `get_by_id`, `get_all`, `get_paged`,
    /// `find` and the unit of work's own loads.
    const PROJECTION: JoinedProjection = JoinedProjection::NONE;

    /// Build the entity from a row selected with `MAPPING.select_list`.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Values for `MAPPING.columns`, same order.
    fn column_values(&self) -> Vec<Value>;
}

/// Current time at storage precision (microseconds), so an entity stamped
/// in memory compares equal to the same entity read back.
pub fn storage_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

pub fn encode_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_timestamp(column: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

/// Read the shared meta columns by name.
pub fn meta_from_row(row: &Row<'_>) -> rusqlite::Result<EntityMeta> {
    let id: i64 = row.get("id")?;

    let created_raw: String = row.get("created_at")?;
    let created_at = decode_timestamp(1, &created_raw)?;

    let updated_raw: Option<String> = row.get("updated_at")?;
    let updated_at = updated_raw
        .map(|raw| decode_timestamp(2, &raw))
        .transpose()?;

    let is_deleted: bool = row.get("is_deleted")?;

    Ok(EntityMeta {
        id,
        created_at,
        updated_at,
        is_deleted,
    })
}

/// Read a column that only some queries project (joined or aggregated
/// values). Absent column reads as `None`.
pub fn optional_column<T: rusqlite::types::FromSql>(
    row: &Row<'_>,
    name: &str,
) -> rusqlite::Result<Option<T>> {
    match row.get::<_, Option<T>>(name) {
        Ok(value) => Ok(value),
        Err(rusqlite::Error::InvalidColumnName(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Parameters for the insert statement of `entity`.
pub(crate) fn insert_values<T: Persistable>(entity: &T) -> Vec<Value> {
    let meta = entity.meta();
    let mut values = vec![
        Value::Text(encode_timestamp(&meta.created_at)),
        meta.updated_at
            .as_ref()
            .map(|dt| Value::Text(encode_timestamp(dt)))
            .unwrap_or(Value::Null),
        Value::Integer(i64::from(meta.is_deleted)),
    ];
    values.extend(entity.column_values());
    values
}

/// Parameters for the update statement of `entity`.
pub(crate) fn update_values<T: Persistable>(entity: &T) -> Vec<Value> {
    let meta = entity.meta();
    let mut values = vec![
        meta.updated_at
            .as_ref()
            .map(|dt| Value::Text(encode_timestamp(dt)))
            .unwrap_or(Value::Null),
        Value::Integer(i64::from(meta.is_deleted)),
    ];
    values.extend(entity.column_values());
    values.push(Value::Integer(meta.id));
    values
}
