// src/repositories/soft_delete.rs
//
// Soft-delete scope
//
// RULES:
// - Every default read, on both the direct and the buffered path, is built
//   by `select_live`; nothing else composes the `is_deleted = 0` filter.
// - Join conditions that must ignore deleted rows use `live_predicate`.
// - The only unfiltered read is DirectReader::get_by_id_including_deleted.

use rusqlite::{Connection, ToSql};

use super::mapping::{Persistable, TableMapping};
use crate::error::AppResult;

/// Alias of the entity's own table in entity-wide reads.
pub const ENTITY_ALIAS: &str = "t";

/// `alias.is_deleted = 0` for soft-deletable tables, `None` otherwise.
pub fn live_predicate(mapping: &TableMapping, alias: &str) -> Option<String> {
    mapping
        .soft_delete
        .then(|| format!("{}.is_deleted = 0", alias))
}

/// Shape of a scoped SELECT. `conditions` are ANDed with the live predicate;
/// `tail` carries GROUP BY / ORDER BY / LIMIT.
#[derive(Debug, Default, Clone, Copy)]
pub struct LiveSelect<'q> {
    pub alias: &'q str,
    pub extra_columns: &'q str,
    pub joins: &'q str,
    pub conditions: &'q [&'q str],
    pub tail: &'q str,
}

impl<'q> LiveSelect<'q> {
    pub fn new(alias: &'q str) -> Self {
        Self {
            alias,
            ..Self::default()
        }
    }

    /// Entity-wide read of `T` under `ENTITY_ALIAS`, with `T::PROJECTION`.
    pub fn entity<T: Persistable>() -> LiveSelect<'static> {
        LiveSelect::new(ENTITY_ALIAS)
            .extra_columns(T::PROJECTION.columns)
            .joins(T::PROJECTION.joins)
    }

    pub fn extra_columns(mut self, columns: &'q str) -> Self {
        self.extra_columns = columns;
        self
    }

    pub fn joins(mut self, joins: &'q str) -> Self {
        self.joins = joins;
        self
    }

    pub fn conditions(mut self, conditions: &'q [&'q str]) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn tail(mut self, tail: &'q str) -> Self {
        self.tail = tail;
        self
    }

    /// Render the statement for `mapping`.
    pub fn to_sql(&self, mapping: &TableMapping) -> String {
        let mut clauses: Vec<String> = Vec::new();
        if let Some(live) = live_predicate(mapping, self.alias) {
            clauses.push(live);
        }
        clauses.extend(self.conditions.iter().map(|c| format!("({})", c)));

        let mut sql = format!(
            "SELECT {}{} FROM {} {}",
            mapping.select_list(self.alias),
            self.extra_columns,
            mapping.table,
            self.alias
        );
        if !self.joins.is_empty() {
            sql.push(' ');
            sql.push_str(self.joins);
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        if !self.tail.is_empty() {
            sql.push(' ');
            sql.push_str(self.tail);
        }
        sql
    }
}

/// Run a scoped SELECT on `conn` and map every row.
pub fn select_live<T: Persistable>(
    conn: &Connection,
    select: &LiveSelect<'_>,
    params: &[&dyn ToSql],
) -> AppResult<Vec<T>> {
    let sql = select.to_sql(&T::MAPPING);
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt
        .query_map(params, |row| T::from_row(row))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// `COUNT(*)` over the live rows of `T`.
pub fn count_live<T: Persistable>(
    conn: &Connection,
    conditions: &[&str],
    params: &[&dyn ToSql],
) -> AppResult<i64> {
    let mapping = T::MAPPING;
    let mut clauses: Vec<String> = live_predicate(&mapping, "t").into_iter().collect();
    clauses.extend(conditions.iter().map(|c| format!("({})", c)));

    let mut sql = format!("SELECT COUNT(*) FROM {} t", mapping.table);
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }

    let count: i64 = conn.query_row(&sql, params, |row| row.get(0))?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDGETS: TableMapping = TableMapping {
        table: "widgets",
        columns: &["name"],
        soft_delete: true,
    };

    const LEDGER: TableMapping = TableMapping {
        table: "ledger",
        columns: &["amount"],
        soft_delete: false,
    };

    #[test]
    fn test_live_predicate_only_for_soft_deletable() {
        assert_eq!(
            live_predicate(&WIDGETS, "w").as_deref(),
            Some("w.is_deleted = 0")
        );
        assert!(live_predicate(&LEDGER, "l").is_none());
    }

    #[test]
    fn test_plain_select_is_scoped() {
        let sql = LiveSelect::new("w").to_sql(&WIDGETS);
        assert_eq!(
            sql,
            "SELECT w.id, w.created_at, w.updated_at, w.is_deleted, w.name FROM widgets w WHERE w.is_deleted = 0"
        );
    }

    #[test]
    fn test_conditions_are_anded_after_scope() {
        let sql = LiveSelect::new("w")
            .conditions(&["w.id = ?1", "w.name = ?2 OR w.name = ?3"])
            .tail("ORDER BY w.id")
            .to_sql(&WIDGETS);
        assert!(sql.ends_with(
            "WHERE w.is_deleted = 0 AND (w.id = ?1) AND (w.name = ?2 OR w.name = ?3) ORDER BY w.id"
        ));
    }

    #[test]
    fn test_entity_select_carries_projection() {
        use crate::domain::{Category, Product};

        let sql = LiveSelect::entity::<Product>()
            .conditions(&["t.id = ?1"])
            .to_sql(&Product::MAPPING);
        assert!(sql.contains(", c.name AS category_name FROM products t LEFT JOIN categories c ON c.id = t.category_id WHERE t.is_deleted = 0 AND (t.id = ?1)"));

        let plain = LiveSelect::entity::<Category>().to_sql(&Category::MAPPING);
        assert!(plain.ends_with("FROM categories t WHERE t.is_deleted = 0"));
    }

    #[test]
    fn test_unscoped_table_without_conditions_has_no_where() {
        let sql = LiveSelect::new("l").to_sql(&LEDGER);
        assert!(!sql.contains("WHERE"));
    }
}
