//! In-memory row store for testing.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, RwLock,
};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::domain::{
    ports::outbound::{Condition, RowQuery, RowStore, Table},
    PlanningError,
};

/// Mock row store backed by in-memory vectors, one per table.
///
/// Generates ids as `{table}-{n}`, stamps `created_at` and enforces the
/// unique (role, team) attachment constraint.
#[derive(Clone, Default)]
pub struct MockRowStore {
    tables: Arc<RwLock<HashMap<Table, Vec<Value>>>>,
    next_id: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
    /// Writes beyond this count fail with a backend error.
    fail_after: Arc<RwLock<Option<usize>>>,
    selects: Arc<RwLock<HashMap<Table, usize>>>,
}

#[allow(dead_code)]
impl MockRowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a table with rows as-is.
    pub fn with_rows(self, table: Table, rows: Vec<Value>) -> Self {
        self.tables
            .write()
            .unwrap()
            .entry(table)
            .or_default()
            .extend(rows);
        self
    }

    pub fn fail_writes_after(&self, n: usize) {
        *self.fail_after.write().unwrap() = Some(self.writes.load(Ordering::SeqCst) + n);
    }

    pub fn rows(&self, table: Table) -> Vec<Value> {
        self.tables
            .read()
            .unwrap()
            .get(&table)
            .cloned()
            .unwrap_or_default()
    }

    /// How many times `table` has been read.
    pub fn select_calls(&self, table: Table) -> usize {
        self.selects
            .read()
            .unwrap()
            .get(&table)
            .copied()
            .unwrap_or_default()
    }

    fn count_write(&self) -> Result<(), PlanningError> {
        let done = self.writes.fetch_add(1, Ordering::SeqCst);
        match *self.fail_after.read().unwrap() {
            Some(limit) if done >= limit => Err(PlanningError::backend("simulated write failure")),
            _ => Ok(()),
        }
    }

    fn violates_unique(table: Table, rows: &[Value], row: &Value) -> bool {
        if table != Table::RoleAttachments {
            return false;
        }
        let key = |r: &Value| (r.get("role_id").cloned(), r.get("equipe_id").cloned());
        let (role, equipe) = key(row);
        if role.as_ref().map_or(true, Value::is_null) {
            return false;
        }
        rows.iter().any(|r| key(r) == (role.clone(), equipe.clone()))
    }
}

fn matches(query: &RowQuery, row: &Value) -> bool {
    query.conditions.iter().all(|c| condition_matches(c, row))
}

/// Compares the way PostgREST does for `eq`: a missing or null column never matches.
fn condition_matches(condition: &Condition, row: &Value) -> bool {
    match condition {
        Condition::Eq(column, expected) => match row.get(column) {
            Some(Value::String(s)) => s == expected,
            Some(Value::Null) | None => false,
            Some(other) => other.to_string() == *expected,
        },
    }
}

fn sort_key(row: &Value, column: &str) -> String {
    match row.get(column) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => format!("{:020.6}", n.as_f64().unwrap_or_default()),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

#[async_trait]
impl RowStore for MockRowStore {
    async fn select(&self, table: Table, query: &RowQuery) -> Result<Vec<Value>, PlanningError> {
        *self.selects.write().unwrap().entry(table).or_default() += 1;

        let mut rows: Vec<Value> = self
            .rows(table)
            .into_iter()
            .filter(|r| matches(query, r))
            .collect();
        if let Some((column, ascending)) = &query.order {
            rows.sort_by_key(|r| sort_key(r, column));
            if !ascending {
                rows.reverse();
            }
        }
        Ok(rows)
    }

    async fn insert(&self, table: Table, row: Value) -> Result<Value, PlanningError> {
        self.count_write()?;

        let Value::Object(mut fields) = row else {
            return Err(PlanningError::backend("insert expects an object"));
        };
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        fields
            .entry("id")
            .or_insert_with(|| Value::String(format!("{}-{}", table, n)));
        let now = OffsetDateTime::now_utc().format(&Rfc3339).unwrap();
        fields
            .entry("created_at")
            .or_insert_with(|| Value::String(now));
        let row = Value::Object(fields);

        let mut tables = self.tables.write().unwrap();
        let rows = tables.entry(table).or_default();
        if Self::violates_unique(table, rows, &row) {
            return Err(PlanningError::Conflict(
                "duplicate key value violates unique constraint".to_string(),
            ));
        }
        rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, table: Table, query: &RowQuery, patch: Value) -> Result<Vec<Value>, PlanningError> {
        self.count_write()?;

        let Value::Object(patch) = patch else {
            return Err(PlanningError::backend("update expects an object"));
        };
        let mut tables = self.tables.write().unwrap();
        let mut updated = Vec::new();
        for row in tables.entry(table).or_default().iter_mut() {
            if !matches(query, row) {
                continue;
            }
            if let Value::Object(fields) = row {
                merge(fields, &patch);
            }
            updated.push(row.clone());
        }
        Ok(updated)
    }

    async fn delete(&self, table: Table, query: &RowQuery) -> Result<(), PlanningError> {
        self.count_write()?;

        self.tables
            .write()
            .unwrap()
            .entry(table)
            .or_default()
            .retain(|row| !matches(query, row));
        Ok(())
    }
}

fn merge(fields: &mut Map<String, Value>, patch: &Map<String, Value>) {
    for (key, value) in patch {
        fields.insert(key.clone(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn insert_generates_id_and_timestamp() {
        let store = MockRowStore::new();
        let row = store
            .insert(Table::Roles, json!({ "nom": "Dev" }))
            .await
            .unwrap();

        assert_eq!(row["id"], "roles-1");
        assert!(row["created_at"].is_string());
    }

    #[tokio::test]
    async fn duplicate_role_attachment_conflicts() {
        let store = MockRowStore::new();
        let attachment = json!({ "equipe_id": "e1", "role_id": "r1", "personne_id": null });

        store.insert(Table::RoleAttachments, attachment.clone()).await.unwrap();
        let err = store.insert(Table::RoleAttachments, attachment).await.unwrap_err();

        assert!(matches!(err, PlanningError::Conflict(_)));
        assert_eq!(store.rows(Table::RoleAttachments).len(), 1);
    }

    #[test]
    fn conditions_match_json_rows() {
        let row = json!({ "id": "c-1", "semaine_debut": null, "unite_ressource": 1.5 });

        assert!(condition_matches(&Condition::Eq("id".into(), "c-1".into()), &row));
        assert!(!condition_matches(&Condition::Eq("semaine_debut".into(), "2024-03-11".into()), &row));
        assert!(!condition_matches(&Condition::Eq("personne_id".into(), "p-1".into()), &row));
        assert!(condition_matches(&Condition::Eq("unite_ressource".into(), "1.5".into()), &row));
    }

    #[tokio::test]
    async fn writes_fail_once_the_budget_is_spent() {
        let store = MockRowStore::new();
        store.fail_writes_after(1);

        assert!(store.insert(Table::Roles, json!({ "nom": "a" })).await.is_ok());
        assert!(store.insert(Table::Roles, json!({ "nom": "b" })).await.is_err());
    }
}
