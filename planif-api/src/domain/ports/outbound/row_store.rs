//! Row store port (outbound).
//!
//! A table-oriented store with equality filters and ordering, the shape of
//! a PostgREST endpoint. Rows cross the port as JSON and are decoded by the
//! services into domain models.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::domain::PlanningError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Table {
    Societes,
    Departements,
    Services,
    Equipes,
    Roles,
    Personnes,
    RoleAttachments,
    Projets,
    Charges,
    Capacites,
    Jalons,
    Chiffres,
    Settings,
}

impl Table {
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

/// A column condition understood by every store.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(String, String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowQuery {
    pub conditions: Vec<Condition>,
    pub order: Option<(String, bool)>,
}

impl RowQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: impl AsRef<str>) -> Self {
        Self::all().eq("id", id)
    }

    pub fn eq(mut self, column: &str, value: impl AsRef<str>) -> Self {
        self.conditions
            .push(Condition::Eq(column.to_string(), value.as_ref().to_string()));
        self
    }

    pub fn order_by(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some((column.to_string(), ascending));
        self
    }
}

/// Outbound port for table storage.
///
/// `insert` and `update` return the written rows as stored, with generated
/// columns filled in. A uniqueness violation must surface as
/// [`PlanningError::Conflict`].
#[async_trait]
pub trait RowStore: Send + Sync + 'static {
    async fn select(&self, table: Table, query: &RowQuery) -> Result<Vec<Value>, PlanningError>;

    async fn insert(&self, table: Table, row: Value) -> Result<Value, PlanningError>;

    async fn update(&self, table: Table, query: &RowQuery, patch: Value) -> Result<Vec<Value>, PlanningError>;

    async fn delete(&self, table: Table, query: &RowQuery) -> Result<(), PlanningError>;
}

pub fn decode<T: DeserializeOwned>(table: Table, rows: Vec<Value>) -> Result<Vec<T>, PlanningError> {
    rows.into_iter().map(|row| decode_one(table, row)).collect()
}

pub fn decode_one<T: DeserializeOwned>(table: Table, row: Value) -> Result<T, PlanningError> {
    serde_json::from_value(row).map_err(|e| PlanningError::InvalidRow(format!("{}: {}", table, e)))
}
