mod cache;
mod capacities;
mod charges;
mod milestones;
mod organisation;
mod planning;
mod projects;
mod resources;
mod settings;

pub use cache::*;
pub use capacities::*;
pub use charges::*;
pub use milestones::*;
pub use organisation::*;
pub use planning::*;
pub use projects::*;
pub use resources::*;
pub use settings::*;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::domain::{
    ports::outbound::{decode, decode_one, RowQuery, RowStore, Table},
    PlanningError,
};

/// Full read of `table`, oldest rows first.
async fn fetch_all<T: DeserializeOwned>(store: &dyn RowStore, table: Table) -> Result<Vec<T>, PlanningError> {
    let rows = store
        .select(table, &RowQuery::all().order_by("created_at", true))
        .await?;
    decode(table, rows)
}

async fn insert_row<T: DeserializeOwned>(store: &dyn RowStore, table: Table, row: Value) -> Result<T, PlanningError> {
    let row = store.insert(table, row).await?;
    decode_one(table, row)
}

/// Updates one row by id, stamping `updated_at`.
async fn update_by_id<T: DeserializeOwned>(
    store: &dyn RowStore,
    table: Table,
    entity: &'static str,
    id: &str,
    patch: Value,
) -> Result<T, PlanningError> {
    let mut rows = store
        .update(table, &RowQuery::by_id(id), stamped(patch)?)
        .await?;
    let row = rows.pop().ok_or_else(|| PlanningError::not_found(entity, id))?;
    decode_one(table, row)
}

fn to_row<T: Serialize>(value: &T) -> Result<Value, PlanningError> {
    serde_json::to_value(value).map_err(|e| PlanningError::InvalidRow(e.to_string()))
}

/// Adds `updated_at = now` to an update payload.
fn stamped(mut patch: Value) -> Result<Value, PlanningError> {
    let now = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|e| PlanningError::InvalidRow(e.to_string()))?;
    match patch.as_object_mut() {
        Some(fields) => {
            fields.insert("updated_at".to_string(), Value::String(now));
            Ok(patch)
        }
        None => Err(PlanningError::InvalidRow("update payload must be an object".to_string())),
    }
}

fn require_name(entity: &str, name: &str) -> Result<(), PlanningError> {
    if name.trim().is_empty() {
        return Err(PlanningError::validation(format!("{} name is required", entity)));
    }
    Ok(())
}

fn require_quantity(value: f64) -> Result<(), PlanningError> {
    if !value.is_finite() || value < 0.0 {
        return Err(PlanningError::validation(format!(
            "quantity must be a non-negative number, got {}",
            value
        )));
    }
    Ok(())
}
