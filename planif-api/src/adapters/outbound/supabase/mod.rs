mod auth;

pub use auth::SupabaseAuthProvider;

use async_trait::async_trait;
use serde_json::Value;
use supabase::{Filter, Order, QueryBuilder, SupabaseClient, SupabaseError};

use crate::domain::{
    ports::outbound::{Condition, RowQuery, RowStore, Table},
    PlanningError,
};

/// Adapter that wraps the Supabase client to implement the RowStore port.
#[derive(Clone)]
pub struct SupabaseRowStore {
    client: SupabaseClient,
}

impl SupabaseRowStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    fn query(&self, table: Table, query: &RowQuery) -> QueryBuilder<'_> {
        let filters = query.conditions.iter().map(|c| match c {
            Condition::Eq(column, value) => Filter::eq(column.as_str(), value),
        });
        let mut builder = self.client.from(table.name()).filters(filters);
        if let Some((column, ascending)) = &query.order {
            builder = builder.order(if *ascending {
                Order::asc(column.as_str())
            } else {
                Order::desc(column.as_str())
            });
        }
        builder
    }
}

#[async_trait]
impl RowStore for SupabaseRowStore {
    async fn select(&self, table: Table, query: &RowQuery) -> Result<Vec<Value>, PlanningError> {
        self.query(table, query).select().await.map_err(|e| {
            tracing::error!("Failed to read {}: {}", table, e);
            map_supabase_error(e)
        })
    }

    async fn insert(&self, table: Table, row: Value) -> Result<Value, PlanningError> {
        let mut rows: Vec<Value> = self
            .client
            .from(table.name())
            .insert(&row)
            .await
            .map_err(map_supabase_error)?;
        rows.pop()
            .ok_or_else(|| PlanningError::backend(format!("insert into {} returned no row", table)))
    }

    async fn update(&self, table: Table, query: &RowQuery, patch: Value) -> Result<Vec<Value>, PlanningError> {
        self.query(table, query)
            .update(&patch)
            .await
            .map_err(map_supabase_error)
    }

    async fn delete(&self, table: Table, query: &RowQuery) -> Result<(), PlanningError> {
        self.query(table, query)
            .delete()
            .await
            .map_err(map_supabase_error)
    }
}

fn map_supabase_error(e: SupabaseError) -> PlanningError {
    if e.is_unique_violation() {
        return PlanningError::Conflict(e.message());
    }
    match e {
        SupabaseError::ParsingError(msg) => PlanningError::InvalidRow(msg),
        SupabaseError::MissingFilter(msg) => PlanningError::validation(msg),
        other => PlanningError::backend(other.message()),
    }
}
