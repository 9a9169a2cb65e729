use std::sync::Arc;

use serde_json::json;
use tracing::instrument;

use super::{fetch_all, insert_row, require_quantity, to_row, update_by_id, TableCache};
use crate::domain::{
    models::{Capacite, CapaciteId, CapacityScope, NewCapacite, ResourceRef},
    ports::outbound::{RowQuery, RowStore, Table},
    week::WeekKey,
    PlanningError,
};

/// Weekly capacities of resources.
pub struct CapacityService {
    store: Arc<dyn RowStore>,
    capacites: TableCache<Capacite>,
}

impl CapacityService {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self {
            store,
            capacites: TableCache::new(),
        }
    }

    pub async fn list(&self) -> Result<Vec<Capacite>, PlanningError> {
        self.capacites
            .get_or_load(|| fetch_all(self.store.as_ref(), Table::Capacites))
            .await
    }

    /// Sets the capacity of a resource for one week and scope.
    ///
    /// The first matching row is updated and duplicates removed; otherwise a
    /// row is inserted.
    #[instrument(skip(self))]
    pub async fn upsert_week(
        &self,
        resource: &ResourceRef,
        scope: &CapacityScope,
        week: WeekKey,
        value: f64,
    ) -> Result<Capacite, PlanningError> {
        require_quantity(value)?;
        let store = self.store.as_ref();

        let matching: Vec<Capacite> = self
            .list()
            .await?
            .into_iter()
            .filter(|c| c.resource().as_ref() == Some(resource) && &c.scope == scope && c.semaine_debut == week)
            .collect();

        let result = match matching.split_first() {
            Some((first, duplicates)) => {
                let updated = update_by_id(
                    store,
                    Table::Capacites,
                    "capacite",
                    first.id.as_str(),
                    json!({ "capacite": value }),
                )
                .await;
                if updated.is_ok() {
                    for duplicate in duplicates {
                        tracing::debug!("Removing duplicate capacity {}", duplicate.id);
                        if let Err(e) = store
                            .delete(Table::Capacites, &RowQuery::by_id(&duplicate.id))
                            .await
                        {
                            self.capacites.invalidate().await;
                            return Err(e);
                        }
                    }
                }
                updated
            }
            None => {
                let row = to_row(&NewCapacite::new(resource, scope.clone(), week, value))?;
                insert_row(store, Table::Capacites, row).await
            }
        };
        self.capacites.invalidate().await;
        result
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &CapaciteId) -> Result<(), PlanningError> {
        self.store
            .delete(Table::Capacites, &RowQuery::by_id(id))
            .await?;
        self.capacites.invalidate().await;
        Ok(())
    }
}
