use std::sync::Arc;

use serde_json::json;
use tracing::instrument;

use super::{fetch_all, insert_row, require_quantity, to_row, update_by_id, TableCache};
use crate::domain::{
    models::{Charge, ChargeId, EquipeId, NewCharge, ProjetId, ResourceRef},
    ports::outbound::{RowQuery, RowStore, Table},
    week::WeekKey,
    PlanningError,
};

/// Weekly charges of resources on projects.
pub struct ChargeService {
    store: Arc<dyn RowStore>,
    charges: TableCache<Charge>,
}

impl ChargeService {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self {
            store,
            charges: TableCache::new(),
        }
    }

    pub async fn list(&self) -> Result<Vec<Charge>, PlanningError> {
        self.charges
            .get_or_load(|| fetch_all(self.store.as_ref(), Table::Charges))
            .await
    }

    pub async fn by_project(&self, projet_id: &ProjetId) -> Result<Vec<Charge>, PlanningError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|c| &c.projet_id == projet_id)
            .collect())
    }

    /// Sets the quantity booked for one (project, team, resource, week) cell.
    ///
    /// The first matching row is updated and any duplicates removed. When the
    /// cell is empty, an unscheduled stub of the same triple is reused before
    /// a new row is inserted.
    #[instrument(skip(self))]
    pub async fn upsert_week(
        &self,
        projet_id: &ProjetId,
        equipe_id: &EquipeId,
        resource: &ResourceRef,
        week: WeekKey,
        value: f64,
    ) -> Result<Charge, PlanningError> {
        require_quantity(value)?;
        let store = self.store.as_ref();

        let triple: Vec<Charge> = self
            .by_project(projet_id)
            .await?
            .into_iter()
            .filter(|c| c.matches(projet_id, equipe_id, resource))
            .collect();
        let mut in_week = triple.iter().filter(|c| c.semaine_debut == Some(week));
        let stub = triple.iter().find(|c| c.is_stub());

        let result = match (in_week.next(), stub) {
            (Some(existing), _) => {
                let updated = update_by_id(
                    store,
                    Table::Charges,
                    "charge",
                    existing.id.as_str(),
                    json!({ "unite_ressource": value }),
                )
                .await;
                if updated.is_ok() {
                    for duplicate in in_week {
                        tracing::debug!("Removing duplicate charge {}", duplicate.id);
                        if let Err(e) = store.delete(Table::Charges, &RowQuery::by_id(&duplicate.id)).await {
                            self.charges.invalidate().await;
                            return Err(e);
                        }
                    }
                }
                updated
            }
            (None, Some(stub)) => {
                update_by_id(
                    store,
                    Table::Charges,
                    "charge",
                    stub.id.as_str(),
                    json!({ "semaine_debut": week, "unite_ressource": value }),
                )
                .await
            }
            (None, None) => {
                let row = to_row(&NewCharge::new(
                    projet_id.clone(),
                    equipe_id.clone(),
                    resource,
                    Some(week),
                    value,
                ))?;
                insert_row(store, Table::Charges, row).await
            }
        };
        self.charges.invalidate().await;
        result
    }

    /// Adds a resource to a project/team without scheduling it.
    ///
    /// If the triple already has rows, the first one is returned unchanged.
    #[instrument(skip(self))]
    pub async fn add_stub(
        &self,
        projet_id: &ProjetId,
        equipe_id: &EquipeId,
        resource: &ResourceRef,
    ) -> Result<Charge, PlanningError> {
        if let Some(existing) = self
            .by_project(projet_id)
            .await?
            .into_iter()
            .find(|c| c.matches(projet_id, equipe_id, resource))
        {
            return Ok(existing);
        }

        let row = to_row(&NewCharge::new(
            projet_id.clone(),
            equipe_id.clone(),
            resource,
            None,
            0.0,
        ))?;
        let created = insert_row(self.store.as_ref(), Table::Charges, row).await?;
        self.charges.invalidate().await;
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &ChargeId) -> Result<(), PlanningError> {
        self.store
            .delete(Table::Charges, &RowQuery::by_id(id))
            .await?;
        self.charges.invalidate().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbound::mock::MockRowStore;
    use crate::domain::models::RoleId;
    use serde_json::Value;

    fn wk(s: &str) -> WeekKey {
        s.parse().unwrap()
    }

    fn dev() -> ResourceRef {
        ResourceRef::Role(RoleId::new("r-dev"))
    }

    fn ids() -> (ProjetId, EquipeId) {
        (ProjetId::new("p1"), EquipeId::new("e1"))
    }

    #[tokio::test]
    async fn upsert_inserts_then_updates_the_same_cell() {
        let store = MockRowStore::new();
        let service = ChargeService::new(Arc::new(store.clone()));
        let (p, e) = ids();

        service.upsert_week(&p, &e, &dev(), wk("2024-03-11"), 1.0).await.unwrap();
        service.upsert_week(&p, &e, &dev(), wk("2024-03-13"), 2.5).await.unwrap();

        let rows = store.rows(Table::Charges);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["unite_ressource"], 2.5);
        assert_eq!(rows[0]["semaine_debut"], "2024-03-11");
    }

    #[tokio::test]
    async fn scheduling_reuses_the_stub() {
        let store = MockRowStore::new();
        let service = ChargeService::new(Arc::new(store.clone()));
        let (p, e) = ids();

        let stub = service.add_stub(&p, &e, &dev()).await.unwrap();
        assert!(stub.is_stub());
        // Adding the same resource again is a no-op.
        assert_eq!(service.add_stub(&p, &e, &dev()).await.unwrap().id, stub.id);

        let scheduled = service
            .upsert_week(&p, &e, &dev(), wk("2024-03-18"), 1.0)
            .await
            .unwrap();

        assert_eq!(scheduled.id, stub.id);
        assert_eq!(scheduled.semaine_debut, Some(wk("2024-03-18")));
        assert_eq!(store.rows(Table::Charges).len(), 1);
    }

    #[tokio::test]
    async fn duplicate_cells_are_collapsed() {
        let row = |id: &str| {
            serde_json::json!({
                "id": id, "projet_id": "p1", "equipe_id": "e1",
                "role_id": "r-dev", "personne_id": null,
                "semaine_debut": "2024-03-11", "unite_ressource": 1.0
            })
        };
        let store = MockRowStore::new().with_rows(Table::Charges, vec![row("c1"), row("c2")]);
        let service = ChargeService::new(Arc::new(store.clone()));
        let (p, e) = ids();

        service.upsert_week(&p, &e, &dev(), wk("2024-03-11"), 3.0).await.unwrap();

        let rows = store.rows(Table::Charges);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], "c1");
        assert_eq!(rows[0]["unite_ressource"], 3.0);
    }

    #[tokio::test]
    async fn failed_update_keeps_the_duplicates() {
        let row = |id: &str| {
            serde_json::json!({
                "id": id, "projet_id": "p1", "equipe_id": "e1",
                "role_id": "r-dev", "personne_id": null,
                "semaine_debut": "2024-03-11", "unite_ressource": 1.0
            })
        };
        let store = MockRowStore::new().with_rows(Table::Charges, vec![row("c1"), row("c2")]);
        let service = ChargeService::new(Arc::new(store.clone()));
        let (p, e) = ids();

        store.fail_writes_after(0);
        assert!(service.upsert_week(&p, &e, &dev(), wk("2024-03-11"), 3.0).await.is_err());

        let rows = store.rows(Table::Charges);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r["unite_ressource"] == 1.0));
    }

    #[tokio::test]
    async fn negative_quantities_are_rejected() {
        let store = MockRowStore::new();
        let service = ChargeService::new(Arc::new(store.clone()));
        let (p, e) = ids();

        assert!(matches!(
            service.upsert_week(&p, &e, &dev(), wk("2024-03-11"), -1.0).await,
            Err(PlanningError::Validation(_))
        ));
        assert!(store.rows(Table::Charges).is_empty());
    }

    #[tokio::test]
    async fn new_rows_null_the_unused_resource_column() {
        let store = MockRowStore::new();
        let service = ChargeService::new(Arc::new(store.clone()));
        let (p, e) = ids();

        service.upsert_week(&p, &e, &dev(), wk("2024-03-11"), 1.0).await.unwrap();
        assert_eq!(store.rows(Table::Charges)[0]["personne_id"], Value::Null);
    }
}
