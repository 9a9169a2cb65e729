use std::sync::Arc;

use serde_json::{json, Value};
use tracing::instrument;

use super::{fetch_all, insert_row, require_name, to_row, update_by_id, TableCache};
use crate::domain::{
    models::{Chiffre, ChiffreId, EquipeId, EstimateField, NewProjet, Projet, ProjetId},
    ports::outbound::{RowQuery, RowStore, Table},
    PlanningError,
};

fn estimate_patch(field: EstimateField, value: f64) -> Result<Value, PlanningError> {
    if !value.is_finite() {
        return Err(PlanningError::validation(format!("{} must be a number", field)));
    }
    let mut patch = serde_json::Map::new();
    patch.insert(field.column().to_string(), json!(value));
    Ok(Value::Object(patch))
}

/// Projects and their per-team estimates.
pub struct ProjectService {
    store: Arc<dyn RowStore>,
    projets: TableCache<Projet>,
    chiffres: TableCache<Chiffre>,
}

impl ProjectService {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self {
            store,
            projets: TableCache::new(),
            chiffres: TableCache::new(),
        }
    }

    pub async fn list(&self) -> Result<Vec<Projet>, PlanningError> {
        self.projets
            .get_or_load(|| fetch_all(self.store.as_ref(), Table::Projets))
            .await
    }

    pub async fn get(&self, id: &ProjetId) -> Result<Projet, PlanningError> {
        self.list()
            .await?
            .into_iter()
            .find(|p| &p.id == id)
            .ok_or_else(|| PlanningError::not_found("projet", id))
    }

    #[instrument(skip(self))]
    pub async fn create(&self, projet: &NewProjet) -> Result<Projet, PlanningError> {
        require_name("project", &projet.nom)?;
        let created = insert_row(self.store.as_ref(), Table::Projets, to_row(projet)?).await?;
        self.projets.invalidate().await;
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn update(&self, id: &ProjetId, projet: &NewProjet) -> Result<Projet, PlanningError> {
        require_name("project", &projet.nom)?;
        let updated = update_by_id(self.store.as_ref(), Table::Projets, "projet", id.as_str(), to_row(projet)?).await?;
        self.projets.invalidate().await;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &ProjetId) -> Result<(), PlanningError> {
        self.store
            .delete(Table::Projets, &RowQuery::by_id(id))
            .await?;
        self.projets.invalidate().await;
        Ok(())
    }

    /// Sets one estimate figure of a project. Writing the current value is a no-op.
    #[instrument(skip(self))]
    pub async fn update_estimate(&self, id: &ProjetId, field: EstimateField, value: f64) -> Result<Projet, PlanningError> {
        let patch = estimate_patch(field, value)?;
        let current = self.get(id).await?;
        if current.estimates.get(field) == value {
            return Ok(current);
        }
        let updated = update_by_id(self.store.as_ref(), Table::Projets, "projet", id.as_str(), patch).await?;
        self.projets.invalidate().await;
        Ok(updated)
    }

    /// Remaining to do for a project.
    pub async fn raf(&self, id: &ProjetId) -> Result<f64, PlanningError> {
        Ok(self.get(id).await?.calculate_raf())
    }

    pub async fn list_chiffres(&self) -> Result<Vec<Chiffre>, PlanningError> {
        self.chiffres
            .get_or_load(|| fetch_all(self.store.as_ref(), Table::Chiffres))
            .await
    }

    pub async fn chiffres_for_project(&self, id: &ProjetId) -> Result<Vec<Chiffre>, PlanningError> {
        Ok(self
            .list_chiffres()
            .await?
            .into_iter()
            .filter(|c| &c.projet_id == id)
            .collect())
    }

    /// Links a team to a project. Linking twice returns the existing link.
    #[instrument(skip(self))]
    pub async fn link_team(&self, projet_id: &ProjetId, equipe_id: &EquipeId) -> Result<Chiffre, PlanningError> {
        if let Some(existing) = self
            .chiffres_for_project(projet_id)
            .await?
            .into_iter()
            .find(|c| &c.equipe_id == equipe_id)
        {
            return Ok(existing);
        }

        let row = json!({ "projet_id": projet_id, "equipe_id": equipe_id });
        let created = insert_row(self.store.as_ref(), Table::Chiffres, row).await?;
        self.chiffres.invalidate().await;
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn update_chiffre(&self, id: &ChiffreId, field: EstimateField, value: f64) -> Result<Chiffre, PlanningError> {
        let patch = estimate_patch(field, value)?;
        let current = self
            .list_chiffres()
            .await?
            .into_iter()
            .find(|c| &c.id == id)
            .ok_or_else(|| PlanningError::not_found("chiffre", id))?;
        if current.estimates.get(field) == value {
            return Ok(current);
        }
        let updated = update_by_id(self.store.as_ref(), Table::Chiffres, "chiffre", id.as_str(), patch).await?;
        self.chiffres.invalidate().await;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn unlink(&self, id: &ChiffreId) -> Result<(), PlanningError> {
        self.store
            .delete(Table::Chiffres, &RowQuery::by_id(id))
            .await?;
        self.chiffres.invalidate().await;
        Ok(())
    }
}
