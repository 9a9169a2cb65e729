use std::sync::Arc;

use tracing::instrument;

use super::{fetch_all, insert_row, require_name, to_row, update_by_id, TableCache};
use crate::domain::{
    models::{Jalon, JalonId, NewJalon, ProjetId},
    ports::outbound::{RowQuery, RowStore, Table},
    week::WeekKey,
    PlanningError,
};

pub struct MilestoneService {
    store: Arc<dyn RowStore>,
    jalons: TableCache<Jalon>,
}

impl MilestoneService {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self {
            store,
            jalons: TableCache::new(),
        }
    }

    /// All milestones, earliest first.
    pub async fn list(&self) -> Result<Vec<Jalon>, PlanningError> {
        let mut jalons = self
            .jalons
            .get_or_load(|| fetch_all(self.store.as_ref(), Table::Jalons))
            .await?;
        jalons.sort_by_key(|j| j.date);
        Ok(jalons)
    }

    pub async fn by_project(&self, projet_id: &ProjetId) -> Result<Vec<Jalon>, PlanningError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|j| j.projet_id.as_ref() == Some(projet_id))
            .collect())
    }

    pub async fn by_week(&self, week: WeekKey) -> Result<Vec<Jalon>, PlanningError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|j| j.week() == week)
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn create(&self, jalon: &NewJalon) -> Result<Jalon, PlanningError> {
        require_name("milestone", &jalon.nom)?;
        let created = insert_row(self.store.as_ref(), Table::Jalons, to_row(jalon)?).await?;
        self.jalons.invalidate().await;
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn update(&self, id: &JalonId, jalon: &NewJalon) -> Result<Jalon, PlanningError> {
        require_name("milestone", &jalon.nom)?;
        let updated = update_by_id(self.store.as_ref(), Table::Jalons, "jalon", id.as_str(), to_row(jalon)?).await?;
        self.jalons.invalidate().await;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &JalonId) -> Result<(), PlanningError> {
        self.store
            .delete(Table::Jalons, &RowQuery::by_id(id))
            .await?;
        self.jalons.invalidate().await;
        Ok(())
    }
}
