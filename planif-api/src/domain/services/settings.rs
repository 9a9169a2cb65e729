use std::sync::Arc;

use serde_json::json;
use tracing::instrument;

use super::{fetch_all, insert_row, update_by_id, TableCache};
use crate::domain::{
    models::{Setting, SettingValue},
    ports::outbound::{RowStore, Table},
    PlanningError,
};

/// Key/value application settings.
pub struct SettingsService {
    store: Arc<dyn RowStore>,
    settings: TableCache<Setting>,
}

impl SettingsService {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self {
            store,
            settings: TableCache::new(),
        }
    }

    pub async fn list(&self) -> Result<Vec<Setting>, PlanningError> {
        self.settings
            .get_or_load(|| fetch_all(self.store.as_ref(), Table::Settings))
            .await
    }

    pub async fn get(&self, key: &str) -> Result<Option<Setting>, PlanningError> {
        Ok(self.list().await?.into_iter().find(|s| s.key == key))
    }

    /// Creates or overwrites the setting stored under `key`.
    #[instrument(skip(self))]
    pub async fn set(&self, key: &str, value: &SettingValue) -> Result<Setting, PlanningError> {
        if key.trim().is_empty() {
            return Err(PlanningError::validation("setting key is required"));
        }
        if !value.is_consistent() {
            return Err(PlanningError::validation(format!(
                "'{}' is not a valid {} value",
                value.value, value.kind
            )));
        }

        let row = json!({
            "key": key,
            "value": value.value,
            "type": value.kind,
            "scope": value.scope,
        });
        let saved = match self.get(key).await? {
            Some(existing) => {
                update_by_id(self.store.as_ref(), Table::Settings, "setting", existing.id.as_str(), row).await
            }
            None => insert_row(self.store.as_ref(), Table::Settings, row).await,
        };
        self.settings.invalidate().await;
        saved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{adapters::outbound::mock::MockRowStore, domain::models::SettingType};

    fn number(value: &str) -> SettingValue {
        SettingValue {
            value: value.to_string(),
            kind: SettingType::Number,
            scope: "global".to_string(),
        }
    }

    #[tokio::test]
    async fn set_twice_overwrites_the_same_row() {
        let store = MockRowStore::new();
        let service = SettingsService::new(Arc::new(store.clone()));

        service.set("semaines_affichees", &number("12")).await.unwrap();
        service.set("semaines_affichees", &number("16")).await.unwrap();

        let setting = service.get("semaines_affichees").await.unwrap().unwrap();
        assert_eq!(setting.as_f64(), Some(16.0));
        assert_eq!(store.rows(Table::Settings).len(), 1);
    }

    #[tokio::test]
    async fn inconsistent_values_are_rejected() {
        let service = SettingsService::new(Arc::new(MockRowStore::new()));
        let err = service.set("semaines_affichees", &number("douze")).await.unwrap_err();
        assert!(matches!(err, PlanningError::Validation(_)));
    }
}
