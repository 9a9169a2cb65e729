use std::sync::Arc;

use serde::Serialize;
use tracing::instrument;

use super::{fetch_all, insert_row, update_by_id, TableCache};
use crate::domain::{
    models::{Departement, Equipe, Service, Societe},
    organisation::{build_org_tree, OrgKind, OrgNodeForm, OrgTree},
    ports::outbound::{RowQuery, RowStore, Table},
    PlanningError,
};

/// A node of any level, as stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OrgEntity {
    Societe(Societe),
    Departement(Departement),
    Service(Service),
    Equipe(Equipe),
}

fn table_for(kind: OrgKind) -> Table {
    match kind {
        OrgKind::Societe => Table::Societes,
        OrgKind::Departement => Table::Departements,
        OrgKind::Service => Table::Services,
        OrgKind::Equipe => Table::Equipes,
    }
}

/// Data access for the four organisation levels.
pub struct OrganisationService {
    store: Arc<dyn RowStore>,
    societes: TableCache<Societe>,
    departements: TableCache<Departement>,
    services: TableCache<Service>,
    equipes: TableCache<Equipe>,
}

impl OrganisationService {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self {
            store,
            societes: TableCache::new(),
            departements: TableCache::new(),
            services: TableCache::new(),
            equipes: TableCache::new(),
        }
    }

    pub async fn list_societes(&self) -> Result<Vec<Societe>, PlanningError> {
        self.societes
            .get_or_load(|| fetch_all(self.store.as_ref(), Table::Societes))
            .await
    }

    pub async fn list_departements(&self) -> Result<Vec<Departement>, PlanningError> {
        self.departements
            .get_or_load(|| fetch_all(self.store.as_ref(), Table::Departements))
            .await
    }

    pub async fn list_services(&self) -> Result<Vec<Service>, PlanningError> {
        self.services
            .get_or_load(|| fetch_all(self.store.as_ref(), Table::Services))
            .await
    }

    pub async fn list_equipes(&self) -> Result<Vec<Equipe>, PlanningError> {
        self.equipes
            .get_or_load(|| fetch_all(self.store.as_ref(), Table::Equipes))
            .await
    }

    #[instrument(skip(self))]
    pub async fn tree(&self) -> Result<OrgTree, PlanningError> {
        let (societes, departements, services, equipes) = futures::try_join!(
            self.list_societes(),
            self.list_departements(),
            self.list_services(),
            self.list_equipes(),
        )?;
        let tree = build_org_tree(&societes, &departements, &services, &equipes);
        tracing::debug!(nodes = tree.node_count(), "Built organisation tree");
        Ok(tree)
    }

    #[instrument(skip(self))]
    pub async fn create(&self, form: &OrgNodeForm) -> Result<OrgEntity, PlanningError> {
        form.validate()?;
        let kind = form.kind();
        let table = table_for(kind);
        let store = self.store.as_ref();

        let entity = match kind {
            OrgKind::Societe => OrgEntity::Societe(insert_row(store, table, form.row()).await?),
            OrgKind::Departement => OrgEntity::Departement(insert_row(store, table, form.row()).await?),
            OrgKind::Service => OrgEntity::Service(insert_row(store, table, form.row()).await?),
            OrgKind::Equipe => OrgEntity::Equipe(insert_row(store, table, form.row()).await?),
        };
        self.invalidate(kind).await;
        Ok(entity)
    }

    #[instrument(skip(self))]
    pub async fn update(&self, kind: OrgKind, id: &str, form: &OrgNodeForm) -> Result<OrgEntity, PlanningError> {
        form.validate()?;
        if form.kind() != kind {
            return Err(PlanningError::validation(format!(
                "cannot update a {} with a {} form",
                kind,
                form.kind()
            )));
        }
        let table = table_for(kind);
        let store = self.store.as_ref();
        let entity: &'static str = kind.into();

        let updated = match kind {
            OrgKind::Societe => OrgEntity::Societe(update_by_id(store, table, entity, id, form.row()).await?),
            OrgKind::Departement => {
                OrgEntity::Departement(update_by_id(store, table, entity, id, form.row()).await?)
            }
            OrgKind::Service => OrgEntity::Service(update_by_id(store, table, entity, id, form.row()).await?),
            OrgKind::Equipe => OrgEntity::Equipe(update_by_id(store, table, entity, id, form.row()).await?),
        };
        self.invalidate(kind).await;
        Ok(updated)
    }

    /// Deletes one node. Children keep their parent reference.
    #[instrument(skip(self))]
    pub async fn delete(&self, kind: OrgKind, id: &str) -> Result<(), PlanningError> {
        self.store
            .delete(table_for(kind), &RowQuery::by_id(id))
            .await?;
        self.invalidate(kind).await;
        Ok(())
    }

    pub async fn invalidate(&self, kind: OrgKind) {
        match kind {
            OrgKind::Societe => self.societes.invalidate().await,
            OrgKind::Departement => self.departements.invalidate().await,
            OrgKind::Service => self.services.invalidate().await,
            OrgKind::Equipe => self.equipes.invalidate().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::outbound::mock::MockRowStore,
        domain::{models::DepartementId, organisation::TeamParent},
    };

    fn service_with(store: &MockRowStore) -> OrganisationService {
        OrganisationService::new(Arc::new(store.clone()))
    }

    #[tokio::test]
    async fn created_nodes_show_up_in_the_tree() {
        let store = MockRowStore::new();
        let service = service_with(&store);

        // Warm the caches first so the writes have something to invalidate.
        assert_eq!(service.tree().await.unwrap().node_count(), 0);

        let OrgEntity::Societe(societe) = service
            .create(&OrgNodeForm::Societe {
                nom: "Acme".to_string(),
                couleur: None,
            })
            .await
            .unwrap()
        else {
            panic!("expected a societe");
        };
        let OrgEntity::Departement(departement) = service
            .create(&OrgNodeForm::Departement {
                nom: "R&D".to_string(),
                couleur: None,
                societe_id: societe.id.clone(),
            })
            .await
            .unwrap()
        else {
            panic!("expected a departement");
        };
        service
            .create(&OrgNodeForm::Equipe {
                nom: "Plateforme".to_string(),
                couleur: None,
                parent: TeamParent::Departement(departement.id.clone()),
            })
            .await
            .unwrap();

        let tree = service.tree().await.unwrap();
        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.roots[0].children[0].children[0].nom, "Plateforme");
    }

    #[tokio::test]
    async fn reads_are_cached_until_a_write() {
        let store = MockRowStore::new();
        let service = service_with(&store);

        service.list_equipes().await.unwrap();
        service.list_equipes().await.unwrap();
        assert_eq!(store.select_calls(Table::Equipes), 1);

        service
            .create(&OrgNodeForm::Equipe {
                nom: "Data".to_string(),
                couleur: None,
                parent: TeamParent::Departement(DepartementId::new("d1")),
            })
            .await
            .unwrap();
        assert_eq!(service.list_equipes().await.unwrap().len(), 1);
        assert_eq!(store.select_calls(Table::Equipes), 2);
    }

    #[tokio::test]
    async fn update_with_a_mismatched_form_is_rejected() {
        let service = service_with(&MockRowStore::new());
        let err = service
            .update(
                OrgKind::Service,
                "sv1",
                &OrgNodeForm::Societe {
                    nom: "Acme".to_string(),
                    couleur: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PlanningError::Validation(_)));
    }

    #[tokio::test]
    async fn updating_a_missing_node_is_not_found() {
        let service = service_with(&MockRowStore::new());
        let err = service
            .update(
                OrgKind::Societe,
                "nope",
                &OrgNodeForm::Societe {
                    nom: "Acme".to_string(),
                    couleur: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PlanningError::NotFound { entity: "societe", .. }));
    }
}
