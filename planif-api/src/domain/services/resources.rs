use std::sync::Arc;

use serde_json::json;
use tracing::instrument;

use super::{fetch_all, insert_row, require_name, to_row, update_by_id, TableCache};
use crate::domain::{
    models::{
        Attachment, AttachmentId, EquipeId, NewAttachment, NewPersonne, NewRole, Personne,
        PersonneId, ResourceRef, Role, RoleId,
    },
    ports::outbound::{RowQuery, RowStore, Table},
    PlanningError,
};

/// Roles, persons and their team attachments.
pub struct ResourceService {
    store: Arc<dyn RowStore>,
    roles: TableCache<Role>,
    personnes: TableCache<Personne>,
    attachments: TableCache<Attachment>,
}

impl ResourceService {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self {
            store,
            roles: TableCache::new(),
            personnes: TableCache::new(),
            attachments: TableCache::new(),
        }
    }

    pub async fn list_roles(&self) -> Result<Vec<Role>, PlanningError> {
        self.roles
            .get_or_load(|| fetch_all(self.store.as_ref(), Table::Roles))
            .await
    }

    #[instrument(skip(self))]
    pub async fn create_role(&self, role: &NewRole) -> Result<Role, PlanningError> {
        require_name("role", &role.nom)?;
        let created = insert_row(self.store.as_ref(), Table::Roles, to_row(role)?).await?;
        self.roles.invalidate().await;
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn update_role(&self, id: &RoleId, role: &NewRole) -> Result<Role, PlanningError> {
        require_name("role", &role.nom)?;
        let updated = update_by_id(self.store.as_ref(), Table::Roles, "role", id.as_str(), to_row(role)?).await?;
        self.roles.invalidate().await;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_role(&self, id: &RoleId) -> Result<(), PlanningError> {
        self.store
            .delete(Table::Roles, &RowQuery::by_id(id))
            .await?;
        self.roles.invalidate().await;
        Ok(())
    }

    pub async fn list_personnes(&self) -> Result<Vec<Personne>, PlanningError> {
        self.personnes
            .get_or_load(|| fetch_all(self.store.as_ref(), Table::Personnes))
            .await
    }

    #[instrument(skip(self))]
    pub async fn create_personne(&self, personne: &NewPersonne) -> Result<Personne, PlanningError> {
        require_name("first", &personne.prenom)?;
        require_name("last", &personne.nom)?;
        let created = insert_row(self.store.as_ref(), Table::Personnes, to_row(personne)?).await?;
        self.personnes.invalidate().await;
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn update_personne(&self, id: &PersonneId, personne: &NewPersonne) -> Result<Personne, PlanningError> {
        require_name("first", &personne.prenom)?;
        require_name("last", &personne.nom)?;
        let updated = update_by_id(
            self.store.as_ref(),
            Table::Personnes,
            "personne",
            id.as_str(),
            to_row(personne)?,
        )
        .await?;
        self.personnes.invalidate().await;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_personne(&self, id: &PersonneId) -> Result<(), PlanningError> {
        self.store
            .delete(Table::Personnes, &RowQuery::by_id(id))
            .await?;
        self.personnes.invalidate().await;
        Ok(())
    }

    pub async fn list_attachments(&self) -> Result<Vec<Attachment>, PlanningError> {
        self.attachments
            .get_or_load(|| fetch_all(self.store.as_ref(), Table::RoleAttachments))
            .await
    }

    pub async fn attachments_for_team(&self, equipe_id: &EquipeId) -> Result<Vec<Attachment>, PlanningError> {
        Ok(self
            .list_attachments()
            .await?
            .into_iter()
            .filter(|a| &a.equipe_id == equipe_id)
            .collect())
    }

    /// Attaches a resource to a team.
    ///
    /// Role attachments rely on the backend's unique constraint; person
    /// attachments are checked here. Either way a duplicate is reported as
    /// [`PlanningError::AlreadyAttached`].
    #[instrument(skip(self))]
    pub async fn attach(&self, equipe_id: &EquipeId, resource: &ResourceRef) -> Result<Attachment, PlanningError> {
        if let ResourceRef::Personne(_) = resource {
            let existing = self.attachments_for_team(equipe_id).await?;
            if existing.iter().any(|a| a.resource().as_ref() == Some(resource)) {
                return Err(PlanningError::AlreadyAttached);
            }
        }

        let row = to_row(&NewAttachment::new(equipe_id.clone(), resource))?;
        let created = insert_row(self.store.as_ref(), Table::RoleAttachments, row)
            .await
            .map_err(|e| match e {
                PlanningError::Conflict(msg) => {
                    tracing::warn!("Duplicate attachment of {} to {}: {}", resource.id(), equipe_id, msg);
                    PlanningError::AlreadyAttached
                }
                other => other,
            })?;
        self.attachments.invalidate().await;
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn detach(&self, id: &AttachmentId) -> Result<(), PlanningError> {
        self.store
            .delete(Table::RoleAttachments, &RowQuery::by_id(id))
            .await?;
        self.attachments.invalidate().await;
        Ok(())
    }

    /// Moves a person to another home team.
    #[instrument(skip(self))]
    pub async fn assign_home_team(&self, id: &PersonneId, equipe_id: Option<&EquipeId>) -> Result<Personne, PlanningError> {
        let updated = update_by_id(
            self.store.as_ref(),
            Table::Personnes,
            "personne",
            id.as_str(),
            json!({ "equipe_id": equipe_id }),
        )
        .await?;
        self.personnes.invalidate().await;
        Ok(updated)
    }
}
