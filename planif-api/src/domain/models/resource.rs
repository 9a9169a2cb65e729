use serde::{Deserialize, Serialize};

use super::{AttachmentId, EquipeId, PersonneId, RoleId, RowMeta, ServiceId};

/// A generic function (e.g. "Développeur") that can be planned before a person is named.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub nom: String,
    /// Weekly day-equivalent, e.g. `3.0` for three days a week.
    #[serde(default)]
    pub jours_semaine: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub meta: RowMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Personne {
    pub id: PersonneId,
    pub prenom: String,
    pub nom: String,
    #[serde(default)]
    pub jours_semaine: f64,
    #[serde(default)]
    pub service_id: Option<ServiceId>,
    #[serde(default)]
    pub equipe_id: Option<EquipeId>,
    #[serde(flatten)]
    pub meta: RowMeta,
}

impl Personne {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.prenom, self.nom).trim().to_string()
    }
}

/// Either kind of plannable resource.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum ResourceRef {
    Role(RoleId),
    Personne(PersonneId),
}

impl ResourceRef {
    /// Resolves the `role_id` / `personne_id` column pair of a row.
    ///
    /// Returns `None` when neither or both columns are set.
    pub fn from_columns(role_id: Option<&RoleId>, personne_id: Option<&PersonneId>) -> Option<Self> {
        match (role_id, personne_id) {
            (Some(role), None) => Some(Self::Role(role.clone())),
            (None, Some(personne)) => Some(Self::Personne(personne.clone())),
            _ => None,
        }
    }

    /// Both foreign key columns, with the unused one explicitly null.
    pub fn columns(&self) -> (Option<&RoleId>, Option<&PersonneId>) {
        match self {
            Self::Role(id) => (Some(id), None),
            Self::Personne(id) => (None, Some(id)),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Role(id) => id.as_str(),
            Self::Personne(id) => id.as_str(),
        }
    }
}

/// Attachment of a role or a person to a team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: AttachmentId,
    pub equipe_id: EquipeId,
    #[serde(default)]
    pub role_id: Option<RoleId>,
    #[serde(default)]
    pub personne_id: Option<PersonneId>,
    #[serde(flatten)]
    pub meta: RowMeta,
}

impl Attachment {
    pub fn resource(&self) -> Option<ResourceRef> {
        ResourceRef::from_columns(self.role_id.as_ref(), self.personne_id.as_ref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRole {
    pub nom: String,
    #[serde(default)]
    pub jours_semaine: f64,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPersonne {
    pub prenom: String,
    pub nom: String,
    #[serde(default)]
    pub jours_semaine: f64,
    #[serde(default)]
    pub service_id: Option<ServiceId>,
    #[serde(default)]
    pub equipe_id: Option<EquipeId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewAttachment {
    pub equipe_id: EquipeId,
    pub role_id: Option<RoleId>,
    pub personne_id: Option<PersonneId>,
}

impl NewAttachment {
    pub fn new(equipe_id: EquipeId, resource: &ResourceRef) -> Self {
        let (role_id, personne_id) = resource.columns();
        Self {
            equipe_id,
            role_id: role_id.cloned(),
            personne_id: personne_id.cloned(),
        }
    }
}
