use serde::{Deserialize, Serialize};

use super::{ChargeId, EquipeId, PersonneId, ProjetId, ResourceRef, RoleId, RowMeta};
use crate::domain::week::WeekKey;

/// Quantity of a resource booked on a project, for one team and one week.
///
/// A charge without `semaine_debut` is a stub: the resource has been added to
/// the project/team but not scheduled yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Charge {
    pub id: ChargeId,
    pub projet_id: ProjetId,
    pub equipe_id: EquipeId,
    #[serde(default)]
    pub role_id: Option<RoleId>,
    #[serde(default)]
    pub personne_id: Option<PersonneId>,
    #[serde(default)]
    pub semaine_debut: Option<WeekKey>,
    #[serde(default)]
    pub unite_ressource: f64,
    #[serde(flatten)]
    pub meta: RowMeta,
}

impl Charge {
    pub fn resource(&self) -> Option<ResourceRef> {
        ResourceRef::from_columns(self.role_id.as_ref(), self.personne_id.as_ref())
    }

    pub fn is_stub(&self) -> bool {
        self.semaine_debut.is_none()
    }

    /// Same project, team and resource.
    pub fn matches(&self, projet_id: &ProjetId, equipe_id: &EquipeId, resource: &ResourceRef) -> bool {
        &self.projet_id == projet_id
            && &self.equipe_id == equipe_id
            && self.resource().as_ref() == Some(resource)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewCharge {
    pub projet_id: ProjetId,
    pub equipe_id: EquipeId,
    pub role_id: Option<RoleId>,
    pub personne_id: Option<PersonneId>,
    pub semaine_debut: Option<WeekKey>,
    pub unite_ressource: f64,
}

impl NewCharge {
    pub fn new(
        projet_id: ProjetId,
        equipe_id: EquipeId,
        resource: &ResourceRef,
        week: Option<WeekKey>,
        unite_ressource: f64,
    ) -> Self {
        let (role_id, personne_id) = resource.columns();
        Self {
            projet_id,
            equipe_id,
            role_id: role_id.cloned(),
            personne_id: personne_id.cloned(),
            semaine_debut: week,
            unite_ressource,
        }
    }
}
