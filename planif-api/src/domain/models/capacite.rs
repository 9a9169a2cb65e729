use serde::{Deserialize, Serialize};

use super::{CapaciteId, DepartementId, EquipeId, PersonneId, ResourceRef, RoleId, RowMeta, ServiceId, SocieteId};
use crate::domain::week::WeekKey;

/// Quantity of a resource available in a given week, optionally scoped to a
/// team or a higher organisational level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capacite {
    pub id: CapaciteId,
    #[serde(default)]
    pub role_id: Option<RoleId>,
    #[serde(default)]
    pub personne_id: Option<PersonneId>,
    #[serde(flatten)]
    pub scope: CapacityScope,
    pub semaine_debut: WeekKey,
    #[serde(default)]
    pub capacite: f64,
    #[serde(flatten)]
    pub meta: RowMeta,
}

impl Capacite {
    pub fn resource(&self) -> Option<ResourceRef> {
        ResourceRef::from_columns(self.role_id.as_ref(), self.personne_id.as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CapacityScope {
    #[serde(default)]
    pub equipe_id: Option<EquipeId>,
    #[serde(default)]
    pub service_id: Option<ServiceId>,
    #[serde(default)]
    pub departement_id: Option<DepartementId>,
    #[serde(default)]
    pub societe_id: Option<SocieteId>,
}

impl CapacityScope {
    pub fn team(equipe_id: EquipeId) -> Self {
        Self {
            equipe_id: Some(equipe_id),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewCapacite {
    pub role_id: Option<RoleId>,
    pub personne_id: Option<PersonneId>,
    #[serde(flatten)]
    pub scope: CapacityScope,
    pub semaine_debut: WeekKey,
    pub capacite: f64,
}

impl NewCapacite {
    pub fn new(resource: &ResourceRef, scope: CapacityScope, week: WeekKey, capacite: f64) -> Self {
        let (role_id, personne_id) = resource.columns();
        Self {
            role_id: role_id.cloned(),
            personne_id: personne_id.cloned(),
            scope,
            semaine_debut: week,
            capacite,
        }
    }
}
