use serde::{Deserialize, Serialize};

use super::{DepartementId, EquipeId, RowMeta, ServiceId, SocieteId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Societe {
    pub id: SocieteId,
    pub nom: String,
    #[serde(default)]
    pub couleur: Option<String>,
    #[serde(flatten)]
    pub meta: RowMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Departement {
    pub id: DepartementId,
    pub nom: String,
    #[serde(default)]
    pub couleur: Option<String>,
    #[serde(default)]
    pub societe_id: Option<SocieteId>,
    #[serde(flatten)]
    pub meta: RowMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub nom: String,
    #[serde(default)]
    pub couleur: Option<String>,
    #[serde(default)]
    pub departement_id: Option<DepartementId>,
    #[serde(flatten)]
    pub meta: RowMeta,
}

/// A team hangs either under a service or directly under a department.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipe {
    pub id: EquipeId,
    pub nom: String,
    #[serde(default)]
    pub couleur: Option<String>,
    #[serde(default)]
    pub service_id: Option<ServiceId>,
    #[serde(default)]
    pub departement_id: Option<DepartementId>,
    #[serde(flatten)]
    pub meta: RowMeta,
}
