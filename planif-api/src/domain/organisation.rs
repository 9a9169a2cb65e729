//! The company → department → service → team hierarchy.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use strum::{Display, EnumString, IntoStaticStr};

use super::{
    models::{Departement, DepartementId, Equipe, Service, ServiceId, Societe, SocieteId},
    PlanningError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OrgKind {
    Societe,
    Departement,
    Service,
    Equipe,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgNode {
    pub kind: OrgKind,
    pub id: String,
    pub nom: String,
    pub couleur: Option<String>,
    pub expanded: bool,
    pub children: Vec<OrgNode>,
}

impl OrgNode {
    fn leaf(kind: OrgKind, id: &str, nom: &str, couleur: &Option<String>) -> Self {
        Self {
            kind,
            id: id.to_string(),
            nom: nom.to_string(),
            couleur: couleur.clone(),
            expanded: false,
            children: Vec::new(),
        }
    }

    fn toggle(&mut self, kind: OrgKind, id: &str) -> bool {
        if self.kind == kind && self.id == id {
            self.expanded = !self.expanded;
            return true;
        }
        self.children.iter_mut().any(|child| child.toggle(kind, id))
    }

    fn expand_all(&mut self) {
        self.expanded = true;
        self.children.iter_mut().for_each(OrgNode::expand_all);
    }

    fn count(&self) -> usize {
        1 + self.children.iter().map(OrgNode::count).sum::<usize>()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrgTree {
    pub roots: Vec<OrgNode>,
}

impl OrgTree {
    /// Flips the `expanded` flag of one node. Returns `false` if no node matched.
    pub fn toggle(&mut self, kind: OrgKind, id: &str) -> bool {
        self.roots.iter_mut().any(|root| root.toggle(kind, id))
    }

    pub fn expand_all(&mut self) {
        self.roots.iter_mut().for_each(OrgNode::expand_all);
    }

    pub fn node_count(&self) -> usize {
        self.roots.iter().map(OrgNode::count).sum()
    }
}

/// Builds the tree in insertion order.
///
/// A department's children are its services followed by the teams attached
/// directly to it. A team that names a service is only listed under that
/// service. Nodes whose parent is missing are left out.
pub fn build_org_tree(
    societes: &[Societe],
    departements: &[Departement],
    services: &[Service],
    equipes: &[Equipe],
) -> OrgTree {
    let team_node = |e: &Equipe| OrgNode::leaf(OrgKind::Equipe, e.id.as_str(), &e.nom, &e.couleur);

    let service_node = |s: &Service| {
        let mut node = OrgNode::leaf(OrgKind::Service, s.id.as_str(), &s.nom, &s.couleur);
        node.children = equipes
            .iter()
            .filter(|e| e.service_id.as_ref() == Some(&s.id))
            .map(team_node)
            .collect();
        node
    };

    let departement_node = |d: &Departement| {
        let mut node = OrgNode::leaf(OrgKind::Departement, d.id.as_str(), &d.nom, &d.couleur);
        let services_under = services
            .iter()
            .filter(|s| s.departement_id.as_ref() == Some(&d.id))
            .map(service_node);
        let teams_under = equipes
            .iter()
            .filter(|e| e.service_id.is_none() && e.departement_id.as_ref() == Some(&d.id))
            .map(team_node);
        node.children = services_under.chain(teams_under).collect();
        node
    };

    let roots = societes
        .iter()
        .map(|s| {
            let mut node = OrgNode::leaf(OrgKind::Societe, s.id.as_str(), &s.nom, &s.couleur);
            node.children = departements
                .iter()
                .filter(|d| d.societe_id.as_ref() == Some(&s.id))
                .map(departement_node)
                .collect();
            node
        })
        .collect();

    OrgTree { roots }
}

/// Where a team hangs. Exactly one parent key is written; the other is nulled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum TeamParent {
    Service(ServiceId),
    Departement(DepartementId),
}

/// Create/update payload for any level of the hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OrgNodeForm {
    Societe {
        nom: String,
        #[serde(default)]
        couleur: Option<String>,
    },
    Departement {
        nom: String,
        #[serde(default)]
        couleur: Option<String>,
        societe_id: SocieteId,
    },
    Service {
        nom: String,
        #[serde(default)]
        couleur: Option<String>,
        departement_id: DepartementId,
    },
    Equipe {
        nom: String,
        #[serde(default)]
        couleur: Option<String>,
        parent: TeamParent,
    },
}

impl OrgNodeForm {
    pub fn kind(&self) -> OrgKind {
        match self {
            Self::Societe { .. } => OrgKind::Societe,
            Self::Departement { .. } => OrgKind::Departement,
            Self::Service { .. } => OrgKind::Service,
            Self::Equipe { .. } => OrgKind::Equipe,
        }
    }

    fn nom(&self) -> &str {
        match self {
            Self::Societe { nom, .. }
            | Self::Departement { nom, .. }
            | Self::Service { nom, .. }
            | Self::Equipe { nom, .. } => nom,
        }
    }

    pub fn validate(&self) -> Result<(), PlanningError> {
        if self.nom().trim().is_empty() {
            return Err(PlanningError::validation(format!("{} name is required", self.kind())));
        }
        Ok(())
    }

    /// The row written to the backend.
    pub fn row(&self) -> Value {
        match self {
            Self::Societe { nom, couleur } => json!({ "nom": nom.trim(), "couleur": couleur }),
            Self::Departement {
                nom,
                couleur,
                societe_id,
            } => json!({ "nom": nom.trim(), "couleur": couleur, "societe_id": societe_id }),
            Self::Service {
                nom,
                couleur,
                departement_id,
            } => json!({ "nom": nom.trim(), "couleur": couleur, "departement_id": departement_id }),
            Self::Equipe {
                nom,
                couleur,
                parent,
            } => {
                let (service_id, departement_id) = match parent {
                    TeamParent::Service(id) => (Some(id), None),
                    TeamParent::Departement(id) => (None, Some(id)),
                };
                json!({
                    "nom": nom.trim(),
                    "couleur": couleur,
                    "service_id": service_id,
                    "departement_id": departement_id,
                })
            }
        }
    }
}
