//! Project/team planning tree.
//!
//! Charges are folded into a three-level tree (root → child → resource) with
//! per-week totals rolled up at each level. Which entity sits at the root is
//! chosen by [`ViewMode`].

use std::collections::{BTreeMap, BTreeSet, HashMap};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::domain::{
    models::{
        Attachment, Capacite, Charge, ChargeId, Chiffre, Equipe, EquipeId, Personne, Projet,
        ProjetId, ResourceRef, Role,
    },
    week::WeekKey,
};

pub type WeekTotals = BTreeMap<WeekKey, f64>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Project,
    Team,
}

/// Everything the planning views are computed from, loaded up front.
#[derive(Debug, Clone, Default)]
pub struct GridInput {
    pub projets: Vec<Projet>,
    pub equipes: Vec<Equipe>,
    pub charges: Vec<Charge>,
    pub capacites: Vec<Capacite>,
    pub roles: Vec<Role>,
    pub personnes: Vec<Personne>,
    /// Project ↔ team links, present even before any charge is booked.
    pub liens: Vec<Chiffre>,
    pub attachments: Vec<Attachment>,
}

/// Display names for every id the grid may reference.
///
/// Ids that no longer resolve are shown as the raw id rather than dropped.
pub struct Labels<'a> {
    projets: HashMap<&'a ProjetId, &'a Projet>,
    equipes: HashMap<&'a EquipeId, &'a Equipe>,
    resources: HashMap<ResourceRef, String>,
}

impl<'a> Labels<'a> {
    pub fn new(input: &'a GridInput) -> Self {
        let roles = input
            .roles
            .iter()
            .map(|r| (ResourceRef::Role(r.id.clone()), r.nom.clone()));
        let personnes = input
            .personnes
            .iter()
            .map(|p| (ResourceRef::Personne(p.id.clone()), p.display_name()));

        Self {
            projets: input.projets.iter().map(|p| (&p.id, p)).collect(),
            equipes: input.equipes.iter().map(|e| (&e.id, e)).collect(),
            resources: roles.chain(personnes).collect(),
        }
    }

    pub fn projet(&self, id: &ProjetId) -> String {
        self.projets
            .get(id)
            .map(|p| p.label())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn equipe(&self, id: &EquipeId) -> String {
        self.equipes
            .get(id)
            .map(|e| e.nom.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn resource(&self, resource: &ResourceRef) -> String {
        self.resources
            .get(resource)
            .cloned()
            .unwrap_or_else(|| resource.id().to_string())
    }

    fn node(&self, key: &NodeKey) -> String {
        match key {
            NodeKey::Projet(id) => self.projet(id),
            NodeKey::Equipe(id) => self.equipe(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum NodeKey {
    Projet(ProjetId),
    Equipe(EquipeId),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceRow {
    pub resource: ResourceRef,
    pub label: String,
    pub weeks: WeekTotals,
    /// Every charge folded into this row, stubs included.
    pub charge_ids: Vec<ChargeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChildNode {
    pub key: NodeKey,
    pub projet_id: ProjetId,
    pub equipe_id: EquipeId,
    pub label: String,
    pub totals: WeekTotals,
    pub resources: Vec<ResourceRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RootNode {
    pub key: NodeKey,
    pub label: String,
    pub totals: WeekTotals,
    pub children: Vec<ChildNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanningTree {
    pub view: ViewMode,
    pub roots: Vec<RootNode>,
}

/// One line of the flattened tree, in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "level", rename_all = "lowercase")]
pub enum FlatRow {
    Root {
        key: NodeKey,
        label: String,
        totals: WeekTotals,
    },
    Child {
        key: NodeKey,
        projet_id: ProjetId,
        equipe_id: EquipeId,
        label: String,
        totals: WeekTotals,
    },
    Resource {
        projet_id: ProjetId,
        equipe_id: EquipeId,
        resource: ResourceRef,
        label: String,
        weeks: WeekTotals,
        charge_ids: Vec<ChargeId>,
    },
}

impl PlanningTree {
    pub fn flatten(&self) -> Vec<FlatRow> {
        let mut rows = Vec::new();
        for root in &self.roots {
            rows.push(FlatRow::Root {
                key: root.key.clone(),
                label: root.label.clone(),
                totals: root.totals.clone(),
            });
            for child in &root.children {
                rows.push(FlatRow::Child {
                    key: child.key.clone(),
                    projet_id: child.projet_id.clone(),
                    equipe_id: child.equipe_id.clone(),
                    label: child.label.clone(),
                    totals: child.totals.clone(),
                });
                rows.extend(child.resources.iter().map(|r| FlatRow::Resource {
                    projet_id: child.projet_id.clone(),
                    equipe_id: child.equipe_id.clone(),
                    resource: r.resource.clone(),
                    label: r.label.clone(),
                    weeks: r.weeks.clone(),
                    charge_ids: r.charge_ids.clone(),
                }));
            }
        }
        rows
    }

    /// Number of resource rows across the whole tree.
    pub fn leaf_count(&self) -> usize {
        self.roots
            .iter()
            .flat_map(|r| &r.children)
            .map(|c| c.resources.len())
            .sum()
    }
}

pub fn add_totals(into: &mut WeekTotals, from: &WeekTotals) {
    for (week, value) in from {
        *into.entry(*week).or_default() += value;
    }
}

fn by_label(a: &str, a_id: &str, b: &str, b_id: &str) -> std::cmp::Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a_id.cmp(b_id))
}

type Pair = (ProjetId, EquipeId);

/// Builds the planning tree.
///
/// Every root entity of the chosen kind is listed, charged or not. A child is
/// listed under a root when a charge or an explicit link connects them.
/// Charges without a resource are skipped; stubs produce a resource row with
/// no week values.
pub fn build_tree(input: &GridInput, view: ViewMode) -> PlanningTree {
    let labels = Labels::new(input);

    let mut rows: BTreeMap<Pair, BTreeMap<ResourceRef, ResourceRow>> = BTreeMap::new();
    for charge in &input.charges {
        let Some(resource) = charge.resource() else {
            tracing::debug!("charge {} has no resource, skipping", charge.id);
            continue;
        };
        let row = rows
            .entry((charge.projet_id.clone(), charge.equipe_id.clone()))
            .or_default()
            .entry(resource.clone())
            .or_insert_with(|| ResourceRow {
                label: labels.resource(&resource),
                resource,
                weeks: WeekTotals::new(),
                charge_ids: Vec::new(),
            });
        if let Some(week) = charge.semaine_debut {
            *row.weeks.entry(week).or_default() += charge.unite_ressource;
        }
        row.charge_ids.push(charge.id.clone());
    }

    let pairs: BTreeSet<Pair> = rows
        .keys()
        .cloned()
        .chain(
            input
                .liens
                .iter()
                .map(|l| (l.projet_id.clone(), l.equipe_id.clone())),
        )
        .collect();

    let split = |(projet, equipe): &Pair| match view {
        ViewMode::Project => (NodeKey::Projet(projet.clone()), NodeKey::Equipe(equipe.clone())),
        ViewMode::Team => (NodeKey::Equipe(equipe.clone()), NodeKey::Projet(projet.clone())),
    };

    let mut children_of: BTreeMap<NodeKey, Vec<ChildNode>> = match view {
        ViewMode::Project => input
            .projets
            .iter()
            .map(|p| (NodeKey::Projet(p.id.clone()), Vec::new()))
            .collect(),
        ViewMode::Team => input
            .equipes
            .iter()
            .map(|e| (NodeKey::Equipe(e.id.clone()), Vec::new()))
            .collect(),
    };

    for pair in &pairs {
        let (root_key, child_key) = split(pair);
        let resources: Vec<ResourceRow> = rows
            .remove(pair)
            .map(|by_resource| {
                by_resource
                    .into_values()
                    .sorted_by(|a, b| by_label(&a.label, a.resource.id(), &b.label, b.resource.id()))
                    .collect()
            })
            .unwrap_or_default();

        let mut totals = WeekTotals::new();
        resources.iter().for_each(|r| add_totals(&mut totals, &r.weeks));

        children_of.entry(root_key).or_default().push(ChildNode {
            label: labels.node(&child_key),
            key: child_key,
            projet_id: pair.0.clone(),
            equipe_id: pair.1.clone(),
            totals,
            resources,
        });
    }

    let roots = children_of
        .into_iter()
        .map(|(key, children)| {
            let children: Vec<ChildNode> = children
                .into_iter()
                .sorted_by(|a, b| by_label(&a.label, node_id(&a.key), &b.label, node_id(&b.key)))
                .collect();
            let mut totals = WeekTotals::new();
            children.iter().for_each(|c| add_totals(&mut totals, &c.totals));
            RootNode {
                label: labels.node(&key),
                key,
                totals,
                children,
            }
        })
        .sorted_by(|a, b| by_label(&a.label, node_id(&a.key), &b.label, node_id(&b.key)))
        .collect();

    PlanningTree { view, roots }
}

fn node_id(key: &NodeKey) -> &str {
    match key {
        NodeKey::Projet(id) => id.as_str(),
        NodeKey::Equipe(id) => id.as_str(),
    }
}
