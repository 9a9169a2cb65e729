use std::collections::{BTreeMap, HashMap};

use itertools::Itertools;
use serde::Serialize;

use super::grid::WeekTotals;
use crate::domain::{
    models::{Charge, Jalon, Projet, ProjetId, ProjetStatut},
    week::WeekKey,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectLoad {
    pub projet_id: ProjetId,
    pub label: String,
    pub statut: ProjetStatut,
    pub raf: f64,
    /// Charged units per week of the axis; weeks outside the axis are dropped.
    pub weeks: WeekTotals,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalPlan {
    pub axis: Vec<WeekKey>,
    pub projects: Vec<ProjectLoad>,
    pub milestones: BTreeMap<WeekKey, Vec<Jalon>>,
}

/// Per-project weekly load over `axis`, with milestones bucketed by week.
pub fn weekly_project_load(
    projets: &[Projet],
    charges: &[Charge],
    jalons: &[Jalon],
    axis: &[WeekKey],
) -> GlobalPlan {
    let in_axis = |week: &WeekKey| axis.binary_search(week).is_ok();

    let mut load: HashMap<&ProjetId, WeekTotals> = HashMap::new();
    for charge in charges {
        let Some(week) = charge.semaine_debut.filter(in_axis) else {
            continue;
        };
        *load
            .entry(&charge.projet_id)
            .or_default()
            .entry(week)
            .or_default() += charge.unite_ressource;
    }

    let projects = projets
        .iter()
        .map(|p| {
            let weeks = load.remove(&p.id).unwrap_or_default();
            ProjectLoad {
                projet_id: p.id.clone(),
                label: p.label(),
                statut: p.statut,
                raf: p.calculate_raf(),
                total: weeks.values().sum(),
                weeks,
            }
        })
        .sorted_by_key(|p| p.label.to_lowercase())
        .collect();

    let milestones = jalons
        .iter()
        .filter(|j| in_axis(&j.week()))
        .sorted_by_key(|j| j.date)
        .map(|j| (j.week(), j.clone()))
        .into_group_map()
        .into_iter()
        .collect();

    GlobalPlan {
        axis: axis.to_vec(),
        projects,
        milestones,
    }
}
