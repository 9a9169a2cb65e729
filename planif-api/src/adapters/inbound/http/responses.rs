//! HTTP response types for the planning endpoints.
//!
//! Grids are sent dense: one cell per week of the requested axis, so the
//! frontend never has to join a sparse map against its column headers.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{
    models::{ChargeId, EquipeId, Jalon, Projet, ProjetId, ResourceRef, Setting},
    planning::{CapacityRow, FlatRow, GlobalPlan, NodeKey, ProjectLoad, ViewMode, WeekTotals},
    services::PlanningSnapshot,
    week::WeekKey,
};

/// Column header of a week.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekHeader {
    /// Monday of the week, `YYYY-MM-DD`.
    pub key: WeekKey,
    pub number: u32,
    pub year: i32,
}

impl From<WeekKey> for WeekHeader {
    fn from(week: WeekKey) -> Self {
        Self {
            key: week,
            number: week.number(),
            year: week.iso_year(),
        }
    }
}

pub fn headers(axis: &[WeekKey]) -> Vec<WeekHeader> {
    axis.iter().copied().map(WeekHeader::from).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowLevel {
    Root,
    Child,
    Resource,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCellResponse {
    pub week: WeekKey,
    pub value: Option<f64>,
    /// Capacity left for the resource in this team and week, resource rows only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<f64>,
    pub over_allocated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRowResponse {
    pub level: RowLevel,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projet_id: Option<ProjetId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equipe_id: Option<EquipeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<ResourceRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub charge_ids: Vec<ChargeId>,
    pub cells: Vec<GridCellResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningGridResponse {
    pub view: ViewMode,
    pub weeks: Vec<WeekHeader>,
    pub rows: Vec<GridRowResponse>,
}

fn total_cells(axis: &[WeekKey], totals: &WeekTotals) -> Vec<GridCellResponse> {
    axis.iter()
        .map(|week| GridCellResponse {
            week: *week,
            value: totals.get(week).copied(),
            available: None,
            over_allocated: false,
        })
        .collect()
}

impl From<PlanningSnapshot> for PlanningGridResponse {
    fn from(snapshot: PlanningSnapshot) -> Self {
        let PlanningSnapshot {
            axis,
            tree,
            availability,
        } = snapshot;

        let rows = tree
            .flatten()
            .into_iter()
            .map(|row| match row {
                FlatRow::Root { key, label, totals } => {
                    let (projet_id, equipe_id) = match key {
                        NodeKey::Projet(id) => (Some(id), None),
                        NodeKey::Equipe(id) => (None, Some(id)),
                    };
                    GridRowResponse {
                        level: RowLevel::Root,
                        label,
                        projet_id,
                        equipe_id,
                        resource: None,
                        charge_ids: Vec::new(),
                        cells: total_cells(&axis, &totals),
                    }
                }
                FlatRow::Child {
                    projet_id,
                    equipe_id,
                    label,
                    totals,
                    ..
                } => GridRowResponse {
                    level: RowLevel::Child,
                    label,
                    projet_id: Some(projet_id),
                    equipe_id: Some(equipe_id),
                    resource: None,
                    charge_ids: Vec::new(),
                    cells: total_cells(&axis, &totals),
                },
                FlatRow::Resource {
                    projet_id,
                    equipe_id,
                    resource,
                    label,
                    weeks,
                    charge_ids,
                } => {
                    let cells = axis
                        .iter()
                        .map(|week| {
                            let available = availability.available(&resource, &equipe_id, *week);
                            GridCellResponse {
                                week: *week,
                                value: weeks.get(week).copied(),
                                available,
                                over_allocated: available.is_some_and(|a| a < 0.0),
                            }
                        })
                        .collect();
                    GridRowResponse {
                        level: RowLevel::Resource,
                        label,
                        projet_id: Some(projet_id),
                        equipe_id: Some(equipe_id),
                        resource: Some(resource),
                        charge_ids,
                        cells,
                    }
                }
            })
            .collect();

        Self {
            view: tree.view,
            weeks: headers(&axis),
            rows,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityGridResponse {
    pub weeks: Vec<WeekHeader>,
    pub rows: Vec<CapacityRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalPlanResponse {
    pub weeks: Vec<WeekHeader>,
    pub projects: Vec<ProjectLoad>,
    pub milestones: BTreeMap<WeekKey, Vec<Jalon>>,
}

impl From<GlobalPlan> for GlobalPlanResponse {
    fn from(plan: GlobalPlan) -> Self {
        Self {
            weeks: headers(&plan.axis),
            projects: plan.projects,
            milestones: plan.milestones,
        }
    }
}

/// A project with its remaining work.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjetResponse {
    #[serde(flatten)]
    pub projet: Projet,
    pub raf: f64,
}

impl From<Projet> for ProjetResponse {
    fn from(projet: Projet) -> Self {
        Self {
            raf: projet.calculate_raf(),
            projet,
        }
    }
}

/// A setting with its value decoded according to its type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettingResponse {
    #[serde(flatten)]
    pub setting: Setting,
    pub typed: Option<serde_json::Value>,
}

impl From<Setting> for SettingResponse {
    fn from(setting: Setting) -> Self {
        Self {
            typed: setting.typed_value(),
            setting,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        planning::{build_tree, AvailabilityIndex, GridInput},
        week::week_axis,
    };
    use chrono::NaiveDate;
    use serde_json::json;

    fn input() -> GridInput {
        GridInput {
            projets: vec![serde_json::from_value(json!({ "id": "p1", "nom": "Portail", "code": "PTL" })).unwrap()],
            equipes: vec![serde_json::from_value(json!({ "id": "e1", "nom": "Back" })).unwrap()],
            roles: vec![serde_json::from_value(json!({ "id": "r1", "nom": "Dev" })).unwrap()],
            charges: vec![serde_json::from_value(json!({
                "id": "c1", "projet_id": "p1", "equipe_id": "e1", "role_id": "r1",
                "semaine_debut": "2024-03-18", "unite_ressource": 4
            }))
            .unwrap()],
            capacites: vec![serde_json::from_value(json!({
                "id": "k1", "role_id": "r1", "equipe_id": "e1",
                "semaine_debut": "2024-03-18", "capacite": 3
            }))
            .unwrap()],
            ..Default::default()
        }
    }

    #[test]
    fn grid_is_dense_and_flags_over_allocation() {
        let input = input();
        let axis = week_axis(NaiveDate::from_ymd_opt(2024, 3, 11).unwrap(), 3);
        let snapshot = PlanningSnapshot {
            tree: build_tree(&input, ViewMode::Project),
            availability: AvailabilityIndex::new(&input),
            axis: axis.clone(),
        };

        let response = PlanningGridResponse::from(snapshot);
        let levels: Vec<_> = response.rows.iter().map(|r| r.level).collect();
        assert_eq!(levels, [RowLevel::Root, RowLevel::Child, RowLevel::Resource]);
        assert!(response.rows.iter().all(|r| r.cells.len() == 3));

        let resource = &response.rows[2];
        assert_eq!(resource.cells[0].value, None);
        assert_eq!(resource.cells[0].available, None);
        assert_eq!(resource.cells[1].value, Some(4.0));
        assert_eq!(resource.cells[1].available, Some(-1.0));
        assert!(resource.cells[1].over_allocated);
        assert_eq!(response.weeks[1].number, 12);
    }

    #[test]
    fn projet_response_carries_raf() {
        let projet: Projet = serde_json::from_value(json!({
            "id": "p1", "nom": "Portail", "chiffrage_previsionnel": 20, "temps_consomme": 5
        }))
        .unwrap();
        let body = serde_json::to_value(ProjetResponse::from(projet)).unwrap();
        assert_eq!(body["raf"], 15.0);
        assert_eq!(body["nom"], "Portail");
    }
}
