//! Orchestrates the planning views on top of the data-access services.

use std::{collections::BTreeMap, sync::Arc};

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::instrument;

use super::{CapacityService, ChargeService, MilestoneService, OrganisationService, ProjectService, ResourceService};
use crate::domain::{
    models::{CapacityScope, EquipeId, ProjetId, ProjetStatut, ResourceRef},
    planning::{
        add_totals, build_capacity_grid, build_tree, weekly_project_load, AvailabilityIndex, CapacityRow,
        GlobalPlan, GridInput, PlanningTree, ViewMode, WeekTotals,
    },
    week::WeekKey,
    PlanningError,
};

/// The row a bulk selection was made on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BulkRow {
    Charge {
        projet_id: ProjetId,
        equipe_id: EquipeId,
        resource: ResourceRef,
    },
    Capacity {
        resource: ResourceRef,
        #[serde(default)]
        scope: CapacityScope,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkReport {
    pub written: usize,
    pub weeks: Vec<WeekKey>,
}

/// A planning tree with the index needed to show availability per cell.
#[derive(Debug, Clone)]
pub struct PlanningSnapshot {
    pub axis: Vec<WeekKey>,
    pub tree: PlanningTree,
    pub availability: AvailabilityIndex,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub projects_by_status: BTreeMap<ProjetStatut, usize>,
    pub total_raf: f64,
    pub roles: usize,
    pub personnes: usize,
    pub equipes: usize,
    /// Charged units per week over the requested axis.
    pub load: WeekTotals,
    pub upcoming_milestones: usize,
}

pub struct PlanningService {
    organisation: Arc<OrganisationService>,
    resources: Arc<ResourceService>,
    projects: Arc<ProjectService>,
    charges: Arc<ChargeService>,
    capacities: Arc<CapacityService>,
    milestones: Arc<MilestoneService>,
}

impl PlanningService {
    pub fn new(
        organisation: Arc<OrganisationService>,
        resources: Arc<ResourceService>,
        projects: Arc<ProjectService>,
        charges: Arc<ChargeService>,
        capacities: Arc<CapacityService>,
        milestones: Arc<MilestoneService>,
    ) -> Self {
        Self {
            organisation,
            resources,
            projects,
            charges,
            capacities,
            milestones,
        }
    }

    /// Loads every collection the grids are built from, concurrently.
    pub async fn load_input(&self) -> Result<GridInput, PlanningError> {
        let (projets, equipes, charges, capacites, roles, personnes, liens, attachments) = futures::try_join!(
            self.projects.list(),
            self.organisation.list_equipes(),
            self.charges.list(),
            self.capacities.list(),
            self.resources.list_roles(),
            self.resources.list_personnes(),
            self.projects.list_chiffres(),
            self.resources.list_attachments(),
        )?;

        Ok(GridInput {
            projets,
            equipes,
            charges,
            capacites,
            roles,
            personnes,
            liens,
            attachments,
        })
    }

    #[instrument(skip(self, axis))]
    pub async fn planning_grid(&self, view: ViewMode, axis: Vec<WeekKey>) -> Result<PlanningSnapshot, PlanningError> {
        let input = self.load_input().await?;
        let tree = build_tree(&input, view);
        tracing::debug!(roots = tree.roots.len(), resources = tree.leaf_count(), "Built planning tree");
        Ok(PlanningSnapshot {
            tree,
            availability: AvailabilityIndex::new(&input),
            axis,
        })
    }

    #[instrument(skip(self, axis))]
    pub async fn capacity_grid(&self, axis: &[WeekKey]) -> Result<Vec<CapacityRow>, PlanningError> {
        let input = self.load_input().await?;
        Ok(build_capacity_grid(&input, axis))
    }

    #[instrument(skip(self, axis))]
    pub async fn global_plan(&self, axis: &[WeekKey]) -> Result<GlobalPlan, PlanningError> {
        let (projets, charges, jalons) = futures::try_join!(
            self.projects.list(),
            self.charges.list(),
            self.milestones.list(),
        )?;
        Ok(weekly_project_load(&projets, &charges, &jalons, axis))
    }

    /// Writes `value` to every target cell, one at a time.
    ///
    /// Stops at the first failure; writes already made are kept and reported
    /// through [`PlanningError::BulkInterrupted`].
    #[instrument(skip(self, targets), fields(cells = targets.len()))]
    pub async fn apply_bulk(&self, targets: &[(BulkRow, WeekKey)], value: f64) -> Result<BulkReport, PlanningError> {
        let total = targets.len();
        let mut weeks = Vec::with_capacity(total);

        for (applied, (row, week)) in targets.iter().enumerate() {
            let written = match row {
                BulkRow::Charge {
                    projet_id,
                    equipe_id,
                    resource,
                } => self
                    .charges
                    .upsert_week(projet_id, equipe_id, resource, *week, value)
                    .await
                    .map(|_| ()),
                BulkRow::Capacity { resource, scope } => self
                    .capacities
                    .upsert_week(resource, scope, *week, value)
                    .await
                    .map(|_| ()),
            };

            if let Err(e) = written {
                tracing::error!("Bulk update stopped at week {} ({} of {} applied): {}", week, applied, total, e);
                return Err(PlanningError::BulkInterrupted {
                    applied,
                    total,
                    source: Box::new(e),
                });
            }
            weeks.push(*week);
        }

        Ok(BulkReport {
            written: weeks.len(),
            weeks,
        })
    }

    #[instrument(skip(self, axis))]
    pub async fn dashboard(&self, axis: &[WeekKey]) -> Result<Dashboard, PlanningError> {
        let input = self.load_input().await?;
        let jalons = self.milestones.list().await?;

        let mut projects_by_status: BTreeMap<ProjetStatut, usize> =
            ProjetStatut::iter().map(|s| (s, 0)).collect();
        for projet in &input.projets {
            *projects_by_status.entry(projet.statut).or_default() += 1;
        }

        let plan = weekly_project_load(&input.projets, &input.charges, &jalons, axis);
        let mut load: WeekTotals = axis.iter().map(|w| (*w, 0.0)).collect();
        plan.projects.iter().for_each(|p| add_totals(&mut load, &p.weeks));

        Ok(Dashboard {
            projects_by_status,
            total_raf: input.projets.iter().map(|p| p.calculate_raf()).sum(),
            roles: input.roles.len(),
            personnes: input.personnes.len(),
            equipes: input.equipes.len(),
            load,
            upcoming_milestones: plan.milestones.values().map(Vec::len).sum(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::outbound::mock::MockRowStore,
        domain::{
            models::{PersonneId, RoleId},
            planning::DragSelection,
            planning::SelectionEvent,
            ports::outbound::{RowStore, Table},
            week::week_axis,
        },
    };
    use chrono::NaiveDate;
    use serde_json::json;

    fn planning(store: &MockRowStore) -> PlanningService {
        let store: Arc<dyn RowStore> = Arc::new(store.clone());
        PlanningService::new(
            Arc::new(OrganisationService::new(store.clone())),
            Arc::new(ResourceService::new(store.clone())),
            Arc::new(ProjectService::new(store.clone())),
            Arc::new(ChargeService::new(store.clone())),
            Arc::new(CapacityService::new(store.clone())),
            Arc::new(MilestoneService::new(store)),
        )
    }

    fn axis() -> Vec<WeekKey> {
        week_axis(NaiveDate::from_ymd_opt(2024, 3, 13).unwrap(), 6)
    }

    fn capacity_row() -> BulkRow {
        BulkRow::Capacity {
            resource: ResourceRef::Role(RoleId::new("r-dev")),
            scope: CapacityScope::team(EquipeId::new("e1")),
        }
    }

    fn drag(row: BulkRow, from: usize, to: usize) -> DragSelection<BulkRow> {
        DragSelection::replay([
            SelectionEvent::PointerDown {
                row: row.clone(),
                week_index: from,
            },
            SelectionEvent::PointerMove { row, week_index: to },
            SelectionEvent::PointerUp,
        ])
    }

    #[tokio::test]
    async fn bulk_capacity_creates_one_monday_row_per_week() {
        let store = MockRowStore::new();
        let service = planning(&store);
        let axis = axis();

        let targets = drag(capacity_row(), 0, 3).targets(&axis);
        let report = service.apply_bulk(&targets, 2.5).await.unwrap();
        assert_eq!(report.written, 4);

        let rows = store.rows(Table::Capacites);
        assert_eq!(rows.len(), 4);
        let mondays: Vec<_> = rows.iter().map(|r| r["semaine_debut"].as_str().unwrap().to_string()).collect();
        assert_eq!(mondays, ["2024-03-11", "2024-03-18", "2024-03-25", "2024-04-01"]);
        assert!(rows.iter().all(|r| r["capacite"] == 2.5));
    }

    #[tokio::test]
    async fn bulk_stops_at_first_failure_and_keeps_earlier_writes() {
        let store = MockRowStore::new();
        let service = planning(&store);
        let targets = drag(capacity_row(), 0, 3).targets(&axis());

        store.fail_writes_after(2);
        let err = service.apply_bulk(&targets, 1.0).await.unwrap_err();

        assert!(matches!(err, PlanningError::BulkInterrupted { applied: 2, total: 4, .. }));
        assert_eq!(store.rows(Table::Capacites).len(), 2);
    }

    #[tokio::test]
    async fn grid_reflects_bulk_charges_with_availability() {
        let store = MockRowStore::new()
            .with_rows(Table::Projets, vec![json!({ "id": "p1", "nom": "Portail", "code": "PTL" })])
            .with_rows(Table::Equipes, vec![json!({ "id": "e1", "nom": "Back" })])
            .with_rows(
                Table::Personnes,
                vec![json!({ "id": "pe-1", "prenom": "Alice", "nom": "Martin" })],
            );
        let service = planning(&store);
        let axis = axis();
        let alice = ResourceRef::Personne(PersonneId::new("pe-1"));

        // Warm every cache before writing.
        service.planning_grid(ViewMode::Project, axis.clone()).await.unwrap();

        let capacity = BulkRow::Capacity {
            resource: alice.clone(),
            scope: CapacityScope::team(EquipeId::new("e1")),
        };
        let charge = BulkRow::Charge {
            projet_id: ProjetId::new("p1"),
            equipe_id: EquipeId::new("e1"),
            resource: alice.clone(),
        };
        service.apply_bulk(&drag(capacity, 0, 1).targets(&axis), 5.0).await.unwrap();
        service.apply_bulk(&drag(charge, 1, 0).targets(&axis), 2.0).await.unwrap();

        let snapshot = service.planning_grid(ViewMode::Project, axis.clone()).await.unwrap();
        let root = &snapshot.tree.roots[0];
        assert_eq!(root.label, "PTL - Portail");
        assert_eq!(root.children[0].resources[0].label, "Alice Martin");
        assert_eq!(root.totals.get(&axis[0]), Some(&2.0));
        assert_eq!(
            snapshot.availability.available(&alice, &EquipeId::new("e1"), axis[1]),
            Some(3.0)
        );
    }

    #[tokio::test]
    async fn dashboard_counts_every_status() {
        let store = MockRowStore::new().with_rows(
            Table::Projets,
            vec![
                json!({ "id": "p1", "nom": "A", "statut": "en_cours", "chiffrage_previsionnel": 10, "temps_consomme": 4 }),
                json!({ "id": "p2", "nom": "B", "statut": "termine", "chiffrage_previsionnel": 5, "temps_consomme": 6 }),
            ],
        );
        let dashboard = planning(&store).dashboard(&axis()).await.unwrap();

        assert_eq!(dashboard.projects_by_status[&ProjetStatut::EnCours], 1);
        assert_eq!(dashboard.projects_by_status[&ProjetStatut::EnPause], 0);
        assert_eq!(dashboard.total_raf, 5.0);
        assert_eq!(dashboard.load.len(), 6);
    }
}
