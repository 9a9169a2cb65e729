//! Capacity versus charge, per resource, team and week.

use std::collections::{BTreeSet, HashMap};

use itertools::Itertools;
use serde::Serialize;

use super::grid::{GridInput, Labels};
use crate::domain::{
    models::{EquipeId, ResourceRef},
    week::WeekKey,
};

type CapacityKey = (ResourceRef, Option<EquipeId>, WeekKey);
type ChargeKey = (ResourceRef, EquipeId, WeekKey);

/// Hash index over capacities and scheduled charges.
///
/// Lookups are exact on the team: a capacity declared at service or company
/// level is only found with `equipe = None`.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityIndex {
    capacity: HashMap<CapacityKey, f64>,
    charged: HashMap<ChargeKey, f64>,
}

impl AvailabilityIndex {
    pub fn new(input: &GridInput) -> Self {
        let mut index = Self::default();

        for cap in &input.capacites {
            let Some(resource) = cap.resource() else {
                continue;
            };
            *index
                .capacity
                .entry((resource, cap.scope.equipe_id.clone(), cap.semaine_debut))
                .or_default() += cap.capacite;
        }

        for charge in &input.charges {
            let (Some(resource), Some(week)) = (charge.resource(), charge.semaine_debut) else {
                continue;
            };
            *index
                .charged
                .entry((resource, charge.equipe_id.clone(), week))
                .or_default() += charge.unite_ressource;
        }

        index
    }

    pub fn capacity(&self, resource: &ResourceRef, equipe: Option<&EquipeId>, week: WeekKey) -> Option<f64> {
        self.capacity
            .get(&(resource.clone(), equipe.cloned(), week))
            .copied()
    }

    /// Sum of every charge booked for the triple, across projects.
    pub fn charged(&self, resource: &ResourceRef, equipe: &EquipeId, week: WeekKey) -> f64 {
        self.charged
            .get(&(resource.clone(), equipe.clone(), week))
            .copied()
            .unwrap_or_default()
    }

    /// `capacity - charged`, or `None` when no capacity was declared.
    pub fn available(&self, resource: &ResourceRef, equipe: &EquipeId, week: WeekKey) -> Option<f64> {
        self.capacity(resource, Some(equipe), week)
            .map(|cap| cap - self.charged(resource, equipe, week))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapacityCell {
    pub week: WeekKey,
    pub capacity: Option<f64>,
    pub charged: f64,
    pub available: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapacityRow {
    pub resource: ResourceRef,
    pub label: String,
    pub equipe_id: Option<EquipeId>,
    pub equipe_label: Option<String>,
    pub cells: Vec<CapacityCell>,
}

/// One row per (resource, team) known from capacities, charges or attachments,
/// with a dense cell per week of `axis`.
pub fn build_capacity_grid(input: &GridInput, axis: &[WeekKey]) -> Vec<CapacityRow> {
    let labels = Labels::new(input);
    let index = AvailabilityIndex::new(input);

    let from_capacities = input
        .capacites
        .iter()
        .filter_map(|c| c.resource().map(|r| (r, c.scope.equipe_id.clone())));
    let from_charges = input
        .charges
        .iter()
        .filter_map(|c| c.resource().map(|r| (r, Some(c.equipe_id.clone()))));
    let from_attachments = input
        .attachments
        .iter()
        .filter_map(|a| a.resource().map(|r| (r, Some(a.equipe_id.clone()))));

    let keys: BTreeSet<(ResourceRef, Option<EquipeId>)> = from_capacities
        .chain(from_charges)
        .chain(from_attachments)
        .collect();

    keys.into_iter()
        .map(|(resource, equipe_id)| {
            let cells = axis
                .iter()
                .map(|&week| {
                    let capacity = index.capacity(&resource, equipe_id.as_ref(), week);
                    let charged = equipe_id
                        .as_ref()
                        .map(|e| index.charged(&resource, e, week))
                        .unwrap_or_default();
                    CapacityCell {
                        week,
                        capacity,
                        charged,
                        available: capacity.map(|c| c - charged),
                    }
                })
                .collect();

            CapacityRow {
                label: labels.resource(&resource),
                equipe_label: equipe_id.as_ref().map(|e| labels.equipe(e)),
                resource,
                equipe_id,
                cells,
            }
        })
        .sorted_by(|a, b| {
            a.label
                .to_lowercase()
                .cmp(&b.label.to_lowercase())
                .then_with(|| a.equipe_label.cmp(&b.equipe_label))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{
        Attachment, AttachmentId, Capacite, CapaciteId, CapacityScope, Charge, ChargeId, ProjetId,
        Role, RoleId, RowMeta,
    };
    use crate::domain::week::week_axis;

    fn wk(s: &str) -> WeekKey {
        s.parse().unwrap()
    }

    fn dev() -> ResourceRef {
        ResourceRef::Role(RoleId::new("r-dev"))
    }

    fn capacite(equipe: Option<&str>, week: &str, value: f64) -> Capacite {
        Capacite {
            id: CapaciteId::new(format!("cap-{week}-{value}")),
            role_id: Some(RoleId::new("r-dev")),
            personne_id: None,
            scope: CapacityScope {
                equipe_id: equipe.map(EquipeId::new),
                ..CapacityScope::default()
            },
            semaine_debut: wk(week),
            capacite: value,
            meta: RowMeta::default(),
        }
    }

    fn charge(id: &str, projet: &str, week: &str, value: f64) -> Charge {
        Charge {
            id: ChargeId::new(id),
            projet_id: ProjetId::new(projet),
            equipe_id: EquipeId::new("e1"),
            role_id: Some(RoleId::new("r-dev")),
            personne_id: None,
            semaine_debut: Some(wk(week)),
            unite_ressource: value,
            meta: RowMeta::default(),
        }
    }

    fn input() -> GridInput {
        GridInput {
            roles: vec![Role {
                id: RoleId::new("r-dev"),
                nom: "Développeur".to_string(),
                jours_semaine: 5.0,
                description: None,
                meta: RowMeta::default(),
            }],
            capacites: vec![capacite(Some("e1"), "2024-03-11", 5.0)],
            charges: vec![
                charge("c1", "p1", "2024-03-11", 1.5),
                charge("c2", "p2", "2024-03-12", 2.0),
                charge("c3", "p1", "2024-03-18", 1.0),
            ],
            ..GridInput::default()
        }
    }

    #[test]
    fn availability_subtracts_the_sum_of_charges() {
        let index = AvailabilityIndex::new(&input());
        let e1 = EquipeId::new("e1");

        assert_eq!(index.charged(&dev(), &e1, wk("2024-03-11")), 3.5);
        assert_eq!(index.available(&dev(), &e1, wk("2024-03-11")), Some(1.5));
    }

    #[test]
    fn no_capacity_means_unknown_availability() {
        let index = AvailabilityIndex::new(&input());
        assert_eq!(index.available(&dev(), &EquipeId::new("e1"), wk("2024-03-18")), None);
    }

    #[test]
    fn capacity_lookup_is_exact_on_team() {
        let mut input = input();
        input.capacites.push(capacite(None, "2024-03-18", 4.0));
        let index = AvailabilityIndex::new(&input);

        assert_eq!(index.capacity(&dev(), None, wk("2024-03-18")), Some(4.0));
        assert_eq!(index.capacity(&dev(), Some(&EquipeId::new("e1")), wk("2024-03-18")), None);
    }

    #[test]
    fn grid_has_one_dense_row_per_resource_and_team() {
        let mut input = input();
        input.attachments.push(Attachment {
            id: AttachmentId::new("a1"),
            equipe_id: EquipeId::new("e2"),
            role_id: Some(RoleId::new("r-dev")),
            personne_id: None,
            meta: RowMeta::default(),
        });
        let axis = week_axis(chrono::NaiveDate::from_ymd_opt(2024, 3, 11).unwrap(), 3);
        let grid = build_capacity_grid(&input, &axis);

        assert_eq!(grid.len(), 2);
        assert!(grid.iter().all(|row| row.cells.len() == 3));
        assert_eq!(grid[0].label, "Développeur");

        let e1 = grid
            .iter()
            .find(|r| r.equipe_id == Some(EquipeId::new("e1")))
            .unwrap();
        assert_eq!(e1.cells[0].available, Some(1.5));
        assert_eq!(e1.cells[1].charged, 1.0);
        assert_eq!(e1.cells[2].charged, 0.0);
    }
}
