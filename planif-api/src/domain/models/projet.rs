use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::{ChiffreId, EquipeId, ProjetId, RowMeta};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumString, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProjetStatut {
    EnCours,
    #[default]
    Planifie,
    Termine,
    EnPause,
    Actif,
}

/// The four editable estimate figures, in day-units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Estimates {
    #[serde(rename = "chiffrage_initial", default)]
    pub initial: f64,
    #[serde(rename = "chiffrage_revise", default)]
    pub revise: f64,
    #[serde(rename = "chiffrage_previsionnel", default)]
    pub previsionnel: f64,
    #[serde(rename = "temps_consomme", default)]
    pub consomme: f64,
}

/// Names one of the [`Estimates`] figures so updates cannot target an arbitrary column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EstimateField {
    Initial,
    Revise,
    Previsionnel,
    Consomme,
}

impl EstimateField {
    pub fn column(&self) -> &'static str {
        match self {
            Self::Initial => "chiffrage_initial",
            Self::Revise => "chiffrage_revise",
            Self::Previsionnel => "chiffrage_previsionnel",
            Self::Consomme => "temps_consomme",
        }
    }
}

impl Estimates {
    pub fn get(&self, field: EstimateField) -> f64 {
        match field {
            EstimateField::Initial => self.initial,
            EstimateField::Revise => self.revise,
            EstimateField::Previsionnel => self.previsionnel,
            EstimateField::Consomme => self.consomme,
        }
    }

    /// Remaining to do ("reste à faire"). Negative when consumed exceeds forecast.
    pub fn raf(&self) -> f64 {
        self.previsionnel - self.consomme
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projet {
    pub id: ProjetId,
    #[serde(default)]
    pub code: String,
    pub nom: String,
    #[serde(default)]
    pub chef_projet: Option<String>,
    #[serde(default)]
    pub statut: ProjetStatut,
    #[serde(flatten)]
    pub estimates: Estimates,
    #[serde(flatten)]
    pub meta: RowMeta,
}

impl Projet {
    pub fn label(&self) -> String {
        if self.code.trim().is_empty() {
            self.nom.clone()
        } else {
            format!("{} - {}", self.code, self.nom)
        }
    }

    pub fn calculate_raf(&self) -> f64 {
        self.estimates.raf()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProjet {
    #[serde(default)]
    pub code: String,
    pub nom: String,
    #[serde(default)]
    pub chef_projet: Option<String>,
    #[serde(default)]
    pub statut: ProjetStatut,
    #[serde(flatten)]
    pub estimates: Estimates,
}

/// Estimates of one team's share of a project.
///
/// The row's existence is what links the team to the project, so a team can be
/// scheduled on a project before any charge exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chiffre {
    pub id: ChiffreId,
    pub projet_id: ProjetId,
    pub equipe_id: EquipeId,
    #[serde(flatten)]
    pub estimates: Estimates,
    #[serde(flatten)]
    pub meta: RowMeta,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use strum::IntoEnumIterator;

    fn projet(previsionnel: f64, consomme: f64) -> Projet {
        Projet {
            id: ProjetId::new("p-1"),
            code: "PRJ-01".to_string(),
            nom: "Refonte".to_string(),
            chef_projet: None,
            statut: ProjetStatut::EnCours,
            estimates: Estimates {
                initial: 10.0,
                revise: 12.0,
                previsionnel,
                consomme,
            },
            meta: RowMeta::default(),
        }
    }

    #[test]
    fn raf_is_forecast_minus_consumed() {
        assert_eq!(projet(20.0, 7.5).calculate_raf(), 12.5);
    }

    #[test]
    fn raf_goes_negative_on_overrun() {
        assert_eq!(projet(5.0, 8.0).calculate_raf(), -3.0);
    }

    #[test]
    fn each_field_reads_its_own_column() {
        let estimates = projet(30.0, 4.0).estimates;
        let read: Vec<f64> = EstimateField::iter().map(|f| estimates.get(f)).collect();
        assert_eq!(read, [10.0, 12.0, 30.0, 4.0]);

        let row = serde_json::to_value(estimates).unwrap();
        for field in EstimateField::iter() {
            assert_eq!(row[field.column()], estimates.get(field), "{field}");
        }
    }

    #[test]
    fn row_deserializes_with_flattened_estimates() {
        let row = json!({
            "id": "p-1",
            "code": "PRJ-01",
            "nom": "Refonte",
            "statut": "en_cours",
            "chiffrage_initial": 10,
            "chiffrage_previsionnel": 14.5,
            "temps_consomme": 4,
            "created_at": "2024-01-15T10:30:00.123456+00:00"
        });
        let parsed: Projet = serde_json::from_value(row).unwrap();

        assert_eq!(parsed.statut, ProjetStatut::EnCours);
        assert_eq!(parsed.estimates.revise, 0.0);
        assert_eq!(parsed.calculate_raf(), 10.5);
        assert!(parsed.meta.created_at.is_some());
        assert_eq!(parsed.label(), "PRJ-01 - Refonte");
    }

    #[test]
    fn field_names_map_to_columns() {
        assert_eq!(
            "previsionnel".parse::<EstimateField>().unwrap().column(),
            "chiffrage_previsionnel"
        );
        assert!("budget".parse::<EstimateField>().is_err());
    }
}
