use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::{JalonId, ProjetId, RowMeta};
use crate::domain::week::{week_key, WeekKey};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JalonType {
    #[serde(alias = "delivery")]
    Livraison,
    Release,
    Sprint,
    #[default]
    #[serde(alias = "other")]
    Autre,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Jalon {
    pub id: JalonId,
    pub nom: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub projet_id: Option<ProjetId>,
    #[serde(rename = "type", default)]
    pub type_jalon: JalonType,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub meta: RowMeta,
}

impl Jalon {
    pub fn week(&self) -> WeekKey {
        week_key(self.date)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewJalon {
    pub nom: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub projet_id: Option<ProjetId>,
    #[serde(rename = "type", default)]
    pub type_jalon: JalonType,
    #[serde(default)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_type_tags_are_accepted() {
        let row = serde_json::json!({
            "id": "j-1",
            "nom": "Mise en production",
            "date": "2024-06-13",
            "type": "delivery"
        });
        let jalon: Jalon = serde_json::from_value(row).unwrap();

        assert_eq!(jalon.type_jalon, JalonType::Livraison);
        assert_eq!(jalon.week().to_string(), "2024-06-10");
    }
}
