use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::{RowMeta, SettingId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SettingType {
    #[default]
    String,
    Number,
    Boolean,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    pub id: SettingId,
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(rename = "type", default)]
    pub kind: SettingType,
    #[serde(default = "default_scope")]
    pub scope: String,
    #[serde(flatten)]
    pub meta: RowMeta,
}

fn default_scope() -> String {
    "global".to_string()
}

impl Setting {
    pub fn as_f64(&self) -> Option<f64> {
        self.value.trim().parse().ok()
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.value.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.value).ok()
    }

    /// The stored text read as its declared type. `None` when it does not parse.
    pub fn typed_value(&self) -> Option<serde_json::Value> {
        match self.kind {
            SettingType::String => Some(serde_json::Value::String(self.value.clone())),
            SettingType::Number => self.as_f64().map(serde_json::Value::from),
            SettingType::Boolean => self.as_bool().map(serde_json::Value::Bool),
            SettingType::Json => self.as_json(),
        }
    }
}

/// A value to store under a key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingValue {
    pub value: String,
    #[serde(rename = "type", default)]
    pub kind: SettingType,
    #[serde(default = "default_scope")]
    pub scope: String,
}

impl SettingValue {
    /// Checks that `value` actually parses as the declared type.
    pub fn is_consistent(&self) -> bool {
        match self.kind {
            SettingType::String => true,
            SettingType::Number => self.value.trim().parse::<f64>().is_ok(),
            SettingType::Boolean => matches!(self.value.trim(), "true" | "false"),
            SettingType::Json => serde_json::from_str::<serde_json::Value>(&self.value).is_ok(),
        }
    }
}
