use serde::{Deserialize, Serialize};
use std::fmt;

/// Declares a backend row identifier.
///
/// Supabase generates UUIDs for every table; the ids stay opaque strings so
/// the domain never parses them.
macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

row_id!(
    /// A company, the root of the organisation tree.
    SocieteId
);
row_id!(DepartementId);
row_id!(ServiceId);
row_id!(
    /// A team. Charges and capacities are always booked against a team.
    EquipeId
);
row_id!(RoleId);
row_id!(PersonneId);
row_id!(AttachmentId);
row_id!(ProjetId);
row_id!(
    /// A per project/team estimate row, which also links the team to the project.
    ChiffreId
);
row_id!(ChargeId);
row_id!(CapaciteId);
row_id!(JalonId);
row_id!(SettingId);
