use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Bookkeeping columns carried by every table.
///
/// `created_at` is filled in by the backend; `updated_at` is stamped by the
/// caller on each update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowMeta {
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<OffsetDateTime>,
}
