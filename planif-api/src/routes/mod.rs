pub(crate) mod capacite;
pub(crate) mod dashboard;
pub(crate) mod error;
pub(crate) mod jalons;
pub(crate) mod organisation;
pub(crate) mod plan_globale;
pub(crate) mod planification;
pub(crate) mod projets;
pub(crate) mod ressources;
pub(crate) mod settings;

pub(crate) use error::ApiError;

use chrono::{Local, NaiveDate};
use serde::Deserialize;

use crate::domain::week::{week_axis, WeekKey};

const MAX_WEEKS: usize = 104;

/// `?from=YYYY-MM-DD&weeks=N`, shared by every week-based view.
#[derive(Debug, Default, Deserialize)]
pub struct WeekWindowQuery {
    pub from: Option<NaiveDate>,
    pub weeks: Option<usize>,
}

impl WeekWindowQuery {
    /// Weeks starting with the one containing `from` (today by default).
    pub fn axis(&self, default_weeks: usize) -> Vec<WeekKey> {
        window(self.from, self.weeks, default_weeks)
    }
}

pub(crate) fn window(from: Option<NaiveDate>, weeks: Option<usize>, default_weeks: usize) -> Vec<WeekKey> {
    let from = from.unwrap_or_else(|| Local::now().date_naive());
    let count = weeks.unwrap_or(default_weeks).clamp(1, MAX_WEEKS);
    week_axis(from, count)
}
