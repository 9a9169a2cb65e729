use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::{ApiError, WeekWindowQuery};
use crate::{app_state::AppState, domain::services::Dashboard};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_dashboard))
}

#[instrument(name = "GET /dashboard", skip(app_state))]
async fn get_dashboard(
    State(app_state): State<AppState>,
    Query(window): Query<WeekWindowQuery>,
) -> Result<Json<Dashboard>, ApiError> {
    let axis = window.axis(app_state.default_weeks);
    Ok(Json(app_state.planning.dashboard(&axis).await?))
}
