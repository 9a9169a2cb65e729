use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::{ApiError, WeekWindowQuery};
use crate::{adapters::inbound::http::GlobalPlanResponse, app_state::AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_plan))
}

#[instrument(name = "GET /plan-globale", skip(app_state))]
async fn get_plan(
    State(app_state): State<AppState>,
    Query(window): Query<WeekWindowQuery>,
) -> Result<Json<GlobalPlanResponse>, ApiError> {
    let axis = window.axis(app_state.default_weeks);
    Ok(Json(app_state.planning.global_plan(&axis).await?.into()))
}
