use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use super::ApiError;
use crate::{
    app_state::AppState,
    domain::{
        models::{Jalon, JalonId, NewJalon, ProjetId},
        week::WeekKey,
    },
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_jalons).post(create_jalon))
        .route("/:id", put(update_jalon).delete(delete_jalon))
}

#[derive(Debug, Default, Deserialize)]
struct JalonFilter {
    projet_id: Option<ProjetId>,
    /// Any day of the week to list.
    week: Option<WeekKey>,
}

#[instrument(name = "GET /jalons", skip(app_state))]
async fn get_jalons(
    State(app_state): State<AppState>,
    Query(filter): Query<JalonFilter>,
) -> Result<Json<Vec<Jalon>>, ApiError> {
    let jalons = match (&filter.projet_id, filter.week) {
        (Some(projet_id), week) => app_state
            .milestones
            .by_project(projet_id)
            .await?
            .into_iter()
            .filter(|j| week.map_or(true, |w| j.week() == w))
            .collect(),
        (None, Some(week)) => app_state.milestones.by_week(week).await?,
        (None, None) => app_state.milestones.list().await?,
    };
    Ok(Json(jalons))
}

#[instrument(name = "POST /jalons", skip(app_state))]
async fn create_jalon(
    State(app_state): State<AppState>,
    Json(jalon): Json<NewJalon>,
) -> Result<(StatusCode, Json<Jalon>), ApiError> {
    let created = app_state.milestones.create(&jalon).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[instrument(name = "PUT /jalons/:id", skip(app_state))]
async fn update_jalon(
    State(app_state): State<AppState>,
    Path(id): Path<JalonId>,
    Json(jalon): Json<NewJalon>,
) -> Result<Json<Jalon>, ApiError> {
    Ok(Json(app_state.milestones.update(&id, &jalon).await?))
}

#[instrument(name = "DELETE /jalons/:id", skip(app_state))]
async fn delete_jalon(State(app_state): State<AppState>, Path(id): Path<JalonId>) -> Result<StatusCode, ApiError> {
    app_state.milestones.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
