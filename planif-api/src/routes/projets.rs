use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::ApiError;
use crate::{
    adapters::inbound::http::ProjetResponse,
    app_state::AppState,
    domain::models::{Chiffre, ChiffreId, EquipeId, EstimateField, NewProjet, ProjetId},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_projets).post(create_projet))
        .route("/:id", get(get_projet).put(update_projet).delete(delete_projet))
        .route("/:id/estimates", patch(update_estimate))
        .route("/:id/raf", get(get_raf))
        .route("/:id/equipes", get(get_chiffres).post(link_team))
        .route("/chiffres/:id", patch(update_chiffre).delete(unlink_team))
}

#[instrument(name = "GET /projets", skip(app_state))]
async fn get_projets(State(app_state): State<AppState>) -> Result<Json<Vec<ProjetResponse>>, ApiError> {
    let projets = app_state.projects.list().await?;
    Ok(Json(projets.into_iter().map(ProjetResponse::from).collect()))
}

#[instrument(name = "GET /projets/:id", skip(app_state))]
async fn get_projet(State(app_state): State<AppState>, Path(id): Path<ProjetId>) -> Result<Json<ProjetResponse>, ApiError> {
    Ok(Json(app_state.projects.get(&id).await?.into()))
}

#[instrument(name = "POST /projets", skip(app_state))]
async fn create_projet(
    State(app_state): State<AppState>,
    Json(projet): Json<NewProjet>,
) -> Result<(StatusCode, Json<ProjetResponse>), ApiError> {
    let created = app_state.projects.create(&projet).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[instrument(name = "PUT /projets/:id", skip(app_state))]
async fn update_projet(
    State(app_state): State<AppState>,
    Path(id): Path<ProjetId>,
    Json(projet): Json<NewProjet>,
) -> Result<Json<ProjetResponse>, ApiError> {
    Ok(Json(app_state.projects.update(&id, &projet).await?.into()))
}

#[instrument(name = "DELETE /projets/:id", skip(app_state))]
async fn delete_projet(State(app_state): State<AppState>, Path(id): Path<ProjetId>) -> Result<StatusCode, ApiError> {
    app_state.projects.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct EstimateBody {
    field: EstimateField,
    value: f64,
}

#[instrument(name = "PATCH /projets/:id/estimates", skip(app_state))]
async fn update_estimate(
    State(app_state): State<AppState>,
    Path(id): Path<ProjetId>,
    Json(body): Json<EstimateBody>,
) -> Result<Json<ProjetResponse>, ApiError> {
    let projet = app_state
        .projects
        .update_estimate(&id, body.field, body.value)
        .await?;
    Ok(Json(projet.into()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RafResponse {
    projet_id: ProjetId,
    raf: f64,
}

#[instrument(name = "GET /projets/:id/raf", skip(app_state))]
async fn get_raf(State(app_state): State<AppState>, Path(id): Path<ProjetId>) -> Result<Json<RafResponse>, ApiError> {
    let raf = app_state.projects.raf(&id).await?;
    Ok(Json(RafResponse { projet_id: id, raf }))
}

#[instrument(name = "GET /projets/:id/equipes", skip(app_state))]
async fn get_chiffres(State(app_state): State<AppState>, Path(id): Path<ProjetId>) -> Result<Json<Vec<Chiffre>>, ApiError> {
    Ok(Json(app_state.projects.chiffres_for_project(&id).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinkBody {
    equipe_id: EquipeId,
}

#[instrument(name = "POST /projets/:id/equipes", skip(app_state))]
async fn link_team(
    State(app_state): State<AppState>,
    Path(id): Path<ProjetId>,
    Json(body): Json<LinkBody>,
) -> Result<Json<Chiffre>, ApiError> {
    Ok(Json(app_state.projects.link_team(&id, &body.equipe_id).await?))
}

#[instrument(name = "PATCH /projets/chiffres/:id", skip(app_state))]
async fn update_chiffre(
    State(app_state): State<AppState>,
    Path(id): Path<ChiffreId>,
    Json(body): Json<EstimateBody>,
) -> Result<Json<Chiffre>, ApiError> {
    Ok(Json(app_state.projects.update_chiffre(&id, body.field, body.value).await?))
}

#[instrument(name = "DELETE /projets/chiffres/:id", skip(app_state))]
async fn unlink_team(State(app_state): State<AppState>, Path(id): Path<ChiffreId>) -> Result<StatusCode, ApiError> {
    app_state.projects.unlink(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
