use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, put},
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use super::ApiError;
use crate::{
    app_state::AppState,
    domain::models::{
        Attachment, AttachmentId, EquipeId, NewPersonne, NewRole, Personne, PersonneId, ResourceRef, Role, RoleId,
    },
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/roles", get(get_roles).post(create_role))
        .route("/roles/:id", put(update_role).delete(delete_role))
        .route("/personnes", get(get_personnes).post(create_personne))
        .route("/personnes/:id", put(update_personne).delete(delete_personne))
        .route("/personnes/:id/equipe", put(assign_home_team))
        .route("/attachments", get(get_attachments))
        .route("/attachments/:id", delete(detach))
        .route("/equipes/:id/attachments", get(get_team_attachments).post(attach))
}

#[instrument(name = "GET /ressources/roles", skip(app_state))]
async fn get_roles(State(app_state): State<AppState>) -> Result<Json<Vec<Role>>, ApiError> {
    Ok(Json(app_state.resources.list_roles().await?))
}

#[instrument(name = "POST /ressources/roles", skip(app_state))]
async fn create_role(
    State(app_state): State<AppState>,
    Json(role): Json<NewRole>,
) -> Result<(StatusCode, Json<Role>), ApiError> {
    let created = app_state.resources.create_role(&role).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[instrument(name = "PUT /ressources/roles/:id", skip(app_state))]
async fn update_role(
    State(app_state): State<AppState>,
    Path(id): Path<RoleId>,
    Json(role): Json<NewRole>,
) -> Result<Json<Role>, ApiError> {
    Ok(Json(app_state.resources.update_role(&id, &role).await?))
}

#[instrument(name = "DELETE /ressources/roles/:id", skip(app_state))]
async fn delete_role(State(app_state): State<AppState>, Path(id): Path<RoleId>) -> Result<StatusCode, ApiError> {
    app_state.resources.delete_role(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(name = "GET /ressources/personnes", skip(app_state))]
async fn get_personnes(State(app_state): State<AppState>) -> Result<Json<Vec<Personne>>, ApiError> {
    Ok(Json(app_state.resources.list_personnes().await?))
}

#[instrument(name = "POST /ressources/personnes", skip(app_state))]
async fn create_personne(
    State(app_state): State<AppState>,
    Json(personne): Json<NewPersonne>,
) -> Result<(StatusCode, Json<Personne>), ApiError> {
    let created = app_state.resources.create_personne(&personne).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[instrument(name = "PUT /ressources/personnes/:id", skip(app_state))]
async fn update_personne(
    State(app_state): State<AppState>,
    Path(id): Path<PersonneId>,
    Json(personne): Json<NewPersonne>,
) -> Result<Json<Personne>, ApiError> {
    Ok(Json(app_state.resources.update_personne(&id, &personne).await?))
}

#[instrument(name = "DELETE /ressources/personnes/:id", skip(app_state))]
async fn delete_personne(State(app_state): State<AppState>, Path(id): Path<PersonneId>) -> Result<StatusCode, ApiError> {
    app_state.resources.delete_personne(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HomeTeamBody {
    equipe_id: Option<EquipeId>,
}

#[instrument(name = "PUT /ressources/personnes/:id/equipe", skip(app_state))]
async fn assign_home_team(
    State(app_state): State<AppState>,
    Path(id): Path<PersonneId>,
    Json(body): Json<HomeTeamBody>,
) -> Result<Json<Personne>, ApiError> {
    let personne = app_state
        .resources
        .assign_home_team(&id, body.equipe_id.as_ref())
        .await?;
    Ok(Json(personne))
}

#[instrument(name = "GET /ressources/attachments", skip(app_state))]
async fn get_attachments(State(app_state): State<AppState>) -> Result<Json<Vec<Attachment>>, ApiError> {
    Ok(Json(app_state.resources.list_attachments().await?))
}

#[instrument(name = "GET /ressources/equipes/:id/attachments", skip(app_state))]
async fn get_team_attachments(
    State(app_state): State<AppState>,
    Path(equipe_id): Path<EquipeId>,
) -> Result<Json<Vec<Attachment>>, ApiError> {
    Ok(Json(app_state.resources.attachments_for_team(&equipe_id).await?))
}

#[instrument(name = "POST /ressources/equipes/:id/attachments", skip(app_state))]
async fn attach(
    State(app_state): State<AppState>,
    Path(equipe_id): Path<EquipeId>,
    Json(resource): Json<ResourceRef>,
) -> Result<(StatusCode, Json<Attachment>), ApiError> {
    let attachment = app_state.resources.attach(&equipe_id, &resource).await?;
    Ok((StatusCode::CREATED, Json(attachment)))
}

#[instrument(name = "DELETE /ressources/attachments/:id", skip(app_state))]
async fn detach(State(app_state): State<AppState>, Path(id): Path<AttachmentId>) -> Result<StatusCode, ApiError> {
    app_state.resources.detach(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
