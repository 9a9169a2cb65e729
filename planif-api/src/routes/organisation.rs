use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use super::ApiError;
use crate::{
    app_state::AppState,
    domain::{
        models::Equipe,
        organisation::{OrgKind, OrgNodeForm, OrgTree},
        services::OrgEntity,
    },
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_tree))
        .route("/equipes", get(get_equipes))
        .route("/nodes", post(create_node))
        .route("/nodes/:kind/:id", put(update_node).delete(delete_node))
}

#[derive(Debug, Deserialize)]
struct TreeQuery {
    #[serde(default)]
    expand: bool,
    /// Comma-separated `kind:id` nodes whose expanded flag is flipped, e.g. `service:sv1,equipe:e2`.
    open: Option<String>,
}

impl TreeQuery {
    fn toggled(&self) -> Result<Vec<(OrgKind, &str)>, ApiError> {
        let Some(open) = &self.open else {
            return Ok(Vec::new());
        };
        open.split(',')
            .filter(|entry| !entry.trim().is_empty())
            .map(|entry| {
                let (kind, id) = entry
                    .trim()
                    .split_once(':')
                    .ok_or_else(|| ApiError::bad_request(format!("expected kind:id, got '{}'", entry)))?;
                let kind = kind
                    .parse::<OrgKind>()
                    .map_err(|_| ApiError::bad_request(format!("unknown node kind '{}'", kind)))?;
                Ok((kind, id))
            })
            .collect()
    }
}

#[instrument(name = "GET /organisation", skip(app_state))]
async fn get_tree(State(app_state): State<AppState>, Query(query): Query<TreeQuery>) -> Result<Json<OrgTree>, ApiError> {
    let toggled = query.toggled()?;
    let mut tree = app_state.organisation.tree().await?;
    if query.expand {
        tree.expand_all();
    }
    for (kind, id) in toggled {
        if !tree.toggle(kind, id) {
            tracing::debug!("No {} node with id {}", kind, id);
        }
    }
    Ok(Json(tree))
}

#[instrument(name = "GET /organisation/equipes", skip(app_state))]
async fn get_equipes(State(app_state): State<AppState>) -> Result<Json<Vec<Equipe>>, ApiError> {
    Ok(Json(app_state.organisation.list_equipes().await?))
}

#[instrument(name = "POST /organisation/nodes", skip(app_state))]
async fn create_node(
    State(app_state): State<AppState>,
    Json(form): Json<OrgNodeForm>,
) -> Result<(StatusCode, Json<OrgEntity>), ApiError> {
    let created = app_state.organisation.create(&form).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[instrument(name = "PUT /organisation/nodes/:kind/:id", skip(app_state))]
async fn update_node(
    State(app_state): State<AppState>,
    Path((kind, id)): Path<(OrgKind, String)>,
    Json(form): Json<OrgNodeForm>,
) -> Result<Json<OrgEntity>, ApiError> {
    Ok(Json(app_state.organisation.update(kind, &id, &form).await?))
}

#[instrument(name = "DELETE /organisation/nodes/:kind/:id", skip(app_state))]
async fn delete_node(
    State(app_state): State<AppState>,
    Path((kind, id)): Path<(OrgKind, String)>,
) -> Result<StatusCode, ApiError> {
    app_state.organisation.delete(kind, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
