use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{window, ApiError};
use crate::{
    adapters::inbound::http::PlanningGridResponse,
    app_state::AppState,
    domain::{
        models::{Charge, ChargeId, EquipeId, ProjetId, ResourceRef},
        planning::{toolbar_position, DragSelection, GridLayout, SelectionEvent, SelectionPhase, ToolbarPosition, ViewMode},
        services::{BulkReport, BulkRow},
        week::WeekKey,
    },
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_grid))
        .route("/charges", post(upsert_charge))
        .route("/charges/:id", delete(delete_charge))
        .route("/stubs", post(add_stub))
        .route("/bulk", post(apply_bulk))
        .route("/selection", post(preview_selection))
}

#[derive(Debug, Deserialize)]
struct GridQuery {
    #[serde(default)]
    view: ViewMode,
    from: Option<NaiveDate>,
    weeks: Option<usize>,
}

#[instrument(name = "GET /planification", skip(app_state))]
async fn get_grid(
    State(app_state): State<AppState>,
    Query(query): Query<GridQuery>,
) -> Result<Json<PlanningGridResponse>, ApiError> {
    let axis = window(query.from, query.weeks, app_state.default_weeks);
    let snapshot = app_state.planning.planning_grid(query.view, axis).await?;
    Ok(Json(snapshot.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChargeCell {
    projet_id: ProjetId,
    equipe_id: EquipeId,
    resource: ResourceRef,
    /// Any day of the week; snapped to its Monday.
    week: WeekKey,
    value: f64,
}

#[instrument(name = "POST /planification/charges", skip(app_state))]
async fn upsert_charge(
    State(app_state): State<AppState>,
    Json(body): Json<ChargeCell>,
) -> Result<Json<Charge>, ApiError> {
    let charge = app_state
        .charges
        .upsert_week(&body.projet_id, &body.equipe_id, &body.resource, body.week, body.value)
        .await?;
    Ok(Json(charge))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StubBody {
    projet_id: ProjetId,
    equipe_id: EquipeId,
    resource: ResourceRef,
}

#[instrument(name = "POST /planification/stubs", skip(app_state))]
async fn add_stub(
    State(app_state): State<AppState>,
    Json(body): Json<StubBody>,
) -> Result<(StatusCode, Json<Charge>), ApiError> {
    let charge = app_state
        .charges
        .add_stub(&body.projet_id, &body.equipe_id, &body.resource)
        .await?;
    Ok((StatusCode::CREATED, Json(charge)))
}

#[instrument(name = "DELETE /planification/charges/:id", skip(app_state))]
async fn delete_charge(State(app_state): State<AppState>, Path(id): Path<ChargeId>) -> Result<StatusCode, ApiError> {
    app_state.charges.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// A drag gesture recorded by the grid, replayed here to find the target cells.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BulkBody {
    pub events: Vec<SelectionEvent<BulkRow>>,
    pub from: Option<NaiveDate>,
    pub weeks: Option<usize>,
    pub value: f64,
}

#[instrument(name = "POST /planification/bulk", skip(app_state, body), fields(events = body.events.len()))]
pub(crate) async fn apply_bulk(
    State(app_state): State<AppState>,
    Json(body): Json<BulkBody>,
) -> Result<Json<BulkReport>, ApiError> {
    let axis = window(body.from, body.weeks, app_state.default_weeks);
    let selection = DragSelection::replay(body.events);
    if !selection.is_selected() {
        return Err(ApiError::bad_request("no completed selection"));
    }

    if selection.range().is_some_and(|(_, hi)| hi >= axis.len()) {
        return Err(ApiError::bad_request("selection is outside the displayed weeks"));
    }

    let targets = selection.targets(&axis);
    let report = app_state.planning.apply_bulk(&targets, body.value).await?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectionBody {
    events: Vec<SelectionEvent<BulkRow>>,
    from: Option<NaiveDate>,
    weeks: Option<usize>,
    /// Position of the dragged row in the rendered grid.
    row_index: usize,
    layout: GridLayout,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SelectionPreview {
    #[serde(flatten)]
    phase: SelectionPhase<BulkRow>,
    weeks: Vec<WeekKey>,
    toolbar: Option<ToolbarPosition>,
}

/// Where the bulk toolbar goes and which weeks a release would write.
#[instrument(name = "POST /planification/selection", skip(app_state, body), fields(events = body.events.len()))]
async fn preview_selection(
    State(app_state): State<AppState>,
    Json(body): Json<SelectionBody>,
) -> Json<SelectionPreview> {
    let axis = window(body.from, body.weeks, app_state.default_weeks);
    let selection = DragSelection::replay(body.events);
    let weeks = selection.targets(&axis).into_iter().map(|(_, week)| week).collect();
    let toolbar = toolbar_position(&selection, body.row_index, &body.layout);

    Json(SelectionPreview {
        phase: selection.phase().clone(),
        weeks,
        toolbar,
    })
}
