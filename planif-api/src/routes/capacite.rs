use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use super::{planification, ApiError, WeekWindowQuery};
use crate::{
    adapters::inbound::http::{headers, CapacityGridResponse},
    app_state::AppState,
    domain::{
        models::{Capacite, CapaciteId, CapacityScope, ResourceRef},
        week::WeekKey,
    },
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_grid).put(upsert_capacity))
        .route("/bulk", post(planification::apply_bulk))
        .route("/:id", delete(delete_capacity))
}

#[instrument(name = "GET /capacite", skip(app_state))]
async fn get_grid(
    State(app_state): State<AppState>,
    Query(window): Query<WeekWindowQuery>,
) -> Result<Json<CapacityGridResponse>, ApiError> {
    let axis = window.axis(app_state.default_weeks);
    let rows = app_state.planning.capacity_grid(&axis).await?;
    Ok(Json(CapacityGridResponse {
        weeks: headers(&axis),
        rows,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CapacityCell {
    resource: ResourceRef,
    #[serde(default)]
    scope: CapacityScope,
    week: WeekKey,
    value: f64,
}

#[instrument(name = "PUT /capacite", skip(app_state))]
async fn upsert_capacity(
    State(app_state): State<AppState>,
    Json(body): Json<CapacityCell>,
) -> Result<Json<Capacite>, ApiError> {
    let capacite = app_state
        .capacities
        .upsert_week(&body.resource, &body.scope, body.week, body.value)
        .await?;
    Ok(Json(capacite))
}

#[instrument(name = "DELETE /capacite/:id", skip(app_state))]
async fn delete_capacity(State(app_state): State<AppState>, Path(id): Path<CapaciteId>) -> Result<StatusCode, ApiError> {
    app_state.capacities.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::{
        adapters::outbound::mock::MockRowStore,
        domain::ports::outbound::Table,
        routes::test_support::{app, body_json, get, json_request},
    };

    fn row() -> serde_json::Value {
        json!({
            "kind": "capacity",
            "resource": { "type": "personne", "id": "pe-1" },
            "scope": { "equipe_id": "e1" }
        })
    }

    #[tokio::test]
    async fn bulk_then_single_edit_keeps_one_row_per_week() {
        let store = MockRowStore::new()
            .with_rows(Table::Equipes, vec![json!({ "id": "e1", "nom": "Back" })])
            .with_rows(
                Table::Personnes,
                vec![json!({ "id": "pe-1", "prenom": "Alice", "nom": "Martin", "equipe_id": "e1" })],
            );
        let app = app(router(), &store);

        let bulk = json!({
            "events": [
                { "type": "pointer_down", "row": row(), "week_index": 0 },
                { "type": "pointer_move", "row": row(), "week_index": 3 },
                { "type": "pointer_up" }
            ],
            "from": "2024-03-11",
            "weeks": 4,
            "value": 2.5
        });
        let response = app.clone().oneshot(json_request("POST", "/bulk", bulk)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let cell = json!({
            "resource": { "type": "personne", "id": "pe-1" },
            "scope": { "equipe_id": "e1" },
            "week": "2024-03-20",
            "value": 4
        });
        let response = app.clone().oneshot(json_request("PUT", "/", cell)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(store.rows(Table::Capacites).len(), 4);

        let grid = body_json(app.oneshot(get("/?from=2024-03-11&weeks=4")).await.unwrap()).await;
        let cells = &grid["rows"][0]["cells"];
        assert_eq!(grid["rows"][0]["label"], "Alice Martin");
        assert_eq!(cells[0]["capacity"], 2.5);
        assert_eq!(cells[1]["capacity"], 4.0);
        assert_eq!(cells[1]["available"], 4.0);
    }
}
