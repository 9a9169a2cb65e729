use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use tracing::instrument;

use super::ApiError;
use crate::{adapters::inbound::http::SettingResponse, app_state::AppState, domain::models::SettingValue};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_settings))
        .route("/:key", put(put_setting).get(get_setting))
}

#[instrument(name = "GET /settings", skip(app_state))]
async fn get_settings(State(app_state): State<AppState>) -> Result<Json<Vec<SettingResponse>>, ApiError> {
    let settings = app_state.settings.list().await?;
    Ok(Json(settings.into_iter().map(SettingResponse::from).collect()))
}

#[instrument(name = "GET /settings/:key", skip(app_state))]
async fn get_setting(
    State(app_state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<SettingResponse>, ApiError> {
    app_state
        .settings
        .get(&key)
        .await?
        .map(|setting| Json(setting.into()))
        .ok_or_else(|| ApiError::not_found(format!("setting not found: {}", key)))
}

#[instrument(name = "PUT /settings/:key", skip(app_state))]
async fn put_setting(
    State(app_state): State<AppState>,
    Path(key): Path<String>,
    Json(value): Json<SettingValue>,
) -> Result<Json<SettingResponse>, ApiError> {
    Ok(Json(app_state.settings.set(&key, &value).await?.into()))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::{
        adapters::outbound::mock::MockRowStore,
        routes::test_support::{app, body_json, get, json_request},
    };

    #[tokio::test]
    async fn put_then_get_returns_the_value() {
        let store = MockRowStore::new();
        let app = app(router(), &store);

        let body = json!({ "value": "16", "type": "number" });
        let response = app
            .clone()
            .oneshot(json_request("PUT", "/semaines_affichees", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let setting = body_json(app.clone().oneshot(get("/semaines_affichees")).await.unwrap()).await;
        assert_eq!(setting["value"], "16");
        assert_eq!(setting["typed"], 16.0);

        let missing = app.oneshot(get("/inconnu")).await.unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }
}
