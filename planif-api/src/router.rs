use axum::{
    http::{header, Method},
    middleware,
    response::Redirect,
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::{app_state::AppState, auth, routes};

pub fn create(app_state: AppState, disable_auth: bool) -> Router<()> {
    let base_app = Router::new()
        .route("/", get(|| async { Redirect::to("/planification") }))
        .nest("/planification", routes::planification::router())
        .nest("/organisation", routes::organisation::router())
        .nest("/ressources", routes::ressources::router())
        .nest("/capacite", routes::capacite::router())
        .nest("/projets", routes::projets::router())
        .nest("/plan-globale", routes::plan_globale::router())
        .nest("/jalons", routes::jalons::router())
        .nest("/settings", routes::settings::router())
        .nest("/dashboard", routes::dashboard::router())
        .merge(auth::account_router());

    // Everything above needs a session unless authentication is disabled
    let app = if disable_auth {
        tracing::warn!("authentication is disabled");
        base_app
    } else {
        base_app.route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth::require_user,
        ))
    };

    let app_url = app_state.app_url.clone();
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
        .allow_origin(AllowOrigin::predicate(move |origin, _| {
            origin.to_str().unwrap_or_default() == app_url.trim_end_matches('/')
        }));

    app.merge(auth::router())
        .fallback(|| async { Redirect::to("/login") })
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
}
