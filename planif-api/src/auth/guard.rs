use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use url::form_urlencoded;

use super::{access_token, clear_session, refresh_token, store_session};
use crate::{app_state::AppState, domain::AuthError};

/// `/login?returnUrl=<path>` for a request that needs a session.
pub fn login_redirect(path: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(path.as_bytes()).collect();
    format!("/login?returnUrl={}", encoded)
}

/// Lets a request through only with a valid session.
///
/// An expired access token is renewed from the refresh cookie and the new
/// tokens are written back on the response. Anything else is sent to the
/// login page with the requested path as `returnUrl`.
pub async fn require_user(State(app_state): State<AppState>, jar: CookieJar, mut request: Request, next: Next) -> Response {
    let path = request
        .uri()
        .path_and_query()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    if let Some(token) = access_token(&jar) {
        match app_state.auth.get_user(&token).await {
            Ok(user) => {
                request.extensions_mut().insert(user);
                return next.run(request).await;
            }
            Err(AuthError::NotAuthenticated) => {}
            Err(e) => tracing::warn!("Failed to check access token: {}", e),
        }
    }

    if let Some(token) = refresh_token(&jar) {
        match app_state.auth.get_session(&token).await {
            Ok(session) => {
                tracing::debug!("refreshed session for {}", session.user.id);
                request.extensions_mut().insert(session.user.clone());
                let jar = store_session(jar, &session, app_state.secure_cookies);
                let response = next.run(request).await;
                return (jar, response).into_response();
            }
            Err(e) => tracing::debug!("session refresh failed: {}", e),
        }
    }

    (clear_session(jar), Redirect::to(&login_redirect(&path))).into_response()
}
