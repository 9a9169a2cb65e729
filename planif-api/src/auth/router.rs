use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use crate::{
    app_state::AppState,
    domain::{
        ForgotPasswordForm, PasswordUpdateForm, SignInForm, SignUpForm, SignUpOutcome, User, MIN_PASSWORD_LENGTH,
    },
    routes::ApiError,
};

use super::{access_token, clear_session, store_session, CurrentUser};

const DEFAULT_LANDING: &str = "/planification";

/// Routes reachable without a session.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(self::get::login).post(self::post::login))
        .route("/signup", get(self::get::signup).post(self::post::signup))
        .route(
            "/forgot-password",
            get(self::get::forgot_password).post(self::post::forgot_password),
        )
        .route("/logout", get(self::post::logout).post(self::post::logout))
}

/// Account routes; mounted behind the session guard.
pub fn account_router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(self::get::profile))
        .route("/update-password", post(self::post::update_password))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReturnUrl {
    return_url: Option<String>,
}

impl ReturnUrl {
    /// Only same-origin paths are followed after sign-in.
    fn target(&self) -> String {
        match self.return_url.as_deref() {
            Some(url) if url.starts_with('/') && !url.starts_with("//") => url.to_string(),
            _ => DEFAULT_LANDING.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthPage {
    page: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    return_url: Option<String>,
    min_password_length: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignedIn {
    user: User,
    redirect_to: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignedUp {
    user: User,
    confirmation_required: bool,
}

mod get {
    use super::*;

    pub async fn login(Query(next): Query<ReturnUrl>) -> Json<AuthPage> {
        Json(AuthPage {
            page: "login",
            return_url: Some(next.target()),
            min_password_length: MIN_PASSWORD_LENGTH,
        })
    }

    pub async fn signup() -> Json<AuthPage> {
        Json(AuthPage {
            page: "signup",
            return_url: None,
            min_password_length: MIN_PASSWORD_LENGTH,
        })
    }

    pub async fn forgot_password() -> Json<AuthPage> {
        Json(AuthPage {
            page: "forgot-password",
            return_url: None,
            min_password_length: MIN_PASSWORD_LENGTH,
        })
    }

    pub async fn profile(CurrentUser(user): CurrentUser) -> Json<User> {
        Json(user)
    }
}

mod post {
    use tracing::instrument;

    use super::*;

    #[instrument(name = "login", skip(app_state, jar, form), fields(email = %form.email))]
    pub async fn login(
        State(app_state): State<AppState>,
        jar: CookieJar,
        Query(next): Query<ReturnUrl>,
        Json(form): Json<SignInForm>,
    ) -> Result<impl IntoResponse, ApiError> {
        let email = form.validate()?;
        let session = app_state.auth.sign_in_with_email(&email, &form.password).await?;
        tracing::info!("signed in {}", session.user.id);

        let jar = store_session(jar, &session, app_state.secure_cookies);
        Ok((
            jar,
            Json(SignedIn {
                user: session.user,
                redirect_to: next.target(),
            }),
        ))
    }

    #[instrument(name = "signup", skip(app_state, jar, form), fields(email = %form.email))]
    pub async fn signup(
        State(app_state): State<AppState>,
        jar: CookieJar,
        Json(form): Json<SignUpForm>,
    ) -> Result<impl IntoResponse, ApiError> {
        let email = form.validate()?;
        let response = match app_state.auth.sign_up_with_email(&email, &form.password).await? {
            SignUpOutcome::SignedIn(session) => {
                let jar = store_session(jar, &session, app_state.secure_cookies);
                let body = SignedUp {
                    user: session.user,
                    confirmation_required: false,
                };
                (StatusCode::CREATED, jar, Json(body)).into_response()
            }
            SignUpOutcome::ConfirmationPending(user) => {
                let body = SignedUp {
                    user,
                    confirmation_required: true,
                };
                (StatusCode::ACCEPTED, Json(body)).into_response()
            }
        };
        Ok(response)
    }

    #[instrument(name = "forgot_password", skip(app_state, form))]
    pub async fn forgot_password(
        State(app_state): State<AppState>,
        Json(form): Json<ForgotPasswordForm>,
    ) -> Result<StatusCode, ApiError> {
        let email = form.validate()?;
        let redirect_to = format!("{}/update-password", app_state.app_url.trim_end_matches('/'));
        app_state
            .auth
            .reset_password_for_email(&email, Some(&redirect_to))
            .await?;
        Ok(StatusCode::ACCEPTED)
    }

    #[instrument(name = "update_password", skip_all, fields(user = %user.id))]
    pub async fn update_password(
        State(app_state): State<AppState>,
        user: CurrentUser,
        jar: CookieJar,
        Json(form): Json<PasswordUpdateForm>,
    ) -> Result<Json<User>, ApiError> {
        form.validate()?;
        let token = access_token(&jar).ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;
        let user = app_state.auth.update_password(&token, &form.password).await?;
        Ok(Json(user))
    }

    pub async fn logout(State(app_state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
        if let Some(token) = access_token(&jar) {
            if let Err(e) = app_state.auth.sign_out(&token).await {
                tracing::warn!("Failed to sign out: {}", e);
            }
        }
        (clear_session(jar), Redirect::to("/login"))
    }
}
