use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{SupabaseClient, SupabaseError};

/// A user as returned by GoTrue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_sign_in_at: Option<String>,
}

/// An authenticated session.
#[derive(Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub token_type: Option<String>,
    pub user: AuthUser,
}

// Tokens stay out of logs.
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"[redacted]")
            .field("refresh_token", &"[redacted]")
            .field("expires_in", &self.expires_in)
            .field("user", &self.user)
            .finish()
    }
}

/// Result of a sign-up: projects with auto-confirm return a session directly,
/// otherwise a confirmation email is sent and only the user is returned.
#[derive(Debug, Clone)]
pub enum SignUp {
    Session(Session),
    ConfirmationSent(AuthUser),
}

pub struct AuthClient<'a> {
    client: &'a SupabaseClient,
}

impl<'a> AuthClient<'a> {
    pub(crate) fn new(client: &'a SupabaseClient) -> Self {
        Self { client }
    }

    pub async fn sign_in_with_email(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, SupabaseError> {
        let url = self
            .client
            .url()
            .auth("token")
            .with_query("grant_type", "password");
        let request = self
            .client
            .request_with_bearer(Method::POST, &url, None)
            .json(&json!({ "email": email, "password": password }));

        self.client.send_json(request).await
    }

    pub async fn sign_up_with_email(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SignUp, SupabaseError> {
        let url = self.client.url().auth("signup");
        let request = self
            .client
            .request_with_bearer(Method::POST, &url, None)
            .json(&json!({ "email": email, "password": password }));

        let body: serde_json::Value = self.client.send_json(request).await?;
        parse_sign_up(body)
    }

    pub async fn sign_out(&self, access_token: &str) -> Result<(), SupabaseError> {
        let url = self.client.url().auth("logout");
        let request = self
            .client
            .request_with_bearer(Method::POST, &url, Some(access_token));
        self.client.send(request).await?;
        Ok(())
    }

    pub async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: Option<&str>,
    ) -> Result<(), SupabaseError> {
        let mut url = self.client.url().auth("recover");
        if let Some(redirect_to) = redirect_to {
            url = url.with_query("redirect_to", redirect_to);
        }
        let request = self
            .client
            .request_with_bearer(Method::POST, &url, None)
            .json(&json!({ "email": email }));
        self.client.send(request).await?;
        Ok(())
    }

    pub async fn update_password(
        &self,
        access_token: &str,
        password: &str,
    ) -> Result<AuthUser, SupabaseError> {
        let url = self.client.url().auth("user");
        let request = self
            .client
            .request_with_bearer(Method::PUT, &url, Some(access_token))
            .json(&json!({ "password": password }));
        self.client.send_json(request).await
    }

    pub async fn get_user(&self, access_token: &str) -> Result<AuthUser, SupabaseError> {
        let url = self.client.url().auth("user");
        let request = self
            .client
            .request_with_bearer(Method::GET, &url, Some(access_token));
        self.client.send_json(request).await
    }

    /// Exchanges a refresh token for a fresh session.
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<Session, SupabaseError> {
        let url = self
            .client
            .url()
            .auth("token")
            .with_query("grant_type", "refresh_token");
        let request = self
            .client
            .request_with_bearer(Method::POST, &url, None)
            .json(&json!({ "refresh_token": refresh_token }));
        self.client.send_json(request).await
    }
}

fn parse_sign_up(body: serde_json::Value) -> Result<SignUp, SupabaseError> {
    let parse_err =
        |e: serde_json::Error| SupabaseError::ParsingError(format!("Invalid sign-up body: {}", e));

    if body.get("access_token").is_some() {
        serde_json::from_value(body).map(SignUp::Session).map_err(parse_err)
    } else if let Some(user) = body.get("user").cloned() {
        serde_json::from_value(user)
            .map(SignUp::ConfirmationSent)
            .map_err(parse_err)
    } else {
        serde_json::from_value(body)
            .map(SignUp::ConfirmationSent)
            .map_err(parse_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_up_with_autoconfirm_returns_session() {
        let body = json!({
            "access_token": "at",
            "refresh_token": "rt",
            "expires_in": 3600,
            "token_type": "bearer",
            "user": { "id": "u-1", "email": "a@b.fr" }
        });

        match parse_sign_up(body).unwrap() {
            SignUp::Session(session) => {
                assert_eq!(session.user.id, "u-1");
                assert_eq!(session.expires_in, Some(3600));
            }
            other => panic!("expected a session, got {other:?}"),
        }
    }

    #[test]
    fn sign_up_pending_confirmation_returns_user() {
        let body = json!({ "id": "u-2", "email": "c@d.fr", "confirmation_sent_at": "2024-01-01T00:00:00Z" });

        match parse_sign_up(body).unwrap() {
            SignUp::ConfirmationSent(user) => assert_eq!(user.email.as_deref(), Some("c@d.fr")),
            other => panic!("expected a user, got {other:?}"),
        }
    }

    #[test]
    fn session_debug_redacts_tokens() {
        let session = Session {
            access_token: "secret-access".to_string(),
            refresh_token: "secret-refresh".to_string(),
            expires_in: None,
            token_type: None,
            user: AuthUser {
                id: "u".to_string(),
                email: None,
                created_at: None,
                last_sign_in_at: None,
            },
        };
        let printed = format!("{:?}", session);
        assert!(!printed.contains("secret"));
    }
}
