use async_trait::async_trait;

use crate::domain::{AuthError, AuthSession, Email, SignUpOutcome, User};

/// Outbound port for the hosted authentication service.
#[async_trait]
pub trait AuthProvider: Send + Sync + 'static {
    async fn sign_in_with_email(&self, email: &Email, password: &str) -> Result<AuthSession, AuthError>;

    async fn sign_up_with_email(&self, email: &Email, password: &str) -> Result<SignUpOutcome, AuthError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;

    /// Sends a reset link; `redirect_to` is where the link lands.
    async fn reset_password_for_email(&self, email: &Email, redirect_to: Option<&str>) -> Result<(), AuthError>;

    async fn update_password(&self, access_token: &str, password: &str) -> Result<User, AuthError>;

    /// The user owning `access_token`, or [`AuthError::NotAuthenticated`].
    async fn get_user(&self, access_token: &str) -> Result<User, AuthError>;

    /// A fresh session from a refresh token.
    async fn get_session(&self, refresh_token: &str) -> Result<AuthSession, AuthError>;
}
