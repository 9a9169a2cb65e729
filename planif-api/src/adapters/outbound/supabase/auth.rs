use async_trait::async_trait;
use supabase::{AuthUser, Session, SignUp, SupabaseClient, SupabaseError};

use crate::domain::{
    ports::outbound::AuthProvider, AuthError, AuthSession, Email, SignUpOutcome, User,
};

/// Adapter that wraps the Supabase auth endpoints to implement the AuthProvider port.
#[derive(Clone)]
pub struct SupabaseAuthProvider {
    client: SupabaseClient,
}

impl SupabaseAuthProvider {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuthProvider {
    async fn sign_in_with_email(&self, email: &Email, password: &str) -> Result<AuthSession, AuthError> {
        self.client
            .auth()
            .sign_in_with_email(email.as_str(), password)
            .await
            .map(to_domain_session)
            .map_err(|e| match e {
                SupabaseError::Unauthorized(_) | SupabaseError::Api { status: 400, .. } => {
                    AuthError::InvalidCredentials
                }
                other => map_auth_error(other),
            })
    }

    async fn sign_up_with_email(&self, email: &Email, password: &str) -> Result<SignUpOutcome, AuthError> {
        let outcome = self
            .client
            .auth()
            .sign_up_with_email(email.as_str(), password)
            .await
            .map_err(map_auth_error)?;

        Ok(match outcome {
            SignUp::Session(session) => SignUpOutcome::SignedIn(to_domain_session(session)),
            SignUp::ConfirmationSent(user) => SignUpOutcome::ConfirmationPending(to_domain_user(user)),
        })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        self.client
            .auth()
            .sign_out(access_token)
            .await
            .map_err(map_auth_error)
    }

    async fn reset_password_for_email(&self, email: &Email, redirect_to: Option<&str>) -> Result<(), AuthError> {
        self.client
            .auth()
            .reset_password_for_email(email.as_str(), redirect_to)
            .await
            .map_err(map_auth_error)
    }

    async fn update_password(&self, access_token: &str, password: &str) -> Result<User, AuthError> {
        self.client
            .auth()
            .update_password(access_token, password)
            .await
            .map(to_domain_user)
            .map_err(map_auth_error)
    }

    async fn get_user(&self, access_token: &str) -> Result<User, AuthError> {
        self.client
            .auth()
            .get_user(access_token)
            .await
            .map(to_domain_user)
            .map_err(map_auth_error)
    }

    async fn get_session(&self, refresh_token: &str) -> Result<AuthSession, AuthError> {
        self.client
            .auth()
            .refresh_session(refresh_token)
            .await
            .map(to_domain_session)
            .map_err(map_auth_error)
    }
}

fn to_domain_user(user: AuthUser) -> User {
    User {
        id: user.id,
        email: user.email,
        last_sign_in_at: user.last_sign_in_at,
    }
}

fn to_domain_session(session: Session) -> AuthSession {
    AuthSession {
        access_token: session.access_token,
        refresh_token: session.refresh_token,
        expires_in: session.expires_in,
        user: to_domain_user(session.user),
    }
}

fn map_auth_error(e: SupabaseError) -> AuthError {
    match e {
        SupabaseError::Unauthorized(_) => AuthError::NotAuthenticated,
        other => AuthError::Provider(other.message()),
    }
}
