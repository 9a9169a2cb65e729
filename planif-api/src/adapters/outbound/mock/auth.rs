//! In-memory auth provider for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, RwLock,
};

use crate::domain::{
    ports::outbound::AuthProvider, AuthError, AuthSession, Email, SignUpOutcome, User,
};

#[derive(Clone)]
struct Account {
    user: User,
    password: String,
}

/// Accounts keyed by email; tokens are `access-{n}` / `refresh-{n}`.
#[derive(Clone, Default)]
pub struct MockAuthProvider {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
    access_tokens: Arc<RwLock<HashMap<String, String>>>,
    refresh_tokens: Arc<RwLock<HashMap<String, String>>>,
    counter: Arc<AtomicUsize>,
    /// Sign-ups wait for email confirmation instead of opening a session.
    require_confirmation: bool,
    reset_requests: Arc<RwLock<Vec<(String, Option<String>)>>>,
}

#[allow(dead_code)]
impl MockAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(self, email: &str, password: &str) -> Self {
        let user = User {
            id: format!("user-{}", email),
            email: Some(email.to_string()),
            last_sign_in_at: None,
        };
        self.accounts.write().unwrap().insert(
            email.to_string(),
            Account {
                user,
                password: password.to_string(),
            },
        );
        self
    }

    pub fn requiring_confirmation(mut self) -> Self {
        self.require_confirmation = true;
        self
    }

    /// Opens a session directly, bypassing the password check.
    pub fn session_for(&self, email: &str) -> AuthSession {
        let account = self.accounts.read().unwrap().get(email).cloned().unwrap();
        self.open_session(account.user)
    }

    /// Invalidates an access token while keeping its refresh token usable.
    pub fn expire(&self, access_token: &str) {
        self.access_tokens.write().unwrap().remove(access_token);
    }

    pub fn reset_requests(&self) -> Vec<(String, Option<String>)> {
        self.reset_requests.read().unwrap().clone()
    }

    fn open_session(&self, user: User) -> AuthSession {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let access_token = format!("access-{}", n);
        let refresh_token = format!("refresh-{}", n);
        let email = user.email.clone().unwrap_or_default();
        self.access_tokens
            .write()
            .unwrap()
            .insert(access_token.clone(), email.clone());
        self.refresh_tokens
            .write()
            .unwrap()
            .insert(refresh_token.clone(), email);
        AuthSession {
            access_token,
            refresh_token,
            expires_in: Some(3600),
            user,
        }
    }

    fn account_for_token(&self, access_token: &str) -> Result<Account, AuthError> {
        let email = self
            .access_tokens
            .read()
            .unwrap()
            .get(access_token)
            .cloned()
            .ok_or(AuthError::NotAuthenticated)?;
        self.accounts
            .read()
            .unwrap()
            .get(&email)
            .cloned()
            .ok_or(AuthError::NotAuthenticated)
    }
}

#[async_trait]
impl AuthProvider for MockAuthProvider {
    async fn sign_in_with_email(&self, email: &Email, password: &str) -> Result<AuthSession, AuthError> {
        let account = self.accounts.read().unwrap().get(email.as_str()).cloned();
        match account {
            Some(account) if account.password == password => Ok(self.open_session(account.user)),
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    async fn sign_up_with_email(&self, email: &Email, password: &str) -> Result<SignUpOutcome, AuthError> {
        if self.accounts.read().unwrap().contains_key(email.as_str()) {
            return Err(AuthError::Provider("User already registered".to_string()));
        }
        let user = User {
            id: format!("user-{}", email),
            email: Some(email.to_string()),
            last_sign_in_at: None,
        };
        self.accounts.write().unwrap().insert(
            email.to_string(),
            Account {
                user: user.clone(),
                password: password.to_string(),
            },
        );

        if self.require_confirmation {
            Ok(SignUpOutcome::ConfirmationPending(user))
        } else {
            Ok(SignUpOutcome::SignedIn(self.open_session(user)))
        }
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        self.access_tokens.write().unwrap().remove(access_token);
        Ok(())
    }

    async fn reset_password_for_email(&self, email: &Email, redirect_to: Option<&str>) -> Result<(), AuthError> {
        self.reset_requests
            .write()
            .unwrap()
            .push((email.to_string(), redirect_to.map(str::to_string)));
        Ok(())
    }

    async fn update_password(&self, access_token: &str, password: &str) -> Result<User, AuthError> {
        let account = self.account_for_token(access_token)?;
        let email = account.user.email.clone().unwrap_or_default();
        if let Some(stored) = self.accounts.write().unwrap().get_mut(&email) {
            stored.password = password.to_string();
        }
        Ok(account.user)
    }

    async fn get_user(&self, access_token: &str) -> Result<User, AuthError> {
        self.account_for_token(access_token).map(|a| a.user)
    }

    async fn get_session(&self, refresh_token: &str) -> Result<AuthSession, AuthError> {
        let email = self
            .refresh_tokens
            .write()
            .unwrap()
            .remove(refresh_token)
            .ok_or(AuthError::NotAuthenticated)?;
        let account = self
            .accounts
            .read()
            .unwrap()
            .get(&email)
            .cloned()
            .ok_or(AuthError::NotAuthenticated)?;
        Ok(self.open_session(account.user))
    }
}
