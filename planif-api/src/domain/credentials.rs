//! Sign-in and account forms, validated before anything is sent to the auth provider.

use std::fmt;

use serde::Deserialize;

use super::AuthError;

pub const MIN_PASSWORD_LENGTH: usize = 6;

/// A syntactically valid, normalised (trimmed, lowercased) email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl TryFrom<&str> for Email {
    type Error = AuthError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalised = value.trim().to_lowercase();
        if normalised.is_empty() {
            return Err(AuthError::validation("email is required"));
        }

        let Some((local, domain)) = normalised.split_once('@') else {
            return Err(AuthError::validation(format!("'{}' is not a valid email", value)));
        };

        let domain_ok = domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && !domain.contains('@');
        if local.is_empty() || !domain_ok || normalised.contains(char::is_whitespace) {
            return Err(AuthError::validation(format!("'{}' is not a valid email", value)));
        }

        Ok(Self(normalised))
    }
}

impl Email {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

fn check_password(password: &str) -> Result<(), AuthError> {
    if password.is_empty() {
        return Err(AuthError::validation("password is required"));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

fn check_confirmation(password: &str, confirmation: &str) -> Result<(), AuthError> {
    if password != confirmation {
        return Err(AuthError::validation("passwords do not match"));
    }
    Ok(())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

impl SignInForm {
    pub fn validate(&self) -> Result<Email, AuthError> {
        let email = Email::try_from(self.email.as_str())?;
        if self.password.is_empty() {
            return Err(AuthError::validation("password is required"));
        }
        Ok(email)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignUpForm {
    pub fn validate(&self) -> Result<Email, AuthError> {
        let email = Email::try_from(self.email.as_str())?;
        check_password(&self.password)?;
        check_confirmation(&self.password, &self.confirm_password)?;
        Ok(email)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordForm {
    pub email: String,
}

impl ForgotPasswordForm {
    pub fn validate(&self) -> Result<Email, AuthError> {
        Email::try_from(self.email.as_str())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordUpdateForm {
    pub password: String,
    pub confirm_password: String,
}

impl PasswordUpdateForm {
    pub fn validate(&self) -> Result<(), AuthError> {
        check_password(&self.password)?;
        check_confirmation(&self.password, &self.confirm_password)
    }
}
