use thiserror::Error;

/// Errors raised by planning operations and the data-access services.
#[derive(Debug, Error)]
pub enum PlanningError {
    #[error("{0}")]
    Validation(String),
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("resource already attached to this team")]
    AlreadyAttached,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("bulk update stopped after {applied} of {total} writes: {source}")]
    BulkInterrupted {
        applied: usize,
        total: usize,
        #[source]
        source: Box<PlanningError>,
    },
    #[error("invalid row from backend: {0}")]
    InvalidRow(String),
    #[error("backend error: {0}")]
    Backend(String),
}

impl PlanningError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// Errors raised by sign-in, sign-up and session handling.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("{0}")]
    Provider(String),
}

impl AuthError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
