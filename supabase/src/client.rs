use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::{AuthClient, Filter, Order, SupabaseURL};

/// Thin client over a hosted Supabase project: PostgREST tables and GoTrue auth.
///
/// Cloning is cheap; the underlying `reqwest::Client` is reference counted.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    url: SupabaseURL,
    api_key: String,
    access_token: Option<String>,
}

impl SupabaseClient {
    pub fn new(url: SupabaseURL, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
            api_key: api_key.into(),
            access_token: None,
        }
    }

    /// Returns a client that sends the given user token instead of the anon key
    /// as bearer, so row level security sees the signed-in user.
    pub fn with_access_token(&self, token: impl Into<String>) -> Self {
        Self {
            access_token: Some(token.into()),
            ..self.clone()
        }
    }

    pub fn url(&self) -> &SupabaseURL {
        &self.url
    }

    pub fn from(&self, table: &str) -> QueryBuilder<'_> {
        QueryBuilder {
            client: self,
            table: table.to_string(),
            columns: "*".to_string(),
            filters: Vec::new(),
            orders: Vec::new(),
        }
    }

    pub fn auth(&self) -> AuthClient<'_> {
        AuthClient::new(self)
    }

    pub(crate) fn request(&self, method: Method, url: &SupabaseURL) -> RequestBuilder {
        self.request_with_bearer(method, url, self.access_token.as_deref())
    }

    pub(crate) fn request_with_bearer(
        &self,
        method: Method,
        url: &SupabaseURL,
        bearer: Option<&str>,
    ) -> RequestBuilder {
        self.http
            .request(method, url.as_ref())
            .header("apikey", &self.api_key)
            .bearer_auth(bearer.unwrap_or(&self.api_key))
    }

    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, SupabaseError> {
        let resp = self.send(request).await?;
        resp.json::<T>().await.map_err(|e| {
            SupabaseError::ParsingError(format!("Failed to parse response as JSON: {}", e))
        })
    }

    pub(crate) async fn send(
        &self,
        request: RequestBuilder,
    ) -> Result<reqwest::Response, SupabaseError> {
        let resp = request
            .send()
            .await
            .map_err(|e| SupabaseError::ResponseError(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        Err(error_from_response(status, &body))
    }
}

/// Chainable query against one table, mirroring the PostgREST client API:
/// `client.from("charges").eq("projet_id", id).order(Order::asc("semaine_debut")).select()`.
#[derive(Debug)]
pub struct QueryBuilder<'a> {
    client: &'a SupabaseClient,
    table: String,
    columns: String,
    filters: Vec<Filter>,
    orders: Vec<Order>,
}

impl<'a> QueryBuilder<'a> {
    pub fn columns(mut self, columns: &str) -> Self {
        self.columns = columns.to_string();
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn filters(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.filters.extend(filters);
        self
    }

    pub fn eq(self, column: &str, value: impl ToString) -> Self {
        self.filter(Filter::eq(column, value))
    }

    pub fn is_null(self, column: &str) -> Self {
        self.filter(Filter::is_null(column))
    }

    pub fn order(mut self, order: Order) -> Self {
        self.orders.push(order);
        self
    }

    fn filtered_url(&self) -> SupabaseURL {
        self.filters
            .iter()
            .fold(self.client.url.rest(&self.table), |url, f| url.with_filter(f))
    }

    fn require_filters(&self, operation: &str) -> Result<(), SupabaseError> {
        if self.filters.is_empty() {
            return Err(SupabaseError::MissingFilter(format!(
                "refusing to {} every row of '{}'",
                operation, self.table
            )));
        }
        Ok(())
    }

    pub async fn select<T: DeserializeOwned>(self) -> Result<Vec<T>, SupabaseError> {
        let url = self
            .client
            .url
            .rest(&self.table)
            .with_query("select", &self.columns);
        let url = self
            .filters
            .iter()
            .fold(url, |url, f| url.with_filter(f))
            .with_order(&self.orders);

        tracing::debug!(table = %self.table, "select");
        let request = self.client.request(Method::GET, &url);
        self.client.send_json(request).await
    }

    pub async fn insert<B, T>(self, body: &B) -> Result<Vec<T>, SupabaseError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.client.url.rest(&self.table);

        tracing::debug!(table = %self.table, "insert");
        let request = self
            .client
            .request(Method::POST, &url)
            .header("Prefer", "return=representation")
            .json(body);
        self.client.send_json(request).await
    }

    pub async fn update<B, T>(self, body: &B) -> Result<Vec<T>, SupabaseError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.require_filters("update")?;
        let url = self.filtered_url();

        tracing::debug!(table = %self.table, filters = self.filters.len(), "update");
        let request = self
            .client
            .request(Method::PATCH, &url)
            .header("Prefer", "return=representation")
            .json(body);
        self.client.send_json(request).await
    }

    pub async fn delete(self) -> Result<(), SupabaseError> {
        self.require_filters("delete")?;
        let url = self.filtered_url();

        tracing::debug!(table = %self.table, filters = self.filters.len(), "delete");
        let request = self
            .client
            .request(Method::DELETE, &url)
            .header("Prefer", "return=minimal");
        self.client.send(request).await?;
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum SupabaseError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("ResponseError: {0}")]
    ResponseError(String),
    #[error("ParsingError: {0}")]
    ParsingError(String),
    #[error("MissingFilter: {0}")]
    MissingFilter(String),
    #[error("ApiError ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },
}

/// SQLSTATE raised by Postgres on a unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

impl SupabaseError {
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Api { code, message, .. } => {
                code.as_deref() == Some(UNIQUE_VIOLATION)
                    || message.to_lowercase().contains("duplicate key")
            }
            _ => false,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Error body shared by PostgREST (`code`/`message`) and GoTrue
/// (`error_code`/`msg`/`error_description`).
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    code: Option<serde_json::Value>,
    error_code: Option<String>,
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    details: Option<String>,
}

pub(crate) fn error_from_response(status: StatusCode, body: &str) -> SupabaseError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();

    let message = parsed
        .message
        .or(parsed.msg)
        .or(parsed.error_description)
        .or(parsed.details)
        .unwrap_or_else(|| {
            if body.is_empty() {
                status.to_string()
            } else {
                body.to_string()
            }
        });

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return SupabaseError::Unauthorized(message);
    }

    let code = match parsed.code {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => parsed.error_code,
    };

    SupabaseError::Api {
        status: status.as_u16(),
        code,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postgrest_unique_violation_is_detected() {
        let body = r#"{"code":"23505","details":"Key (role_id, equipe_id)=(r, e) already exists.","hint":null,"message":"duplicate key value violates unique constraint \"role_attachments_role_id_equipe_id_key\""}"#;
        let err = error_from_response(StatusCode::CONFLICT, body);

        assert!(err.is_unique_violation());
        assert!(matches!(err, SupabaseError::Api { status: 409, .. }));
    }

    #[test]
    fn gotrue_message_field_is_used() {
        let body = r#"{"code":400,"error_code":"invalid_credentials","msg":"Invalid login credentials"}"#;
        let err = error_from_response(StatusCode::BAD_REQUEST, body);

        assert_eq!(err.message(), "Invalid login credentials");
        assert!(!err.is_unique_violation());
        match err {
            SupabaseError::Api { code, .. } => assert_eq!(code.as_deref(), Some("400")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unauthorized_status_maps_to_unauthorized() {
        let err = error_from_response(StatusCode::UNAUTHORIZED, r#"{"message":"JWT expired"}"#);
        assert!(matches!(err, SupabaseError::Unauthorized(ref m) if m == "JWT expired"));
    }

    #[test]
    fn non_json_body_is_kept_verbatim() {
        let err = error_from_response(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(err.message(), "upstream down");
    }

    #[tokio::test]
    async fn update_without_filter_is_refused() {
        let client = SupabaseClient::new(SupabaseURL::new("http://localhost:1"), "anon");
        let result = client
            .from("charges")
            .update::<_, serde_json::Value>(&serde_json::json!({ "unite_ressource": 1 }))
            .await;

        assert!(matches!(result, Err(SupabaseError::MissingFilter(_))));
    }
}
