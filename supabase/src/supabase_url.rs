use std::env;

use url::form_urlencoded;

use crate::{Filter, Order};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupabaseURL(String);

impl AsRef<str> for SupabaseURL {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SupabaseURL {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl SupabaseURL {
    pub fn new(base: impl Into<String>) -> Self {
        Self(base.into().trim_end_matches('/').to_string())
    }

    /// Creates a new SupabaseURL from the environment variable `SUPABASE_URL`.
    pub fn from_env() -> Option<Self> {
        env::var("SUPABASE_URL").ok().map(Self::new)
    }

    /// Append the given path to the URL.
    pub fn append_path(&self, path: &str) -> Self {
        let trimmed_url = self.0.trim_end_matches('/');
        let trimmed_path = path.trim_start_matches('/');
        Self(format!("{}/{}", trimmed_url, trimmed_path))
    }

    /// PostgREST endpoint for a table.
    pub fn rest(&self, table: &str) -> Self {
        self.append_path("/rest/v1").append_path(table)
    }

    /// GoTrue endpoint.
    pub fn auth(&self, path: &str) -> Self {
        self.append_path("/auth/v1").append_path(path)
    }

    pub fn with_query(&self, key: &str, value: &str) -> Self {
        let pair = format!("{}={}", encode(key), encode(value));
        if self.0.contains('?') {
            Self(format!("{}&{}", self.0, pair))
        } else {
            Self(format!("{}?{}", self.0, pair))
        }
    }

    pub fn with_filter(&self, filter: &Filter) -> Self {
        let (column, expression) = filter.as_query_pair();
        self.with_query(&column, &expression)
    }

    pub fn with_order(&self, orders: &[Order]) -> Self {
        if orders.is_empty() {
            return self.clone();
        }
        let rendered = orders
            .iter()
            .map(Order::as_query_value)
            .collect::<Vec<_>>()
            .join(",");
        self.with_query("order", &rendered)
    }
}

fn encode(raw: &str) -> String {
    form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}
