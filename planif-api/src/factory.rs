//! Composition root: the only place that names the concrete outbound adapters.

use std::sync::Arc;

use supabase::{SupabaseClient, SupabaseURL};

use crate::{
    adapters::outbound::supabase::{SupabaseAuthProvider, SupabaseRowStore},
    app_state::AppState,
    config::Settings,
};

/// Builds the application state on top of the hosted backend.
pub fn create_app_state(settings: &Settings) -> AppState {
    let client = SupabaseClient::new(
        SupabaseURL::new(settings.supabase.url.as_str()),
        settings.supabase.anon_key.as_str(),
    );
    tracing::debug!("using backend at {}", client.url());

    AppState::new(
        settings.application.app_url.clone(),
        settings.application.default_weeks,
        Arc::new(SupabaseRowStore::new(client.clone())),
        Arc::new(SupabaseAuthProvider::new(client)),
    )
}
