mod auth;
mod client;
mod filter;
mod supabase_url;

pub use auth::*;
pub use client::*;
pub use filter::*;
pub use supabase_url::*;
