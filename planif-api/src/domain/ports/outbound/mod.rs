mod auth_provider;
mod row_store;

pub use auth_provider::*;
pub use row_store::*;
