mod auth;
mod row_store;

pub use auth::*;
pub use row_store::*;
