mod credentials;
mod error;
pub mod models;
pub mod organisation;
pub mod planning;
pub mod ports;
pub mod services;
mod user;
pub mod week;

pub use credentials::*;
pub use error::*;
pub use user::*;
