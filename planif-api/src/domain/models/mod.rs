mod capacite;
mod charge;
mod ids;
mod jalon;
mod meta;
mod organisation;
mod projet;
mod resource;
mod setting;

pub use capacite::*;
pub use charge::*;
pub use ids::*;
pub use jalon::*;
pub use meta::*;
pub use organisation::*;
pub use projet::*;
pub use resource::*;
pub use setting::*;
