mod capacity;
mod global_plan;
mod grid;
mod selection;

pub use capacity::*;
pub use global_plan::*;
pub use grid::*;
pub use selection::*;
