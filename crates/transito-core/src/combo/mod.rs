//! Per-chat recipe assignments for each filling line.

mod model;
mod repository;

pub use model::ComboAssignment;
pub use repository::{ComboRegistry, ComboRepository};
