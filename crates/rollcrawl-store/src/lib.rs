pub mod file_store;
pub mod ids;

pub use file_store::{DsvFileStore, OutputLayout};
pub use ids::read_ids;
