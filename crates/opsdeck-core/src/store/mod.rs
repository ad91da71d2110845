// ── Entity store ──
//
// Ordered in-memory repositories with push-based change notification,
// plus the serializable workspace snapshot and demo seed data.

mod collection;
mod data_store;
mod repository;
pub mod seed;
mod workspace;

pub use data_store::DataStore;
pub use repository::{Entity, InMemoryRepository, Repository};
pub use workspace::Workspace;
