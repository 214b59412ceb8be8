// Service exports
pub mod auth;
pub mod cache;
pub mod memory;
pub mod postgres;
pub mod store;

pub use auth::{AuthError, Claims, TokenVerifier};
pub use cache::{CacheKey, Snapshot, SnapshotCache};
pub use memory::MemoryStore;
pub use postgres::{PostgresClient, PostgresError};
pub use store::{CandidateStore, StoreBackend, StoreError};
