mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::spot::{Spot, SpotInput};
use crate::models::user::User;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Persistence for spots and users. Every single call is atomic on its own;
/// nothing spans more than one call.
#[async_trait]
pub trait SpotStore: Send + Sync {
    /// Creates the user with `privacy` unless one already exists. Returns
    /// whether a record was created.
    async fn insert_user_if_missing(&self, user_id: &str, privacy: i32) -> StoreResult<bool>;

    /// All users ordered by identifier.
    async fn list_users(&self) -> StoreResult<Vec<User>>;

    /// Returns false when no user matched.
    async fn update_privacy(&self, user_id: &str, privacy: i32) -> StoreResult<bool>;

    async fn insert_spot(&self, user_id: &str, spot: &SpotInput) -> StoreResult<()>;

    /// All spots in insertion order, minus those owned by `exclude_user`.
    async fn list_spots(&self, exclude_user: Option<&str>) -> StoreResult<Vec<Spot>>;

    /// One user's spots, newest timestamp first.
    async fn user_path(&self, user_id: &str) -> StoreResult<Vec<Spot>>;
}
