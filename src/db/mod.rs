use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use tracing::info;

pub mod queries;

pub type DbPool = Pool<Postgres>;

pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Creates the `spots` and `users` tables when they do not exist yet.
pub async fn ensure_schema(pool: &DbPool) -> Result<()> {
    for statement in [
        queries::CREATE_SPOTS_TABLE,
        queries::CREATE_SPOTS_USER_INDEX,
        queries::CREATE_USERS_TABLE,
    ] {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("Database schema ready");
    Ok(())
}
