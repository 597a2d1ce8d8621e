use async_trait::async_trait;

use super::{SpotStore, StoreResult};
use crate::db::{queries, DbPool};
use crate::models::spot::{Spot, SpotInput};
use crate::models::user::User;

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SpotStore for PgStore {
    async fn insert_user_if_missing(&self, user_id: &str, privacy: i32) -> StoreResult<bool> {
        let result = sqlx::query(queries::INSERT_USER_IF_MISSING)
            .bind(user_id)
            .bind(privacy)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(queries::SELECT_ALL_USERS)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn update_privacy(&self, user_id: &str, privacy: i32) -> StoreResult<bool> {
        let result = sqlx::query(queries::UPDATE_USER_PRIVACY)
            .bind(user_id)
            .bind(privacy)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_spot(&self, user_id: &str, spot: &SpotInput) -> StoreResult<()> {
        sqlx::query(queries::INSERT_SPOT)
            .bind(spot.latd)
            .bind(spot.longd)
            .bind(spot.accuracy)
            .bind(spot.altitude)
            .bind(spot.speed)
            .bind(spot.timestamp)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_spots(&self, exclude_user: Option<&str>) -> StoreResult<Vec<Spot>> {
        let spots = match exclude_user {
            Some(user_id) => {
                sqlx::query_as::<_, Spot>(queries::SELECT_SPOTS_EXCEPT_USER)
                    .bind(user_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_as::<_, Spot>(queries::SELECT_ALL_SPOTS)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(spots)
    }

    async fn user_path(&self, user_id: &str) -> StoreResult<Vec<Spot>> {
        let spots = sqlx::query_as::<_, Spot>(queries::SELECT_USER_PATH)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(spots)
    }
}

// These run against a live database:
// DATABASE_URL=postgres://... cargo test -- --ignored
#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;
    use crate::db;
    use crate::error::AppError;
    use crate::service::SpotService;

    async fn store() -> PgStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = db::init_pool(&url, 2)
            .await
            .expect("failed to connect to database");
        db::ensure_schema(&pool)
            .await
            .expect("failed to create schema");
        PgStore::new(pool)
    }

    /// Device ids unique per run, the tables are shared between tests.
    fn device(name: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        format!("{}-{}", name, nanos)
    }

    fn reading(timestamp: i64) -> SpotInput {
        SpotInput {
            latd: 20.652494,
            longd: -100.391404,
            accuracy: 5.0,
            altitude: 1850.25,
            speed: 0.0,
            timestamp,
        }
    }

    async fn find_user(store: &PgStore, user_id: &str) -> Option<User> {
        store
            .list_users()
            .await
            .unwrap()
            .into_iter()
            .find(|user| user.user_id == user_id)
    }

    #[tokio::test]
    #[ignore]
    async fn test_insert_user_if_missing_reports_creation_once() {
        let store = store().await;
        let id = device("register");

        assert!(store.insert_user_if_missing(&id, 0).await.unwrap());
        assert!(store.update_privacy(&id, 2).await.unwrap());
        assert!(!store.insert_user_if_missing(&id, 0).await.unwrap());

        let user = find_user(&store, &id).await.unwrap();
        assert_eq!(user.privacy, 2);
    }

    #[tokio::test]
    #[ignore]
    async fn test_add_spots_registers_one_user_with_all_spots() {
        let store = Arc::new(store().await);
        let service = SpotService::new(store.clone());
        let id = device("batch");

        service
            .add_spots(&id, &[reading(1), reading(2), reading(3)])
            .await
            .unwrap();
        service.add_spots(&id, &[reading(4)]).await.unwrap();

        let users: Vec<User> = store
            .list_users()
            .await
            .unwrap()
            .into_iter()
            .filter(|user| user.user_id == id)
            .collect();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].privacy, 0);

        let owned = store
            .list_spots(None)
            .await
            .unwrap()
            .into_iter()
            .filter(|spot| spot.user_id == id)
            .count();
        assert_eq!(owned, 4);
    }

    #[tokio::test]
    #[ignore]
    async fn test_list_spots_excludes_requesting_user() {
        let store = store().await;
        let mine = device("mine");
        let theirs = device("theirs");

        store.insert_spot(&mine, &reading(10)).await.unwrap();
        store.insert_spot(&theirs, &reading(11)).await.unwrap();

        let others = store.list_spots(Some(mine.as_str())).await.unwrap();
        assert!(others.iter().all(|spot| spot.user_id != mine));
        assert!(others.iter().any(|spot| spot.user_id == theirs));

        let all = store.list_spots(None).await.unwrap();
        assert!(all.iter().any(|spot| spot.user_id == mine));
        assert!(all.windows(2).all(|w| w[0].spot_id < w[1].spot_id));
    }

    #[tokio::test]
    #[ignore]
    async fn test_set_privacy_and_unknown_user() {
        let store = Arc::new(store().await);
        let service = SpotService::new(store.clone());
        let id = device("private");
        let ghost = device("ghost");

        service.register_or_skip(&id).await.unwrap();
        service.set_privacy(&id, 7).await.unwrap();
        assert_eq!(find_user(&store, &id).await.unwrap().privacy, 7);

        let err = service.set_privacy(&ghost, 1).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(find_user(&store, &ghost).await.is_none());
    }

    #[tokio::test]
    #[ignore]
    async fn test_user_path_orders_newest_first() {
        let store = store().await;
        let id = device("path");

        store.insert_spot(&id, &reading(100)).await.unwrap();
        store.insert_spot(&id, &reading(300)).await.unwrap();
        store.insert_spot(&id, &reading(200)).await.unwrap();
        store.insert_spot(&id, &reading(300)).await.unwrap();

        let path = store.user_path(&id).await.unwrap();
        let times: Vec<i64> = path.iter().map(|spot| spot.timestamp).collect();
        assert_eq!(times, vec![300, 300, 200, 100]);
        assert!(path[0].spot_id > path[1].spot_id);
    }
}
