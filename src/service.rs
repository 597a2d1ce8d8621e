use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::models::spot::{Spot, SpotInput, SpotRecord};
use crate::models::user::{User, DEFAULT_PRIVACY};
use crate::store::SpotStore;

/// One shared user's spots, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub user_id: String,
    pub spots: Vec<Spot>,
}

/// Everything the browser page shows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapView {
    /// Spots whose owner is not private.
    pub spots: Vec<Spot>,
    pub users: Vec<User>,
    pub paths: Vec<Path>,
}

#[derive(Clone)]
pub struct SpotService {
    store: Arc<dyn SpotStore>,
    rpc_respect_privacy: bool,
}

impl SpotService {
    pub fn new(store: Arc<dyn SpotStore>) -> Self {
        Self {
            store,
            rpc_respect_privacy: false,
        }
    }

    /// When set, `get_spots` also drops spots of private users.
    pub fn with_rpc_privacy(mut self, respect: bool) -> Self {
        self.rpc_respect_privacy = respect;
        self
    }

    pub async fn register_or_skip(&self, user_id: &str) -> Result<()> {
        if self
            .store
            .insert_user_if_missing(user_id, DEFAULT_PRIVACY)
            .await?
        {
            info!("Registered new user {}", user_id);
        }
        Ok(())
    }

    /// Stores a batch of readings for `user_id`, registering the user first.
    /// Spots are inserted one by one; a storage failure midway keeps the
    /// spots already written.
    pub async fn add_spots(&self, user_id: &str, spots: &[SpotInput]) -> Result<()> {
        if user_id.is_empty() {
            return Err(AppError::Validation("user_id is required".to_string()));
        }

        self.register_or_skip(user_id).await?;

        for spot in spots {
            self.store.insert_spot(user_id, spot).await?;
        }

        info!("Stored {} spots for user {}", spots.len(), user_id);
        Ok(())
    }

    /// All spots except the requesting user's own, who already has them.
    pub async fn get_spots(&self, requesting_user_id: Option<&str>) -> Result<Vec<SpotRecord>> {
        let requesting_user_id = requesting_user_id.filter(|id| !id.is_empty());
        let mut spots = self.store.list_spots(requesting_user_id).await?;

        if self.rpc_respect_privacy {
            let private = self.private_user_ids().await?;
            spots.retain(|spot| !private.contains(&spot.user_id));
        }

        debug!(
            "Returning {} spots to {}",
            spots.len(),
            requesting_user_id.unwrap_or("anonymous caller")
        );
        Ok(spots.iter().map(SpotRecord::from).collect())
    }

    pub async fn set_privacy(&self, user_id: &str, privacy: i32) -> Result<()> {
        if !self.store.update_privacy(user_id, privacy).await? {
            return Err(AppError::NotFound(format!("user '{}'", user_id)));
        }
        info!("Privacy of user {} set to {}", user_id, privacy);
        Ok(())
    }

    pub async fn map_view(&self) -> Result<MapView> {
        let users = self.store.list_users().await?;
        let mut paths = Vec::new();
        let mut private = HashSet::new();

        for user in &users {
            if user.is_shared() {
                let spots = self.store.user_path(&user.user_id).await?;
                if !spots.is_empty() {
                    paths.push(Path {
                        user_id: user.user_id.clone(),
                        spots,
                    });
                }
            } else {
                private.insert(user.user_id.as_str());
            }
        }

        let spots = self
            .store
            .list_spots(None)
            .await?
            .into_iter()
            .filter(|spot| !private.contains(spot.user_id.as_str()))
            .collect();

        Ok(MapView {
            spots,
            users,
            paths,
        })
    }

    async fn private_user_ids(&self) -> Result<HashSet<String>> {
        Ok(self
            .store
            .list_users()
            .await?
            .into_iter()
            .filter(|user| !user.is_shared())
            .map(|user| user.user_id)
            .collect())
    }
}

#[cfg(test)]
impl SpotService {
    pub(crate) async fn find_user(&self, user_id: &str) -> Result<Option<User>> {
        Ok(self
            .store
            .list_users()
            .await?
            .into_iter()
            .find(|user| user.user_id == user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service() -> SpotService {
        SpotService::new(Arc::new(MemoryStore::new()))
    }

    fn reading(timestamp: i64) -> SpotInput {
        SpotInput {
            latd: 10.0,
            longd: 20.0,
            accuracy: 5.0,
            altitude: 0.0,
            speed: 0.0,
            timestamp,
        }
    }

    #[tokio::test]
    async fn test_add_spots_registers_user_and_stores_batch() {
        let service = service();
        let batch: Vec<SpotInput> = (0..4).map(reading).collect();

        service.add_spots("device-A", &batch).await.unwrap();

        let user = service.find_user("device-A").await.unwrap().unwrap();
        assert_eq!(user.privacy, 0);

        let spots = service.get_spots(None).await.unwrap();
        assert_eq!(spots.len(), 4);
        assert!(spots.iter().all(|s| s.user_id == "device-A"));
    }

    #[tokio::test]
    async fn test_add_spots_twice_creates_one_user() {
        let service = service();
        service.add_spots("device-A", &[reading(1)]).await.unwrap();
        service.add_spots("device-A", &[reading(2)]).await.unwrap();

        let view = service.map_view().await.unwrap();
        assert_eq!(
            view.users,
            vec![User {
                user_id: "device-A".to_string(),
                privacy: DEFAULT_PRIVACY,
            }]
        );
    }

    #[tokio::test]
    async fn test_add_spots_does_not_reset_privacy() {
        let service = service();
        service.add_spots("device-A", &[reading(1)]).await.unwrap();
        service.set_privacy("device-A", 1).await.unwrap();
        service.add_spots("device-A", &[reading(2)]).await.unwrap();

        let user = service.find_user("device-A").await.unwrap().unwrap();
        assert_eq!(user.privacy, 1);
    }

    #[tokio::test]
    async fn test_add_spots_rejects_empty_user() {
        let service = service();
        let err = service.add_spots("", &[reading(1)]).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(service.get_spots(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_spots_excludes_requesting_user() {
        let service = service();
        service.add_spots("device-A", &[reading(1000)]).await.unwrap();
        service.add_spots("device-C", &[reading(1001)]).await.unwrap();

        let for_b = service.get_spots(Some("device-B")).await.unwrap();
        assert_eq!(for_b.len(), 2);

        let for_a = service.get_spots(Some("device-A")).await.unwrap();
        assert_eq!(for_a.len(), 1);
        assert_eq!(for_a[0].user_id, "device-C");

        let for_empty = service.get_spots(Some("")).await.unwrap();
        assert_eq!(for_empty.len(), 2);
    }

    #[tokio::test]
    async fn test_get_spots_ignores_privacy_by_default() {
        let service = service();
        service.add_spots("device-A", &[reading(1)]).await.unwrap();
        service.set_privacy("device-A", 1).await.unwrap();

        assert_eq!(service.get_spots(Some("device-B")).await.unwrap().len(), 1);

        let strict = service.clone().with_rpc_privacy(true);
        assert!(strict.get_spots(Some("device-B")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_privacy() {
        let service = service();
        service.register_or_skip("device-A").await.unwrap();
        service.set_privacy("device-A", 42).await.unwrap();

        let user = service.find_user("device-A").await.unwrap().unwrap();
        assert_eq!(user.privacy, 42);
    }

    #[tokio::test]
    async fn test_set_privacy_unknown_user() {
        let service = service();
        let err = service.set_privacy("nobody", 1).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(service.find_user("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_map_view_applies_privacy() {
        let service = service();
        service
            .add_spots("shared", &[reading(10), reading(30), reading(20)])
            .await
            .unwrap();
        service.add_spots("hidden", &[reading(40)]).await.unwrap();
        service.set_privacy("hidden", 1).await.unwrap();

        let view = service.map_view().await.unwrap();

        assert_eq!(view.users.len(), 2);
        assert_eq!(view.spots.len(), 3);
        assert!(view.spots.iter().all(|s| s.user_id == "shared"));

        assert_eq!(view.paths.len(), 1);
        assert_eq!(view.paths[0].user_id, "shared");
        let times: Vec<i64> = view.paths[0].spots.iter().map(|s| s.timestamp).collect();
        assert_eq!(times, vec![30, 20, 10]);
    }
}
