use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{SpotStore, StoreResult};
use crate::models::spot::{Spot, SpotInput};
use crate::models::user::User;

#[derive(Default)]
struct State {
    next_spot_id: i64,
    spots: Vec<Spot>,
    users: BTreeMap<String, User>,
}

/// Process-local store. Data is lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SpotStore for MemoryStore {
    async fn insert_user_if_missing(&self, user_id: &str, privacy: i32) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        if state.users.contains_key(user_id) {
            return Ok(false);
        }
        state.users.insert(
            user_id.to_string(),
            User {
                user_id: user_id.to_string(),
                privacy,
            },
        );
        Ok(true)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.state.read().await.users.values().cloned().collect())
    }

    async fn update_privacy(&self, user_id: &str, privacy: i32) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        match state.users.get_mut(user_id) {
            Some(user) => {
                user.privacy = privacy;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_spot(&self, user_id: &str, spot: &SpotInput) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.next_spot_id += 1;
        let spot_id = state.next_spot_id;
        state.spots.push(Spot {
            spot_id,
            latd: spot.latd,
            longd: spot.longd,
            accuracy: spot.accuracy,
            altitude: spot.altitude,
            speed: spot.speed,
            timestamp: spot.timestamp,
            user_id: user_id.to_string(),
        });
        Ok(())
    }

    async fn list_spots(&self, exclude_user: Option<&str>) -> StoreResult<Vec<Spot>> {
        let state = self.state.read().await;
        Ok(state
            .spots
            .iter()
            .filter(|spot| exclude_user != Some(spot.user_id.as_str()))
            .cloned()
            .collect())
    }

    async fn user_path(&self, user_id: &str) -> StoreResult<Vec<Spot>> {
        let state = self.state.read().await;
        let mut path: Vec<Spot> = state
            .spots
            .iter()
            .filter(|spot| spot.user_id == user_id)
            .cloned()
            .collect();
        path.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.spot_id.cmp(&a.spot_id))
        });
        Ok(path)
    }
}
