use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StorageError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ActivityResponse {
    pub activities: Vec<Activity>,
}

/// Body of the insert and delete endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityPost {
    pub activity: Activity,
}

#[async_trait]
pub trait ActivityStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Activity>, StorageError>;

    /// Insert a new activity. Names are stored lowercased.
    async fn insert(&self, name: &str) -> Result<Activity, StorageError>;

    /// Delete by id, returning how many rows went away.
    async fn delete(&self, id: Uuid) -> Result<u64, StorageError>;
}

#[derive(Debug, Default)]
pub struct MemoryActivityStore {
    activities: RwLock<Vec<Activity>>,
}

#[async_trait]
impl ActivityStore for MemoryActivityStore {
    async fn list(&self) -> Result<Vec<Activity>, StorageError> {
        Ok(self.activities.read().await.clone())
    }

    async fn insert(&self, name: &str) -> Result<Activity, StorageError> {
        let activity = Activity {
            id: Uuid::new_v4().to_string(),
            name: name.to_lowercase(),
        };
        self.activities.write().await.push(activity.clone());
        Ok(activity)
    }

    async fn delete(&self, id: Uuid) -> Result<u64, StorageError> {
        let id = id.to_string();
        let mut activities = self.activities.write().await;
        let before = activities.len();
        activities.retain(|a| a.id != id);
        Ok((before - activities.len()) as u64)
    }
}
