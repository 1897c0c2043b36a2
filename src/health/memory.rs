use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repo::HealthStore;
use super::repo_types::HealthRecord;
use crate::db::{StoreError, StoreResult, UniqueKey};

/// Health store kept in process memory, keyed by owner.
#[derive(Default)]
pub struct MemoryHealthStore {
    by_owner: RwLock<HashMap<Uuid, HealthRecord>>,
}

impl MemoryHealthStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HealthStore for MemoryHealthStore {
    async fn find_by_owner(&self, owner_id: Uuid) -> StoreResult<Option<HealthRecord>> {
        Ok(self.by_owner.read().await.get(&owner_id).cloned())
    }

    async fn insert(&self, record: HealthRecord) -> StoreResult<HealthRecord> {
        let mut rows = self.by_owner.write().await;
        if rows.contains_key(&record.owner_id) {
            return Err(StoreError::UniqueViolation(UniqueKey::HealthOwner));
        }
        rows.insert(record.owner_id, record.clone());
        Ok(record)
    }

    async fn update(&self, record: HealthRecord) -> StoreResult<HealthRecord> {
        let mut rows = self.by_owner.write().await;
        match rows.get_mut(&record.owner_id) {
            Some(existing) if existing.id == record.id => {
                *existing = record.clone();
                Ok(record)
            }
            _ => Err(StoreError::NotFound),
        }
    }
}
