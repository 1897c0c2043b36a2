use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use sqlx::PgPool;

use crate::accounts::{memory::MemoryAccountStore, AccountStore, PgAccountStore};
use crate::auth::JwtKeys;
use crate::config::AppConfig;
use crate::health::{memory::MemoryHealthStore, HealthStore, PgHealthStore};
use crate::storage::{S3Storage, StorageClient};

/// Collaborators shared by every handler. Built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountStore>,
    pub health: Arc<dyn HealthStore>,
    pub storage: Arc<dyn StorageClient>,
    pub keys: Arc<JwtKeys>,
}

impl AppState {
    pub async fn init(db: PgPool, config: &AppConfig) -> anyhow::Result<Self> {
        let storage: Arc<dyn StorageClient> = Arc::new(S3Storage::connect(&config.storage).await?);
        Ok(Self::from_parts(
            Arc::new(PgAccountStore::new(db.clone())),
            Arc::new(PgHealthStore::new(db)),
            storage,
            JwtKeys::from_secret(config.jwt.secret.as_bytes()),
        ))
    }

    pub fn from_parts(
        accounts: Arc<dyn AccountStore>,
        health: Arc<dyn HealthStore>,
        storage: Arc<dyn StorageClient>,
        keys: JwtKeys,
    ) -> Self {
        Self {
            accounts,
            health,
            storage,
            keys: Arc::new(keys),
        }
    }

    /// In-memory stores and a blob store that accepts everything.
    pub fn fake() -> Self {
        #[derive(Clone)]
        struct FakeStorage;

        #[async_trait]
        impl StorageClient for FakeStorage {
            async fn put_object(&self, _k: &str, _b: Bytes, _ct: &str) -> anyhow::Result<()> {
                Ok(())
            }
            async fn delete_object(&self, _k: &str) -> anyhow::Result<()> {
                Ok(())
            }
        }

        Self::from_parts(
            Arc::new(MemoryAccountStore::new()),
            Arc::new(MemoryHealthStore::new()),
            Arc::new(FakeStorage),
            JwtKeys::from_secret(b"test-secret"),
        )
    }
}
