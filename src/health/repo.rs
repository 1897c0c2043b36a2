use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{HealthRecord, HealthRow};
use crate::db::{map_sqlx_error, StoreError, StoreResult};

/// Health store contract consumed by the core. At most one record per owner.
#[async_trait]
pub trait HealthStore: Send + Sync {
    async fn find_by_owner(&self, owner_id: Uuid) -> StoreResult<Option<HealthRecord>>;
    async fn insert(&self, record: HealthRecord) -> StoreResult<HealthRecord>;
    async fn update(&self, record: HealthRecord) -> StoreResult<HealthRecord>;
}

#[derive(Clone)]
pub struct PgHealthStore {
    db: PgPool,
}

impl PgHealthStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl HealthStore for PgHealthStore {
    async fn find_by_owner(&self, owner_id: Uuid) -> StoreResult<Option<HealthRecord>> {
        let row = sqlx::query_as::<_, HealthRow>(
            r#"
            SELECT id, owner_id, gender, height, weight, bmi, bmi_category
            FROM health_records
            WHERE owner_id = $1
            "#,
        )
        .bind(owner_id)
        .fetch_optional(&self.db)
        .await
        .map_err(map_sqlx_error)?;
        row.map(HealthRecord::try_from).transpose()
    }

    async fn insert(&self, record: HealthRecord) -> StoreResult<HealthRecord> {
        let row = HealthRow::from(&record);
        sqlx::query(
            r#"
            INSERT INTO health_records (id, owner_id, gender, height, weight, bmi, bmi_category)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(row.id)
        .bind(row.owner_id)
        .bind(&row.gender)
        .bind(row.height)
        .bind(row.weight)
        .bind(row.bmi)
        .bind(&row.bmi_category)
        .execute(&self.db)
        .await
        .map_err(map_sqlx_error)?;
        Ok(record)
    }

    async fn update(&self, record: HealthRecord) -> StoreResult<HealthRecord> {
        let row = HealthRow::from(&record);
        let done = sqlx::query(
            r#"
            UPDATE health_records
               SET gender = $2, height = $3, weight = $4, bmi = $5, bmi_category = $6,
                   updated_at = now()
             WHERE id = $1
            "#,
        )
        .bind(row.id)
        .bind(&row.gender)
        .bind(row.height)
        .bind(row.weight)
        .bind(row.bmi)
        .bind(&row.bmi_category)
        .execute(&self.db)
        .await
        .map_err(map_sqlx_error)?;
        if done.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(record)
    }
}
