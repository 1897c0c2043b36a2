use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::repo_types::{IdentityFilter, NewPrincipal, Principal, PrincipalChanges, PrincipalRow, Role};
use crate::db::{map_sqlx_error, StoreError, StoreResult};

/// Account store contract consumed by the core.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// First principal matching any supplied identity field.
    async fn find_one(&self, filter: &IdentityFilter<'_>) -> StoreResult<Option<Principal>>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Principal>>;
    async fn list_by_role(&self, role: Role) -> StoreResult<Vec<Principal>>;
    async fn insert(&self, new: NewPrincipal) -> StoreResult<Principal>;
    /// Fails with [`StoreError::NotFound`] when no principal has this id.
    async fn update_by_id(&self, id: Uuid, changes: PrincipalChanges) -> StoreResult<Principal>;
}

const PRINCIPAL_COLUMNS: &str = "id, username, email, phone, date_of_birth, role, password_hash, \
     image, specialty, experience, location, description, prices, is_premium, \
     premium_expired_at, created_at";

#[derive(Clone)]
pub struct PgAccountStore {
    db: PgPool,
}

impl PgAccountStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn into_principal(row: PrincipalRow) -> StoreResult<Principal> {
    Principal::try_from(row)
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_one(&self, filter: &IdentityFilter<'_>) -> StoreResult<Option<Principal>> {
        if filter.is_empty() {
            return Ok(None);
        }
        let sql = format!(
            r#"
            SELECT {PRINCIPAL_COLUMNS}
            FROM users
            WHERE ($4::uuid IS NULL OR id <> $4)
              AND (username = $1 OR email = $2 OR phone = $3)
            LIMIT 1
            "#
        );
        let row = sqlx::query_as::<_, PrincipalRow>(&sql)
            .bind(filter.username)
            .bind(filter.email)
            .bind(filter.phone)
            .bind(filter.exclude_id)
            .fetch_optional(&self.db)
            .await
            .map_err(map_sqlx_error)?;
        row.map(into_principal).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Principal>> {
        let sql = format!("SELECT {PRINCIPAL_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, PrincipalRow>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(map_sqlx_error)?;
        row.map(into_principal).transpose()
    }

    async fn list_by_role(&self, role: Role) -> StoreResult<Vec<Principal>> {
        let sql = format!(
            "SELECT {PRINCIPAL_COLUMNS} FROM users WHERE role = $1 ORDER BY created_at ASC"
        );
        let rows = sqlx::query_as::<_, PrincipalRow>(&sql)
            .bind(role.as_str())
            .fetch_all(&self.db)
            .await
            .map_err(map_sqlx_error)?;
        rows.into_iter().map(into_principal).collect()
    }

    async fn insert(&self, new: NewPrincipal) -> StoreResult<Principal> {
        let sql = format!(
            r#"
            INSERT INTO users (id, username, email, phone, date_of_birth, role, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PRINCIPAL_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, PrincipalRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new.username)
            .bind(&new.email)
            .bind(&new.phone)
            .bind(new.date_of_birth)
            .bind(new.role.as_str())
            .bind(&new.password_hash)
            .fetch_one(&self.db)
            .await
            .map_err(map_sqlx_error)?;
        debug!(user_id = %row.id, "user row inserted");
        into_principal(row)
    }

    async fn update_by_id(&self, id: Uuid, changes: PrincipalChanges) -> StoreResult<Principal> {
        let sql = format!(
            r#"
            UPDATE users SET
                username      = COALESCE($2, username),
                email         = COALESCE($3, email),
                phone         = COALESCE($4, phone),
                date_of_birth = COALESCE($5, date_of_birth),
                image         = COALESCE($6, image),
                specialty     = COALESCE($7, specialty),
                experience    = COALESCE($8, experience),
                location      = COALESCE($9, location),
                description   = COALESCE($10, description),
                prices        = COALESCE($11, prices)
            WHERE id = $1
            RETURNING {PRINCIPAL_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, PrincipalRow>(&sql)
            .bind(id)
            .bind(changes.username)
            .bind(changes.email)
            .bind(changes.phone)
            .bind(changes.date_of_birth)
            .bind(changes.image)
            .bind(changes.specialty)
            .bind(changes.experience)
            .bind(changes.location)
            .bind(changes.description)
            .bind(changes.prices)
            .fetch_optional(&self.db)
            .await
            .map_err(map_sqlx_error)?
            .ok_or(StoreError::NotFound)?;
        into_principal(row)
    }
}
