use std::fmt;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::error;

/// Store-enforced uniqueness constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueKey {
    Username,
    Email,
    Phone,
    HealthOwner,
}

impl UniqueKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            UniqueKey::Username => "username",
            UniqueKey::Email => "email",
            UniqueKey::Phone => "phone",
            UniqueKey::HealthOwner => "health record owner",
        }
    }

    fn from_constraint(name: &str) -> Option<Self> {
        match name {
            "users_username_key" => Some(UniqueKey::Username),
            "users_email_key" => Some(UniqueKey::Email),
            "users_phone_key" => Some(UniqueKey::Phone),
            "health_records_owner_id_key" => Some(UniqueKey::HealthOwner),
            _ => None,
        }
    }
}

impl fmt::Display for UniqueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure modes shared by the account and health stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated on {0}")]
    UniqueViolation(UniqueKey),

    #[error("record not found")]
    NotFound,

    #[error("{0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .context("connect to database")
}

pub(crate) fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            if let Some(key) = db_err.constraint().and_then(UniqueKey::from_constraint) {
                return StoreError::UniqueViolation(key);
            }
        }
    }
    if matches!(err, sqlx::Error::RowNotFound) {
        return StoreError::NotFound;
    }
    error!(error = %err, "database call failed");
    StoreError::Unavailable(err.to_string())
}
