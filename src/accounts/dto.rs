use serde::Serialize;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::repo_types::{date_format, Principal, Role};

/// Principal as returned to clients; the password verifier is never part of it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalView {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(with = "date_format")]
    pub date_of_birth: Option<Date>,
    pub role: Role,
    pub image: Option<String>,
    pub specialty: Option<String>,
    pub experience: Option<i32>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub prices: Option<serde_json::Value>,
    pub is_premium: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub premium_expired_at: Option<OffsetDateTime>,
    pub premium_days_left: i64,
}

impl PrincipalView {
    pub fn at(p: &Principal, now: OffsetDateTime) -> Self {
        Self {
            id: p.id,
            username: p.username.clone(),
            email: p.email.clone(),
            phone: p.phone.clone(),
            date_of_birth: p.date_of_birth,
            role: p.role,
            image: p.image.clone(),
            specialty: p.specialty.clone(),
            experience: p.experience,
            location: p.location.clone(),
            description: p.description.clone(),
            prices: p.prices.clone(),
            is_premium: p.is_premium,
            premium_expired_at: p.premium_expired_at,
            premium_days_left: p.premium_days_left(now),
        }
    }
}

impl From<&Principal> for PrincipalView {
    fn from(p: &Principal) -> Self {
        Self::at(p, OffsetDateTime::now_utc())
    }
}
