use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::db::StoreError;

/// Account role. Serialized lowercase ("user", "pt", "admin").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Pt,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Pt => "pt",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "pt" => Ok(Role::Pt),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// An account as held by the account store.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<Date>,
    pub role: Role,
    pub password_hash: String, // Argon2 PHC string, never serialized
    pub image: Option<String>,
    pub specialty: Option<String>,
    pub experience: Option<i32>, // years
    pub location: Option<String>,
    pub description: Option<String>,
    pub prices: Option<serde_json::Value>,
    pub is_premium: bool,
    pub premium_expired_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

impl Principal {
    /// Whole days of premium left, rounded up. Zero when not premium or expired.
    pub fn premium_days_left(&self, now: OffsetDateTime) -> i64 {
        match self.premium_expired_at {
            Some(expires) if self.is_premium && expires > now => {
                let secs = (expires - now).whole_seconds();
                (secs + 86_399) / 86_400
            }
            _ => 0,
        }
    }
}

/// Row shape of the `users` table.
#[derive(Debug, FromRow)]
pub struct PrincipalRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<Date>,
    pub role: String,
    pub password_hash: String,
    pub image: Option<String>,
    pub specialty: Option<String>,
    pub experience: Option<i32>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub prices: Option<serde_json::Value>,
    pub is_premium: bool,
    pub premium_expired_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

impl TryFrom<PrincipalRow> for Principal {
    type Error = StoreError;

    fn try_from(r: PrincipalRow) -> Result<Self, Self::Error> {
        let role = r.role.parse::<Role>().map_err(StoreError::Unavailable)?;
        Ok(Self {
            id: r.id,
            username: r.username,
            email: r.email,
            phone: r.phone,
            date_of_birth: r.date_of_birth,
            role,
            password_hash: r.password_hash,
            image: r.image,
            specialty: r.specialty,
            experience: r.experience,
            location: r.location,
            description: r.description,
            prices: r.prices,
            is_premium: r.is_premium,
            premium_expired_at: r.premium_expired_at,
            created_at: r.created_at,
        })
    }
}

/// Fields supplied at registration.
#[derive(Debug, Clone)]
pub struct NewPrincipal {
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<Date>,
    pub role: Role,
    pub password_hash: String,
}

/// Partial update of a stored principal. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct PrincipalChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<Date>,
    pub image: Option<String>,
    pub specialty: Option<String>,
    pub experience: Option<i32>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub prices: Option<serde_json::Value>,
}

impl PrincipalChanges {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.date_of_birth.is_none()
            && self.image.is_none()
            && self.specialty.is_none()
            && self.experience.is_none()
            && self.location.is_none()
            && self.description.is_none()
            && self.prices.is_none()
    }

    pub fn apply_to(self, p: &mut Principal) {
        if let Some(v) = self.username {
            p.username = v;
        }
        if let Some(v) = self.email {
            p.email = v;
        }
        if let Some(v) = self.phone {
            p.phone = Some(v);
        }
        if let Some(v) = self.date_of_birth {
            p.date_of_birth = Some(v);
        }
        if let Some(v) = self.image {
            p.image = Some(v);
        }
        if let Some(v) = self.specialty {
            p.specialty = Some(v);
        }
        if let Some(v) = self.experience {
            p.experience = Some(v);
        }
        if let Some(v) = self.location {
            p.location = Some(v);
        }
        if let Some(v) = self.description {
            p.description = Some(v);
        }
        if let Some(v) = self.prices {
            p.prices = Some(v);
        }
    }
}

/// Equality filter over the unique identity fields, OR-combined, with an
/// optional `id != exclude_id` clause. Absent fields never match.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityFilter<'a> {
    pub username: Option<&'a str>,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub exclude_id: Option<Uuid>,
}

impl<'a> IdentityFilter<'a> {
    pub fn by_email(email: &'a str) -> Self {
        Self {
            email: Some(email),
            ..Default::default()
        }
    }

    pub fn excluding(mut self, id: Uuid) -> Self {
        self.exclude_id = Some(id);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.phone.is_none()
    }

    pub fn matches(&self, p: &Principal) -> bool {
        if self.exclude_id == Some(p.id) {
            return false;
        }
        self.username == Some(p.username.as_str())
            || self.email == Some(p.email.as_str())
            || (self.phone.is_some() && self.phone == p.phone.as_deref())
    }
}

/// `YYYY-MM-DD` (de)serialization for optional calendar dates.
pub mod date_format {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{macros::format_description, Date};

    pub fn serialize<S: Serializer>(date: &Option<Date>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => {
                let text = d
                    .format(format_description!("[year]-[month]-[day]"))
                    .map_err(serde::ser::Error::custom)?;
                s.serialize_some(&text)
            }
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Date>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        raw.map(|text| {
            Date::parse(&text, format_description!("[year]-[month]-[day]"))
                .map_err(serde::de::Error::custom)
        })
        .transpose()
    }
}
