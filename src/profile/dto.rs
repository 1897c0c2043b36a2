use serde::{Deserialize, Serialize};
use time::Date;

use crate::accounts::{repo_types::date_format, IdentityFilter, PrincipalChanges, PrincipalView};
use crate::health::{Gender, HealthView};

/// Partial update of a principal's identity and trainer fields.
/// An absent key and an explicit `null` both mean "leave unchanged".
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityPatch {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, with = "date_format")]
    pub date_of_birth: Option<Date>,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub experience: Option<i32>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub prices: Option<serde_json::Value>,
}

impl IdentityPatch {
    /// Candidate covering exactly the unique fields this patch changes.
    pub fn identity_filter(&self) -> IdentityFilter<'_> {
        IdentityFilter {
            username: self.username.as_deref(),
            email: self.email.as_deref(),
            phone: self.phone.as_deref(),
            exclude_id: None,
        }
    }

    pub fn into_changes(self) -> PrincipalChanges {
        PrincipalChanges {
            username: self.username,
            email: self.email,
            phone: self.phone,
            date_of_birth: self.date_of_birth,
            image: None,
            specialty: self.specialty,
            experience: self.experience,
            location: self.location,
            description: self.description,
            prices: self.prices,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthPatch {
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
}

impl HealthPatch {
    pub fn is_empty(&self) -> bool {
        self.gender.is_none() && self.height.is_none() && self.weight.is_none()
    }
}

/// Body of `PUT /auth/profile`: identity and health fields side by side.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdateRequest {
    #[serde(flatten)]
    pub identity: IdentityPatch,
    #[serde(flatten)]
    pub health: HealthPatch,
}

/// Merged read view of a principal and its health record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub user: PrincipalView,
    pub health_info: Option<HealthView>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub message: &'static str,
    pub data: ProfileView,
}

#[derive(Debug, Serialize)]
pub struct TrainerUpdateResponse {
    pub message: &'static str,
    pub updated: PrincipalView,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn profile_request_splits_identity_and_health() {
        let req: ProfileUpdateRequest = serde_json::from_value(json!({
            "email": "new@x.com",
            "dateOfBirth": "1990-12-31",
            "height": 0,
            "gender": "female"
        }))
        .unwrap();
        assert_eq!(req.identity.email.as_deref(), Some("new@x.com"));
        assert!(req.identity.username.is_none());
        assert!(req.identity.date_of_birth.is_some());
        // zero is a supplied value, not an absent one
        assert_eq!(req.health.height, Some(0.0));
        assert_eq!(req.health.gender, Some(Gender::Female));
        assert!(req.health.weight.is_none());
    }

    #[test]
    fn empty_body_is_an_empty_patch() {
        let req: ProfileUpdateRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.health.is_empty());
        assert!(req.identity.into_changes().is_empty());
    }

    #[test]
    fn filter_covers_only_supplied_unique_fields() {
        let patch = IdentityPatch {
            phone: Some("0123".into()),
            specialty: Some("yoga".into()),
            ..Default::default()
        };
        let f = patch.identity_filter();
        assert_eq!(f.phone, Some("0123"));
        assert!(f.username.is_none() && f.email.is_none());
    }
}
