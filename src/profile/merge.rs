//! Profile merge engine: partial identity updates, lazily created health
//! records, and the merged profile view. Both profile routes go through here
//! so the uniqueness check and field rules are applied identically.

use time::OffsetDateTime;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::dto::{HealthPatch, IdentityPatch, ProfileUpdateRequest, ProfileView};
use crate::accounts::{uniqueness, AccountStore, Principal, PrincipalView, Role};
use crate::auth::services::is_valid_email;
use crate::db::{StoreError, UniqueKey};
use crate::error::{AppError, AppResult};
use crate::health::{
    body_metrics,
    repo_types::{DEFAULT_GENDER, DEFAULT_HEIGHT_CM, DEFAULT_WEIGHT_KG},
    HealthRecord, HealthStore, HealthView,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Username,
    Email,
    Phone,
    DateOfBirth,
    Specialty,
    Experience,
    Location,
    Description,
    Prices,
}

const IDENTITY_FIELDS: &[ProfileField] = &[
    ProfileField::Username,
    ProfileField::Email,
    ProfileField::Phone,
    ProfileField::DateOfBirth,
];

const TRAINER_FIELDS: &[ProfileField] = &[
    ProfileField::Username,
    ProfileField::Email,
    ProfileField::Phone,
    ProfileField::DateOfBirth,
    ProfileField::Specialty,
    ProfileField::Experience,
    ProfileField::Location,
    ProfileField::Description,
    ProfileField::Prices,
];

/// Fields a principal of `role` may change on its own profile.
pub fn editable_fields(role: Role) -> &'static [ProfileField] {
    match role {
        Role::User => IDENTITY_FIELDS,
        Role::Pt | Role::Admin => TRAINER_FIELDS,
    }
}

fn supplied_fields(patch: &IdentityPatch) -> Vec<ProfileField> {
    let flags = [
        (patch.username.is_some(), ProfileField::Username),
        (patch.email.is_some(), ProfileField::Email),
        (patch.phone.is_some(), ProfileField::Phone),
        (patch.date_of_birth.is_some(), ProfileField::DateOfBirth),
        (patch.specialty.is_some(), ProfileField::Specialty),
        (patch.experience.is_some(), ProfileField::Experience),
        (patch.location.is_some(), ProfileField::Location),
        (patch.description.is_some(), ProfileField::Description),
        (patch.prices.is_some(), ProfileField::Prices),
    ];
    flags
        .into_iter()
        .filter_map(|(present, field)| present.then_some(field))
        .collect()
}

fn validate_identity(patch: &IdentityPatch) -> AppResult<()> {
    if patch.username.as_deref() == Some("") {
        return Err(AppError::validation("username must not be empty"));
    }
    if let Some(email) = patch.email.as_deref() {
        if !is_valid_email(email) {
            return Err(AppError::validation("invalid email"));
        }
    }
    if patch.phone.as_deref() == Some("") {
        return Err(AppError::validation("phone must not be empty"));
    }
    if matches!(patch.experience, Some(years) if years < 0) {
        return Err(AppError::validation("experience must not be negative"));
    }
    Ok(())
}

fn user_not_found(err: StoreError) -> AppError {
    match err {
        StoreError::NotFound => AppError::NotFound("user"),
        other => other.into(),
    }
}

/// Applies only the supplied fields to the stored principal.
pub async fn update_identity(
    accounts: &dyn AccountStore,
    principal_id: Uuid,
    patch: IdentityPatch,
) -> AppResult<Principal> {
    let current = accounts
        .find_by_id(principal_id)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    let allowed = editable_fields(current.role);
    if let Some(field) = supplied_fields(&patch).into_iter().find(|f| !allowed.contains(f)) {
        warn!(user_id = %principal_id, role = %current.role, ?field, "field not editable for role");
        return Err(AppError::Forbidden);
    }
    validate_identity(&patch)?;

    let changes = {
        let candidate = patch.identity_filter().excluding(principal_id);
        uniqueness::ensure_available(accounts, &candidate).await?;
        patch.into_changes()
    };
    if changes.is_empty() {
        return Ok(current);
    }

    // A concurrent writer can still claim the value after the pre-check;
    // the store's unique violation comes back as the same Conflict.
    let updated = accounts
        .update_by_id(principal_id, changes)
        .await
        .map_err(user_not_found)?;
    info!(user_id = %principal_id, "identity updated");
    Ok(updated)
}

fn apply_health(record: &mut HealthRecord, patch: &HealthPatch) -> AppResult<()> {
    if let Some(gender) = patch.gender {
        record.gender = gender;
    }
    if patch.height.is_some() || patch.weight.is_some() {
        let height = patch.height.unwrap_or(record.height());
        let weight = patch.weight.unwrap_or(record.weight());
        record.set_measurements(height, weight)?;
    }
    Ok(())
}

async fn save_patched(
    health: &dyn HealthStore,
    mut record: HealthRecord,
    patch: &HealthPatch,
) -> AppResult<HealthRecord> {
    apply_health(&mut record, patch)?;
    Ok(health.update(record).await?)
}

/// Creates the owner's health record with defaults for absent fields, or
/// mutates only the supplied fields of the existing one. BMI is recomputed
/// either way.
pub async fn update_health(
    health: &dyn HealthStore,
    owner_id: Uuid,
    patch: HealthPatch,
) -> AppResult<HealthRecord> {
    if let Some(existing) = health.find_by_owner(owner_id).await? {
        let saved = save_patched(health, existing, &patch).await?;
        debug!(owner_id = %owner_id, bmi = saved.bmi(), "health record updated");
        return Ok(saved);
    }

    let record = HealthRecord::new(
        owner_id,
        patch.gender.unwrap_or(DEFAULT_GENDER),
        patch.height.unwrap_or(DEFAULT_HEIGHT_CM),
        patch.weight.unwrap_or(DEFAULT_WEIGHT_KG),
    )?;
    match health.insert(record).await {
        Ok(created) => {
            info!(owner_id = %owner_id, bmi = created.bmi(), "health record created");
            Ok(created)
        }
        Err(StoreError::UniqueViolation(UniqueKey::HealthOwner)) => {
            debug!(owner_id = %owner_id, "health record created concurrently; patching it");
            let existing = health
                .find_by_owner(owner_id)
                .await?
                .ok_or(AppError::NotFound("health record"))?;
            save_patched(health, existing, &patch).await
        }
        Err(e) => Err(e.into()),
    }
}

/// Current principal plus current health record, read after any prior write.
pub async fn compose_profile_view(
    accounts: &dyn AccountStore,
    health: &dyn HealthStore,
    principal_id: Uuid,
) -> AppResult<ProfileView> {
    let user = accounts
        .find_by_id(principal_id)
        .await?
        .ok_or(AppError::NotFound("user"))?;
    let record = health.find_by_owner(principal_id).await?;
    Ok(ProfileView {
        user: PrincipalView::at(&user, OffsetDateTime::now_utc()),
        health_info: record.as_ref().map(HealthView::from),
    })
}

/// Rejects supplied measurements that can never produce a BMI. Stored and
/// default measurements are always valid, so only supplied values can fail.
fn check_measurements(patch: &HealthPatch) -> AppResult<()> {
    body_metrics(
        patch.height.unwrap_or(DEFAULT_HEIGHT_CM),
        patch.weight.unwrap_or(DEFAULT_WEIGHT_KG),
    )?;
    Ok(())
}

/// Identity patch, then health patch when one was supplied, then a fresh view.
/// Measurements are checked before the identity write, so a rejected request
/// leaves both sides unchanged.
pub async fn update_profile(
    accounts: &dyn AccountStore,
    health: &dyn HealthStore,
    principal_id: Uuid,
    req: ProfileUpdateRequest,
) -> AppResult<ProfileView> {
    check_measurements(&req.health)?;
    update_identity(accounts, principal_id, req.identity).await?;
    if !req.health.is_empty() {
        update_health(health, principal_id, req.health).await?;
    }
    compose_profile_view(accounts, health, principal_id).await
}
