use tracing::warn;

use super::jwt::JwtKeys;
use crate::accounts::{AccountStore, Principal, Role};
use crate::error::{AppError, AppResult};

/// Verifies the bearer token and loads the principal it names.
///
/// Any token problem, or a subject that no longer exists, is
/// [`AppError::Unauthenticated`]. Store outages surface as themselves.
pub async fn authenticate(
    keys: &JwtKeys,
    accounts: &dyn AccountStore,
    token: &str,
) -> AppResult<Principal> {
    let claims = keys.verify(token).map_err(|e| {
        warn!(error = %e, "bearer token rejected");
        AppError::Unauthenticated
    })?;
    match accounts.find_by_id(claims.id).await? {
        Some(principal) => Ok(principal),
        None => {
            warn!(user_id = %claims.id, "token subject no longer exists");
            Err(AppError::Unauthenticated)
        }
    }
}

/// Pure role-membership check.
pub fn authorize(principal: &Principal, allowed: &[Role]) -> AppResult<()> {
    if allowed.contains(&principal.role) {
        Ok(())
    } else {
        warn!(user_id = %principal.id, role = %principal.role, ?allowed, "role not permitted");
        Err(AppError::Forbidden)
    }
}
