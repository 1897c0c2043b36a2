use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use super::dto::{LoginRequest, RegisterRequest};
use super::jwt::JwtKeys;
use super::password::{hash_password, verify_password};
use crate::accounts::{uniqueness, AccountStore, IdentityFilter, NewPrincipal, Principal, Role};
use crate::error::{AppError, AppResult};

/// A freshly issued bearer token together with its principal.
#[derive(Debug)]
pub struct Session {
    pub token: String,
    pub principal: Principal,
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid");
    }
    EMAIL_RE.is_match(email)
}

fn validate_registration(req: &RegisterRequest) -> AppResult<()> {
    if req.username.is_empty() {
        return Err(AppError::validation("username is required"));
    }
    if !is_valid_email(&req.email) {
        return Err(AppError::validation("invalid email"));
    }
    if req.password.is_empty() {
        return Err(AppError::validation("password is required"));
    }
    if req.phone.as_deref() == Some("") {
        return Err(AppError::validation("phone must not be empty"));
    }
    Ok(())
}

pub async fn register(
    accounts: &dyn AccountStore,
    keys: &JwtKeys,
    req: RegisterRequest,
) -> AppResult<Session> {
    validate_registration(&req)?;

    let role = req.role.unwrap_or_default();
    if role == Role::Admin {
        warn!(username = %req.username, "self-registration as admin refused");
        return Err(AppError::Forbidden);
    }

    let candidate = IdentityFilter {
        username: Some(&req.username),
        email: Some(&req.email),
        phone: req.phone.as_deref(),
        exclude_id: None,
    };
    uniqueness::ensure_available(accounts, &candidate).await?;

    let password_hash = hash_password(&req.password)?;
    // The store constraint still decides if a concurrent registration won the race.
    let principal = accounts
        .insert(NewPrincipal {
            username: req.username,
            email: req.email,
            phone: req.phone,
            date_of_birth: req.date_of_birth,
            role,
            password_hash,
        })
        .await?;

    let token = keys.issue(principal.id, principal.role)?;
    info!(user_id = %principal.id, role = %principal.role, "user registered");
    Ok(Session { token, principal })
}

/// Unknown email and wrong password fail identically.
pub async fn login(
    accounts: &dyn AccountStore,
    keys: &JwtKeys,
    req: LoginRequest,
) -> AppResult<Session> {
    let Some(principal) = accounts.find_one(&IdentityFilter::by_email(&req.email)).await? else {
        warn!("login unknown email");
        return Err(AppError::Unauthenticated);
    };

    if !verify_password(&req.password, &principal.password_hash)? {
        warn!(user_id = %principal.id, "login invalid password");
        return Err(AppError::Unauthenticated);
    }

    let token = keys.issue(principal.id, principal.role)?;
    info!(user_id = %principal.id, "user logged in");
    Ok(Session { token, principal })
}
