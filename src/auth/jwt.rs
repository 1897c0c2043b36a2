use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use super::claims::Claims;
use crate::accounts::Role;
use crate::error::{AppError, AppResult};

/// Fixed validity window of every issued token.
pub const TOKEN_TTL: Duration = Duration::days(7);

/// HS256 signing material, built once at startup and read-only afterwards.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    pub fn issue(&self, subject: Uuid, role: Role) -> AppResult<String> {
        self.issue_at(subject, role, OffsetDateTime::now_utc())
    }

    pub fn issue_at(&self, subject: Uuid, role: Role, issued_at: OffsetDateTime) -> AppResult<String> {
        let iat = issued_at.unix_timestamp();
        let claims = Claims {
            id: subject,
            role,
            iat,
            exp: iat + TOKEN_TTL.whole_seconds(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Crypto(format!("jwt encode: {e}")))?;
        debug!(user_id = %subject, role = %role, "jwt signed");
        Ok(token)
    }

    /// Signature, structure and expiry must all hold; anything else is
    /// [`AppError::InvalidCredential`].
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat"]);
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            debug!(error = %e, "jwt rejected");
            AppError::InvalidCredential
        })?;
        debug!(user_id = %data.claims.id, role = %data.claims.role, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys() -> JwtKeys {
        JwtKeys::from_secret(b"dev-secret")
    }

    fn flip_char(token: &str, idx: usize) -> String {
        let mut bytes = token.as_bytes().to_vec();
        bytes[idx] = if bytes[idx] == b'A' { b'B' } else { b'A' };
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn sign_and_verify_round_trip() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let token = keys.issue(user_id, Role::Pt).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.id, user_id);
        assert_eq!(claims.role, Role::Pt);
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn token_inside_window_is_accepted() {
        let keys = make_keys();
        let issued = OffsetDateTime::now_utc() - Duration::days(6);
        let token = keys.issue_at(Uuid::new_v4(), Role::User, issued).unwrap();
        assert!(keys.verify(&token).is_ok());
    }

    #[test]
    fn token_past_seven_days_is_rejected() {
        let keys = make_keys();
        let issued = OffsetDateTime::now_utc() - TOKEN_TTL - Duration::seconds(1);
        let token = keys.issue_at(Uuid::new_v4(), Role::Admin, issued).unwrap();
        assert!(matches!(keys.verify(&token), Err(AppError::InvalidCredential)));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let keys = make_keys();
        let token = keys.issue(Uuid::new_v4(), Role::User).unwrap();
        let payload_start = token.find('.').unwrap() + 1;
        let sig_start = token.rfind('.').unwrap() + 1;
        let sig_middle = sig_start + (token.len() - sig_start) / 2;

        for idx in [payload_start + 2, sig_middle] {
            let tampered = flip_char(&token, idx);
            assert_ne!(tampered, token);
            assert!(matches!(keys.verify(&tampered), Err(AppError::InvalidCredential)));
        }
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let token = JwtKeys::from_secret(b"other").issue(Uuid::new_v4(), Role::User).unwrap();
        assert!(matches!(make_keys().verify(&token), Err(AppError::InvalidCredential)));
    }

    #[test]
    fn garbage_is_rejected() {
        let keys = make_keys();
        for token in ["", "not-a-token", "a.b.c"] {
            assert!(matches!(keys.verify(token), Err(AppError::InvalidCredential)));
        }
    }
}
