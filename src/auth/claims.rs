use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::accounts::Role;

/// JWT payload. Validity is fully determined by signature and `exp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,   // subject (principal id)
    pub role: Role, // role at issuance
    pub iat: i64,   // issued at (unix timestamp)
    pub exp: i64,   // expires at, always iat + 7 days
}
