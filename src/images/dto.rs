use serde::Serialize;

use crate::accounts::PrincipalView;

#[derive(Debug, Serialize)]
pub struct AvatarResponse {
    pub message: &'static str,
    pub user: PrincipalView,
}
