use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod merge;

pub use dto::{HealthPatch, IdentityPatch, ProfileUpdateRequest, ProfileView};
pub use merge::{compose_profile_view, editable_fields, update_health, update_identity, ProfileField};

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::profile_routes())
        .merge(handlers::trainer_routes())
}
