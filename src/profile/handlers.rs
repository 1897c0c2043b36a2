use axum::{
    extract::State,
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{IdentityPatch, ProfileResponse, ProfileUpdateRequest, TrainerUpdateResponse},
    merge,
};
use crate::{
    accounts::{PrincipalView, Role},
    auth::{extractors::CurrentPrincipal, gate::authorize},
    error::{AppError, AppResult},
    extract::{AppJson, AppPath},
    state::AppState,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", put(put_profile))
        .route("/profile/me", get(get_profile_me))
        .route("/trainer/profile", put(put_trainer_profile))
}

pub fn trainer_routes() -> Router<AppState> {
    Router::new()
        .route("/trainers", get(list_trainers))
        .route("/trainers/:id", get(get_trainer))
}

#[instrument(skip_all, fields(user_id = %principal.id))]
pub async fn put_profile(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    AppJson(payload): AppJson<ProfileUpdateRequest>,
) -> AppResult<Json<ProfileResponse>> {
    let data = merge::update_profile(
        state.accounts.as_ref(),
        state.health.as_ref(),
        principal.id,
        payload,
    )
    .await?;
    Ok(Json(ProfileResponse {
        message: "Profile updated",
        data,
    }))
}

#[instrument(skip_all, fields(user_id = %principal.id))]
pub async fn get_profile_me(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> AppResult<Json<ProfileResponse>> {
    let data =
        merge::compose_profile_view(state.accounts.as_ref(), state.health.as_ref(), principal.id)
            .await?;
    Ok(Json(ProfileResponse {
        message: "Profile loaded",
        data,
    }))
}

#[instrument(skip_all, fields(user_id = %principal.id))]
pub async fn put_trainer_profile(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    AppJson(payload): AppJson<IdentityPatch>,
) -> AppResult<Json<TrainerUpdateResponse>> {
    authorize(&principal, &[Role::Pt, Role::Admin])?;
    let updated = merge::update_identity(state.accounts.as_ref(), principal.id, payload).await?;
    info!("trainer profile updated");
    Ok(Json(TrainerUpdateResponse {
        message: "Trainer profile updated",
        updated: PrincipalView::from(&updated),
    }))
}

#[instrument(skip(state))]
pub async fn list_trainers(State(state): State<AppState>) -> AppResult<Json<Vec<PrincipalView>>> {
    let trainers = state.accounts.list_by_role(Role::Pt).await?;
    Ok(Json(trainers.iter().map(PrincipalView::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_trainer(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<PrincipalView>> {
    match state.accounts.find_by_id(id).await? {
        Some(p) if p.role == Role::Pt => Ok(Json(PrincipalView::from(&p))),
        _ => Err(AppError::NotFound("trainer")),
    }
}
