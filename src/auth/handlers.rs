use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{AuthResponse, LoginRequest, MeResponse, MessageResponse, RegisterRequest},
    extractors::CurrentPrincipal,
    gate::authorize,
    services,
};
use crate::{
    accounts::{PrincipalView, Role},
    error::AppResult,
    extract::AppJson,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route("/admin", get(admin_only))
        .route("/pt", get(trainer_or_admin))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let session = services::register(state.accounts.as_ref(), &state.keys, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "Registration successful",
            token: session.token,
            user: PrincipalView::from(&session.principal),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let session = services::login(state.accounts.as_ref(), &state.keys, payload).await?;
    Ok(Json(AuthResponse {
        message: "Login successful",
        token: session.token,
        user: PrincipalView::from(&session.principal),
    }))
}

#[instrument(skip_all)]
pub async fn get_me(CurrentPrincipal(principal): CurrentPrincipal) -> Json<MeResponse> {
    Json(MeResponse {
        user: PrincipalView::from(&principal),
    })
}

#[instrument(skip_all)]
pub async fn admin_only(
    CurrentPrincipal(principal): CurrentPrincipal,
) -> AppResult<Json<MessageResponse>> {
    authorize(&principal, &[Role::Admin])?;
    Ok(Json(MessageResponse {
        message: "Admin area",
    }))
}

#[instrument(skip_all)]
pub async fn trainer_or_admin(
    CurrentPrincipal(principal): CurrentPrincipal,
) -> AppResult<Json<MessageResponse>> {
    authorize(&principal, &[Role::Pt, Role::Admin])?;
    Ok(Json(MessageResponse {
        message: "Trainer and admin area",
    }))
}
