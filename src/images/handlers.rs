use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use tracing::{instrument, warn};

use super::dto::AvatarResponse;
use super::services::{upload_avatar, UploadItem, MAX_AVATAR_BYTES};
use crate::{
    accounts::PrincipalView,
    auth::extractors::CurrentPrincipal,
    error::{AppError, AppResult},
    state::AppState,
};

const AVATAR_FIELD: &str = "avatar";

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/upload-avatar", post(post_avatar))
        // headroom for multipart framing; the file itself is capped in the service
        .layer(DefaultBodyLimit::max(MAX_AVATAR_BYTES + 1024 * 1024))
}

/// POST /upload-avatar (multipart, field `avatar`)
#[instrument(skip_all, fields(user_id = %principal.id))]
pub async fn post_avatar(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    mp: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<AvatarResponse>> {
    let mut mp = mp?;
    let mut upload = None;
    while let Some(field) = mp.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(AVATAR_FIELD) {
            continue;
        }
        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".into());
        let body = field.bytes().await.map_err(multipart_error)?;
        upload = Some(UploadItem { body, content_type });
        break;
    }
    let Some(item) = upload else {
        return Err(AppError::validation("avatar file is required"));
    };

    let updated = upload_avatar(&state, principal.id, item).await?;
    Ok(Json(AvatarResponse {
        message: "Avatar uploaded",
        user: PrincipalView::from(&updated),
    }))
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    warn!(error = %e, "malformed multipart body");
    AppError::validation(e.body_text())
}
