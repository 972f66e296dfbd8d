use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use warbler_db::DbError;
use warbler_types::api::LikeResponse;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::Session;
use crate::policy::{Action, authorize_user};
use crate::run_blocking;

/// POST /users/add_like/{message_id}
pub async fn add_like(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(message_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = authorize_user(session.identity(), Action::Like)?;

    let likes = run_blocking(&state, move |db| {
        db.like(user_id, message_id)?;
        db.like_count(message_id)
    })
    .await?;

    Ok(Json(LikeResponse {
        message_id,
        liked: true,
        likes,
    }))
}

/// POST /users/remove_like/{message_id}
pub async fn remove_like(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(message_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = authorize_user(session.identity(), Action::Unlike)?;

    let likes = run_blocking(&state, move |db| {
        if db.get_message(message_id)?.is_none() {
            return Err(DbError::NotFound("Message".into()));
        }
        db.unlike(user_id, message_id)?;
        db.like_count(message_id)
    })
    .await?;

    Ok(Json(LikeResponse {
        message_id,
        liked: false,
        likes,
    }))
}
