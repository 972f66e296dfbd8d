use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use warbler_db::DbError;
use warbler_types::api::ConnectionsResponse;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::Session;
use crate::policy::{Action, authorize_user};
use crate::{run_blocking, views};

/// POST /users/follow/{id}: returns who the viewer now follows.
pub async fn follow(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(target_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = authorize_user(session.identity(), Action::Follow)?;
    update_following(&state, user_id, target_id, true).await
}

/// POST /users/stop-following/{id}
pub async fn stop_following(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(target_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = authorize_user(session.identity(), Action::Unfollow)?;
    update_following(&state, user_id, target_id, false).await
}

async fn update_following(
    state: &AppState,
    user_id: i64,
    target_id: i64,
    follow: bool,
) -> Result<Json<ConnectionsResponse>, ApiError> {
    let (user, following) = run_blocking(state, move |db| {
        if follow {
            db.follow(user_id, target_id)?;
        } else {
            db.unfollow(user_id, target_id)?;
        }
        let user = db
            .get_user(user_id)?
            .ok_or_else(|| DbError::NotFound("User".into()))?;
        Ok((user, db.following(user_id)?))
    })
    .await?;

    Ok(Json(ConnectionsResponse {
        user: views::user_summary(&user),
        users: following.iter().map(views::user_summary).collect(),
    }))
}
