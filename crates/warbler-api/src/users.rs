use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::cookie::CookieJar;
use warbler_db::DbError;
use warbler_db::models::ProfileUpdate;
use warbler_types::api::{
    ConnectionsResponse, LikesResponse, ProfileUpdateRequest, UserPage, UserSearchQuery, UserSummary,
};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::Session;
use crate::policy::{Action, authorize, authorize_user};
use crate::{run_blocking, session, views};

/// GET /users?q=: list users, optionally filtered by username.
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserSearchQuery>,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let users = run_blocking(&state, move |db| db.search_users(query.q.as_deref())).await?;
    Ok(Json(users.iter().map(views::user_summary).collect()))
}

/// GET /users/{id}: profile, counts and the user's messages.
pub async fn show_user(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(session.identity(), Action::ViewProfile)?;

    let viewer = session.identity().user_id();
    let limit = state.timeline_limit;
    let page = run_blocking(&state, move |db| {
        let user = db
            .get_user(user_id)?
            .ok_or_else(|| DbError::NotFound("User".into()))?;
        let stats = db.user_stats(user_id)?;
        let rows = db.user_messages(user_id, limit)?;
        let messages = views::present_messages(db, viewer, rows)?;
        let viewer_follows = match viewer {
            Some(viewer_id) => db.is_following(viewer_id, user_id)?,
            None => false,
        };
        Ok(UserPage {
            user: views::user_profile(&user, stats),
            messages,
            viewer_follows,
        })
    })
    .await?;

    Ok(Json(page))
}

/// GET /users/{id}/following
pub async fn show_following(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(session.identity(), Action::ViewConnections)?;
    connections(&state, user_id, Direction::Following).await
}

/// GET /users/{id}/followers
pub async fn show_followers(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(session.identity(), Action::ViewConnections)?;
    connections(&state, user_id, Direction::Followers).await
}

#[derive(Clone, Copy)]
enum Direction {
    Following,
    Followers,
}

async fn connections(
    state: &AppState,
    user_id: i64,
    direction: Direction,
) -> Result<Json<ConnectionsResponse>, ApiError> {
    let (user, users) = run_blocking(state, move |db| {
        let user = db
            .get_user(user_id)?
            .ok_or_else(|| DbError::NotFound("User".into()))?;
        let users = match direction {
            Direction::Following => db.following(user_id)?,
            Direction::Followers => db.followers(user_id)?,
        };
        Ok((user, users))
    })
    .await?;

    Ok(Json(ConnectionsResponse {
        user: views::user_summary(&user),
        users: users.iter().map(views::user_summary).collect(),
    }))
}

/// GET /users/{id}/likes
pub async fn show_likes(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let viewer = authorize_user(session.identity(), Action::ViewLikes)?;

    let limit = state.timeline_limit;
    let (user, messages) = run_blocking(&state, move |db| {
        let user = db
            .get_user(user_id)?
            .ok_or_else(|| DbError::NotFound("User".into()))?;
        let rows = db.liked_messages(user_id, limit)?;
        Ok((user, views::present_messages(db, Some(viewer), rows)?))
    })
    .await?;

    Ok(Json(LikesResponse {
        user: views::user_summary(&user),
        messages,
    }))
}

/// GET /users/profile: the viewer's editable profile.
pub async fn edit_profile(Extension(session): Extension<Session>) -> Result<impl IntoResponse, ApiError> {
    let identity = session.identity();
    let user = session.user.ok_or(ApiError::Unauthorized)?;
    authorize(identity, Action::EditProfile { user_id: user.id })?;
    Ok(Json(views::edit_profile(&user)))
}

/// POST /users/profile: requires the current password.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(req): Json<ProfileUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = session.identity().user_id().ok_or(ApiError::Unauthorized)?;
    authorize(session.identity(), Action::EditProfile { user_id })?;

    let update = ProfileUpdate {
        username: req.username,
        email: req.email,
        image_url: req.image_url,
        header_image_url: req.header_image_url,
        bio: req.bio,
        location: req.location,
    };
    let password = req.password;
    let user = run_blocking(&state, move |db| db.update_profile(user_id, &password, &update)).await?;

    Ok(Json(views::edit_profile(&user)))
}

/// POST /users/delete: delete the viewer's account and end the session.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = session.identity().user_id().ok_or(ApiError::Unauthorized)?;
    authorize(session.identity(), Action::DeleteAccount { user_id })?;

    run_blocking(&state, move |db| db.delete_user(user_id)).await?;

    Ok((session::logout(jar), StatusCode::NO_CONTENT))
}
