use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use warbler_db::DbError;
use warbler_types::api::{NewMessageRequest, TimelineResponse};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::Session;
use crate::policy::{Action, authorize, authorize_user};
use crate::{run_blocking, views};

/// GET /, the viewer's timeline: their messages and those of everyone they
/// follow. Anonymous viewers get an empty page.
pub async fn home(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(session.identity(), Action::ViewTimeline)?;

    let Some(user) = session.user else {
        return Ok(Json(TimelineResponse {
            user: None,
            messages: vec![],
        }));
    };

    let limit = state.timeline_limit;
    let user_id = user.id;
    let messages = run_blocking(&state, move |db| {
        let rows = db.timeline(user_id, limit)?;
        views::present_messages(db, Some(user_id), rows)
    })
    .await?;

    Ok(Json(TimelineResponse {
        user: Some(views::user_summary(&user)),
        messages,
    }))
}

/// POST /messages/new
pub async fn new_message(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(req): Json<NewMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = authorize_user(session.identity(), Action::CreateMessage)?;

    let mut messages = run_blocking(&state, move |db| {
        let row = db.create_message(user_id, &req.text)?;
        views::present_messages(db, Some(user_id), vec![row])
    })
    .await?;

    let message = messages.pop().ok_or(ApiError::Internal)?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /messages/{id}
pub async fn show_message(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(message_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(session.identity(), Action::ViewMessage)?;

    let viewer = session.identity().user_id();
    let mut messages = run_blocking(&state, move |db| {
        let row = db
            .get_message(message_id)?
            .ok_or_else(|| DbError::NotFound("Message".into()))?;
        views::present_messages(db, viewer, vec![row])
    })
    .await?;

    let message = messages.pop().ok_or(ApiError::Internal)?;
    Ok(Json(message))
}

/// POST /messages/{id}/delete: owner only.
pub async fn delete_message(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(message_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let identity = session.identity();
    if !identity.is_authenticated() {
        return Err(ApiError::Unauthorized);
    }

    let removed = run_blocking(&state, move |db| {
        db.delete_message_if(message_id, |message| {
            authorize(identity, Action::DeleteMessage { owner_id: message.user_id }).is_ok()
        })
    })
    .await?;

    if !removed {
        return Err(ApiError::Unauthorized);
    }
    Ok(StatusCode::NO_CONTENT)
}
