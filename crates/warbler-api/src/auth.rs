use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, warn};

use warbler_db::Database;
use warbler_db::models::NewUser;
use warbler_types::api::{AuthResponse, LoginRequest, SignupRequest};

use crate::error::ApiError;
use crate::session::{self, SessionConfig};
use crate::{run_blocking, views};

/// Default timeline page size.
pub const DEFAULT_TIMELINE_LIMIT: u32 = 100;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub session: SessionConfig,
    pub timeline_limit: u32,
}

/// POST /signup: create the account and log it in.
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = run_blocking(&state, move |db| {
        db.signup(&NewUser {
            username: &req.username,
            email: &req.email,
            password: req.password.as_deref(),
            image_url: req.image_url.as_deref(),
        })
    })
    .await?;

    let jar = session::login(jar, &state.session, user.id)?;

    Ok((
        StatusCode::CREATED,
        jar,
        Json(AuthResponse {
            user: views::user_summary(&user),
        }),
    ))
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = req.username.clone();
    let user = run_blocking(&state, move |db| db.authenticate(&req.username, &req.password))
        .await?
        .ok_or_else(|| {
            warn!("Failed login attempt for {}", username);
            ApiError::InvalidCredentials
        })?;

    let jar = session::login(jar, &state.session, user.id)?;
    info!(user_id = user.id, "User logged in");

    Ok((
        jar,
        Json(AuthResponse {
            user: views::user_summary(&user),
        }),
    ))
}

/// POST /logout
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (session::logout(jar), StatusCode::NO_CONTENT)
}
