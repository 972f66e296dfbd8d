use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;
use warbler_db::models::UserRow;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::policy::Identity;
use crate::run_blocking;
use crate::session;

/// Who the current request is acting as. Resolved fresh for every request.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub user: Option<UserRow>,
}

impl Session {
    pub fn identity(&self) -> Identity {
        Identity::from(self.user.as_ref().map(|u| u.id))
    }
}

/// Resolve the session cookie to a user and stash a `Session` in the request
/// extensions. Missing, invalid or expired cookies, and cookies naming a
/// deleted user, all resolve to an anonymous session.
pub async fn resolve_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let jar = CookieJar::from_headers(req.headers());

    let user = match session::current_user_id(&state.session, &jar) {
        Some(id) => {
            let user = run_blocking(&state, move |db| db.get_user(id)).await?;
            if user.is_none() {
                debug!(user_id = id, "Session names a missing user; treating as anonymous");
            }
            user
        }
        None => None,
    };

    req.extensions_mut().insert(Session { user });
    Ok(next.run(req).await)
}
