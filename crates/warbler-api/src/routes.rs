use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::{self, AppState};
use crate::middleware::resolve_session;
use crate::{follows, likes, messages, users};

/// Every route sees a freshly resolved `Session`; handlers apply the
/// authorization rules themselves.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(messages::home))
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/users", get(users::list_users))
        .route("/users/profile", get(users::edit_profile).post(users::update_profile))
        .route("/users/delete", post(users::delete_user))
        .route("/users/{id}", get(users::show_user))
        .route("/users/{id}/following", get(users::show_following))
        .route("/users/{id}/followers", get(users::show_followers))
        .route("/users/{id}/likes", get(users::show_likes))
        .route("/users/follow/{id}", post(follows::follow))
        .route("/users/stop-following/{id}", post(follows::stop_following))
        .route("/users/add_like/{message_id}", post(likes::add_like))
        .route("/users/remove_like/{message_id}", post(likes::remove_like))
        .route("/messages/new", post(messages::new_message))
        .route("/messages/{id}", get(messages::show_message))
        .route("/messages/{id}/delete", post(messages::delete_message))
        .layer(middleware::from_fn_with_state(state.clone(), resolve_session))
        .with_state(state)
}
