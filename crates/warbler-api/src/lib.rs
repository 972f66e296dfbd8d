pub mod auth;
pub mod error;
pub mod follows;
pub mod likes;
pub mod messages;
pub mod middleware;
pub mod policy;
pub mod routes;
pub mod session;
pub mod users;
pub mod views;

use tracing::error;
use warbler_db::Database;

use crate::auth::AppState;
use crate::error::ApiError;

/// Run a database unit of work off the async runtime.
pub(crate) async fn run_blocking<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> warbler_db::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })?
        .map_err(ApiError::from)
}
