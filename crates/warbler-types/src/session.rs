use serde::{Deserialize, Serialize};

/// Name of the cookie carrying the signed session.
pub const SESSION_COOKIE: &str = "warbler_session";

/// Claims signed into the session cookie. `curr_user` is the id of the
/// logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub curr_user: i64,
    pub exp: usize,
}
