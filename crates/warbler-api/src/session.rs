//! Session transport: a signed JWT in an HttpOnly cookie.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::{debug, error};
use warbler_types::session::{SESSION_COOKIE, SessionClaims};

use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl: chrono::Duration,
}

pub fn issue_token(config: &SessionConfig, user_id: i64) -> Result<String, ApiError> {
    let expires = chrono::Utc::now().checked_add_signed(config.ttl).ok_or_else(|| {
        error!("Session expiry out of range for ttl {}", config.ttl);
        ApiError::Internal
    })?;
    let claims = SessionClaims {
        curr_user: user_id,
        exp: expires.timestamp().max(0) as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| {
        error!("Failed to sign session token: {}", e);
        ApiError::Internal
    })
}

/// The user id in a valid, unexpired token.
pub fn decode_token(config: &SessionConfig, token: &str) -> Option<i64> {
    match decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    ) {
        Ok(data) => Some(data.claims.curr_user),
        Err(e) => {
            debug!("Rejected session token: {}", e);
            None
        }
    }
}

/// Read the session cookie, if present and valid.
pub fn current_user_id(config: &SessionConfig, jar: &CookieJar) -> Option<i64> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| decode_token(config, cookie.value()))
}

/// Set the session cookie for `user_id`.
pub fn login(jar: CookieJar, config: &SessionConfig, user_id: i64) -> Result<CookieJar, ApiError> {
    let token = issue_token(config, user_id)?;

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    Ok(jar.add(cookie))
}

/// Clear the session cookie.
pub fn logout(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}
