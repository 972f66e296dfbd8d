//! Shared fixtures for HTTP tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use warbler_api::auth::{AppState, AppStateInner, DEFAULT_TIMELINE_LIMIT};
use warbler_api::routes::router;
use warbler_api::session::{SessionConfig, issue_token};
use warbler_db::Database;
use warbler_db::models::{MessageRow, NewUser, UserRow};
use warbler_types::session::SESSION_COOKIE;

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub json: Value,
    /// `name=value` from the Set-Cookie header, if any.
    pub cookie: Option<String>,
}

impl TestApp {
    pub fn new() -> Self {
        let state: AppState = Arc::new(AppStateInner {
            db: Database::open_in_memory().expect("in-memory database"),
            session: SessionConfig {
                secret: "test-secret".into(),
                ttl: chrono::Duration::days(1),
            },
            timeline_limit: DEFAULT_TIMELINE_LIMIT,
        });
        let router = router(state.clone());
        Self { state, router }
    }

    pub fn db(&self) -> &Database {
        &self.state.db
    }

    pub fn signup(&self, name: &str) -> UserRow {
        let email = format!("{}@gmail.com", name);
        self.db()
            .signup(&NewUser {
                username: name,
                email: &email,
                password: Some("password"),
                image_url: None,
            })
            .expect("signup")
    }

    pub fn post_message(&self, user: &UserRow, text: &str) -> MessageRow {
        self.db().create_message(user.id, text).expect("create message")
    }

    /// A session cookie for `user_id`, as the browser would send it.
    pub fn cookie_for(&self, user_id: i64) -> String {
        let token = issue_token(&self.state.session, user_id).expect("sign token");
        format!("{}={}", SESSION_COOKIE, token)
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        self.request("GET", uri, None, cookie).await
    }

    pub async fn post(&self, uri: &str, body: Option<Value>, cookie: Option<&str>) -> TestResponse {
        self.request("POST", uri, body, cookie).await
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        cookie: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        let body = match body {
            Some(v) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&v).unwrap())
            }
            None => Body::empty(),
        };

        let request = builder.body(body).unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string);

        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, json, cookie }
    }
}

/// Usernames in a JSON array of user summaries.
pub fn usernames(users: &Value) -> Vec<String> {
    users
        .as_array()
        .expect("array of users")
        .iter()
        .map(|u| u["username"].as_str().unwrap().to_string())
        .collect()
}
