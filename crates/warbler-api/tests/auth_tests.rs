//! Signup, login and logout over HTTP.

mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn signup_logs_in() {
    let app = TestApp::new();

    let res = app
        .post(
            "/signup",
            Some(json!({
                "username": "newbie",
                "email": "newbie@gmail.com",
                "password": "password"
            })),
            None,
        )
        .await;

    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.json["user"]["username"], "newbie");
    assert_eq!(res.json["user"]["image_url"], "/static/images/default-pic.png");

    let cookie = res.cookie.expect("session cookie");
    let home = app.get("/", Some(&cookie)).await;
    assert_eq!(home.json["user"]["username"], "newbie");

    let stored = app.db().get_user_by_username("newbie").unwrap().unwrap();
    assert_ne!(stored.password, "password");
}

#[tokio::test]
async fn signup_duplicate_username_conflicts() {
    let app = TestApp::new();
    app.signup("user1");

    let res = app
        .post(
            "/signup",
            Some(json!({
                "username": "user1",
                "email": "fresh@gmail.com",
                "password": "password"
            })),
            None,
        )
        .await;

    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.json["message"], "username already taken.");
    assert!(res.cookie.is_none());
}

#[tokio::test]
async fn signup_without_password_rejected() {
    let app = TestApp::new();

    for body in [
        json!({ "username": "user3", "email": "user3@gmail.com" }),
        json!({ "username": "user3", "email": "user3@gmail.com", "password": "" }),
    ] {
        let res = app.post("/signup", Some(body), None).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
    }
    assert!(app.db().get_user_by_username("user3").unwrap().is_none());
}

#[tokio::test]
async fn login_and_logout() {
    let app = TestApp::new();
    app.signup("user1");

    let res = app
        .post("/login", Some(json!({ "username": "user1", "password": "password" })), None)
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json["user"]["username"], "user1");
    let cookie = res.cookie.expect("session cookie");

    let res = app.post("/logout", None, Some(&cookie)).await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    let cleared = res.cookie.expect("removal cookie");
    assert_eq!(cleared, "warbler_session=");
}

#[tokio::test]
async fn login_failures_are_uniform() {
    let app = TestApp::new();
    app.signup("user1");

    for body in [
        json!({ "username": "user1", "password": "piggies" }),
        json!({ "username": "user7", "password": "password" }),
    ] {
        let res = app.post("/login", Some(body), None).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
        assert_eq!(res.json["message"], "Invalid credentials.");
        assert!(res.cookie.is_none());
    }
}

#[tokio::test]
async fn tampered_cookie_is_anonymous() {
    let app = TestApp::new();
    let user = app.signup("user1");
    let cookie = format!("{}x", app.cookie_for(user.id));

    let res = app.post("/messages/new", Some(json!({ "text": "hi" })), Some(&cookie)).await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}
