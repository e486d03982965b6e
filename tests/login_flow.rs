use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use axum_sealed_jwt::{router, AppState, AuthConfig, ManualClock, Secrets, StaticCredentials, TokenResponse};
use tower::ServiceExt;

const NOW: i64 = 1_700_000_000;

fn app() -> (Router, Arc<ManualClock>) {
    let mut key = [0u8; 32];
    key[..15].copy_from_slice(b"myEncryptionKey");
    let config = AuthConfig::new(Secrets::new(&key, "mySigningKey").unwrap());
    let clock = Arc::new(ManualClock::new(NOW));
    let state = AppState::new(&config, Arc::new(StaticCredentials::demo()), clock.clone());
    (router(state), clock)
}

async fn login(app: &Router, username: &str, password: &str) -> Response {
    let request = Request::post("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("username={username}&password={password}")))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn restricted(app: &Router, cookie: Option<&str>) -> Response {
    let mut request = Request::get("/restricted");
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_string(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Cookie pair (`X-Jwt=<token>`) from a `Set-Cookie` header.
fn cookie_pair(response: &Response) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("set-cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn login_issues_token_and_cookie() {
    let (app, _) = app();
    let response = login(&app, "jon", "shhh%21").await;
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("X-Jwt="));
    assert!(set_cookie.contains("Path=/"));
    // NOW + 72h = 2023-11-17T22:13:20Z
    assert!(set_cookie.contains("Expires=Fri, 17 Nov 2023 22:13:20 GMT"));

    let cookie_token = cookie_pair(&response).trim_start_matches("X-Jwt=").to_string();
    let body: TokenResponse = serde_json::from_str(&body_string(response).await).unwrap();
    assert!(!body.token.is_empty());
    assert_eq!(body.token, cookie_token);
}

#[tokio::test]
async fn wrong_password_is_unauthorized_without_cookie() {
    let (app, _) = app();
    let response = login(&app, "jon", "wrong").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn missing_form_fields_are_unauthorized() {
    let (app, _) = app();
    let request = Request::post("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("username=jon"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_without_form_body_is_unauthorized() {
    let (app, _) = app();
    let response = app
        .clone()
        .oneshot(Request::post("/login").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());

    let request = Request::post("/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"username":"jon","password":"shhh!"}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn cookie_from_login_grants_access() {
    let (app, _) = app();
    let cookie = cookie_pair(&login(&app, "jon", "shhh%21").await);

    let response = restricted(&app, Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "Welcome Jon Snow!");
}

#[tokio::test]
async fn no_cookie_is_unauthorized() {
    let (app, _) = app();
    let response = restricted(&app, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_past_72_hours_is_unauthorized() {
    let (app, clock) = app();
    let cookie = cookie_pair(&login(&app, "jon", "shhh%21").await);

    clock.advance(72 * 3_600 + 1);

    let response = restricted(&app, Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn rejection_reason_is_not_echoed() {
    let (app, _) = app();
    let cookie = cookie_pair(&login(&app, "jon", "shhh%21").await);
    let tampered = format!("{cookie}x");

    let response = restricted(&app, Some(&tampered)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_string(response).await;
    assert_eq!(body, r#"{"error":"Unauthorized","status":401}"#);
    assert!(!body.to_lowercase().contains("signature"));
}

#[tokio::test]
async fn login_form_is_served() {
    let (app, _) = app();
    let response = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("action=\"/login\""));
}
