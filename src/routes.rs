use std::sync::Arc;

use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{middleware, Form, Json, Router};
use http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::config::AuthConfig;
use crate::credentials::{CredentialStore, CredentialValidator};
use crate::error::AuthError;
use crate::issuer::TokenIssuer;
use crate::middleware::{require_auth, AuthUser, AuthorizationGate};
use crate::session::SessionBinder;

/// Everything the login and protected routes need.
#[derive(Debug, Clone)]
pub struct AppState {
    pub issuer: Arc<TokenIssuer>,
    pub gate: Arc<AuthorizationGate>,
    pub credentials: CredentialValidator,
    pub session: SessionBinder,
}

impl AppState {
    pub fn new(config: &AuthConfig, store: Arc<dyn CredentialStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            issuer: Arc::new(TokenIssuer::new(config, clock.clone())),
            gate: Arc::new(AuthorizationGate::new(config, clock)),
            credentials: CredentialValidator::new(store),
            session: SessionBinder::new(config.cookie_name.clone()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// `GET /` login form, `POST /login`, and the gated `GET /restricted`.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/restricted", get(restricted))
        .route_layer(middleware::from_fn_with_state(state.gate.clone(), require_auth));

    Router::new()
        .route("/", get(login_form))
        .route("/login", post(login))
        .merge(protected)
        .with_state(state)
}

async fn login(
    State(state): State<AppState>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<impl IntoResponse, AuthError> {
    // An unreadable body is just a failed login.
    let form = form.map(|Form(form)| form).unwrap_or_default();

    let identity = state
        .credentials
        .resolve(&form.username, &form.password)
        .ok_or(AuthError::InvalidCredentials)?;

    let issued = state.issuer.issue(&identity)?;

    let mut headers = HeaderMap::new();
    state
        .session
        .attach(&issued.token, issued.claims.exp, &mut headers)?;

    tracing::info!(user = %form.username, "login succeeded");

    Ok((headers, Json(TokenResponse { token: issued.token })))
}

async fn restricted(user: AuthUser) -> String {
    format!("Welcome {}!", user.claims.name)
}

async fn login_form() -> Html<&'static str> {
    Html(concat!(
        "<!doctype html>\n",
        "<form method=\"post\" action=\"/login\">\n",
        "  <label>Username <input name=\"username\" autocomplete=\"username\"></label>\n",
        "  <label>Password <input name=\"password\" type=\"password\"></label>\n",
        "  <button type=\"submit\">Sign in</button>\n",
        "</form>\n",
    ))
}
