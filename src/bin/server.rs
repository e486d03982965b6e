//! Login + restricted-page server for sealed tokens.
//!
//! Loads `.env` if present.  Besides the `AuthConfig::from_env` variables
//! it reads `BIND_ADDR` (default `0.0.0.0:1323`) and the demo credential
//! `AUTH_USERNAME` / `AUTH_PASSWORD` / `AUTH_DISPLAY_NAME`
//! (default `jon` / `shhh!` / `Jon Snow`).

use std::sync::Arc;

use axum_sealed_jwt::{router, AppState, AuthConfig, Identity, StaticCredentials, SystemClock};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AuthConfig::from_env()?;
    let state = AppState::new(&config, Arc::new(credentials()), Arc::new(SystemClock));

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:1323".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, cookie = %state.session.cookie_name(), "listening");

    axum::serve(listener, router(state)).await?;
    Ok(())
}

fn credentials() -> StaticCredentials {
    let demo = StaticCredentials::demo();
    match (std::env::var("AUTH_USERNAME"), std::env::var("AUTH_PASSWORD")) {
        (Ok(user), Ok(pass)) if !user.is_empty() && !pass.is_empty() => {
            let name = std::env::var("AUTH_DISPLAY_NAME").unwrap_or_else(|_| user.clone());
            StaticCredentials::new(user, pass, Identity::new(name, true))
        }
        _ => demo,
    }
}
