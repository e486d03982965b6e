use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use http::request::Parts;
use http::HeaderMap;

use crate::claims::Claims;
use crate::clock::Clock;
use crate::codec::ClaimsCodec;
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::session::SessionBinder;
use crate::token::TokenSigner;

/// Where a request stands inside the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Unauthenticated,
    SignatureChecked,
    Decrypted,
    ExpiryChecked,
    Authorized,
    Rejected,
}

/// Validates a request's token end to end: signature, then decryption,
/// then expiry.  Each check runs once; the first failure rejects the
/// whole token.
#[derive(Debug, Clone)]
pub struct AuthorizationGate {
    session: SessionBinder,
    signer: TokenSigner,
    codec: ClaimsCodec,
    clock: Arc<dyn Clock>,
}

impl AuthorizationGate {
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            session: SessionBinder::new(config.cookie_name.clone()),
            signer: TokenSigner::new(config.secrets.clone()),
            codec: ClaimsCodec::new(config.secrets.clone()),
            clock,
        }
    }

    /// Run the gate against the token cookie in `headers`.
    pub fn authorize(&self, headers: &HeaderMap) -> Result<AuthUser, AuthError> {
        let token = self.session.extract(headers).ok_or_else(|| {
            reject(GateState::Unauthenticated, AuthError::MissingToken)
        })?;
        let claims = self.evaluate(&token)?;
        Ok(AuthUser { claims, token })
    }

    /// Run the gate against a raw token string.
    pub fn evaluate(&self, token: &str) -> Result<Claims, AuthError> {
        let mut state = GateState::Unauthenticated;

        let envelope = self.signer.verify(token).map_err(|e| reject(state, e))?;
        state = advance(GateState::SignatureChecked);

        let claims = self.codec.decrypt(&envelope).map_err(|e| reject(state, e))?;
        state = advance(GateState::Decrypted);

        if claims.is_expired(self.clock.now()) {
            return Err(reject(state, AuthError::TokenExpired));
        }
        advance(GateState::ExpiryChecked);

        advance(GateState::Authorized);
        Ok(claims)
    }
}

fn advance(state: GateState) -> GateState {
    tracing::trace!(?state, "gate transition");
    state
}

fn reject(from: GateState, err: AuthError) -> AuthError {
    tracing::debug!(?from, to = ?GateState::Rejected, reason = %err, "gate rejected token");
    err
}

/// The authorized caller.  Handlers take it as an extractor.
///
/// Normally placed in request extensions by [`require_auth`].  On routes
/// without that middleware it runs the gate itself, provided an
/// `Extension(Arc<AuthorizationGate>)` layer is present.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use axum::{routing::get, Extension, Router};
/// use axum_sealed_jwt::{AuthConfig, AuthUser, AuthorizationGate, SystemClock};
///
/// async fn handler(user: AuthUser) -> String {
///     format!("Welcome {}!", user.claims.name)
/// }
///
/// # fn example() {
/// let config = AuthConfig::from_env().unwrap();
/// let gate = Arc::new(AuthorizationGate::new(&config, Arc::new(SystemClock)));
/// let app: Router = Router::new()
///     .route("/me", get(handler))
///     .layer(Extension(gate));
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Decrypted claims.
    pub claims: Claims,

    /// The raw token as received.
    pub token: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let gate = parts
            .extensions
            .get::<Arc<AuthorizationGate>>()
            .cloned()
            .ok_or_else(|| {
                AuthError::ConfigError(
                    "AuthorizationGate not found: add `require_auth` or `.layer(Extension(gate))`"
                        .into(),
                )
            })?;
        gate.authorize(&parts.headers)
    }
}

/// Middleware for `axum::middleware::from_fn_with_state`.  Rejects with
/// 401 unless the gate authorizes the request, then exposes the
/// [`AuthUser`] through request extensions.
pub async fn require_auth(
    State(gate): State<Arc<AuthorizationGate>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = gate.authorize(request.headers())?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
