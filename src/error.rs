use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
}

/// Errors from issuing or authorizing sealed tokens.
///
/// The message of each variant is for server-side diagnostics only.
/// The HTTP response carries nothing but the status reason.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Missing token cookie")]
    MissingToken,

    #[error("Malformed token: {0}")]
    MalformedToken(String),

    #[error("Token signature is invalid")]
    SignatureInvalid,

    #[error("Could not decrypt claims: {0}")]
    DecryptionError(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Could not encrypt claims: {0}")]
    EncryptionError(String),

    #[error("Auth not configured: {0}")]
    ConfigError(String),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::EncryptionError(_) | AuthError::ConfigError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, "token issuance failed");
        } else {
            tracing::warn!(error = %self, "request unauthorized");
        }

        let body = ErrorBody {
            error: status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
            status: status.as_u16(),
        };

        (status, axum::Json(body)).into_response()
    }
}
