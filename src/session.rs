use http::header::{COOKIE, SET_COOKIE};
use http::{HeaderMap, HeaderValue};

use crate::error::AuthError;

/// Moves the token between a cookie and the rest of the pipeline.
#[derive(Debug, Clone)]
pub struct SessionBinder {
    cookie_name: String,
}

impl SessionBinder {
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Append a `Set-Cookie` for `token`, scoped to `/` and expiring at
    /// `expires_at` (Unix seconds).
    pub fn attach(&self, token: &str, expires_at: i64, headers: &mut HeaderMap) -> Result<(), AuthError> {
        let expires = chrono::DateTime::from_timestamp(expires_at, 0)
            .ok_or_else(|| AuthError::ConfigError(format!("expiry {expires_at} out of range")))?
            .format("%a, %d %b %Y %H:%M:%S GMT");

        let cookie = format!(
            "{}={token}; Path=/; Expires={expires}; HttpOnly",
            self.cookie_name
        );
        let value = HeaderValue::from_str(&cookie)
            .map_err(|e| AuthError::ConfigError(format!("invalid cookie: {e}")))?;

        headers.append(SET_COOKIE, value);
        Ok(())
    }

    /// The token from the named cookie, if present and non-empty.
    pub fn extract(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .filter(|(name, _)| *name == self.cookie_name)
            .map(|(_, value)| value.trim_matches('"'))
            .find(|value| !value.is_empty())
            .map(str::to_owned)
    }
}
