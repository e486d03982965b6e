use std::fmt;
use std::sync::Arc;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::claims::DEFAULT_TTL_SECS;
use crate::error::AuthError;

/// XChaCha20 key length in bytes.
pub const ENCRYPTION_KEY_LEN: usize = 32;

/// Default cookie carrying the token.
pub const DEFAULT_COOKIE_NAME: &str = "X-Jwt";

/// The two process-wide secrets.
///
/// Constructed once at start-up and shared behind an `Arc` by the codec,
/// the signer and the gate.  Key material is wiped on drop and never
/// printed by `Debug`.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Secrets {
    encryption_key: [u8; ENCRYPTION_KEY_LEN],
    signing_key: Vec<u8>,
}

impl Secrets {
    /// Fails with [`AuthError::ConfigError`] unless the encryption key is
    /// exactly [`ENCRYPTION_KEY_LEN`] bytes and the signing key is non-empty.
    pub fn new(encryption_key: &[u8], signing_key: impl Into<Vec<u8>>) -> Result<Self, AuthError> {
        let encryption_key: [u8; ENCRYPTION_KEY_LEN] =
            encryption_key.try_into().map_err(|_| {
                AuthError::ConfigError(format!(
                    "encryption key must be {ENCRYPTION_KEY_LEN} bytes, got {}",
                    encryption_key.len()
                ))
            })?;

        let signing_key = signing_key.into();
        if signing_key.is_empty() {
            return Err(AuthError::ConfigError("signing key must not be empty".into()));
        }

        Ok(Self {
            encryption_key,
            signing_key,
        })
    }

    /// Like [`new`](Self::new) with the encryption key given as hex.
    pub fn from_hex(encryption_key_hex: &str, signing_key: impl Into<Vec<u8>>) -> Result<Self, AuthError> {
        let mut key = hex::decode(encryption_key_hex.trim())
            .map_err(|e| AuthError::ConfigError(format!("encryption key is not hex: {e}")))?;
        let secrets = Self::new(&key, signing_key);
        key.zeroize();
        secrets
    }

    pub(crate) fn encryption_key(&self) -> &[u8; ENCRYPTION_KEY_LEN] {
        &self.encryption_key
    }

    pub(crate) fn signing_key(&self) -> &[u8] {
        &self.signing_key
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("encryption_key", &"<redacted>")
            .field("signing_key", &"<redacted>")
            .finish()
    }
}

/// Configuration for issuing and authorizing sealed tokens.
///
/// Build with [`new`](Self::new) and the chained setters, or with
/// [`from_env`](Self::from_env).
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub secrets: Arc<Secrets>,
    pub ttl_secs: i64,
    pub cookie_name: String,
}

impl AuthConfig {
    /// Config with a 72 hour lifetime and the `X-Jwt` cookie.
    pub fn new(secrets: Secrets) -> Self {
        Self {
            secrets: Arc::new(secrets),
            ttl_secs: DEFAULT_TTL_SECS,
            cookie_name: DEFAULT_COOKIE_NAME.into(),
        }
    }

    /// Build from environment variables already set in the process.
    ///
    /// | Variable             | Required | Default | Notes                   |
    /// |----------------------|----------|---------|-------------------------|
    /// | `JWT_ENCRYPTION_KEY` | **yes**  | —       | 64 hex chars (32 bytes) |
    /// | `JWT_SIGNING_KEY`    | **yes**  | —       | Non-empty               |
    /// | `JWT_TTL_HOURS`      | no       | `72`    | Token lifetime in hours |
    /// | `JWT_COOKIE_NAME`    | no       | `X-Jwt` |                         |
    pub fn from_env() -> Result<Self, AuthError> {
        let encryption_key = std::env::var("JWT_ENCRYPTION_KEY")
            .map_err(|_| AuthError::ConfigError("JWT_ENCRYPTION_KEY is not set".into()))?;
        let signing_key = std::env::var("JWT_SIGNING_KEY")
            .map_err(|_| AuthError::ConfigError("JWT_SIGNING_KEY is not set".into()))?;

        let mut config = Self::new(Secrets::from_hex(&encryption_key, signing_key)?);

        if let Ok(hours) = std::env::var("JWT_TTL_HOURS") {
            config = config.ttl_secs(parse_ttl_hours(&hours)?);
        }

        if let Ok(name) = std::env::var("JWT_COOKIE_NAME") {
            if !name.is_empty() {
                config = config.cookie_name(name);
            }
        }

        Ok(config)
    }

    /// Saturates instead of overflowing; negative values clamp to zero.
    pub fn ttl_hours(mut self, hours: i64) -> Self {
        self.ttl_secs = hours.max(0).saturating_mul(3_600);
        self
    }
    pub fn ttl_secs(mut self, secs: i64) -> Self {
        self.ttl_secs = secs.max(0);
        self
    }
    pub fn cookie_name(mut self, v: impl Into<String>) -> Self {
        self.cookie_name = v.into();
        self
    }
}

/// Positive whole hours, returned as seconds.
fn parse_ttl_hours(value: &str) -> Result<i64, AuthError> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|h| *h > 0)
        .and_then(|h| h.checked_mul(3_600))
        .ok_or_else(|| AuthError::ConfigError(format!("JWT_TTL_HOURS is not a valid lifetime: {value:?}")))
}
