use serde::{Deserialize, Serialize};

/// Seconds in the default token lifetime (72 hours).
pub const DEFAULT_TTL_SECS: i64 = 72 * 3_600;

/// The identity a credential store resolves a login to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub admin: bool,
}

impl Identity {
    pub fn new(name: impl Into<String>, admin: bool) -> Self {
        Self {
            name: name.into(),
            admin,
        }
    }
}

/// Claims sealed inside every token.
///
/// These never travel in the clear: the serialized form is encrypted by
/// [`ClaimsCodec`](crate::codec::ClaimsCodec) before it reaches the JWT
/// payload.  Field order is fixed, so the serialized form is canonical.
///
/// `exp` is an absolute Unix timestamp (seconds) set once at issue time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub name: String,
    pub admin: bool,
    pub exp: i64,
}

impl Claims {
    /// Claims for `identity`, valid for `ttl_secs` from `issued_at`.
    pub fn issue(identity: &Identity, issued_at: i64, ttl_secs: i64) -> Self {
        Self {
            name: identity.name.clone(),
            admin: identity.admin,
            exp: issued_at.saturating_add(ttl_secs),
        }
    }

    /// True once `now` is strictly past `exp`.
    pub fn is_expired(&self, now: i64) -> bool {
        now > self.exp
    }
}
