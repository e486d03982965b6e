use std::sync::Arc;

use crate::claims::{Claims, Identity};
use crate::clock::Clock;
use crate::codec::ClaimsCodec;
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::token::TokenSigner;

/// A freshly issued token and the claims sealed inside it.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// Issues tokens: claims are encrypted first, then the envelope is signed.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    codec: ClaimsCodec,
    signer: TokenSigner,
    clock: Arc<dyn Clock>,
    ttl_secs: i64,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            codec: ClaimsCodec::new(config.secrets.clone()),
            signer: TokenSigner::new(config.secrets.clone()),
            clock,
            ttl_secs: config.ttl_secs,
        }
    }

    pub fn issue(&self, identity: &Identity) -> Result<IssuedToken, AuthError> {
        let now = self.clock.now();
        let claims = Claims::issue(identity, now, self.ttl_secs);

        let envelope = self.codec.encrypt(&claims)?;
        let token = self.signer.issue(&envelope, now)?;

        tracing::debug!(exp = claims.exp, "issued token");

        Ok(IssuedToken { token, claims })
    }
}
