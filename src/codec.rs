use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chacha20::cipher::{KeyIvInit, StreamCipher};
use chacha20::{Key, XChaCha20, XNonce};
use rand::rngs::OsRng;
use rand::TryRngCore;
use serde::{Deserialize, Serialize};

use crate::claims::Claims;
use crate::config::Secrets;
use crate::error::AuthError;

/// XChaCha20 nonce length in bytes.
pub const IV_LEN: usize = 24;

/// Encrypted claims as carried in the token payload.
///
/// Serializes as `{"iv": "<base64>", "encrypted": "<base64>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionEnvelope {
    #[serde(with = "base64_bytes")]
    pub iv: Vec<u8>,
    #[serde(rename = "encrypted", with = "base64_bytes")]
    pub ciphertext: Vec<u8>,
}

/// Seals [`Claims`] with XChaCha20 under the shared encryption key.
///
/// The cipher gives confidentiality only.  Integrity comes from the outer
/// token signature, so envelopes must be signed after encryption and
/// verified before [`decrypt`](Self::decrypt) is called.
#[derive(Debug, Clone)]
pub struct ClaimsCodec {
    secrets: Arc<Secrets>,
}

impl ClaimsCodec {
    pub fn new(secrets: Arc<Secrets>) -> Self {
        Self { secrets }
    }

    /// Serialize and encrypt `claims` under a fresh random IV.
    pub fn encrypt(&self, claims: &Claims) -> Result<EncryptionEnvelope, AuthError> {
        let mut buf =
            serde_json::to_vec(claims).map_err(|e| AuthError::EncryptionError(e.to_string()))?;

        let mut iv = [0u8; IV_LEN];
        OsRng
            .try_fill_bytes(&mut iv)
            .map_err(|e| AuthError::EncryptionError(format!("random source unavailable: {e}")))?;

        self.apply_keystream(&iv, &mut buf);

        Ok(EncryptionEnvelope {
            iv: iv.to_vec(),
            ciphertext: buf,
        })
    }

    /// Decrypt and deserialize an envelope.
    ///
    /// A ciphertext that was altered but still decodes to valid JSON yields
    /// different claims without error.
    pub fn decrypt(&self, envelope: &EncryptionEnvelope) -> Result<Claims, AuthError> {
        let iv: [u8; IV_LEN] = envelope.iv.as_slice().try_into().map_err(|_| {
            AuthError::DecryptionError(format!(
                "iv must be {IV_LEN} bytes, got {}",
                envelope.iv.len()
            ))
        })?;

        let mut buf = envelope.ciphertext.clone();
        self.apply_keystream(&iv, &mut buf);

        serde_json::from_slice(&buf).map_err(|e| AuthError::DecryptionError(e.to_string()))
    }

    fn apply_keystream(&self, iv: &[u8; IV_LEN], buf: &mut [u8]) {
        let key = Key::from_slice(self.secrets.encryption_key());
        let mut cipher = XChaCha20::new(key, XNonce::from_slice(iv));
        cipher.apply_keystream(buf);
    }
}

mod base64_bytes {
    use super::{Engine, STANDARD};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(d)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}
