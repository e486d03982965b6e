use std::sync::Arc;

use jsonwebtoken::{crypto, decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::codec::EncryptionEnvelope;
use crate::config::Secrets;
use crate::error::AuthError;

/// JWT payload: the encrypted claims plus the issue time.
///
/// Expiry is deliberately absent here; it is only readable after
/// decryption.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TokenPayload {
    #[serde(flatten)]
    envelope: EncryptionEnvelope,
    iat: i64,
}

/// Signs envelopes into HS256 compact tokens and verifies them.
#[derive(Debug, Clone)]
pub struct TokenSigner {
    secrets: Arc<Secrets>,
}

impl TokenSigner {
    pub fn new(secrets: Arc<Secrets>) -> Self {
        Self { secrets }
    }

    /// Wrap `envelope` in a signed `header.payload.signature` token.
    pub fn issue(&self, envelope: &EncryptionEnvelope, issued_at: i64) -> Result<String, AuthError> {
        let payload = TokenPayload {
            envelope: envelope.clone(),
            iat: issued_at,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &payload,
            &EncodingKey::from_secret(self.secrets.signing_key()),
        )
        .map_err(|e| AuthError::EncryptionError(e.to_string()))
    }

    /// Check the signature, then recover the envelope.
    ///
    /// The HMAC is recomputed over the raw `header.payload` bytes and
    /// compared in constant time before either segment is parsed, so any
    /// byte-level change to them is reported as
    /// [`AuthError::SignatureInvalid`].
    pub fn verify(&self, token: &str) -> Result<EncryptionEnvelope, AuthError> {
        let (message, signature) = split_token(token)?;
        let key = DecodingKey::from_secret(self.secrets.signing_key());

        let valid = crypto::verify(signature, message.as_bytes(), &key, Algorithm::HS256)
            .map_err(|_| AuthError::SignatureInvalid)?;
        if !valid {
            return Err(AuthError::SignatureInvalid);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims::<&str>(&[]);

        let data = decode::<TokenPayload>(token, &key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::SignatureInvalid,
                _ => AuthError::MalformedToken(e.to_string()),
            }
        })?;

        Ok(data.claims.envelope)
    }
}

/// Split into (`header.payload`, `signature`), rejecting anything that is
/// not three non-empty segments.
fn split_token(token: &str) -> Result<(&str, &str), AuthError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(AuthError::MalformedToken(format!(
            "expected 3 segments, got {}",
            segments.len()
        )));
    }
    if segments.iter().any(|s| s.is_empty()) {
        return Err(AuthError::MalformedToken("empty segment".into()));
    }

    let split = segments[0].len() + 1 + segments[1].len();
    Ok((&token[..split], segments[2]))
}

#[cfg(test)]
mod tests {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    use super::*;

    fn secrets(signing: &str) -> Arc<Secrets> {
        Arc::new(Secrets::new(&[9u8; 32], signing).unwrap())
    }

    fn envelope() -> EncryptionEnvelope {
        EncryptionEnvelope {
            iv: (0..24).collect(),
            ciphertext: b"not really encrypted".to_vec(),
        }
    }

    #[test]
    fn roundtrip() {
        let signer = TokenSigner::new(secrets("mySigningKey"));
        let token = signer.issue(&envelope(), 1_700_000_000).unwrap();
        assert_eq!(token.split('.').count(), 3);
        assert_eq!(signer.verify(&token).unwrap(), envelope());
    }

    #[test]
    fn payload_segment_carries_iv_and_encrypted() {
        let signer = TokenSigner::new(secrets("mySigningKey"));
        let token = signer.issue(&envelope(), 42).unwrap();

        let payload = token.split('.').nth(1).unwrap();
        let json: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).unwrap()).unwrap();
        assert!(json["iv"].is_string());
        assert!(json["encrypted"].is_string());
        assert_eq!(json["iat"], 42);
        assert!(json.get("exp").is_none());
        assert!(json.get("name").is_none());

        let header = token.split('.').next().unwrap();
        let json: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(header).unwrap()).unwrap();
        assert_eq!(json["alg"], "HS256");
        assert_eq!(json["typ"], "JWT");
    }

    #[test]
    fn wrong_secret_rejected() {
        let token = TokenSigner::new(secrets("good"))
            .issue(&envelope(), 0)
            .unwrap();
        assert!(matches!(
            TokenSigner::new(secrets("bad")).verify(&token),
            Err(AuthError::SignatureInvalid)
        ));
    }

    #[test]
    fn every_header_and_payload_bit_flip_is_detected() {
        let signer = TokenSigner::new(secrets("mySigningKey"));
        let token = signer.issue(&envelope(), 0).unwrap();
        let signed_len = token.rfind('.').unwrap();

        for pos in 0..signed_len {
            if token.as_bytes()[pos] == b'.' {
                continue;
            }
            for bit in 0..7 {
                let mut bytes = token.clone().into_bytes();
                bytes[pos] ^= 1 << bit;
                if bytes[pos] == b'.' {
                    continue;
                }
                let tampered = String::from_utf8(bytes).unwrap();
                assert!(
                    matches!(signer.verify(&tampered), Err(AuthError::SignatureInvalid)),
                    "flip at byte {pos} bit {bit} not detected"
                );
            }
        }
    }

    #[test]
    fn ciphertext_swapped_inside_signed_token_is_detected() {
        let signer = TokenSigner::new(secrets("mySigningKey"));
        let token = signer.issue(&envelope(), 0).unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        let mut payload: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(parts[1]).unwrap()).unwrap();
        let mut ciphertext = base64::engine::general_purpose::STANDARD
            .decode(payload["encrypted"].as_str().unwrap())
            .unwrap();
        ciphertext[0] ^= 0x80;
        payload["encrypted"] =
            base64::engine::general_purpose::STANDARD.encode(&ciphertext).into();

        let forged = format!(
            "{}.{}.{}",
            parts[0],
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload).unwrap()),
            parts[2]
        );
        assert!(matches!(signer.verify(&forged), Err(AuthError::SignatureInvalid)));
    }

    #[test]
    fn wrong_segment_count_is_malformed() {
        let signer = TokenSigner::new(secrets("s"));
        for token in ["", "abc", "a.b", "a.b.c.d", "a..c", ".b.c"] {
            assert!(
                matches!(signer.verify(token), Err(AuthError::MalformedToken(_))),
                "{token:?}"
            );
        }
    }

    #[test]
    fn validly_signed_foreign_payload_is_malformed() {
        #[derive(Serialize)]
        struct Other {
            sub: String,
        }

        let secrets = secrets("s");
        let token = encode(
            &Header::new(Algorithm::HS256),
            &Other { sub: "42".into() },
            &EncodingKey::from_secret(secrets.signing_key()),
        )
        .unwrap();

        assert!(matches!(
            TokenSigner::new(secrets).verify(&token),
            Err(AuthError::MalformedToken(_))
        ));
    }
}
