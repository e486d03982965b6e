//! # axum-sealed-jwt
//!
//! HS256 JWTs for [Axum](https://docs.rs/axum) whose claims are encrypted
//! with XChaCha20 before they are signed.  Anyone can see that a token is
//! well-formed; only holders of the encryption key can read who it was
//! issued to, whether they are an admin, or when it expires.
//!
//! Issuing encrypts first and signs second.  Verifying checks the
//! signature first and decrypts second, then enforces expiry.  The
//! stream cipher has no authentication tag of its own, so that ordering
//! is what protects the ciphertext.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use axum_sealed_jwt::{router, AppState, AuthConfig, StaticCredentials, SystemClock};
//!
//! #[tokio::main]
//! async fn main() {
//!     // JWT_ENCRYPTION_KEY (64 hex chars) and JWT_SIGNING_KEY must be set.
//!     let config = AuthConfig::from_env().unwrap();
//!
//!     let state = AppState::new(
//!         &config,
//!         Arc::new(StaticCredentials::demo()),
//!         Arc::new(SystemClock),
//!     );
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:1323").await.unwrap();
//!     axum::serve(listener, router(state)).await.unwrap();
//! }
//! ```
//!
//! ## Lower level
//!
//! ```rust
//! use std::sync::Arc;
//! use axum_sealed_jwt::{AuthConfig, AuthorizationGate, Identity, ManualClock, Secrets, TokenIssuer};
//!
//! let config = AuthConfig::new(Secrets::new(&[7u8; 32], "signing-key").unwrap());
//! let clock = Arc::new(ManualClock::new(1_700_000_000));
//!
//! let issued = TokenIssuer::new(&config, clock.clone())
//!     .issue(&Identity::new("Jon Snow", true))
//!     .unwrap();
//!
//! let gate = AuthorizationGate::new(&config, clock);
//! let claims = gate.evaluate(&issued.token).unwrap();
//! assert_eq!(claims.name, "Jon Snow");
//! ```
//!
//! ## Environment variables (`AuthConfig::from_env`)
//!
//! This crate does **not** load `.env` files; the bundled server does.
//!
//! | Variable             | Required | Default | Notes                   |
//! |----------------------|----------|---------|-------------------------|
//! | `JWT_ENCRYPTION_KEY` | **yes**  | —       | 64 hex chars (32 bytes) |
//! | `JWT_SIGNING_KEY`    | **yes**  | —       |                         |
//! | `JWT_TTL_HOURS`      | no       | `72`    | Token lifetime in hours |
//! | `JWT_COOKIE_NAME`    | no       | `X-Jwt` |                         |

pub mod claims;
pub mod clock;
pub mod codec;
pub mod config;
pub mod credentials;
pub mod error;
pub mod issuer;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod token;

pub use claims::{Claims, Identity, DEFAULT_TTL_SECS};
pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::{ClaimsCodec, EncryptionEnvelope, IV_LEN};
pub use config::{AuthConfig, Secrets, DEFAULT_COOKIE_NAME, ENCRYPTION_KEY_LEN};
pub use credentials::{CredentialStore, CredentialValidator, StaticCredentials};
pub use error::AuthError;
pub use issuer::{IssuedToken, TokenIssuer};
pub use middleware::{require_auth, AuthUser, AuthorizationGate, GateState};
pub use routes::{router, AppState, LoginForm, TokenResponse};
pub use session::SessionBinder;
pub use token::TokenSigner;
