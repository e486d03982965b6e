use std::fmt;
use std::sync::Arc;

use crate::claims::Identity;

/// Something that can check a username/password pair.
pub trait CredentialStore: Send + Sync + fmt::Debug {
    /// The identity behind the pair, or `None` if it does not match.
    fn lookup(&self, username: &str, password: &str) -> Option<Identity>;
}

/// A single fixed credential.  For demos and tests only: the password is
/// held and compared in plain text.
#[derive(Clone)]
pub struct StaticCredentials {
    username: String,
    password: String,
    identity: Identity,
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>, identity: Identity) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            identity,
        }
    }

    /// `jon` / `shhh!`, resolving to the admin `Jon Snow`.
    pub fn demo() -> Self {
        Self::new("jon", "shhh!", Identity::new("Jon Snow", true))
    }
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("username", &self.username)
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

impl CredentialStore for StaticCredentials {
    fn lookup(&self, username: &str, password: &str) -> Option<Identity> {
        (username == self.username && password == self.password).then(|| self.identity.clone())
    }
}

/// Checks submitted credentials against a [`CredentialStore`].
#[derive(Debug, Clone)]
pub struct CredentialValidator {
    store: Arc<dyn CredentialStore>,
}

impl CredentialValidator {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    pub fn authenticate(&self, username: &str, password: &str) -> bool {
        self.resolve(username, password).is_some()
    }

    pub fn resolve(&self, username: &str, password: &str) -> Option<Identity> {
        self.store.lookup(username, password)
    }
}
