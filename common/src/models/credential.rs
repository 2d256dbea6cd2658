use std::fmt;

/// Login used for every remote-shell session of a run.
///
/// Without a secret, sessions fall back to key-based authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    secret: Option<String>,
}

impl Credential {
    pub fn new(username: impl Into<String>, secret: Option<String>) -> Self {
        Self {
            username: username.into(),
            secret: secret.filter(|s| !s.is_empty()),
        }
    }

    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
