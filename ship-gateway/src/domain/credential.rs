//! Short-lived bearer credentials.

use std::fmt;
use std::time::Duration;

/// A bearer token obtained from an upstream's credential exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub access_token: String,
    pub token_type: Option<String>,
    /// Lifetime granted by the issuer
    pub expires_in: Duration,
    pub refresh_token: Option<String>,
}

impl Credential {
    /// Create a credential with the given token and lifetime.
    pub fn new(access_token: impl Into<String>, expires_in: Duration) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: None,
            expires_in,
            refresh_token: None,
        }
    }
}

// Tokens stay out of logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
