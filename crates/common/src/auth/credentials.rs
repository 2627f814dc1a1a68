//! Immutable credential value types.
//!
//! Secrets are opaque byte strings: they are fed verbatim into the signing
//! key and never percent-decoded or otherwise interpreted. `Debug` output
//! masks them so request tracing cannot leak credentials into logs.

use std::fmt;

const MASK: &str = "******************************";

/// Consumer key/secret pair identifying the calling application.
#[derive(Clone, PartialEq, Eq)]
pub struct Consumer {
    key: String,
    secret: String,
}

impl Consumer {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self { key: key.into(), secret: secret.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Consumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer").field("key", &self.key).field("secret", &MASK).finish()
    }
}

/// Long-lived token identifying the authorizing end user.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    token: String,
    secret: String,
}

impl AccessToken {
    pub fn new(token: impl Into<String>, secret: impl Into<String>) -> Self {
        Self { token: token.into(), secret: secret.into() }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken").field("token", &self.token).field("secret", &MASK).finish()
    }
}

/// Short-lived token produced by the authorization handshake, exchanged
/// (together with a verifier) for an [`AccessToken`].
#[derive(Clone, PartialEq, Eq)]
pub struct RequestToken {
    token: String,
    secret: String,
    callback_confirmed: Option<bool>,
}

impl RequestToken {
    pub fn new(token: impl Into<String>, secret: impl Into<String>) -> Self {
        Self { token: token.into(), secret: secret.into(), callback_confirmed: None }
    }

    /// Record the `oauth_callback_confirmed` flag from the token endpoint.
    pub fn with_callback_confirmed(mut self, confirmed: bool) -> Self {
        self.callback_confirmed = Some(confirmed);
        self
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn callback_confirmed(&self) -> Option<bool> {
        self.callback_confirmed
    }
}

impl fmt::Debug for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestToken")
            .field("token", &self.token)
            .field("secret", &MASK)
            .field("callback_confirmed", &self.callback_confirmed)
            .finish()
    }
}

/// Either flavor of token, as held by the signature engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Access(AccessToken),
    Request(RequestToken),
}

impl Token {
    pub fn token(&self) -> &str {
        match self {
            Self::Access(t) => t.token(),
            Self::Request(t) => t.token(),
        }
    }

    pub fn secret(&self) -> &str {
        match self {
            Self::Access(t) => t.secret(),
            Self::Request(t) => t.secret(),
        }
    }

    pub fn is_access(&self) -> bool {
        matches!(self, Self::Access(_))
    }
}

impl From<AccessToken> for Token {
    fn from(token: AccessToken) -> Self {
        Self::Access(token)
    }
}

impl From<RequestToken> for Token {
    fn from(token: RequestToken) -> Self {
        Self::Request(token)
    }
}
