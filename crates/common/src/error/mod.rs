//! Typed errors for the Wren client core.
//!
//! Every failure the signing engine or the resilient transport can produce
//! maps onto one of the variants here. Classification matters: the retry
//! loop in `wren-infra` consults [`ClientError::is_retryable`] to decide
//! whether another attempt is worthwhile, so the mapping from status codes
//! to variants is part of the retry contract, not a presentation detail.

use thiserror::Error;

/// Result alias used across the Wren crates.
pub type ClientResult<T> = Result<T, ClientError>;

/// Statuses that must never be retried even when attempts remain.
///
/// 400 responses are caller bugs; 420 is the service's rate-limit status
/// ("Enhance Your Calm") and hammering it only digs the hole deeper. This
/// set is deliberately small — other 4xx codes go through the normal
/// retry-until-exhausted path.
pub const NO_RETRY_STATUSES: [u16; 2] = [400, 420];

/// Failure inside the signature engine.
///
/// Signing is pure computation; the only realistic failure is being handed
/// a URL that cannot be canonicalized. A MAC-key rejection is a fatal
/// configuration problem, never a per-request condition.
#[derive(Debug, Error)]
pub enum SigningError {
    /// The request URL could not be parsed into a canonical form.
    #[error("cannot canonicalize request URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The HMAC implementation rejected the signing key.
    #[error("HMAC-SHA1 rejected the signing key: {0}")]
    Mac(String),
}

/// A transport-level failure: connection refused, timeout, TLS or I/O
/// error. The request never produced an HTTP status.
#[derive(Debug, Error)]
#[error("transport failure: {message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    /// Wrap an underlying engine error.
    pub fn new(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self { message: message.into(), source: Some(Box::new(source)) }
    }

    /// A transport failure with no structured cause.
    pub fn message(message: impl Into<String>) -> Self {
        Self { message: message.into(), source: None }
    }
}

/// The service answered with a non-success status.
///
/// Carries the raw body so callers (and error logs) see the service's own
/// diagnostics.
#[derive(Debug, Error)]
#[error("API responded with status {status}: {body}")]
pub struct ApiError {
    /// HTTP status code of the failed response.
    pub status: u16,
    /// Raw response body, already drained from the connection.
    pub body: String,
}

impl ApiError {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    /// Whether another attempt may produce a different outcome.
    pub fn is_retryable(&self) -> bool {
        !NO_RETRY_STATUSES.contains(&self.status)
    }
}

/// Top-level error surfaced by `execute` and the OAuth handshake.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Request signing failed before anything went on the wire.
    #[error(transparent)]
    Signing(#[from] SigningError),

    /// The request never reached the service.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The service rejected the request.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Every configured attempt failed; wraps the last error unchanged.
    #[error("all {attempts} attempts exhausted: {source}")]
    ExhaustedRetries {
        attempts: u32,
        #[source]
        source: Box<ClientError>,
    },

    /// Invalid or incomplete client configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A token-endpoint response could not be interpreted.
    #[error("malformed token response: {0}")]
    TokenResponse(String),

    /// A response body could not be decoded into the requested type.
    #[error("failed to decode response body: {0}")]
    Decode(String),
}

impl ClientError {
    /// Classify whether the retry loop should attempt again.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Api(e) => e.is_retryable(),
            Self::Signing(_)
            | Self::ExhaustedRetries { .. }
            | Self::Config(_)
            | Self::TokenResponse(_)
            | Self::Decode(_) => false,
        }
    }

    /// Status code of the underlying API rejection, if there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api(e) => Some(e.status),
            Self::ExhaustedRetries { source, .. } => source.status(),
            _ => None,
        }
    }
}
