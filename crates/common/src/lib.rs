//! Shared foundation for the Wren API client.
//!
//! This crate holds the pieces every other Wren crate builds on: the
//! credential model, the OAuth 1.0a parameter codec and signature engine,
//! the request vocabulary (methods and parameters), typed errors, and the
//! configuration structs consumed at client construction.
//!
//! Transport, token handshake, and the async dispatcher live in
//! `wren-infra`; this crate stays free of I/O so the signing engine can be
//! tested byte-for-byte against the OAuth Core golden vectors.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod auth;
pub mod config;
pub mod error;
pub mod http;

// Re-export commonly used types for convenience
// ------------------------------
pub use auth::credentials::{AccessToken, Consumer, RequestToken, Token};
pub use auth::signer::{Authorizer, OAuthSigner};
pub use config::{ClientConfig, DispatcherConfig, EndpointConfig, HttpConfig, RetryConfig};
pub use error::{ApiError, ClientError, ClientResult, SigningError, TransportError};
pub use http::{Method, Param};
