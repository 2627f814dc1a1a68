//! Infrastructure for the Wren API client: resilient HTTP transport, the
//! OAuth token handshake, the async dispatcher, and configuration loading.
//!
//! The pure signing and credential types live in `wren-common`; this crate
//! is where I/O happens.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod client;
pub mod config;
pub mod dispatch;
pub mod http;
pub mod oauth;

// Re-export commonly used types for convenience
// ------------------------------
pub use client::WrenClient;
pub use dispatch::{DispatchError, DispatchTask, Dispatcher};
pub use http::{
    ApiRequest, ApiResponse, HttpClient, HttpClientBuilder, HttpTransport, LoggingListener,
    ReqwestTransport, RequestListener, WireRequest,
};
pub use oauth::OAuthFlow;
