//! Resilient HTTP transport.
//!
//! Layering, outermost first: [`HttpClient`] (retry policy + observer),
//! the [`HttpTransport`] engine seam, and [`ReqwestTransport`] doing the
//! actual socket work. Requests are described by [`ApiRequest`] and come
//! back as fully drained [`ApiResponse`] values.

pub mod engine;
pub mod observer;
pub mod request;
pub mod response;
pub mod transport;

pub use engine::ReqwestTransport;
pub use observer::{LoggingListener, RequestListener};
pub use request::ApiRequest;
pub use response::ApiResponse;
pub use transport::{HttpClient, HttpClientBuilder, HttpTransport, WireRequest};
