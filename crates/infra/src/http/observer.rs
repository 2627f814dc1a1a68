//! Terminal-outcome observer hook for the resilient transport.

use wren_common::error::ClientError;

use super::request::ApiRequest;
use super::response::ApiResponse;

/// Observer notified exactly once per request, after the retry loop has
/// settled on a terminal outcome.
///
/// Intermediate failed attempts are invisible here; a request that fails
/// twice and then succeeds produces a single success notification. Listener
/// panics or slowness happen on the caller's task, so implementations
/// should stay cheap.
pub trait RequestListener: Send + Sync {
    /// Called with the final response (on success) or the final error
    /// (after classification and exhaustion handling). Exactly one of the
    /// two is `Some`.
    fn on_request_resolved(
        &self,
        request: &ApiRequest,
        response: Option<&ApiResponse>,
        error: Option<&ClientError>,
    );
}

/// Listener that logs outcomes through `tracing`, used when no custom
/// listener is installed.
#[derive(Debug, Default)]
pub struct LoggingListener;

impl RequestListener for LoggingListener {
    fn on_request_resolved(
        &self,
        request: &ApiRequest,
        response: Option<&ApiResponse>,
        error: Option<&ClientError>,
    ) {
        match (response, error) {
            (Some(resp), _) => {
                tracing::debug!(
                    method = %request.method(),
                    url = request.url(),
                    status = resp.status(),
                    "request resolved"
                );
            }
            (None, Some(err)) => {
                tracing::warn!(
                    method = %request.method(),
                    url = request.url(),
                    error = %err,
                    "request failed"
                );
            }
            (None, None) => {}
        }
    }
}
