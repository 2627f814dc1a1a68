//! Resilient transport: the retry loop and the pluggable engine seam.
//!
//! [`HttpClient`] owns retry classification and observer notification;
//! the actual socket work lives behind [`HttpTransport`] so tests can
//! substitute a deterministic engine and count attempts exactly.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};
use wren_common::error::{ApiError, ClientError, ClientResult, TransportError};
use wren_common::http::{Method, Param};
use wren_common::RetryConfig;

use super::observer::{LoggingListener, RequestListener};
use super::request::ApiRequest;
use super::response::ApiResponse;

/// A request after signing: final header set, parameters still in caller
/// order for the engine to place (query, form body, or multipart).
#[derive(Debug, Clone)]
pub struct WireRequest {
    pub method: Method,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub params: Vec<Param>,
}

/// Low-level engine contract. One call, one attempt: implementations do
/// not retry, classify, or interpret statuses — they either produce a
/// fully drained response or a [`TransportError`].
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: &WireRequest) -> Result<ApiResponse, TransportError>;
}

/// Statuses treated as success. 302 is included because several endpoints
/// answer redirects the caller is expected to interpret, not follow.
fn is_success(status: u16) -> bool {
    (200..300).contains(&status) || status == 302
}

/// HTTP client with retry and terminal-outcome observation.
pub struct HttpClient {
    transport: Arc<dyn HttpTransport>,
    retry: RetryConfig,
    listener: Arc<dyn RequestListener>,
}

impl HttpClient {
    /// Start building a client around the given engine.
    pub fn builder(transport: Arc<dyn HttpTransport>) -> HttpClientBuilder {
        HttpClientBuilder::new(transport)
    }

    /// Execute a request to a terminal outcome, retrying per the
    /// configured policy, and notify the listener exactly once.
    pub async fn execute(&self, request: &ApiRequest) -> ClientResult<ApiResponse> {
        let outcome = self.run_attempts(request).await;
        match &outcome {
            Ok(response) => self.listener.on_request_resolved(request, Some(response), None),
            Err(error) => self.listener.on_request_resolved(request, None, Some(error)),
        }
        outcome
    }

    async fn run_attempts(&self, request: &ApiRequest) -> ClientResult<ApiResponse> {
        let attempts = self.retry.max_attempts.max(1);
        let mut last_error: Option<ClientError> = None;

        for attempt in 1..=attempts {
            // Re-sign on every attempt: nonces are single-use and the
            // timestamp must stay current across retry sleeps.
            let wire = self.to_wire(request)?;
            debug!(attempt, method = %wire.method, url = %wire.url, "sending request");

            let error: ClientError = match self.transport.send(&wire).await {
                Ok(response) => {
                    let status = response.status();
                    debug!(attempt, status, url = %wire.url, "received response");
                    if is_success(status) {
                        return Ok(response);
                    }
                    let api = ApiError::new(status, response.text());
                    if !api.is_retryable() {
                        // Caller bug or rate limiting; another attempt
                        // cannot change the answer.
                        return Err(api.into());
                    }
                    api.into()
                }
                Err(transport_error) => {
                    warn!(attempt, url = %wire.url, error = %transport_error, "attempt failed");
                    transport_error.into()
                }
            };
            last_error = Some(error);

            if attempt < attempts && !self.retry.interval.is_zero() {
                tokio::time::sleep(self.retry.interval).await;
            }
        }

        match last_error {
            Some(source) => Err(ClientError::ExhaustedRetries { attempts, source: Box::new(source) }),
            // Unreachable with attempts >= 1, but never panic here.
            None => Err(TransportError::message("retry loop produced no outcome").into()),
        }
    }

    /// Sign and assemble the final header set for one attempt. Signing
    /// happens before custom headers are applied, so a caller-supplied
    /// `Authorization` header always wins.
    fn to_wire(&self, request: &ApiRequest) -> ClientResult<WireRequest> {
        let mut headers = BTreeMap::new();
        if let Some(authorizer) = request.authorizer() {
            let header = authorizer.authorization_header(
                request.method(),
                request.url(),
                request.param_list(),
            )?;
            headers.insert("Authorization".to_owned(), header);
        }
        for (name, value) in request.header_map() {
            headers.insert(name.clone(), value.clone());
        }
        Ok(WireRequest {
            method: request.method(),
            url: request.url().to_owned(),
            headers,
            params: request.param_list().to_vec(),
        })
    }
}

/// Builder for [`HttpClient`].
pub struct HttpClientBuilder {
    transport: Arc<dyn HttpTransport>,
    retry: RetryConfig,
    listener: Arc<dyn RequestListener>,
}

impl HttpClientBuilder {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport, retry: RetryConfig::default(), listener: Arc::new(LoggingListener) }
    }

    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Install an observer notified once per terminal outcome.
    pub fn listener(mut self, listener: Arc<dyn RequestListener>) -> Self {
        self.listener = listener;
        self
    }

    pub fn build(self) -> HttpClient {
        HttpClient { transport: self.transport, retry: self.retry, listener: self.listener }
    }
}

#[cfg(test)]
mod tests {
    //! Retry-policy tests on a deterministic engine.

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use wren_common::auth::credentials::Consumer;
    use wren_common::auth::signer::OAuthSigner;

    use super::*;

    /// Engine that replays a scripted sequence of outcomes and counts
    /// how many times it was asked to send.
    struct ScriptedTransport {
        script: Mutex<Vec<Result<u16, String>>>,
        sends: AtomicUsize,
        auth_headers: Mutex<Vec<Option<String>>>,
    }

    impl ScriptedTransport {
        fn new(script: Vec<Result<u16, String>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script),
                sends: AtomicUsize::new(0),
                auth_headers: Mutex::new(Vec::new()),
            })
        }

        fn sends(&self) -> usize {
            self.sends.load(Ordering::SeqCst)
        }

        fn auth_headers(&self) -> Vec<Option<String>> {
            self.auth_headers.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn send(&self, request: &WireRequest) -> Result<ApiResponse, TransportError> {
            self.sends.fetch_add(1, Ordering::SeqCst);
            self.auth_headers.lock().unwrap().push(request.headers.get("Authorization").cloned());
            let mut script = self.script.lock().unwrap();
            match script.pop() {
                Some(Ok(status)) => {
                    Ok(ApiResponse::new(status, BTreeMap::new(), b"body".to_vec()))
                }
                Some(Err(message)) => Err(TransportError::message(message)),
                None => Err(TransportError::message("script exhausted")),
            }
        }
    }

    /// Listener that counts notifications and records the final shape.
    #[derive(Default)]
    struct CountingListener {
        resolved: AtomicUsize,
        failures: AtomicUsize,
    }

    impl RequestListener for CountingListener {
        fn on_request_resolved(
            &self,
            _request: &ApiRequest,
            response: Option<&ApiResponse>,
            _error: Option<&ClientError>,
        ) {
            self.resolved.fetch_add(1, Ordering::SeqCst);
            if response.is_none() {
                self.failures.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn retry(max_attempts: u32) -> RetryConfig {
        RetryConfig::new(max_attempts, Duration::ZERO)
    }

    fn client(transport: Arc<ScriptedTransport>, max_attempts: u32) -> HttpClient {
        HttpClient::builder(transport).retry(retry(max_attempts)).build()
    }

    #[tokio::test]
    async fn test_success_uses_single_attempt() {
        let transport = ScriptedTransport::new(vec![Ok(200)]);
        let client = client(transport.clone(), 5);

        let response = client.execute(&ApiRequest::get("https://x.test/a")).await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(transport.sends(), 1);
    }

    #[tokio::test]
    async fn test_302_counts_as_success() {
        let transport = ScriptedTransport::new(vec![Ok(302)]);
        let client = client(transport.clone(), 3);

        let response = client.execute(&ApiRequest::get("https://x.test/a")).await.unwrap();
        assert_eq!(response.status(), 302);
        assert_eq!(transport.sends(), 1);
    }

    /// An always-failing transport with `max_attempts = N` produces
    /// exactly N sends, then `ExhaustedRetries` around the last error.
    #[tokio::test]
    async fn test_exhaustion_after_exact_attempt_count() {
        let transport = ScriptedTransport::new(vec![
            Err("timed out".into()),
            Err("timed out".into()),
            Err("timed out".into()),
            Err("timed out".into()),
        ]);
        let client = client(transport.clone(), 4);

        let error = client.execute(&ApiRequest::get("https://x.test/a")).await.unwrap_err();
        assert_eq!(transport.sends(), 4);
        match error {
            ClientError::ExhaustedRetries { attempts, source } => {
                assert_eq!(attempts, 4);
                assert!(matches!(*source, ClientError::Transport(_)));
            }
            other => panic!("expected ExhaustedRetries, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_400_fails_after_single_attempt() {
        let transport = ScriptedTransport::new(vec![Ok(400)]);
        let client = client(transport.clone(), 5);

        let error = client.execute(&ApiRequest::get("https://x.test/a")).await.unwrap_err();
        assert_eq!(transport.sends(), 1);
        assert_eq!(error.status(), Some(400));
        assert!(!matches!(error, ClientError::ExhaustedRetries { .. }));
    }

    #[tokio::test]
    async fn test_420_rate_limit_not_retried() {
        let transport = ScriptedTransport::new(vec![Ok(420)]);
        let client = client(transport.clone(), 5);

        let error = client.execute(&ApiRequest::get("https://x.test/a")).await.unwrap_err();
        assert_eq!(transport.sends(), 1);
        assert_eq!(error.status(), Some(420));
    }

    /// 5xx responses are retried until one attempt succeeds; the observer
    /// sees only the final success.
    #[tokio::test]
    async fn test_server_errors_retried_until_success() {
        // Script pops from the back: two 503s, then a 200.
        let transport = ScriptedTransport::new(vec![Ok(200), Ok(503), Ok(503)]);
        let listener = Arc::new(CountingListener::default());
        let client = HttpClient::builder(transport.clone())
            .retry(retry(5))
            .listener(listener.clone())
            .build();

        let response = client.execute(&ApiRequest::get("https://x.test/a")).await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(transport.sends(), 3);
        assert_eq!(listener.resolved.load(Ordering::SeqCst), 1);
        assert_eq!(listener.failures.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_listener_notified_once_on_failure() {
        let transport = ScriptedTransport::new(vec![Ok(500), Ok(500)]);
        let listener = Arc::new(CountingListener::default());
        let client = HttpClient::builder(transport.clone())
            .retry(retry(2))
            .listener(listener.clone())
            .build();

        let error = client.execute(&ApiRequest::get("https://x.test/a")).await.unwrap_err();
        assert!(matches!(error, ClientError::ExhaustedRetries { .. }));
        assert_eq!(error.status(), Some(500));
        assert_eq!(listener.resolved.load(Ordering::SeqCst), 1);
        assert_eq!(listener.failures.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_signed_request_carries_authorization_header() {
        let transport = ScriptedTransport::new(vec![Ok(200)]);
        let client = client(transport, 1);

        let signer = Arc::new(OAuthSigner::new(Consumer::new("ck", "cs")));
        let request = ApiRequest::get("https://x.test/a").authorize(signer);
        let wire = client.to_wire(&request).unwrap();
        let header = wire.headers.get("Authorization").unwrap();
        assert!(header.starts_with("OAuth oauth_consumer_key=\"ck\""));
    }

    /// Every attempt is signed fresh: a retried request must carry a new
    /// nonce and timestamp, never a replay of the previous header.
    #[tokio::test]
    async fn test_retries_resign_with_fresh_nonce() {
        let transport = ScriptedTransport::new(vec![Ok(500), Ok(500), Ok(500)]);
        let client = client(transport.clone(), 3);

        let signer = Arc::new(OAuthSigner::new(Consumer::new("ck", "cs")));
        let request = ApiRequest::get("https://x.test/a").authorize(signer);
        let error = client.execute(&request).await.unwrap_err();
        assert!(matches!(error, ClientError::ExhaustedRetries { .. }));

        let seen = transport.auth_headers();
        assert_eq!(seen.len(), 3);
        assert!(seen.iter().all(Option::is_some));
        assert_ne!(seen[0], seen[1]);
        assert_ne!(seen[1], seen[2]);
        assert_ne!(seen[0], seen[2]);
    }

    /// A caller-supplied Authorization header replaces the generated one.
    #[tokio::test]
    async fn test_custom_authorization_header_wins() {
        let transport = ScriptedTransport::new(vec![Ok(200)]);
        let client = client(transport, 1);

        let signer = Arc::new(OAuthSigner::new(Consumer::new("ck", "cs")));
        let request = ApiRequest::get("https://x.test/a")
            .authorize(signer)
            .header("Authorization", "Bearer override");
        let wire = client.to_wire(&request).unwrap();
        assert_eq!(wire.headers.get("Authorization").map(String::as_str), Some("Bearer override"));
    }
}
