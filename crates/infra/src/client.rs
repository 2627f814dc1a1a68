//! Top-level client facade assembling transport, signer, and dispatcher
//! from a [`ClientConfig`].

use std::sync::Arc;

use wren_common::auth::credentials::{AccessToken, Consumer};
use wren_common::auth::signer::{Authorizer, OAuthSigner};
use wren_common::error::ClientResult;
use wren_common::ClientConfig;

use crate::dispatch::Dispatcher;
use crate::http::{ApiRequest, ApiResponse, HttpClient, ReqwestTransport, RequestListener};
use crate::oauth::OAuthFlow;

/// A configured Wren client: signer attached to every request, resilient
/// transport underneath, and a dispatcher for fire-and-forget work.
pub struct WrenClient {
    http: Arc<HttpClient>,
    signer: Arc<OAuthSigner>,
    dispatcher: Dispatcher,
    config: ClientConfig,
}

impl WrenClient {
    /// Build a client from validated configuration. Must be called from
    /// within a Tokio runtime (the dispatcher spawns its workers here).
    pub fn from_config(config: ClientConfig) -> ClientResult<Self> {
        Self::build(config, None)
    }

    /// Like [`Self::from_config`] with a request listener installed.
    pub fn with_listener(
        config: ClientConfig,
        listener: Arc<dyn RequestListener>,
    ) -> ClientResult<Self> {
        Self::build(config, Some(listener))
    }

    fn build(config: ClientConfig, listener: Option<Arc<dyn RequestListener>>) -> ClientResult<Self> {
        config.validate()?;

        let consumer = Consumer::new(
            config.credentials.consumer_key.clone(),
            config.credentials.consumer_secret.clone(),
        );
        let mut signer = OAuthSigner::new(consumer);
        if let (Some(token), Some(secret)) =
            (&config.credentials.access_token, &config.credentials.access_token_secret)
        {
            signer = signer.with_access_token(AccessToken::new(token.clone(), secret.clone()));
        }

        let transport = Arc::new(ReqwestTransport::new(&config.http)?);
        let mut builder = HttpClient::builder(transport).retry(config.retry.clone());
        if let Some(listener) = listener {
            builder = builder.listener(listener);
        }
        let http = Arc::new(builder.build());
        let dispatcher = Dispatcher::new(&config.dispatcher);

        Ok(Self { http, signer: Arc::new(signer), dispatcher, config })
    }

    /// Execute a request, signing it with this client's credentials.
    pub async fn execute(&self, request: ApiRequest) -> ClientResult<ApiResponse> {
        let authorizer: Arc<dyn Authorizer> = Arc::clone(&self.signer) as Arc<dyn Authorizer>;
        let signed = request.authorize(authorizer);
        self.http.execute(&signed).await
    }

    /// The handshake flow for obtaining user credentials.
    pub fn oauth(&self) -> OAuthFlow {
        OAuthFlow::new(
            Arc::clone(&self.http),
            Consumer::new(
                self.config.credentials.consumer_key.clone(),
                self.config.credentials.consumer_secret.clone(),
            ),
            self.config.endpoints.clone(),
        )
    }

    pub fn http(&self) -> &Arc<HttpClient> {
        &self.http
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Shut the dispatcher down. Idempotent.
    pub async fn shutdown(&self) {
        self.dispatcher.shutdown().await;
    }
}
