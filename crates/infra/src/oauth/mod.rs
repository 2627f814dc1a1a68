//! OAuth 1.0a token handshake.
//!
//! Three-step flow: obtain a request token, send the user to the
//! authorization page, exchange the verifier for an access token. Every
//! endpoint call is signed and goes through the resilient transport, so
//! handshake requests get the same retry policy as API calls.

use std::sync::Arc;

use tracing::debug;
use wren_common::auth::credentials::{AccessToken, Consumer, RequestToken};
use wren_common::auth::percent::{percent_decode, percent_encode};
use wren_common::auth::signer::OAuthSigner;
use wren_common::config::EndpointConfig;
use wren_common::error::{ClientError, ClientResult};

use crate::http::{ApiRequest, ApiResponse, HttpClient};

/// Drives the token handshake against the configured endpoints.
pub struct OAuthFlow {
    client: Arc<HttpClient>,
    consumer: Consumer,
    endpoints: EndpointConfig,
}

impl OAuthFlow {
    pub fn new(client: Arc<HttpClient>, consumer: Consumer, endpoints: EndpointConfig) -> Self {
        Self { client, consumer, endpoints }
    }

    /// Fetch a request token, optionally registering a callback URL. When
    /// a callback is given, the endpoint's `oauth_callback_confirmed`
    /// answer is captured on the returned token.
    pub async fn obtain_request_token(
        &self,
        callback_url: Option<&str>,
    ) -> ClientResult<RequestToken> {
        let signer = Arc::new(OAuthSigner::new(self.consumer.clone()));
        let mut request =
            ApiRequest::post(&self.endpoints.request_token_url).authorize(signer);
        if let Some(callback) = callback_url {
            request = request.param("oauth_callback", callback);
        }

        let response = self.client.execute(&request).await?;
        let fields = parse_token_response(&response)?;
        let token = RequestToken::new(
            require_field(&fields, "oauth_token")?,
            require_field(&fields, "oauth_token_secret")?,
        );
        debug!(url = %self.endpoints.request_token_url, "obtained request token");
        Ok(match lookup(&fields, "oauth_callback_confirmed") {
            Some(flag) => token.with_callback_confirmed(flag == "true"),
            None => token,
        })
    }

    /// URL the user visits to authorize the request token.
    pub fn authorization_url(&self, token: &RequestToken) -> String {
        format!(
            "{}?oauth_token={}",
            self.endpoints.authorize_url,
            percent_encode(token.token())
        )
    }

    /// Like [`Self::authorization_url`] but for the sign-in-with variant,
    /// which skips re-approval for returning users.
    pub fn authenticate_url(&self, token: &RequestToken) -> String {
        format!(
            "{}?oauth_token={}",
            self.endpoints.authenticate_url,
            percent_encode(token.token())
        )
    }

    /// Exchange an authorized request token plus verifier for a
    /// long-lived access token.
    pub async fn exchange_access_token(
        &self,
        request_token: &RequestToken,
        verifier: &str,
    ) -> ClientResult<AccessToken> {
        let signer = Arc::new(
            OAuthSigner::new(self.consumer.clone()).with_request_token(request_token.clone()),
        );
        let request = ApiRequest::post(&self.endpoints.access_token_url)
            .authorize(signer)
            .param("oauth_verifier", verifier);

        let response = self.client.execute(&request).await?;
        let fields = parse_token_response(&response)?;
        debug!(url = %self.endpoints.access_token_url, "exchanged access token");
        Ok(AccessToken::new(
            require_field(&fields, "oauth_token")?,
            require_field(&fields, "oauth_token_secret")?,
        ))
    }
}

/// Parse an `application/x-www-form-urlencoded` token-endpoint body.
fn parse_token_response(response: &ApiResponse) -> ClientResult<Vec<(String, String)>> {
    let body = response.text();
    body.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, value) = pair
                .split_once('=')
                .ok_or_else(|| ClientError::TokenResponse(format!("malformed pair {pair:?}")))?;
            let name = percent_decode(name)
                .map_err(|e| ClientError::TokenResponse(e.to_string()))?
                .into_owned();
            let value = percent_decode(value)
                .map_err(|e| ClientError::TokenResponse(e.to_string()))?
                .into_owned();
            Ok((name, value))
        })
        .collect()
}

fn lookup<'a>(fields: &'a [(String, String)], name: &str) -> Option<&'a str> {
    fields.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
}

fn require_field(fields: &[(String, String)], name: &str) -> ClientResult<String> {
    lookup(fields, name)
        .map(str::to_owned)
        .ok_or_else(|| ClientError::TokenResponse(format!("missing field {name:?}")))
}
