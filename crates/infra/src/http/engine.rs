//! `reqwest`-backed implementation of the [`HttpTransport`] engine seam.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use wren_common::auth::percent::form_encode;
use wren_common::error::{ClientError, TransportError};
use wren_common::http::{contains_file, Method, Param};
use wren_common::HttpConfig;

use super::transport::{HttpTransport, WireRequest};
use super::response::ApiResponse;

/// Production engine. Parameter placement follows the method: query string
/// for GET/DELETE/HEAD, form body for POST/PUT, multipart when any
/// parameter is a file upload.
pub struct ReqwestTransport {
    client: ReqwestClient,
}

impl ReqwestTransport {
    pub fn new(config: &HttpConfig) -> Result<Self, ClientError> {
        let mut builder = ReqwestClient::builder().user_agent(&config.user_agent);
        if config.connect_timeout_secs > 0 {
            builder = builder.connect_timeout(Duration::from_secs(config.connect_timeout_secs));
        }
        if config.read_timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.read_timeout_secs));
        }
        if let Some(proxy) = &config.proxy {
            let mut prepared = reqwest::Proxy::all(format!("http://{}:{}", proxy.host, proxy.port))
                .map_err(|e| ClientError::Config(format!("invalid proxy: {e}")))?;
            if let (Some(user), Some(password)) = (&proxy.user, &proxy.password) {
                prepared = prepared.basic_auth(user, password);
            }
            builder = builder.proxy(prepared);
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::Config(format!("cannot build HTTP engine: {e}")))?;
        Ok(Self { client })
    }

    fn multipart_form(params: &[Param]) -> Result<reqwest::multipart::Form, TransportError> {
        let mut form = reqwest::multipart::Form::new();
        for param in params {
            form = match param.file_payload() {
                Some((file_name, content_type, data)) => {
                    let part = reqwest::multipart::Part::bytes(data.to_vec())
                        .file_name(file_name.to_owned())
                        .mime_str(content_type)
                        .map_err(|e| TransportError::new("invalid content type", e))?;
                    form.part(param.name().to_owned(), part)
                }
                None => form.text(
                    param.name().to_owned(),
                    param.text().unwrap_or_default().to_owned(),
                ),
            };
        }
        Ok(form)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &WireRequest) -> Result<ApiResponse, TransportError> {
        let method = to_reqwest_method(request.method);
        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        builder = if request.method.has_body() {
            if contains_file(&request.params) {
                builder.multipart(Self::multipart_form(&request.params)?)
            } else {
                builder
                    .header("Content-Type", "application/x-www-form-urlencoded")
                    .body(form_encode(&request.params))
            }
        } else {
            let pairs: Vec<(&str, &str)> = request
                .params
                .iter()
                .filter_map(|p| p.text().map(|v| (p.name(), v)))
                .collect();
            if pairs.is_empty() { builder } else { builder.query(&pairs) }
        };

        let response =
            builder.send().await.map_err(|e| TransportError::new("request failed", e))?;

        let status = response.status().as_u16();
        let mut headers = BTreeMap::new();
        for (name, value) in response.headers() {
            if let Ok(text) = value.to_str() {
                headers.insert(name.as_str().to_owned(), text.to_owned());
            }
        }
        // Drain the body before returning so a retried attempt never
        // holds the connection open.
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::new("cannot read response body", e))?
            .to_vec();
        Ok(ApiResponse::new(status, headers, body))
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
        Method::Head => reqwest::Method::HEAD,
    }
}
