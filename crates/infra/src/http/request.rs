//! Request description handed to the resilient transport.

use std::collections::BTreeMap;
use std::sync::Arc;

use wren_common::auth::signer::Authorizer;
use wren_common::http::{Method, Param};

/// A fully described API request: method, URL, parameters, extra headers,
/// and the authorizer that signs it.
///
/// Parameters keep caller order; the signer computes its own canonical
/// ordering without touching this list. Custom headers win over generated
/// ones, including `Authorization`.
#[derive(Clone)]
pub struct ApiRequest {
    method: Method,
    url: String,
    params: Vec<Param>,
    headers: BTreeMap<String, String>,
    authorizer: Option<Arc<dyn Authorizer>>,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            params: Vec::new(),
            headers: BTreeMap::new(),
            authorizer: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    /// Append a text parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push(Param::new(name, value));
        self
    }

    /// Append a prebuilt parameter (text or file).
    pub fn push_param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Append several prebuilt parameters.
    pub fn params(mut self, params: impl IntoIterator<Item = Param>) -> Self {
        self.params.extend(params);
        self
    }

    /// Set a request header. Replaces any generated header of the same
    /// name when the request is sent.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sign this request with the given authorizer.
    pub fn authorize(mut self, authorizer: Arc<dyn Authorizer>) -> Self {
        self.authorizer = Some(authorizer);
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn param_list(&self) -> &[Param] {
        &self.params
    }

    pub fn header_map(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn authorizer(&self) -> Option<&Arc<dyn Authorizer>> {
        self.authorizer.as_ref()
    }
}

impl std::fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("params", &self.params)
            .field("headers", &self.headers.keys())
            .field("authorized", &self.authorizer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_accumulates_params_in_order() {
        let request = ApiRequest::post("https://api.wren.social/1.1/statuses/update.json")
            .param("status", "hello")
            .param("lat", "37.78")
            .push_param(Param::new("long", "-122.40"));

        assert_eq!(request.method(), Method::Post);
        let names: Vec<&str> = request.param_list().iter().map(Param::name).collect();
        assert_eq!(names, ["status", "lat", "long"]);
    }

    #[test]
    fn test_custom_header_recorded() {
        let request = ApiRequest::get("https://api.wren.social/1.1/account/verify_credentials.json")
            .header("X-Wren-Client", "tests");
        assert_eq!(request.header_map().get("X-Wren-Client").map(String::as_str), Some("tests"));
    }

    #[test]
    fn test_debug_does_not_dump_authorizer() {
        let request = ApiRequest::get("https://api.wren.social/1.1/help/test.json");
        let dbg = format!("{request:?}");
        assert!(dbg.contains("authorized: false"));
    }
}
