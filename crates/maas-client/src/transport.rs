//! HTTP transport for the MAAS API.
//!
//! This module provides the `Transport` trait, which sends one request and
//! returns the raw response, and `HttpTransport`, which does so over HTTP
//! with OAuth-signed requests.

use async_trait::async_trait;
use maas_auth::{ApiKey, OAuthSigner};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};

use crate::config::ClientConfig;
use crate::error::Result;

/// A single API request.
///
/// Bodies are always form-encoded; repeated keys are allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the API base URL (e.g., `/machines/abc/`).
    pub path: String,
    /// Query string parameters.
    pub query: Vec<(String, String)>,
    /// Form body fields.
    pub form: Vec<(String, String)>,
}

impl ApiRequest {
    /// Create a request with no query or body.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            form: Vec::new(),
        }
    }

    /// Create a GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Create a POST request.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Create a PUT request.
    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// Create a DELETE request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append the `op` query parameter used by MAAS for actions.
    #[must_use]
    pub fn op(self, op: &str) -> Self {
        self.query("op", op)
    }

    /// Append a form field.
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.push((key.into(), value.into()));
        self
    }

    /// Append several form fields.
    #[must_use]
    pub fn fields<I, K, V>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.form
            .extend(fields.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Look up the first query value for `key`.
    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A response as received from the server, before any decoding.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body as text.
    pub body: String,
}

impl RawResponse {
    /// Create a response from its parts.
    #[must_use]
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<String>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Create a JSON response as MAAS sends it.
    #[must_use]
    pub fn json(status: StatusCode, value: &serde_json::Value) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        Self::new(status, headers, value.to_string())
    }

    /// Returns true if the status is below 400.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        !(self.status.is_client_error() || self.status.is_server_error())
    }

    /// The `content-type` header, if present and valid UTF-8.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }
}

/// Sends API requests.
///
/// This trait abstracts the HTTP layer, allowing for mock implementations
/// in tests. Implementations sign requests themselves and report
/// connection-level failures as errors; any HTTP status is a valid response.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and return the raw response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent or the body cannot be
    /// read.
    async fn send(&self, request: ApiRequest) -> Result<RawResponse>;
}

/// HTTP transport with OAuth 1.0 PLAINTEXT signing.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    signer: OAuthSigner,
}

impl HttpTransport {
    /// Create a transport from client configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is malformed or the HTTP client
    /// cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let key = ApiKey::parse(&config.api_key)?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()?;

        Ok(Self::with_client(client, &config.base_url, OAuthSigner::new(key)))
    }

    /// Create a transport with a custom reqwest client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: &str, signer: OAuthSigner) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            signer,
        }
    }

    /// Get the base URL of the API, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the absolute URL for an API path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse> {
        let url = self.url(&request.path);
        tracing::debug!(method = %request.method, url = %url, "Sending MAAS API request");

        let mut builder = self
            .client
            .request(request.method, &url)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, self.signer.authorization_header());

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if !request.form.is_empty() {
            builder = builder.form(&request.form);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        tracing::debug!(url = %url, status = %status, "Received MAAS API response");

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockTransport;

#[cfg(any(test, feature = "test-utils"))]
mod mock {
    use std::collections::VecDeque;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use reqwest::StatusCode;

    use super::{ApiRequest, RawResponse, Transport};
    use crate::error::{ClientError, Result};

    /// Transport that replays scripted responses and records requests.
    #[derive(Debug, Default)]
    pub struct MockTransport {
        responses: Mutex<VecDeque<RawResponse>>,
        requests: Mutex<Vec<ApiRequest>>,
    }

    impl MockTransport {
        /// Create a mock with no scripted responses.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a response.
        pub fn push_response(&self, response: RawResponse) {
            self.responses.lock().push_back(response);
        }

        /// Queue a JSON response with the given status.
        pub fn push_json(&self, status: StatusCode, value: &serde_json::Value) {
            self.push_response(RawResponse::json(status, value));
        }

        /// Queue a `200 OK` JSON response.
        pub fn push_ok(&self, value: &serde_json::Value) {
            self.push_json(StatusCode::OK, value);
        }

        /// Requests sent so far, in order.
        #[must_use]
        pub fn requests(&self) -> Vec<ApiRequest> {
            self.requests.lock().clone()
        }

        /// Number of scripted responses not yet consumed.
        #[must_use]
        pub fn remaining(&self) -> usize {
            self.responses.lock().len()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn send(&self, request: ApiRequest) -> Result<RawResponse> {
            let description = format!("{} {}", request.method, request.path);
            self.requests.lock().push(request);
            self.responses.lock().pop_front().ok_or_else(|| {
                ClientError::UnexpectedResponse(format!(
                    "no scripted response for {description}"
                ))
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn url_joins_without_double_slash() {
        let signer = OAuthSigner::new(ApiKey::parse("a:b:c").unwrap());
        let transport = HttpTransport::with_client(
            reqwest::Client::new(),
            "http://maas:5240/MAAS/api/2.0/",
            signer,
        );
        assert_eq!(transport.base_url(), "http://maas:5240/MAAS/api/2.0");
        assert_eq!(
            transport.url("/machines/abc/"),
            "http://maas:5240/MAAS/api/2.0/machines/abc/"
        );
        assert_eq!(
            transport.url("nodes/"),
            "http://maas:5240/MAAS/api/2.0/nodes/"
        );
    }

    #[test]
    fn transport_from_config_rejects_bad_key() {
        let config = ClientConfig::new("http://maas", "not-a-key");
        let err = HttpTransport::new(&config).unwrap_err();
        assert!(matches!(err, crate::ClientError::Auth(_)));
    }

    #[test]
    fn request_builder() {
        let request = ApiRequest::post("/machines/abc/")
            .op("deploy")
            .field("mac_addresses", "aa")
            .fields([("mac_addresses", "bb")]);
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.query_value("op"), Some("deploy"));
        assert_eq!(request.query_value("missing"), None);
        assert_eq!(request.form.len(), 2);
    }

    #[test]
    fn raw_response_helpers() {
        let ok = RawResponse::json(StatusCode::OK, &json!({"a": 1}));
        assert!(ok.is_ok());
        assert_eq!(ok.content_type(), Some("application/json; charset=utf-8"));

        let redirect = RawResponse::new(StatusCode::FOUND, HeaderMap::new(), "");
        assert!(redirect.is_ok());
        assert_eq!(redirect.content_type(), None);

        let missing = RawResponse::new(StatusCode::NOT_FOUND, HeaderMap::new(), "");
        assert!(!missing.is_ok());
    }

    #[tokio::test]
    async fn mock_replays_in_order_and_records() {
        let mock = MockTransport::new();
        mock.push_ok(&json!({"n": 1}));
        mock.push_json(StatusCode::CONFLICT, &json!({"n": 2}));

        let first = mock.send(ApiRequest::get("/a/")).await.unwrap();
        let second = mock.send(ApiRequest::delete("/b/")).await.unwrap();
        assert_eq!(first.status, StatusCode::OK);
        assert_eq!(second.status, StatusCode::CONFLICT);
        assert_eq!(mock.remaining(), 0);

        let requests = mock.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].method, Method::DELETE);

        assert!(mock.send(ApiRequest::get("/c/")).await.is_err());
    }
}
