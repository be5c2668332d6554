//! The HTTP seam of the client.
//!
//! [`WalletClient`](crate::WalletClient) never talks to the network itself. Each operation builds
//! an [`ApiRequest`] descriptor and hands it to a [`Transport`]; whatever comes back is routed
//! through [`normalize`](crate::response::normalize). [`ReqwestTransport`] is the default
//! implementation; tests and embedders can plug in their own.

use http::header::CONTENT_TYPE;
use http::{HeaderMap, Method, StatusCode};
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// A single outbound call, built fresh per operation.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    /// Query string pairs, in order. Empty when the endpoint takes none.
    pub query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    /// Identifier used in tracing and error messages, e.g. `"GET /sinap/crossRates"`.
    pub context: &'static str,
}

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    /// `application/x-www-form-urlencoded`, used by the detection endpoints.
    Form(Vec<(String, String)>),
}

impl ApiRequest {
    pub fn new(method: Method, url: Url, headers: HeaderMap, context: &'static str) -> Self {
        Self {
            method,
            url,
            headers,
            query: Vec::new(),
            body: None,
            context,
        }
    }

    pub fn with_query<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn with_form<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let form = pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self.body = Some(RequestBody::Form(form));
        self
    }

    /// Returns the first query value for `key`.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A raw response as delivered by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// A `200 OK` response carrying `body` as JSON.
    pub fn json(body: &Value) -> Self {
        Self::json_with_status(StatusCode::OK, body)
    }

    pub fn json_with_status(status: StatusCode, body: &Value) -> Self {
        Self {
            status,
            content_type: Some("application/json".to_string()),
            body: body.to_string().into_bytes(),
        }
    }

    /// Body decoded as JSON. An empty body decodes to [`Value::Null`].
    pub fn decode_json(&self) -> Result<Value, serde_json::Error> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&self.body)
    }

    /// Body as lossy UTF-8 text, for error reporting.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Transport-level failures: nothing usable came back from the remote side.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {context}: {source}")]
    Http {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to read response body: {context}: {source}")]
    ResponseBodyRead {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },
    /// Failure reported by a non-reqwest transport.
    #[error("Connection failure: {0}")]
    Connection(String),
}

/// Executes [`ApiRequest`]s.
///
/// Implementations must issue exactly one HTTP call per [`Transport::send`] and must not retry.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, TransportError>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn send(
        &self,
        request: ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, TransportError>> + Send {
        self.as_ref().send(request)
    }
}

/// [`Transport`] backed by a shared [`reqwest::Client`].
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    client: Client,
    timeout: Option<Duration>,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuses an existing client, e.g. one with a custom connection pool or proxy.
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    /// Sets a timeout for all future requests.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let context = request.context;
        let mut req = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if !request.query.is_empty() {
            req = req.query(&request.query);
        }
        req = match request.body {
            Some(RequestBody::Json(body)) => req.json(&body),
            Some(RequestBody::Form(form)) => req.form(&form),
            None => req,
        };
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }

        let http_response = req
            .send()
            .await
            .map_err(|e| TransportError::Http { context, source: e })?;
        let status = http_response.status();
        let content_type = http_response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = http_response
            .bytes()
            .await
            .map_err(|e| TransportError::ResponseBodyRead { context, source: e })?;

        Ok(ApiResponse {
            status,
            content_type,
            body: body.to_vec(),
        })
    }
}
