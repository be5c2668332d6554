//! The [`WalletClient`] and its operations.
//!
//! Operations are grouped by API area:
//!
//! - [`account`]: profile, balance, identification, cross rates
//! - [`history`]: payment history, statistics, transaction details and receipts
//! - [`payments`]: transfers and commission lookups
//! - [`detect`]: mobile-operator and card-provider detection
//! - [`webhooks`]: notification hook management
//!
//! Each operation builds one [`ApiRequest`], sends it through the configured [`Transport`] and
//! normalizes the outcome. History and statistics first fetch the account profile to learn the
//! person identifier; the two calls are strictly sequential.
//!
//! ## Example
//!
//! ```rust,no_run
//! use qiwi_wallet::WalletClient;
//!
//! # async fn run() -> Result<(), qiwi_wallet::WalletError> {
//! let client = WalletClient::try_new("access-token")?;
//! let balance = client.get_balance().await?;
//! println!("{balance}");
//! # Ok(())
//! # }
//! ```

pub mod account;
pub mod detect;
pub mod history;
pub mod payments;
pub mod webhooks;

use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method};
use serde_json::Value;
use url::Url;

use crate::config::WalletConfig;
use crate::error::WalletError;
use crate::response::{normalize, normalize_json};
use crate::transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport};

/// Base URL of the wallet API.
pub const API_URL: &str = "https://edge.qiwi.com/";
/// Base URL of the operator and card detection endpoints.
pub const DETECT_URL: &str = "https://qiwi.com/";

const APPLICATION_JSON: &str = "application/json";

/// A client for the QIWI Wallet API, bound to one access token.
///
/// The configuration is immutable after construction, so a client can be shared by any
/// number of in-flight operations.
#[derive(Clone, Debug)]
pub struct WalletClient<T = ReqwestTransport> {
    /// Base URL for API calls
    api_url: Url,
    /// Base URL for detection calls
    detect_url: Url,
    /// Authorization and content negotiation headers sent with every request
    headers: HeaderMap,
    transport: T,
}

impl WalletClient<ReqwestTransport> {
    /// Constructs a client for `token` with the default reqwest transport.
    ///
    /// Fails only if the token cannot be carried in an HTTP header.
    pub fn try_new(token: &str) -> Result<Self, WalletError> {
        Self::with_parts(token, ReqwestTransport::new())
    }

    /// Constructs a client from a loaded [`WalletConfig`].
    pub fn from_config(config: &WalletConfig) -> Result<Self, WalletError> {
        let mut transport = ReqwestTransport::new();
        if let Some(timeout) = config.timeout() {
            transport = transport.with_timeout(timeout);
        }
        Self::with_parts(config.token(), transport)?
            .with_api_url(config.api_url().clone())?
            .with_detect_url(config.detect_url().clone())
    }
}

impl<T> WalletClient<T> {
    /// Constructs a client for `token` that sends requests through `transport`.
    pub fn with_parts(token: &str, transport: T) -> Result<Self, WalletError> {
        let api_url = parse_base(API_URL)?;
        let detect_url = parse_base(DETECT_URL)?;
        Ok(Self {
            api_url,
            detect_url,
            headers: default_headers(token)?,
            transport,
        })
    }

    /// Replaces the transport, keeping token and URLs.
    pub fn with_transport<U>(self, transport: U) -> WalletClient<U> {
        WalletClient {
            api_url: self.api_url,
            detect_url: self.detect_url,
            headers: self.headers,
            transport,
        }
    }

    /// Points API calls at a different host, e.g. a mock server in tests.
    pub fn with_api_url(mut self, url: Url) -> Result<Self, WalletError> {
        self.api_url = validate_base(url)?;
        Ok(self)
    }

    /// Points detection calls at a different host.
    pub fn with_detect_url(mut self, url: Url) -> Result<Self, WalletError> {
        self.detect_url = validate_base(url)?;
        Ok(self)
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    pub fn detect_url(&self) -> &Url {
        &self.detect_url
    }

    /// Headers attached to every request.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: Transport> WalletClient<T> {
    /// Builds a request against the API host. Path segments are percent-encoded.
    pub(crate) fn api_request(
        &self,
        method: Method,
        segments: &[&str],
        context: &'static str,
    ) -> Result<ApiRequest, WalletError> {
        let url = endpoint(&self.api_url, segments)?;
        Ok(ApiRequest::new(method, url, self.headers.clone(), context))
    }

    /// Builds a form-encoded request against the detection host.
    pub(crate) fn detect_request(
        &self,
        segments: &[&str],
        context: &'static str,
    ) -> Result<ApiRequest, WalletError> {
        let url = endpoint(&self.detect_url, segments)?;
        let mut headers = self.headers.clone();
        headers.remove(CONTENT_TYPE);
        Ok(ApiRequest::new(Method::POST, url, headers, context))
    }

    /// Sends `request` and decodes the normalized body as JSON.
    pub(crate) async fn call_json(&self, request: ApiRequest) -> Result<Value, WalletError> {
        let context = request.context;
        trace_request(&request);
        let result = normalize_json(context, self.transport.send(request).await);
        record_result(context, &result);
        result
    }

    /// Sends `request` and returns the normalized raw response.
    pub(crate) async fn call_raw(&self, request: ApiRequest) -> Result<ApiResponse, WalletError> {
        let context = request.context;
        trace_request(&request);
        let result = normalize(self.transport.send(request).await);
        record_result(context, &result);
        result
    }
}

/// Treats the string as the access token and uses the default transport.
impl TryFrom<&str> for WalletClient<ReqwestTransport> {
    type Error = WalletError;

    fn try_from(token: &str) -> Result<Self, Self::Error> {
        WalletClient::try_new(token)
    }
}

fn default_headers(token: &str) -> Result<HeaderMap, WalletError> {
    let mut authorization = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|_| WalletError::InvalidToken)?;
    authorization.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, authorization);
    headers.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
    Ok(headers)
}

fn parse_base(url: &str) -> Result<Url, WalletError> {
    let url = Url::parse(url).map_err(|e| WalletError::UrlParse {
        context: "Failed to parse base url",
        source: e,
    })?;
    validate_base(url)
}

fn validate_base(url: Url) -> Result<Url, WalletError> {
    if url.cannot_be_a_base() {
        return Err(WalletError::InvalidBaseUrl(url));
    }
    Ok(url)
}

/// Appends `segments` to the path of `base`.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, WalletError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| WalletError::InvalidBaseUrl(base.clone()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(feature = "telemetry")]
fn trace_request(request: &ApiRequest) {
    tracing::debug!(
        method = %request.method,
        url = %request.url,
        context = request.context,
        "Sending request"
    );
}

#[cfg(not(feature = "telemetry"))]
fn trace_request(_request: &ApiRequest) {}

/// Records the outcome of a request on the current span.
#[cfg(feature = "telemetry")]
fn record_result<R>(context: &'static str, result: &Result<R, WalletError>) {
    let span = tracing::Span::current();
    match result {
        Ok(_) => {
            span.record("otel.status_code", "OK");
        }
        Err(err) => {
            span.record("otel.status_code", "ERROR");
            span.record("error.message", tracing::field::display(err));
            tracing::debug!(error = %err, context, "Request to wallet API failed");
        }
    }
}

/// Noop if telemetry feature is off.
#[cfg(not(feature = "telemetry"))]
fn record_result<R>(_context: &'static str, _result: &Result<R, WalletError>) {}
