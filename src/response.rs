//! Response normalization.
//!
//! Every operation routes the transport outcome through [`normalize`]; it is the only place
//! where a response is classified as success or failure:
//!
//! 1. transport failure: [`WalletError::Transport`];
//! 2. a JSON object carrying a non-empty `errorCode`: [`WalletError::Api`] with the body itself;
//! 3. anything else is success, whatever the HTTP status.

use serde_json::Value;

use crate::error::WalletError;
use crate::transport::{ApiResponse, TransportError};

/// Name of the field that marks an error-shaped body.
pub const ERROR_CODE_FIELD: &str = "errorCode";

/// Classifies a transport outcome.
pub fn normalize(
    outcome: Result<ApiResponse, TransportError>,
) -> Result<ApiResponse, WalletError> {
    let response = outcome?;
    if let Ok(body) = response.decode_json() {
        if is_error_body(&body) {
            return Err(WalletError::Api(body));
        }
    }
    Ok(response)
}

/// Like [`normalize`], then decodes the body as JSON.
pub fn normalize_json(
    context: &'static str,
    outcome: Result<ApiResponse, TransportError>,
) -> Result<Value, WalletError> {
    normalize(outcome)?
        .decode_json()
        .map_err(|source| WalletError::Decode { context, source })
}

/// `true` if `body` is an object whose `errorCode` is present, non-null and not an empty string.
pub fn is_error_body(body: &Value) -> bool {
    match body.get(ERROR_CODE_FIELD) {
        None | Some(Value::Null) => false,
        Some(Value::String(code)) => !code.is_empty(),
        Some(_) => true,
    }
}
