//! Errors returned by [`WalletClient`](crate::WalletClient) operations.
//!
//! Every operation resolves to exactly one `Result`: either the payload or one of the
//! variants below. Nothing is retried and transport failures are passed through untouched.

use serde_json::Value;

use crate::transport::TransportError;

/// Errors that can occur while talking to the QIWI Wallet API.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    /// The HTTP collaborator failed before a response was available.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The API answered with an error-shaped body (it carries an `errorCode` field).
    /// The body is kept verbatim so callers can inspect the code and message.
    #[error("API error {}: {}", error_code_of(.0), .0)]
    Api(Value),
    #[error("Failed to deserialize JSON: {context}: {source}")]
    Decode {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to serialize request body: {context}: {source}")]
    Encode {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("URL parse error: {context}: {source}")]
    UrlParse {
        context: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("URL cannot be used as an API base: {0}")]
    InvalidBaseUrl(url::Url),
    #[error("Access token is not a valid header value")]
    InvalidToken,
    /// The profile lookup preceding a person-scoped call returned nothing usable.
    #[error("Unable to get account info")]
    AccountInfoUnavailable,
    #[error("Invalid card number")]
    InvalidCardNumber,
    #[error("Unable to detect mobile operator")]
    OperatorNotDetected,
}

impl WalletError {
    /// The remote `errorCode` if this is an [`WalletError::Api`] error.
    pub fn api_error_code(&self) -> Option<&Value> {
        match self {
            WalletError::Api(body) => body.get("errorCode"),
            _ => None,
        }
    }
}

fn error_code_of(body: &Value) -> String {
    match body.get("errorCode") {
        Some(Value::String(code)) => code.clone(),
        Some(other) => other.to_string(),
        None => "<none>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_api_error_display_and_code() {
        let err = WalletError::Api(json!({
            "errorCode": "auth.forbidden",
            "userMessage": "Access denied"
        }));
        let message = err.to_string();
        assert!(message.starts_with("API error auth.forbidden"));
        assert!(message.contains("Access denied"));
        assert_eq!(err.api_error_code(), Some(&json!("auth.forbidden")));
    }

    #[test]
    fn test_non_api_error_has_no_code() {
        assert!(WalletError::InvalidCardNumber.api_error_code().is_none());
        assert_eq!(
            WalletError::AccountInfoUnavailable.to_string(),
            "Unable to get account info"
        );
    }
}
