//! Mobile-operator and card-provider detection.
//!
//! Both endpoints answer with `{"code": {"value": "0"}, "message": "<providerId>"}`; the code
//! `"2"` means the number was not recognised.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[cfg(feature = "telemetry")]
use tracing::instrument;

use super::WalletClient;
use crate::error::WalletError;
use crate::transport::{ApiRequest, Transport};

/// Status code of a detection that found nothing.
pub const NOT_DETECTED: &str = "2";

/// Result of a detection lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    pub code: DetectionCode,
    /// Provider identifier on success, a human-readable reason otherwise
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionCode {
    #[serde(deserialize_with = "string_or_number")]
    pub value: String,
    #[serde(rename = "_name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Detection {
    pub fn is_detected(&self) -> bool {
        self.code.value != NOT_DETECTED
    }

    /// The detected provider, or `None` if detection failed or the message is not an identifier.
    pub fn provider_id(&self) -> Option<u32> {
        if !self.is_detected() {
            return None;
        }
        self.message.as_deref()?.trim().parse().ok()
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number, got {other}"
        ))),
    }
}

impl<T: Transport> WalletClient<T> {
    /// `POST /mobile/detect.action` on the detection host.
    ///
    /// `phone` is sent as given; callers pass the international form (`+79991234567`).
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "qiwi.wallet.detect_operator", skip_all, err)
    )]
    pub async fn detect_operator(&self, phone: &str) -> Result<Detection, WalletError> {
        let request = self
            .detect_request(&["mobile", "detect.action"], "POST /mobile/detect.action")?
            .with_form([("phone", phone)]);
        self.call_detection(request).await
    }

    /// `POST /card/detect.action` on the detection host.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "qiwi.wallet.detect_card", skip_all, err)
    )]
    pub async fn detect_card(&self, card_number: &str) -> Result<Detection, WalletError> {
        let request = self
            .detect_request(&["card", "detect.action"], "POST /card/detect.action")?
            .with_form([("cardNumber", card_number)]);
        self.call_detection(request).await
    }

    async fn call_detection(&self, request: ApiRequest) -> Result<Detection, WalletError> {
        let context = request.context;
        let body = self.call_json(request).await?;
        serde_json::from_value(body).map_err(|source| WalletError::Decode { context, source })
    }
}
