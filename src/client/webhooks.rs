//! Notification hooks.
//!
//! A wallet has at most one active hook: a URL the API calls on transaction events. Hooks are
//! identified by a server-generated UUID.

use http::Method;
use qiwi_types::TransactionType;
use serde_json::Value;

#[cfg(feature = "telemetry")]
use tracing::instrument;

use super::WalletClient;
use crate::error::WalletError;
use crate::transport::Transport;

/// The only hook type the API supports: an HTTP callback URL.
pub const HOOK_TYPE_URL: &str = "1";

impl<T: Transport> WalletClient<T> {
    /// `PUT /payment-notifier/v1/hooks`: registers `url` for events of `transaction_type`.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "qiwi.wallet.add_webhook", skip_all, fields(url = url), err)
    )]
    pub async fn add_webhook(
        &self,
        url: &str,
        transaction_type: TransactionType,
    ) -> Result<Value, WalletError> {
        let request = self
            .api_request(
                Method::PUT,
                &["payment-notifier", "v1", "hooks"],
                "PUT /payment-notifier/v1/hooks",
            )?
            .with_query([
                ("hookType", HOOK_TYPE_URL.to_string()),
                ("param", url.to_string()),
                ("txnType", transaction_type.code().to_string()),
            ]);
        self.call_json(request).await
    }

    /// `DELETE /payment-notifier/v1/hooks/{hookId}`
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "qiwi.wallet.remove_webhook", skip_all, err)
    )]
    pub async fn remove_webhook(&self, hook_id: &str) -> Result<Value, WalletError> {
        let request = self.api_request(
            Method::DELETE,
            &["payment-notifier", "v1", "hooks", hook_id],
            "DELETE /payment-notifier/v1/hooks/{hookId}",
        )?;
        self.call_json(request).await
    }

    /// `GET /payment-notifier/v1/hooks/{hookId}/key`: the key notifications are signed with.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "qiwi.wallet.get_webhook_secret", skip_all, err)
    )]
    pub async fn get_webhook_secret(&self, hook_id: &str) -> Result<Value, WalletError> {
        let request = self.api_request(
            Method::GET,
            &["payment-notifier", "v1", "hooks", hook_id, "key"],
            "GET /payment-notifier/v1/hooks/{hookId}/key",
        )?;
        self.call_json(request).await
    }

    /// `POST /payment-notifier/v1/hooks/{hookId}/newkey`
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "qiwi.wallet.refresh_webhook_secret", skip_all, err)
    )]
    pub async fn refresh_webhook_secret(&self, hook_id: &str) -> Result<Value, WalletError> {
        let request = self.api_request(
            Method::POST,
            &["payment-notifier", "v1", "hooks", hook_id, "newkey"],
            "POST /payment-notifier/v1/hooks/{hookId}/newkey",
        )?;
        self.call_json(request).await
    }

    /// `GET /payment-notifier/v1/hooks/active`
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "qiwi.wallet.get_active_webhook", skip_all, err)
    )]
    pub async fn get_active_webhook(&self) -> Result<Value, WalletError> {
        let request = self.api_request(
            Method::GET,
            &["payment-notifier", "v1", "hooks", "active"],
            "GET /payment-notifier/v1/hooks/active",
        )?;
        self.call_json(request).await
    }

    /// `GET /payment-notifier/v1/hooks/test`: asks the API to send a test notification.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "qiwi.wallet.test_active_webhook", skip_all, err)
    )]
    pub async fn test_active_webhook(&self) -> Result<Value, WalletError> {
        let request = self.api_request(
            Method::GET,
            &["payment-notifier", "v1", "hooks", "test"],
            "GET /payment-notifier/v1/hooks/test",
        )?;
        self.call_json(request).await
    }
}
