//! Transfers and commission lookups.
//!
//! All transfers post the same body to `POST /sinap/api/v2/terms/{providerId}/payments`:
//! a fresh [`PaymentId`], the amount in roubles, the wallet balance as funding source, a
//! comment, and the destination in `fields`. They differ only in how the provider is chosen:
//!
//! | Operation | Provider |
//! |---|---|
//! | [`WalletClient::send_to_wallet`] | [`recipients::QIWI`] |
//! | [`WalletClient::send_to_mobile_phone`] | operator detection |
//! | [`WalletClient::send_to_card`] | card detection |
//! | [`WalletClient::send_to_bank_account`] | given by the caller |

use http::Method;
use qiwi_types::{MoneyAmount, PaymentId, recipients};
use serde::Serialize;
use serde_json::Value;

#[cfg(feature = "telemetry")]
use tracing::instrument;

use super::WalletClient;
use crate::error::WalletError;
use crate::transport::Transport;

/// ISO 4217 numeric code of the Russian rouble.
pub const CURRENCY_RUB: &str = "643";
/// Funding source: the rouble balance of the wallet.
pub const SOURCE_ACCOUNT_RUB: &str = "account_643";
pub const PAYMENT_METHOD_ACCOUNT: &str = "Account";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentSum {
    pub amount: MoneyAmount,
    pub currency: &'static str,
}

impl PaymentSum {
    pub fn rub(amount: MoneyAmount) -> Self {
        Self {
            amount,
            currency: CURRENCY_RUB,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub account_id: &'static str,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        Self {
            kind: PAYMENT_METHOD_ACCOUNT,
            account_id: CURRENCY_RUB,
        }
    }
}

/// Destination of a payment.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentFields {
    pub account: String,
    /// Bank transfers only
    pub account_type: Option<String>,
    /// Bank transfers only, `MMYY`
    pub exp_date: Option<String>,
}

/// Body of a payment submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub id: PaymentId,
    pub sum: PaymentSum,
    pub source: &'static str,
    pub payment_method: PaymentMethod,
    pub comment: String,
    pub fields: PaymentFields,
}

impl PaymentRequest {
    /// A rouble payment to `account` with a freshly generated identifier.
    pub fn new(
        account: impl Into<String>,
        amount: MoneyAmount,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            id: PaymentId::generate(),
            sum: PaymentSum::rub(amount),
            source: SOURCE_ACCOUNT_RUB,
            payment_method: PaymentMethod::default(),
            comment: comment.into(),
            fields: PaymentFields {
                account: account.into(),
                account_type: None,
                exp_date: None,
            },
        }
    }

    pub fn with_bank_details(
        mut self,
        account_type: impl Into<String>,
        exp_date: impl Into<String>,
    ) -> Self {
        self.fields.account_type = Some(account_type.into());
        self.fields.exp_date = Some(exp_date.into());
        self
    }
}

/// Destination of [`WalletClient::send_to_bank_account`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankTransfer {
    /// Provider identifier of the bank, see [`recipients::banks`]
    pub recipient: u32,
    /// Card or account number
    pub account: String,
    /// `"1"` for a card, `"2"` for an account (bank specific)
    pub account_type: String,
    /// Card expiry, `MMYY`
    pub exp_date: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct OnlineCommissionRequest<'a> {
    account: &'a str,
    payment_method: PaymentMethod,
    purchase_totals: PurchaseTotals,
}

#[derive(Debug, Clone, Serialize)]
struct PurchaseTotals {
    total: PaymentSum,
}

/// Splits a phone number into the `+`-prefixed international form used for detection and the
/// national ten-digit form used as the payment account.
pub fn phone_forms(phone: &str) -> (String, String) {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    let russian = match digits.len() {
        10 => Some(digits.clone()),
        11 if digits.starts_with('7') || digits.starts_with('8') => Some(digits[1..].to_string()),
        _ => None,
    };
    match russian {
        Some(national) => (format!("+7{national}"), national),
        None => (format!("+{digits}"), digits),
    }
}

impl<T: Transport> WalletClient<T> {
    /// `POST /sinap/api/v2/terms/{providerId}/payments`
    #[cfg_attr(
        feature = "telemetry",
        instrument(
            name = "qiwi.wallet.submit_payment",
            skip_all,
            fields(provider = provider, id = %payment.id),
            err
        )
    )]
    pub async fn submit_payment(
        &self,
        provider: u32,
        payment: &PaymentRequest,
    ) -> Result<Value, WalletError> {
        let context = "POST /sinap/api/v2/terms/{providerId}/payments";
        let body = serde_json::to_value(payment)
            .map_err(|source| WalletError::Encode { context, source })?;
        let provider = provider.to_string();
        let request = self
            .api_request(
                Method::POST,
                &["sinap", "api", "v2", "terms", provider.as_str(), "payments"],
                context,
            )?
            .with_json(body);
        self.call_json(request).await
    }

    /// Transfers to another QIWI wallet.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "qiwi.wallet.send_to_wallet", skip_all, err)
    )]
    pub async fn send_to_wallet(
        &self,
        wallet: &str,
        amount: MoneyAmount,
        comment: &str,
    ) -> Result<Value, WalletError> {
        let payment = PaymentRequest::new(wallet, amount, comment);
        self.submit_payment(recipients::QIWI, &payment).await
    }

    /// Tops up a mobile phone; the operator is detected first.
    ///
    /// Fails with [`WalletError::OperatorNotDetected`] without paying if detection fails.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "qiwi.wallet.send_to_mobile_phone", skip_all, err)
    )]
    pub async fn send_to_mobile_phone(
        &self,
        phone: &str,
        amount: MoneyAmount,
        comment: &str,
    ) -> Result<Value, WalletError> {
        let (international, national) = phone_forms(phone);
        let provider = self
            .detect_operator(&international)
            .await
            .ok()
            .and_then(|d| d.provider_id())
            .ok_or(WalletError::OperatorNotDetected)?;
        let payment = PaymentRequest::new(national, amount, comment);
        self.submit_payment(provider, &payment).await
    }

    /// Transfers to a bank card; the card network is detected first.
    ///
    /// Fails with [`WalletError::InvalidCardNumber`] without paying if detection fails.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "qiwi.wallet.send_to_card", skip_all, err)
    )]
    pub async fn send_to_card(
        &self,
        card_number: &str,
        amount: MoneyAmount,
        comment: &str,
    ) -> Result<Value, WalletError> {
        let provider = self
            .detect_card(card_number)
            .await
            .ok()
            .and_then(|d| d.provider_id())
            .ok_or(WalletError::InvalidCardNumber)?;
        let payment = PaymentRequest::new(card_number, amount, comment);
        self.submit_payment(provider, &payment).await
    }

    /// Transfers to a card or account of a specific bank.
    #[cfg_attr(
        feature = "telemetry",
        instrument(
            name = "qiwi.wallet.send_to_bank_account",
            skip_all,
            fields(recipient = transfer.recipient),
            err
        )
    )]
    pub async fn send_to_bank_account(
        &self,
        transfer: &BankTransfer,
        amount: MoneyAmount,
        comment: &str,
    ) -> Result<Value, WalletError> {
        let payment = PaymentRequest::new(transfer.account.as_str(), amount, comment)
            .with_bank_details(transfer.account_type.as_str(), transfer.exp_date.as_str());
        self.submit_payment(transfer.recipient, &payment).await
    }

    /// `GET /sinap/providers/{providerId}/form`: the provider's commission rules.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "qiwi.wallet.check_commission", skip_all, err)
    )]
    pub async fn check_commission(&self, provider: u32) -> Result<Value, WalletError> {
        let provider = provider.to_string();
        let request = self.api_request(
            Method::GET,
            &["sinap", "providers", provider.as_str(), "form"],
            "GET /sinap/providers/{providerId}/form",
        )?;
        self.call_json(request).await
    }

    /// `POST /sinap/providers/{providerId}/onlineCommission`: the exact fee for one payment.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "qiwi.wallet.check_online_commission", skip_all, err)
    )]
    pub async fn check_online_commission(
        &self,
        provider: u32,
        account: &str,
        amount: MoneyAmount,
    ) -> Result<Value, WalletError> {
        let context = "POST /sinap/providers/{providerId}/onlineCommission";
        let body = OnlineCommissionRequest {
            account,
            payment_method: PaymentMethod::default(),
            purchase_totals: PurchaseTotals {
                total: PaymentSum::rub(amount),
            },
        };
        let body = serde_json::to_value(&body)
            .map_err(|source| WalletError::Encode { context, source })?;
        let provider = provider.to_string();
        let request = self
            .api_request(
                Method::POST,
                &["sinap", "providers", provider.as_str(), "onlineCommission"],
                context,
            )?
            .with_json(body);
        self.call_json(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::transport::{ApiRequest, RequestBody, TransportError};
    use http::header::AUTHORIZATION;
    use serde_json::json;

    fn json_body(request: &ApiRequest) -> &Value {
        match &request.body {
            Some(RequestBody::Json(body)) => body,
            other => panic!("expected JSON body, got {other:?}"),
        }
    }

    fn accepted() -> Value {
        json!({"id": "1", "transaction": {"id": "4969142201", "state": {"code": "Accepted"}}})
    }

    #[tokio::test]
    async fn test_send_to_wallet_body() {
        let transport = RecordingTransport::new();
        transport.push_json(accepted());
        let client = client(&transport);

        let amount = MoneyAmount::parse("10.5").unwrap();
        let result = client.send_to_wallet("+79991234567", amount, "thanks").await.unwrap();
        assert_eq!(result["transaction"]["state"]["code"], "Accepted");

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::POST);
        assert_eq!(requests[0].url.path(), "/sinap/api/v2/terms/99/payments");
        let body = json_body(&requests[0]);
        assert_eq!(body["sum"], json!({"amount": 10.5, "currency": "643"}));
        assert_eq!(body["source"], "account_643");
        assert_eq!(body["paymentMethod"], json!({"type": "Account", "accountId": "643"}));
        assert_eq!(body["comment"], "thanks");
        assert_eq!(body["fields"], json!({"account": "+79991234567"}));
        let id = body["id"].as_str().unwrap();
        assert!(!id.is_empty() && id.chars().all(|c| c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn test_send_to_card_detects_provider() {
        let transport = RecordingTransport::new();
        transport.push_json(json!({"code": {"value": "0"}, "message": "1963"}));
        transport.push_json(accepted());
        let client = client(&transport);

        client
            .send_to_card("4111111111111111", MoneyAmount::from(100), "")
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].url.path(), "/card/detect.action");
        assert_eq!(requests[1].url.path(), "/sinap/api/v2/terms/1963/payments");
        assert_eq!(json_body(&requests[1])["fields"]["account"], "4111111111111111");
    }

    #[tokio::test]
    async fn test_send_to_card_not_detected() {
        let transport = RecordingTransport::new();
        let body = json!({"code": {"value": "2"}, "message": "Неверный номер карты"});
        transport.push_json(body);
        let client = client(&transport);

        let result = client
            .send_to_card("1234", MoneyAmount::from(100), "")
            .await;
        assert!(matches!(result, Err(WalletError::InvalidCardNumber)));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_send_to_card_detection_transport_failure() {
        let transport = RecordingTransport::new();
        transport.push(Err(TransportError::Connection("timeout".into())));
        let client = client(&transport);

        let result = client
            .send_to_card("4111111111111111", MoneyAmount::from(100), "")
            .await;
        assert!(matches!(result, Err(WalletError::InvalidCardNumber)));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_send_to_mobile_phone() {
        let transport = RecordingTransport::new();
        transport.push_json(json!({"code": {"value": "0"}, "message": "1"}));
        transport.push_json(accepted());
        let client = client(&transport);

        client
            .send_to_mobile_phone("79031234567", MoneyAmount::from(50), "top up")
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(
            requests[0].body,
            Some(RequestBody::Form(vec![("phone".into(), "+79031234567".into())]))
        );
        assert_eq!(requests[1].url.path(), "/sinap/api/v2/terms/1/payments");
        assert_eq!(json_body(&requests[1])["fields"]["account"], "9031234567");
    }

    #[tokio::test]
    async fn test_send_to_mobile_phone_not_detected() {
        let transport = RecordingTransport::new();
        transport.push_json(json!({"code": {"value": "2"}, "message": null}));
        let client = client(&transport);

        let result = client
            .send_to_mobile_phone("+79031234567", MoneyAmount::from(50), "")
            .await;
        assert!(matches!(result, Err(WalletError::OperatorNotDetected)));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_send_to_mobile_phone_detection_transport_failure() {
        let transport = RecordingTransport::new();
        transport.push(Err(TransportError::Connection("connection refused".into())));
        let client = client(&transport);

        let result = client
            .send_to_mobile_phone("79031234567", MoneyAmount::from(50), "")
            .await;
        assert!(matches!(result, Err(WalletError::OperatorNotDetected)));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_send_to_mobile_phone_detection_error_code() {
        let transport = RecordingTransport::new();
        transport.push_json(json!({"errorCode": "internal.error", "userMessage": "Try later"}));
        let client = client(&transport);

        let result = client
            .send_to_mobile_phone("79031234567", MoneyAmount::from(50), "")
            .await;
        assert!(matches!(result, Err(WalletError::OperatorNotDetected)));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_send_to_bank_account() {
        let transport = RecordingTransport::new();
        transport.push_json(accepted());
        let client = client(&transport);

        let transfer = BankTransfer {
            recipient: recipients::banks::TINKOFF,
            account: "5213243738261234".into(),
            account_type: "1".into(),
            exp_date: "0926".into(),
        };
        client
            .send_to_bank_account(&transfer, MoneyAmount::from(1000), "rent")
            .await
            .unwrap();

        let request = &transport.requests()[0];
        assert_eq!(request.url.path(), "/sinap/api/v2/terms/466/payments");
        assert_eq!(
            json_body(request)["fields"],
            json!({"account": "5213243738261234", "account_type": "1", "exp_date": "0926"})
        );
    }

    #[tokio::test]
    async fn test_payment_ids_differ_between_sends() {
        let transport = RecordingTransport::new();
        transport.push_json(accepted());
        transport.push_json(accepted());
        let client = client(&transport);

        client.send_to_wallet("79990000000", MoneyAmount::from(1), "").await.unwrap();
        client.send_to_wallet("79990000000", MoneyAmount::from(1), "").await.unwrap();

        let requests = transport.requests();
        assert_ne!(json_body(&requests[0])["id"], json_body(&requests[1])["id"]);
    }

    #[tokio::test]
    async fn test_commission_lookups_are_authorized() {
        let transport = RecordingTransport::new();
        transport.push_json(json!({"content": {"terms": {"commission": {"ranges": []}}}}));
        transport.push_json(json!({"qwCommission": {"amount": 0, "currency": 643}}));
        let client = client(&transport);

        client.check_commission(1963).await.unwrap();
        client
            .check_online_commission(1963, "4111111111111111", MoneyAmount::from(500))
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].method, Method::GET);
        assert_eq!(requests[0].url.path(), "/sinap/providers/1963/form");
        assert!(requests[0].headers.get(AUTHORIZATION).is_some());
        assert_eq!(requests[1].url.path(), "/sinap/providers/1963/onlineCommission");
        assert_eq!(
            json_body(&requests[1]),
            &json!({
                "account": "4111111111111111",
                "paymentMethod": {"type": "Account", "accountId": "643"},
                "purchaseTotals": {"total": {"amount": 500.0, "currency": "643"}}
            })
        );
    }

    #[test]
    fn test_phone_forms() {
        assert_eq!(
            phone_forms("+79031234567"),
            ("+79031234567".to_string(), "9031234567".to_string())
        );
        assert_eq!(
            phone_forms("89031234567"),
            ("+79031234567".to_string(), "9031234567".to_string())
        );
        assert_eq!(
            phone_forms("9031234567"),
            ("+79031234567".to_string(), "9031234567".to_string())
        );
        assert_eq!(
            phone_forms("+380501234567"),
            ("+380501234567".to_string(), "380501234567".to_string())
        );
    }
}
