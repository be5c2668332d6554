//! Payment history, statistics, transaction details and receipts.
//!
//! History and statistics are person-scoped: the person identifier is read from the account
//! profile first (`authInfo.personId`), then the real request is issued. If the profile call
//! fails its error is returned as-is and the second call is never made.

use http::Method;
use qiwi_types::{ReceiptFormat, TransactionType};
use serde_json::Value;

#[cfg(feature = "telemetry")]
use tracing::instrument;

use super::WalletClient;
use crate::error::WalletError;
use crate::transport::Transport;

/// Query of `GET /payment-history/v2/persons/{personId}/payments`.
///
/// Dates are ISO-8601 with a time zone, e.g. `2024-01-01T00:00:00+03:00`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    /// Number of rows, 1 to 50
    pub rows: u32,
    pub operation: Option<TransactionType>,
    /// Funding source filter, e.g. `QW_RUB`, `CARD`, `MK`
    pub sources: Vec<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// Pagination cursor: date of the last transaction of the previous page
    pub next_txn_date: Option<String>,
    /// Pagination cursor: id of the last transaction of the previous page
    pub next_txn_id: Option<String>,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self::new(HistoryQuery::MAX_ROWS)
    }
}

impl HistoryQuery {
    pub const MAX_ROWS: u32 = 50;

    pub fn new(rows: u32) -> Self {
        Self {
            rows,
            operation: None,
            sources: Vec::new(),
            start_date: None,
            end_date: None,
            next_txn_date: None,
            next_txn_id: None,
        }
    }

    pub fn with_operation(mut self, operation: TransactionType) -> Self {
        self.operation = Some(operation);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.sources.push(source.into());
        self
    }

    pub fn with_period(
        mut self,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Self {
        self.start_date = Some(start_date.into());
        self.end_date = Some(end_date.into());
        self
    }

    /// Continues after the page that ended at the given transaction.
    pub fn with_cursor(
        mut self,
        next_txn_date: impl Into<String>,
        next_txn_id: impl Into<String>,
    ) -> Self {
        self.next_txn_date = Some(next_txn_date.into());
        self.next_txn_id = Some(next_txn_id.into());
        self
    }

    fn to_query(&self) -> Vec<(String, String)> {
        let mut query = vec![("rows".to_string(), self.rows.to_string())];
        if let Some(operation) = self.operation {
            query.push(("operation".into(), operation.to_string()));
        }
        query.extend(sources_query(&self.sources));
        let optional = [
            ("startDate", &self.start_date),
            ("endDate", &self.end_date),
            ("nextTxnDate", &self.next_txn_date),
            ("nextTxnId", &self.next_txn_id),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                query.push((key.into(), value.clone()));
            }
        }
        query
    }
}

/// Query of `GET /payment-history/v2/persons/{personId}/payments/total`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsQuery {
    pub start_date: String,
    pub end_date: String,
    pub operation: Option<TransactionType>,
    pub sources: Vec<String>,
}

impl StatsQuery {
    pub fn new(start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        Self {
            start_date: start_date.into(),
            end_date: end_date.into(),
            operation: None,
            sources: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: TransactionType) -> Self {
        self.operation = Some(operation);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.sources.push(source.into());
        self
    }

    fn to_query(&self) -> Vec<(String, String)> {
        let mut query = vec![
            ("startDate".to_string(), self.start_date.clone()),
            ("endDate".to_string(), self.end_date.clone()),
        ];
        if let Some(operation) = self.operation {
            query.push(("operation".into(), operation.to_string()));
        }
        query.extend(sources_query(&self.sources));
        query
    }
}

/// `sources[0]=QW_RUB&sources[1]=CARD`
fn sources_query(sources: &[String]) -> impl Iterator<Item = (String, String)> + '_ {
    sources
        .iter()
        .enumerate()
        .map(|(i, source)| (format!("sources[{i}]"), source.clone()))
}

/// A transaction receipt file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub format: ReceiptFormat,
    /// Content type reported by the server, if any
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Reads `authInfo.personId` from a profile payload.
pub fn person_id(profile: &Value) -> Option<String> {
    match profile.pointer("/authInfo/personId")? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

impl<T: Transport> WalletClient<T> {
    /// Fetches the profile and extracts the person identifier.
    async fn current_person_id(&self) -> Result<String, WalletError> {
        let profile = self.get_account_info().await?;
        person_id(&profile).ok_or(WalletError::AccountInfoUnavailable)
    }

    /// `GET /payment-history/v2/persons/{personId}/payments`
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "qiwi.wallet.get_operation_history", skip_all, err)
    )]
    pub async fn get_operation_history(&self, query: &HistoryQuery) -> Result<Value, WalletError> {
        let person_id = self.current_person_id().await?;
        let request = self
            .api_request(
                Method::GET,
                &["payment-history", "v2", "persons", person_id.as_str(), "payments"],
                "GET /payment-history/v2/persons/{personId}/payments",
            )?
            .with_query(query.to_query());
        self.call_json(request).await
    }

    /// `GET /payment-history/v2/persons/{personId}/payments/total`
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "qiwi.wallet.get_operation_stats", skip_all, err)
    )]
    pub async fn get_operation_stats(&self, query: &StatsQuery) -> Result<Value, WalletError> {
        let person_id = self.current_person_id().await?;
        let request = self
            .api_request(
                Method::GET,
                &["payment-history", "v2", "persons", person_id.as_str(), "payments", "total"],
                "GET /payment-history/v2/persons/{personId}/payments/total",
            )?
            .with_query(query.to_query());
        self.call_json(request).await
    }

    /// `GET /payment-history/v2/transactions/{transactionId}`
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "qiwi.wallet.get_transaction_info", skip_all, err)
    )]
    pub async fn get_transaction_info(
        &self,
        transaction_id: &str,
        transaction_type: TransactionType,
    ) -> Result<Value, WalletError> {
        let request = self
            .api_request(
                Method::GET,
                &["payment-history", "v2", "transactions", transaction_id],
                "GET /payment-history/v2/transactions/{transactionId}",
            )?
            .with_query([("type", transaction_type.as_str())]);
        self.call_json(request).await
    }

    /// `GET /payment-history/v1/transactions/{transactionId}/cheque/file`
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "qiwi.wallet.get_receipt", skip_all, err)
    )]
    pub async fn get_receipt(
        &self,
        transaction_id: &str,
        transaction_type: TransactionType,
        format: ReceiptFormat,
    ) -> Result<Receipt, WalletError> {
        let request = self
            .api_request(
                Method::GET,
                &["payment-history", "v1", "transactions", transaction_id, "cheque", "file"],
                "GET /payment-history/v1/transactions/{transactionId}/cheque/file",
            )?
            .with_query([
                ("type", transaction_type.as_str()),
                ("format", format.as_str()),
            ]);
        let response = self.call_raw(request).await?;
        Ok(Receipt {
            format,
            content_type: response.content_type,
            bytes: response.body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::transport::{ApiResponse, TransportError};
    use http::StatusCode;
    use serde_json::json;

    #[test]
    fn test_history_query_pairs() {
        let query = HistoryQuery::new(10)
            .with_operation(TransactionType::In)
            .with_source("QW_RUB")
            .with_source("CARD")
            .with_period("2024-01-01T00:00:00+03:00", "2024-01-31T00:00:00+03:00")
            .with_cursor("2024-01-15T12:00:00+03:00", "1234567");
        let pairs = query.to_query();
        let expected: Vec<(String, String)> = [
            ("rows", "10"),
            ("operation", "IN"),
            ("sources[0]", "QW_RUB"),
            ("sources[1]", "CARD"),
            ("startDate", "2024-01-01T00:00:00+03:00"),
            ("endDate", "2024-01-31T00:00:00+03:00"),
            ("nextTxnDate", "2024-01-15T12:00:00+03:00"),
            ("nextTxnId", "1234567"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        assert_eq!(pairs, expected);
    }

    #[test]
    fn test_person_id_extraction() {
        assert_eq!(person_id(&profile(79991234567)), Some("79991234567".into()));
        assert_eq!(
            person_id(&json!({"authInfo": {"personId": "79991234567"}})),
            Some("79991234567".into())
        );
        assert_eq!(person_id(&json!({"authInfo": {}})), None);
        assert_eq!(person_id(&Value::Null), None);
    }

    #[tokio::test]
    async fn test_history_uses_person_id_from_profile() {
        let transport = RecordingTransport::new();
        transport.push_json(profile(79991234567));
        transport.push_json(json!({"data": [], "nextTxnId": null, "nextTxnDate": null}));
        let client = client(&transport);

        let history = client
            .get_operation_history(&HistoryQuery::new(5).with_operation(TransactionType::Out))
            .await
            .unwrap();
        assert_eq!(history["data"], json!([]));

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].url.path(), "/person-profile/v1/profile/current");
        assert_eq!(
            requests[1].url.path(),
            "/payment-history/v2/persons/79991234567/payments"
        );
        assert_eq!(requests[1].query_value("rows"), Some("5"));
        assert_eq!(requests[1].query_value("operation"), Some("OUT"));
    }

    #[tokio::test]
    async fn test_history_profile_error_is_returned_unchanged() {
        let transport = RecordingTransport::new();
        let body = json!({"errorCode": "auth.forbidden"});
        transport.push(Ok(ApiResponse::json_with_status(StatusCode::UNAUTHORIZED, &body)));
        let client = client(&transport);

        match client.get_operation_history(&HistoryQuery::default()).await {
            Err(WalletError::Api(value)) => assert_eq!(value, body),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_stats_transport_error_stops_before_second_call() {
        let transport = RecordingTransport::new();
        transport.push(Err(TransportError::Connection("dns failure".into())));
        let client = client(&transport);

        let query = StatsQuery::new("2024-01-01T00:00:00+03:00", "2024-02-01T00:00:00+03:00");
        match client.get_operation_stats(&query).await {
            Err(WalletError::Transport(TransportError::Connection(msg))) => {
                assert_eq!(msg, "dns failure")
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_profile_without_person_id_stops_before_second_call() {
        let transport = RecordingTransport::new();
        let body = json!({"message": "Not found"});
        transport.push(Ok(ApiResponse::json_with_status(StatusCode::NOT_FOUND, &body)));
        let client = client(&transport);

        assert!(matches!(
            client.get_operation_history(&HistoryQuery::default()).await,
            Err(WalletError::AccountInfoUnavailable)
        ));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_profile_is_account_info_unavailable() {
        let transport = RecordingTransport::new();
        transport.push(Ok(ApiResponse {
            status: StatusCode::OK,
            content_type: None,
            body: Vec::new(),
        }));
        let client = client(&transport);

        let query = StatsQuery::new("2024-01-01T00:00:00+03:00", "2024-02-01T00:00:00+03:00");
        assert!(matches!(
            client.get_operation_stats(&query).await,
            Err(WalletError::AccountInfoUnavailable)
        ));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_stats_request() {
        let transport = RecordingTransport::new();
        transport.push_json(profile(123));
        transport.push_json(json!({"incomingTotal": [], "outgoingTotal": []}));
        let client = client(&transport);

        let query = StatsQuery::new("2024-01-01T00:00:00+03:00", "2024-02-01T00:00:00+03:00")
            .with_source("QW_RUB");
        client.get_operation_stats(&query).await.unwrap();

        let request = &transport.requests()[1];
        assert_eq!(request.url.path(), "/payment-history/v2/persons/123/payments/total");
        assert_eq!(request.query_value("sources[0]"), Some("QW_RUB"));
        assert_eq!(request.query_value("startDate"), Some("2024-01-01T00:00:00+03:00"));
    }

    #[tokio::test]
    async fn test_transaction_info_and_receipt() {
        let transport = RecordingTransport::new();
        transport.push_json(json!({"txnId": 1234567, "status": "SUCCESS"}));
        transport.push(Ok(ApiResponse {
            status: StatusCode::OK,
            content_type: Some("application/pdf".into()),
            body: b"%PDF-1.4".to_vec(),
        }));
        let client = client(&transport);

        let info = client
            .get_transaction_info("1234567", TransactionType::Out)
            .await
            .unwrap();
        assert_eq!(info["status"], "SUCCESS");
        let receipt = client
            .get_receipt("1234567", TransactionType::Out, ReceiptFormat::Pdf)
            .await
            .unwrap();
        assert_eq!(receipt.bytes, b"%PDF-1.4");
        assert_eq!(receipt.content_type.as_deref(), Some("application/pdf"));

        let requests = transport.requests();
        assert_eq!(requests[0].url.path(), "/payment-history/v2/transactions/1234567");
        assert_eq!(requests[0].query_value("type"), Some("OUT"));
        assert_eq!(
            requests[1].url.path(),
            "/payment-history/v1/transactions/1234567/cheque/file"
        );
        assert_eq!(requests[1].query_value("format"), Some("PDF"));
    }

    #[tokio::test]
    async fn test_receipt_error_body_is_api_error() {
        let transport = RecordingTransport::new();
        transport.push_json(json!({"errorCode": "not.found", "description": "no cheque"}));
        let client = client(&transport);
        let result = client
            .get_receipt("1", TransactionType::In, ReceiptFormat::Jpeg)
            .await;
        assert!(matches!(result, Err(WalletError::Api(_))));
    }
}
