//! Profile, balance, identification and exchange rates.

use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[cfg(feature = "telemetry")]
use tracing::instrument;

use super::WalletClient;
use crate::error::WalletError;
use crate::transport::Transport;

/// Personal data submitted for simplified wallet identification.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentificationData {
    /// `YYYY-MM-DD`
    pub birth_date: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    /// Series and number, digits only
    pub passport: String,
    pub inn: Option<String>,
    pub snils: Option<String>,
    pub oms: Option<String>,
}

impl<T: Transport> WalletClient<T> {
    /// `GET /identification/v1/persons/{wallet}/identification`
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "qiwi.wallet.get_identification", skip_all, err)
    )]
    pub async fn get_identification(&self, wallet: &str) -> Result<Value, WalletError> {
        let request = self.api_request(
            Method::GET,
            &["identification", "v1", "persons", wallet, "identification"],
            "GET /identification/v1/persons/{wallet}/identification",
        )?;
        self.call_json(request).await
    }

    /// `POST /identification/v1/persons/{wallet}/identification`
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "qiwi.wallet.identify_wallet", skip_all, err)
    )]
    pub async fn identify_wallet(
        &self,
        wallet: &str,
        data: &IdentificationData,
    ) -> Result<Value, WalletError> {
        let context = "POST /identification/v1/persons/{wallet}/identification";
        let body = serde_json::to_value(data)
            .map_err(|source| WalletError::Encode { context, source })?;
        let request = self
            .api_request(
                Method::POST,
                &["identification", "v1", "persons", wallet, "identification"],
                context,
            )?
            .with_json(body);
        self.call_json(request).await
    }

    /// `GET /person-profile/v1/profile/current`
    ///
    /// The profile carries the person identifier under `authInfo.personId`.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "qiwi.wallet.get_account_info", skip_all, err)
    )]
    pub async fn get_account_info(&self) -> Result<Value, WalletError> {
        let request = self.api_request(
            Method::GET,
            &["person-profile", "v1", "profile", "current"],
            "GET /person-profile/v1/profile/current",
        )?;
        self.call_json(request).await
    }

    /// `GET /funding-sources/v1/accounts/current`
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "qiwi.wallet.get_balance", skip_all, err)
    )]
    pub async fn get_balance(&self) -> Result<Value, WalletError> {
        let request = self.api_request(
            Method::GET,
            &["funding-sources", "v1", "accounts", "current"],
            "GET /funding-sources/v1/accounts/current",
        )?;
        self.call_json(request).await
    }

    /// `GET /sinap/crossRates`
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "qiwi.wallet.get_cross_rates", skip_all, err)
    )]
    pub async fn get_cross_rates(&self) -> Result<Value, WalletError> {
        let request =
            self.api_request(Method::GET, &["sinap", "crossRates"], "GET /sinap/crossRates")?;
        self.call_json(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::transport::RequestBody;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_get_balance_end_to_end() {
        let server = MockServer::start().await;
        let body = json!({
            "accounts": [{
                "alias": "qw_wallet_rub",
                "hasBalance": true,
                "balance": {"amount": 42.5, "currency": 643}
            }]
        });
        Mock::given(method("GET"))
            .and(path("/funding-sources/v1/accounts/current"))
            .and(header("Authorization", "Bearer secret-token"))
            .and(header("Accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .expect(1)
            .mount(&server)
            .await;

        let client = WalletClient::try_new("secret-token")
            .unwrap()
            .with_api_url(server.uri().parse().unwrap())
            .unwrap();
        let balance = client.get_balance().await.unwrap();
        assert_eq!(balance, body);
    }

    #[tokio::test]
    async fn test_api_error_from_server() {
        let server = MockServer::start().await;
        let body = json!({"errorCode": "auth.forbidden", "userMessage": "Forbidden"});
        Mock::given(method("GET"))
            .and(path("/person-profile/v1/profile/current"))
            .respond_with(ResponseTemplate::new(401).set_body_json(&body))
            .mount(&server)
            .await;

        let client = WalletClient::try_new("expired")
            .unwrap()
            .with_api_url(server.uri().parse().unwrap())
            .unwrap();
        match client.get_account_info().await.unwrap_err() {
            WalletError::Api(value) => assert_eq!(value, body),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_identification_paths() {
        let transport = RecordingTransport::new();
        transport.push_json(json!({"id": 79991234567u64, "type": "SIMPLE"}));
        transport.push_json(json!({"id": 79991234567u64, "type": "VERIFIED"}));
        let client = client(&transport);

        client.get_identification("79991234567").await.unwrap();
        let data = IdentificationData {
            birth_date: "1990-01-01".into(),
            first_name: "Ivan".into(),
            middle_name: "Ivanovich".into(),
            last_name: "Ivanov".into(),
            passport: "4400111222".into(),
            inn: Some("123456789012".into()),
            ..Default::default()
        };
        client.identify_wallet("79991234567", &data).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].method, Method::GET);
        assert_eq!(
            requests[0].url.path(),
            "/identification/v1/persons/79991234567/identification"
        );
        assert_eq!(requests[1].method, Method::POST);
        let Some(RequestBody::Json(body)) = &requests[1].body else {
            panic!("expected JSON body");
        };
        assert_eq!(body["birthDate"], "1990-01-01");
        assert_eq!(body["inn"], "123456789012");
        assert!(body.get("snils").is_none());
    }

    #[tokio::test]
    async fn test_cross_rates() {
        let transport = RecordingTransport::new();
        transport.push_json(json!({"result": [{"from": "643", "to": "840", "rate": 90.1}]}));
        let client = client(&transport);
        let rates = client.get_cross_rates().await.unwrap();
        assert_eq!(rates["result"][0]["to"], "840");
        assert_eq!(transport.requests()[0].url.path(), "/sinap/crossRates");
    }
}
