//! UPS OAuth and Locator HTTP client.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::{debug, error, info, warn};

use crate::domain::{Address, Credential, Location, SearchCriteria};

use super::convert::{convert_response, locator_request};
use super::error::UpsError;
use super::types::{LocatorResponseEnvelope, TokenResponse, error_message};

const DEV_AUTH_URL: &str = "https://wwwcie.ups.com/security/v1/oauth/token";
const PROD_AUTH_URL: &str = "https://onlinetools.ups.com/security/v1/oauth/token";
const DEV_LOCATOR_URL: &str = "https://wwwcie.ups.com/api/locations/v2/search/availabilities/1";
const PROD_LOCATOR_URL: &str =
    "https://onlinetools.ups.com/api/locations/v2/search/availabilities/1";

/// Which UPS environment to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpsEnvironment {
    /// Customer integration environment (`wwwcie`)
    #[default]
    Development,
    Production,
}

impl UpsEnvironment {
    /// Parse an environment name; anything but `production` is development.
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("production") {
            UpsEnvironment::Production
        } else {
            UpsEnvironment::Development
        }
    }

    pub fn auth_url(self) -> &'static str {
        match self {
            UpsEnvironment::Development => DEV_AUTH_URL,
            UpsEnvironment::Production => PROD_AUTH_URL,
        }
    }

    pub fn locator_url(self) -> &'static str {
        match self {
            UpsEnvironment::Development => DEV_LOCATOR_URL,
            UpsEnvironment::Production => PROD_LOCATOR_URL,
        }
    }
}

/// Configuration for the UPS client.
#[derive(Debug, Clone)]
pub struct UpsConfig {
    /// OAuth token endpoint
    pub auth_url: String,
    /// Locator search endpoint, without query string
    pub locator_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl UpsConfig {
    /// Create a config pointing at the given environment.
    pub fn new(environment: UpsEnvironment) -> Self {
        Self {
            auth_url: environment.auth_url().to_string(),
            locator_url: environment.locator_url().to_string(),
            timeout_secs: 30,
        }
    }

    /// Override the OAuth endpoint.
    pub fn with_auth_url(mut self, url: impl Into<String>) -> Self {
        self.auth_url = url.into();
        self
    }

    /// Override the Locator endpoint.
    pub fn with_locator_url(mut self, url: impl Into<String>) -> Self {
        self.locator_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for UpsConfig {
    fn default() -> Self {
        Self::new(UpsEnvironment::default())
    }
}

/// UPS API client.
///
/// Stateless apart from the connection pool: tokens are passed in by the
/// caller, which owns caching them.
#[derive(Debug, Clone)]
pub struct UpsClient {
    http: reqwest::Client,
    auth_url: String,
    locator_url: String,
}

impl UpsClient {
    /// Create a new UPS client with the given configuration.
    pub fn new(config: UpsConfig) -> Result<Self, UpsError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            auth_url: config.auth_url,
            locator_url: config.locator_url,
        })
    }

    /// Exchange application credentials for a bearer token.
    pub async fn renew_credential(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<Credential, UpsError> {
        if client_id.is_empty() || client_secret.is_empty() {
            error!(
                has_client_id = !client_id.is_empty(),
                has_client_secret = !client_secret.is_empty(),
                "Missing UPS credentials"
            );
            return Err(UpsError::MissingCredentials);
        }

        let merchant_id = HeaderValue::from_str(client_id).map_err(|_| UpsError::Auth {
            status: 0,
            message: "Invalid client ID format".to_string(),
            body: None,
        })?;

        info!(client_id, "Requesting new UPS access token");

        let response = self
            .http
            .post(&self.auth_url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header("x-merchant-id", merchant_id)
            .basic_auth(client_id, Some(client_secret))
            .body("grant_type=client_credentials")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("").to_string());
            error!(status = status.as_u16(), message = %message, "UPS auth request failed");
            return Err(UpsError::Auth {
                status: status.as_u16(),
                message,
                body: serde_json::from_str(&body).ok(),
            });
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            error!(error = %e, "UPS auth response could not be parsed");
            UpsError::Auth {
                status: status.as_u16(),
                message: format!("invalid token response: {e}"),
                body: serde_json::from_str(&body).ok(),
            }
        })?;

        let expires_in = token
            .expires_in
            .as_ref()
            .and_then(|e| e.as_u64())
            .ok_or_else(|| UpsError::Auth {
                status: status.as_u16(),
                message: "missing or invalid expires_in".to_string(),
                body: serde_json::from_str(&body).ok(),
            })?;

        info!(expires_in, "Successfully obtained UPS access token");

        Ok(Credential {
            access_token: token.access_token,
            token_type: token.token_type,
            expires_in: Duration::from_secs(expires_in),
            refresh_token: token.refresh_token,
        })
    }

    /// Search for drop-off locations around `address`.
    ///
    /// Zero matches is an empty list, not an error.
    pub async fn search(
        &self,
        address: &Address,
        access_token: &str,
        criteria: &SearchCriteria,
    ) -> Result<Vec<Location>, UpsError> {
        debug!(
            url = %self.locator_url,
            radius = criteria.radius,
            max_results = criteria.max_results,
            service_types = ?criteria.service_types,
            city = %address.city,
            state = %address.state,
            country = %address.country,
            "Making UPS location API request"
        );

        let response = self
            .http
            .post(&self.locator_url)
            .query(&[("Locale", "en_US")])
            .bearer_auth(access_token)
            .json(&locator_request(address, criteria))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("").to_string());
            error!(status = status.as_u16(), message = %message, "UPS location API request failed");
            return Err(UpsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: LocatorResponseEnvelope =
            serde_json::from_str(&body).map_err(|e| UpsError::Json {
                message: e.to_string(),
                body: Some(body.chars().take(500).collect()),
            })?;

        let locations = convert_response(parsed);
        if locations.is_empty() {
            warn!("No locations found in UPS response");
        } else {
            info!(
                location_count = locations.len(),
                first_location = %locations[0].id,
                "Successfully retrieved UPS locations"
            );
        }

        Ok(locations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use mockito::Matcher;

    const LOCATOR_PATH: &str = "/api/locations/v2/search/availabilities/1";

    fn client_for(server: &mockito::ServerGuard) -> UpsClient {
        let config = UpsConfig::default()
            .with_auth_url(format!("{}/security/v1/oauth/token", server.url()))
            .with_locator_url(format!("{}{}", server.url(), LOCATOR_PATH))
            .with_timeout(5);
        UpsClient::new(config).unwrap()
    }

    #[test]
    fn environment_selects_urls() {
        assert_eq!(UpsConfig::default().auth_url, DEV_AUTH_URL);

        let prod = UpsConfig::new(UpsEnvironment::from_name("Production"));
        assert_eq!(prod.auth_url, PROD_AUTH_URL);
        assert_eq!(prod.locator_url, PROD_LOCATOR_URL);
        assert_eq!(prod.timeout_secs, 30);

        assert_eq!(
            UpsEnvironment::from_name("staging"),
            UpsEnvironment::Development
        );
    }

    #[tokio::test]
    async fn renew_sends_client_credentials_grant() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/security/v1/oauth/token")
            .match_header("x-merchant-id", "client-id")
            .match_header(
                "authorization",
                format!("Basic {}", STANDARD.encode("client-id:secret")).as_str(),
            )
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body("grant_type=client_credentials")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"tok","token_type":"Bearer","expires_in":"14399"}"#)
            .create_async()
            .await;

        let credential = client_for(&server)
            .renew_credential("client-id", "secret")
            .await
            .unwrap();

        assert_eq!(credential.access_token, "tok");
        assert_eq!(credential.token_type.as_deref(), Some("Bearer"));
        assert_eq!(credential.expires_in, Duration::from_secs(14399));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn renew_rejection_carries_upstream_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/security/v1/oauth/token")
            .with_status(401)
            .with_body(r#"{"response":{"errors":[{"code":"250002","message":"Invalid Authentication Information."}]}}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .renew_credential("client-id", "wrong")
            .await
            .unwrap_err();

        match err {
            UpsError::Auth {
                status,
                message,
                body,
            } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid Authentication Information.");
                assert!(body.is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn renew_with_unreadable_token_is_auth_error() {
        for body in [
            "<html>maintenance</html>",
            r#"{"access_token":"tok","expires_in":"soon"}"#,
        ] {
            let mut server = mockito::Server::new_async().await;
            server
                .mock("POST", "/security/v1/oauth/token")
                .with_status(200)
                .with_body(body)
                .create_async()
                .await;

            let err = client_for(&server)
                .renew_credential("client-id", "secret")
                .await
                .unwrap_err();
            match err {
                UpsError::Auth { status, .. } => assert_eq!(status, 200),
                other => panic!("unexpected error for {body}: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn renew_without_credentials_makes_no_call() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let err = client_for(&server)
            .renew_credential("", "secret")
            .await
            .unwrap_err();

        assert!(matches!(err, UpsError::MissingCredentials));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn search_returns_converted_locations() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", LOCATOR_PATH)
            .match_query(Matcher::UrlEncoded("Locale".into(), "en_US".into()))
            .match_header("authorization", "Bearer tok")
            .match_body(Matcher::PartialJsonString(
                r#"{"LocatorRequest":{"OriginAddress":{"AddressKeyFormat":{"PostcodePrimaryLow":"30005"}}}}"#.to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"LocatorResponse":{"SearchResults":{"DropLocation":[
                    {"LocationID":"L1","LocationName":"One"},
                    {"LocationID":"L2","LocationName":"Two"}]}}}"#,
            )
            .create_async()
            .await;

        let address = Address::new("123 Fork Rd", "Atlanta", "GA", "30005");
        let locations = client_for(&server)
            .search(&address, "tok", &SearchCriteria::default())
            .await
            .unwrap();

        let ids: Vec<_> = locations.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, ["L1", "L2"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn search_error_status_is_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", LOCATOR_PATH)
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"response":{"errors":[{"code":"350203","message":"Invalid postal code"}]}}"#)
            .create_async()
            .await;

        let address = Address::new("1 Main", "Nowhere", "GA", "00000");
        let err = client_for(&server)
            .search(&address, "tok", &SearchCriteria::default())
            .await
            .unwrap_err();

        match err {
            UpsError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid postal code");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn search_malformed_body_is_json_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", LOCATOR_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>gateway</html>")
            .create_async()
            .await;

        let address = Address::new("1 Main", "Atlanta", "GA", "30005");
        let err = client_for(&server)
            .search(&address, "tok", &SearchCriteria::default())
            .await
            .unwrap_err();

        assert!(matches!(err, UpsError::Json { .. }));
    }
}
