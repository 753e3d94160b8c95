//! Token endpoint and FHIR API client.
//!
//! Provides async HTTP client with:
//! - Connection pooling via reqwest
//! - Form-encoded authorization code exchange
//! - Bearer-authenticated FHIR reads
//!
//! Requests are single-shot: nothing is retried.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use url::Url;

use crate::config::{Config, api};
use crate::error::{ClientError, ClientResult};
use crate::models::{Bundle, MedicationRequest, Observation, Patient, TokenResponse};

/// The provider's token endpoint.
#[async_trait]
pub trait AuthorizationServer: Send + Sync {
    /// Exchange an authorization code and its PKCE verifier for a token.
    ///
    /// Single-shot: a rejected exchange is never retried.
    async fn exchange_code(&self, code: &str, code_verifier: &str) -> ClientResult<TokenResponse>;
}

/// Read access to the four clinical resource types shown on the chart.
///
/// The callback depends on this seam instead of on [`FhirClient`] so
/// orchestration can be tested without a network.
#[async_trait]
pub trait ClinicalDataSource: Send + Sync {
    /// `GET Patient/{id}`
    async fn patient(&self, access_token: &str, patient_id: &str) -> ClientResult<Patient>;

    /// `GET MedicationRequest?patient={id}`
    async fn medications(
        &self,
        access_token: &str,
        patient_id: &str,
    ) -> ClientResult<Bundle<MedicationRequest>>;

    /// `GET Observation?patient={id}&category=<lab>`
    async fn lab_reports(
        &self,
        access_token: &str,
        patient_id: &str,
    ) -> ClientResult<Bundle<Observation>>;

    /// `GET Observation?patient={id}&category=<vital-signs>`
    async fn vital_signs(
        &self,
        access_token: &str,
        patient_id: &str,
    ) -> ClientResult<Bundle<Observation>>;
}

/// HTTP client for the provider's token endpoint and FHIR API.
#[derive(Clone)]
pub struct FhirClient {
    /// HTTP client.
    client: Client,

    /// FHIR base URL.
    base_url: Url,

    /// Token endpoint URL.
    token_url: String,

    /// OAuth client id.
    client_id: String,

    /// Redirect URI sent with the exchange.
    redirect_uri: String,

    /// Observation category for lab results.
    lab_category: String,

    /// Observation category for vital signs.
    vitals_category: String,
}

impl FhirClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the FHIR base URL is invalid or HTTP client
    /// initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(api::MAX_KEEPALIVE)
            .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
            .gzip(true)
            .build()?;

        let base_url = Url::parse(&config.fhir_base_url)?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("FHIR base URL cannot be a base: {}", config.fhir_base_url);
        }

        Ok(Self {
            client,
            base_url,
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone(),
            redirect_uri: config.redirect_uri.clone(),
            lab_category: config.lab_category.clone(),
            vitals_category: config.vitals_category.clone(),
        })
    }

    /// Build `<base>/<segments..>` with each segment percent-encoded.
    fn resource_url(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Make a bearer-authenticated GET request.
    async fn get<T>(&self, url: Url, params: &[(&str, &str)], access_token: &str) -> ClientResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        tracing::debug!(url = %url, "FHIR read");

        let started = std::time::Instant::now();
        let response =
            self.client.get(url.clone()).query(params).bearer_auth(access_token).send().await?;
        let response = self.handle_response(response, url.path()).await?;
        let body = response.bytes().await?;

        tracing::debug!(
            path = url.path(),
            elapsed_ms = duration_ms(started.elapsed()),
            bytes = body.len(),
            "FHIR read complete"
        );

        serde_json::from_slice(&body).map_err(ClientError::from)
    }

    /// Handle API response status codes.
    async fn handle_response(
        &self,
        response: reqwest::Response,
        resource: &str,
    ) -> ClientResult<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        match status.as_u16() {
            401 | 403 => Err(ClientError::Unauthorized { status: status.as_u16(), message: text }),
            404 => Err(ClientError::not_found(resource)),
            500..=599 => Err(ClientError::server(status.as_u16(), text)),
            _ => Err(ClientError::UnexpectedStatus { status: status.as_u16(), message: text }),
        }
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[async_trait]
impl AuthorizationServer for FhirClient {
    async fn exchange_code(&self, code: &str, code_verifier: &str) -> ClientResult<TokenResponse> {
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("client_id", self.client_id.as_str()),
            ("code_verifier", code_verifier),
        ];

        tracing::debug!(token_url = %self.token_url, "Exchanging authorization code");

        let response = self.client.post(&self.token_url).form(&form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Token endpoint rejected the exchange");
            return Err(ClientError::token_exchange(status.as_u16(), text));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(ClientError::from)
    }
}

#[async_trait]
impl ClinicalDataSource for FhirClient {
    async fn patient(&self, access_token: &str, patient_id: &str) -> ClientResult<Patient> {
        let url = self.resource_url(&["Patient", patient_id])?;
        self.get(url, &[], access_token).await
    }

    async fn medications(
        &self,
        access_token: &str,
        patient_id: &str,
    ) -> ClientResult<Bundle<MedicationRequest>> {
        let url = self.resource_url(&["MedicationRequest"])?;
        self.get(url, &[("patient", patient_id)], access_token).await
    }

    async fn lab_reports(
        &self,
        access_token: &str,
        patient_id: &str,
    ) -> ClientResult<Bundle<Observation>> {
        let url = self.resource_url(&["Observation"])?;
        let params = [("patient", patient_id), ("category", self.lab_category.as_str())];
        self.get(url, &params, access_token).await
    }

    async fn vital_signs(
        &self,
        access_token: &str,
        patient_id: &str,
    ) -> ClientResult<Bundle<Observation>> {
        let url = self.resource_url(&["Observation"])?;
        let params = [("patient", patient_id), ("category", self.vitals_category.as_str())];
        self.get(url, &params, access_token).await
    }
}

impl std::fmt::Debug for FhirClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FhirClient")
            .field("base_url", &self.base_url.as_str())
            .field("client_id", &self.client_id)
            .finish()
    }
}
