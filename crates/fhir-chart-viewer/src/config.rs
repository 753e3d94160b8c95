//! Configuration for the FHIR chart viewer.

use std::time::Duration;

/// Provider configuration constants (Epic FHIR sandbox).
pub mod api {
    use std::time::Duration;

    /// Registered public client identifier.
    pub const CLIENT_ID: &str = "9a56b469-7715-4279-9997-8b1ba37cf8dc";

    /// Requested scope.
    pub const SCOPE: &str = "openid fhirUser";

    /// Redirect target registered with the provider.
    pub const REDIRECT_URI: &str = "http://localhost:3000";

    /// Authorization endpoint.
    pub const AUTHORIZATION_URL: &str =
        "https://fhir.epic.com/interconnect-fhir-oauth/oauth2/authorize";

    /// Token endpoint.
    pub const TOKEN_URL: &str = "https://fhir.epic.com/interconnect-fhir-oauth/oauth2/token";

    /// FHIR R4 base URL, also sent as the `aud` parameter.
    pub const FHIR_BASE_URL: &str = "https://fhir.epic.com/interconnect-fhir-oauth/api/FHIR/R4";

    /// Observation category used for lab results.
    pub const LAB_CATEGORY: &str = "lab";

    /// Observation category used for vital signs.
    pub const VITALS_CATEGORY: &str = "vital-signs";

    /// Request timeout.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Maximum keepalive connections.
    pub const MAX_KEEPALIVE: usize = 4;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);

    /// How long a pending authorization may wait for its callback.
    pub const PENDING_AUTH_TTL: Duration = Duration::from_secs(600);
}

/// Client and provider configuration.
///
/// Injected into the initiator, the callback handler, the HTTP client
/// and the server so every environment (sandbox, production, mock) is
/// just a different value of this struct.
#[derive(Debug, Clone)]
pub struct Config {
    /// OAuth client identifier.
    pub client_id: String,

    /// OAuth scope.
    pub scope: String,

    /// Redirect URI registered for the client.
    pub redirect_uri: String,

    /// Authorization endpoint URL.
    pub authorization_url: String,

    /// Token endpoint URL.
    pub token_url: String,

    /// FHIR base URL (also the `aud` parameter).
    pub fhir_base_url: String,

    /// Observation category for lab results.
    pub lab_category: String,

    /// Observation category for vital signs.
    pub vitals_category: String,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Lifetime of a pending authorization (state + verifier).
    pub pending_auth_ttl: Duration,
}

impl Config {
    /// Create the default configuration for the Epic sandbox.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client_id: api::CLIENT_ID.to_string(),
            scope: api::SCOPE.to_string(),
            redirect_uri: api::REDIRECT_URI.to_string(),
            authorization_url: api::AUTHORIZATION_URL.to_string(),
            token_url: api::TOKEN_URL.to_string(),
            fhir_base_url: api::FHIR_BASE_URL.to_string(),
            lab_category: api::LAB_CATEGORY.to_string(),
            vitals_category: api::VITALS_CATEGORY.to_string(),
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            pending_auth_ttl: api::PENDING_AUTH_TTL,
        }
    }

    /// Create a test configuration with every endpoint on a mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            client_id: "test-client".to_string(),
            scope: api::SCOPE.to_string(),
            redirect_uri: "http://localhost:3000".to_string(),
            authorization_url: format!("{}/oauth2/authorize", base_url),
            token_url: format!("{}/oauth2/token", base_url),
            fhir_base_url: format!("{}/api/FHIR/R4", base_url),
            lab_category: api::LAB_CATEGORY.to_string(),
            vitals_category: api::VITALS_CATEGORY.to_string(),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            pending_auth_ttl: api::PENDING_AUTH_TTL,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Unset variables keep the sandbox defaults.
    ///
    /// # Errors
    ///
    /// Returns error if environment variables are invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::new();
        let vars: [(&str, &mut String); 8] = [
            ("FHIR_CLIENT_ID", &mut config.client_id),
            ("FHIR_SCOPE", &mut config.scope),
            ("FHIR_REDIRECT_URI", &mut config.redirect_uri),
            ("FHIR_AUTHORIZE_URL", &mut config.authorization_url),
            ("FHIR_TOKEN_URL", &mut config.token_url),
            ("FHIR_BASE_URL", &mut config.fhir_base_url),
            ("FHIR_LAB_CATEGORY", &mut config.lab_category),
            ("FHIR_VITALS_CATEGORY", &mut config.vitals_category),
        ];
        for (name, slot) in vars {
            if let Ok(value) = std::env::var(name) {
                *slot = value;
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// Check that every endpoint is an absolute URL.
    ///
    /// # Errors
    ///
    /// Returns error naming the first invalid field.
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, value) in [
            ("redirect_uri", &self.redirect_uri),
            ("authorization_url", &self.authorization_url),
            ("token_url", &self.token_url),
            ("fhir_base_url", &self.fhir_base_url),
        ] {
            url::Url::parse(value)
                .map_err(|e| anyhow::anyhow!("invalid {name} '{value}': {e}"))?;
        }
        if self.client_id.trim().is_empty() {
            anyhow::bail!("client_id cannot be empty");
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.client_id, api::CLIENT_ID);
        assert_eq!(config.redirect_uri, "http://localhost:3000");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_for_testing() {
        let config = Config::for_testing("http://127.0.0.1:9999");
        assert_eq!(config.token_url, "http://127.0.0.1:9999/oauth2/token");
        assert_eq!(config.fhir_base_url, "http://127.0.0.1:9999/api/FHIR/R4");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_relative_url() {
        let config = Config { token_url: "/oauth2/token".to_string(), ..Config::default() };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("token_url"));
    }

    #[test]
    fn test_validate_rejects_empty_client_id() {
        let config = Config { client_id: "  ".to_string(), ..Config::default() };
        assert!(config.validate().is_err());
    }
}
