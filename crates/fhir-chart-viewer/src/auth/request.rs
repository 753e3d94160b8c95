//! Authorization request URL construction.

use url::Url;

use super::pkce::CHALLENGE_METHOD;
use crate::config::Config;
use crate::error::{AuthError, AuthResult};

/// Parameters of an authorization code request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest<'a> {
    pub client_id: &'a str,
    pub redirect_uri: &'a str,
    pub scope: &'a str,
    pub state: &'a str,
    pub code_challenge: &'a str,
    /// Audience: the FHIR API the token is requested for.
    pub aud: &'a str,
}

impl<'a> AuthorizationRequest<'a> {
    /// Bind the configured client to a fresh state and challenge.
    #[must_use]
    pub fn new(config: &'a Config, state: &'a str, code_challenge: &'a str) -> Self {
        Self {
            client_id: &config.client_id,
            redirect_uri: &config.redirect_uri,
            scope: &config.scope,
            state,
            code_challenge,
            aud: &config.fhir_base_url,
        }
    }

    /// Query parameters in the order they are appended.
    #[must_use]
    pub fn query_pairs(&self) -> [(&'static str, &'a str); 8] {
        [
            ("response_type", "code"),
            ("client_id", self.client_id),
            ("redirect_uri", self.redirect_uri),
            ("scope", self.scope),
            ("state", self.state),
            ("code_challenge", self.code_challenge),
            ("code_challenge_method", CHALLENGE_METHOD),
            ("aud", self.aud),
        ]
    }

    /// Append the parameters to the authorization endpoint.
    pub fn to_url(&self, authorization_url: &str) -> AuthResult<Url> {
        let mut url = Url::parse(authorization_url).map_err(|e| AuthError::InvalidEndpoint {
            name: "authorization_url",
            message: e.to_string(),
        })?;
        url.query_pairs_mut().extend_pairs(self.query_pairs());
        Ok(url)
    }
}
