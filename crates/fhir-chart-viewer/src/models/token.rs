//! Token endpoint response.

use serde::{Deserialize, Serialize};

/// Successful token endpoint response.
///
/// Only `access_token` is required by the schema; the patient id is
/// checked by the callback so a missing one fails with a clear message.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,

    #[serde(default)]
    pub token_type: Option<String>,

    #[serde(default)]
    pub expires_in: Option<u64>,

    #[serde(default)]
    pub scope: Option<String>,

    /// SMART launch context: the patient in context.
    #[serde(default)]
    pub patient: Option<String>,

    #[serde(default)]
    pub id_token: Option<String>,
}

impl TokenResponse {
    /// Patient id from the launch context, ignoring blank values.
    #[must_use]
    pub fn patient_id(&self) -> Option<&str> {
        self.patient.as_deref().map(str::trim).filter(|p| !p.is_empty())
    }
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .field("patient", &self.patient)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_epic_token_response() {
        let token: TokenResponse = serde_json::from_value(json!({
            "access_token": "abc",
            "token_type": "Bearer",
            "expires_in": 3600,
            "scope": "openid fhirUser",
            "patient": "erXuFYUfucBZaryVksYEcMg3"
        }))
        .unwrap();
        assert_eq!(token.patient_id(), Some("erXuFYUfucBZaryVksYEcMg3"));
    }

    #[test]
    fn test_blank_patient_is_absent() {
        let token: TokenResponse =
            serde_json::from_value(json!({"access_token": "abc", "patient": " "})).unwrap();
        assert!(token.patient_id().is_none());
    }

    #[test]
    fn test_missing_access_token_is_an_error() {
        assert!(serde_json::from_value::<TokenResponse>(json!({"patient": "p1"})).is_err());
    }

    #[test]
    fn test_debug_hides_access_token() {
        let token: TokenResponse =
            serde_json::from_value(json!({"access_token": "super-secret"})).unwrap();
        assert!(!format!("{token:?}").contains("super-secret"));
    }
}
