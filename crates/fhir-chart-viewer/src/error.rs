//! Error types for the FHIR chart viewer.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.

/// Errors from the HTTP client layer (token endpoint and FHIR API).
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The token endpoint refused the authorization code.
    #[error("Failed to exchange authorization code for access token ({status}): {message}")]
    TokenExchange {
        /// HTTP status code
        status: u16,
        /// Response body from the token endpoint
        message: String,
    },

    /// Access token was rejected by the FHIR API (401/403 response)
    #[error("Unauthorized ({status}): {message}")]
    Unauthorized {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Resource not found (404 response)
    #[error("Resource not found: {resource}")]
    NotFound {
        /// Description of the missing resource
        resource: String,
    },

    /// Server error (5xx response)
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Unexpected HTTP status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// A request URL could not be built from the configured base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// Create a token exchange error.
    #[must_use]
    pub fn token_exchange(status: u16, message: impl Into<String>) -> Self {
        Self::TokenExchange { status, message: message.into() }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    /// Create a server error.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server { status, message: message.into() }
    }

    /// Returns true if the token endpoint rejected the exchange.
    #[must_use]
    pub const fn is_token_exchange(&self) -> bool {
        matches!(self, Self::TokenExchange { .. })
    }

    /// HTTP status code carried by this error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::TokenExchange { status, .. }
            | Self::Unauthorized { status, .. }
            | Self::Server { status, .. }
            | Self::UnexpectedStatus { status, .. } => Some(*status),
            Self::NotFound { .. } => Some(404),
            _ => None,
        }
    }
}

/// Errors from the authorization flow.
#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    /// The operating system random source could not be read.
    #[error("Secret generation failed: {0}")]
    SecretGeneration(String),

    /// A configured endpoint is not a valid absolute URL.
    #[error("Invalid endpoint {name}: {message}")]
    InvalidEndpoint {
        /// Configuration field name
        name: &'static str,
        /// Parse error
        message: String,
    },

    /// The provider redirected back with an OAuth error.
    #[error("Provider returned {error}: {description}")]
    Provider {
        /// OAuth error code
        error: String,
        /// Human readable description
        description: String,
    },

    /// No `state` was stored for this session or none came back on the redirect.
    #[error("Missing authorization state")]
    MissingState,

    /// The returned `state` does not match the stored value.
    #[error("Authorization state mismatch")]
    StateMismatch,

    /// No PKCE verifier was stored for this session.
    #[error("Missing PKCE verifier")]
    MissingVerifier,

    /// The token response did not identify a patient.
    #[error("Token response did not include a patient identifier")]
    MissingPatient,

    /// Error from the HTTP client
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl AuthError {
    /// Create a secret generation error.
    #[must_use]
    pub fn secret_generation(message: impl Into<String>) -> Self {
        Self::SecretGeneration(message.into())
    }

    /// Create a provider error from the redirect query parameters.
    #[must_use]
    pub fn provider(error: impl Into<String>, description: Option<String>) -> Self {
        let error = error.into();
        Self::Provider { description: description.unwrap_or_else(|| error.clone()), error }
    }

    /// Returns true if the callback should not be trusted (state problems).
    #[must_use]
    pub const fn is_state_error(&self) -> bool {
        matches!(self, Self::MissingState | Self::StateMismatch)
    }

    /// Convert to the message shown in the status area.
    #[must_use]
    pub fn to_user_message(&self) -> String {
        match self {
            Self::SecretGeneration(_) | Self::InvalidEndpoint { .. } => {
                format!("Sign-in failed: {self}")
            }
            Self::MissingState | Self::StateMismatch => {
                concat!(
                    "Authorization failed: the sign-in response could not be verified. ",
                    "Please sign in again."
                )
                .to_string()
            }
            Self::MissingVerifier => {
                concat!(
                    "Authorization failed: no sign-in is in progress for this session. ",
                    "Please sign in again."
                )
                .to_string()
            }
            Self::Client(ClientError::TokenExchange { .. }) => {
                "Authorization failed: Failed to exchange authorization code for access token"
                    .to_string()
            }
            _ => format!("Authorization failed: {self}"),
        }
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for authorization flow operations.
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_status() {
        assert_eq!(ClientError::token_exchange(400, "invalid_grant").status(), Some(400));
        assert_eq!(ClientError::not_found("Patient/1").status(), Some(404));
        assert_eq!(ClientError::server(503, "down").status(), Some(503));
        assert_eq!(ClientError::InvalidUrl("x".into()).status(), None);
    }

    #[test]
    fn test_token_exchange_detection() {
        assert!(ClientError::token_exchange(401, "").is_token_exchange());
        assert!(!ClientError::server(500, "").is_token_exchange());
    }

    #[test]
    fn test_provider_error_defaults_description() {
        let err = AuthError::provider("access_denied", None);
        assert!(err.to_string().contains("access_denied: access_denied"));

        let err = AuthError::provider("access_denied", Some("User declined".into()));
        assert!(err.to_user_message().contains("User declined"));
    }

    #[test]
    fn test_user_messages() {
        let err = AuthError::from(ClientError::token_exchange(400, "invalid_grant"));
        assert_eq!(
            err.to_user_message(),
            "Authorization failed: Failed to exchange authorization code for access token"
        );

        let err = AuthError::secret_generation("no entropy");
        assert!(err.to_user_message().starts_with("Sign-in failed:"));

        assert!(AuthError::StateMismatch.is_state_error());
        assert!(!AuthError::MissingPatient.is_state_error());
    }
}
