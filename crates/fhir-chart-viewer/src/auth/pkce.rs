//! PKCE (Proof Key for Code Exchange) secrets.
//!
//! Implements S256 code challenges per RFC 7636. Both the `state` value and
//! the code verifier are 32 bytes from the OS random source, hex-encoded.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use crate::error::{AuthError, AuthResult};

/// Number of random bytes behind each secret.
pub const SECRET_BYTES: usize = 32;

/// Challenge method sent with the authorization request.
pub const CHALLENGE_METHOD: &str = "S256";

/// Read `SECRET_BYTES` from the OS random source and hex-encode them.
///
/// The result is always 64 lowercase hex characters.
pub fn random_hex() -> AuthResult<String> {
    let mut bytes = [0u8; SECRET_BYTES];
    OsRng.try_fill_bytes(&mut bytes).map_err(|e| AuthError::secret_generation(e.to_string()))?;
    Ok(hex::encode(bytes))
}

/// Compute the S256 code challenge for a verifier.
///
/// `BASE64URL(SHA256(code_verifier))` without padding.
#[must_use]
pub fn challenge_s256(code_verifier: &str) -> String {
    let hash = Sha256::digest(code_verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// A verifier and the challenge derived from it.
#[derive(Clone, PartialEq, Eq)]
pub struct PkcePair {
    pub verifier: String,
    pub challenge: String,
}

impl PkcePair {
    /// Generate a fresh verifier and its challenge.
    pub fn generate() -> AuthResult<Self> {
        let verifier = random_hex()?;
        let challenge = challenge_s256(&verifier);
        Ok(Self { verifier, challenge })
    }
}

impl std::fmt::Debug for PkcePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PkcePair").field("challenge", &self.challenge).finish()
    }
}
