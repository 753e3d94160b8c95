//! Authorization Initiator.

use url::Url;

use super::pkce::{self, PkcePair};
use super::request::AuthorizationRequest;
use super::session::{PKCE_VERIFIER_KEY, STATE_KEY, Session};
use crate::config::Config;
use crate::error::AuthResult;

/// Start an authorization round trip for `session`.
///
/// Stores a fresh `state` and PKCE verifier in the session and returns the
/// authorization URL the browser must navigate to. Calling this again for
/// the same session replaces both secrets.
pub async fn initiate(config: &Config, session: &Session) -> AuthResult<Url> {
    tracing::info!(session = %session.id(), "Initiating authorization");

    let state = pkce::random_hex()?;
    session.set_item(STATE_KEY, state.clone()).await;

    let pair = PkcePair::generate()?;
    session.set_item(PKCE_VERIFIER_KEY, pair.verifier.clone()).await;

    let url = AuthorizationRequest::new(config, &state, &pair.challenge)
        .to_url(&config.authorization_url)?;

    tracing::info!(
        session = %session.id(),
        endpoint = %config.authorization_url,
        "Redirecting to authorization page"
    );

    Ok(url)
}
