//! OAuth 2.0 authorization code flow with PKCE (RFC 7636, S256).
//!
//! Two halves separated by a full browser navigation:
//! - [`initiator`]: generate `state` and verifier, remember them for this
//!   browser session, redirect to the authorization endpoint
//! - [`callback`]: verify `state`, exchange the code, load the chart

pub mod callback;
pub mod initiator;
pub mod pkce;
pub mod request;
pub mod session;

pub use callback::{Authorization, CallbackOutcome, CallbackParams, ChartLoad, handle_callback};
pub use initiator::initiate;
pub use session::{Session, SessionStore};
