//! HTTP handlers for the sign-in page, the initiator and the callback.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use super::{AppState, SESSION_COOKIE};
use crate::auth::{CallbackOutcome, CallbackParams, SessionStore, handle_callback, initiate};
use crate::render::{HtmlPage, RenderSink};

/// `GET /`
///
/// The sign-in page, and the redirect target the provider sends the
/// browser back to with `code` and `state`.
pub async fn handle_index(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Response {
    let mut page = HtmlPage::new();

    if params.is_callback() {
        let session_id = jar.get(SESSION_COOKIE).map(|c| c.value().to_owned()).unwrap_or_default();
        if session_id.is_empty() {
            tracing::warn!("Callback without a session cookie");
        }
        let session = state.sessions.session(session_id);

        let outcome = handle_callback(
            &params,
            &session,
            state.client.as_ref(),
            state.client.as_ref(),
            &mut page,
        )
        .await;

        if let CallbackOutcome::Failed(e) = &outcome {
            if e.is_state_error() {
                tracing::warn!(session = %session.id(), "Rejected callback with unverified state");
            }
            return page_response(StatusCode::BAD_REQUEST, &page);
        }
    }

    page_response(StatusCode::OK, &page)
}

/// `GET /signin`
///
/// Authorization Initiator: starts a new browser session, stores its
/// secrets and redirects to the provider.
pub async fn handle_signin(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    // A fresh id per sign-in so a pre-set cookie can never be reused.
    let session = state.sessions.session(SessionStore::new_session_id());

    match initiate(&state.config, &session).await {
        Ok(url) => {
            let cookie = Cookie::build((SESSION_COOKIE, session.id().to_owned()))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .secure(state.config.redirect_uri.starts_with("https://"))
                .build();

            (StatusCode::FOUND, jar.add(cookie), [(header::LOCATION, url.to_string())])
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Sign-in failed");
            let mut page = HtmlPage::new();
            page.status(&e.to_user_message());
            page_response(StatusCode::INTERNAL_SERVER_ERROR, &page)
        }
    }
}

/// `GET /health`
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "fhir-chart-viewer",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Chart pages carry patient data and must not be cached.
fn page_response(status: StatusCode, page: &HtmlPage) -> Response {
    (status, [(header::CACHE_CONTROL, "no-store")], Html(page.render())).into_response()
}
