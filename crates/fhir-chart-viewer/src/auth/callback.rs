//! Callback Handler.
//!
//! Runs once per load of the redirect target:
//!
//! ```text
//! no code ──────────────────────────────► Idle
//! code ─► verify state ─► exchange ─► fetch ×4 ─► Loaded
//!              │              │
//!              └──────────────┴─────────► Failed
//! ```

use serde::Deserialize;

use super::session::{PKCE_VERIFIER_KEY, STATE_KEY, Session};
use crate::client::{AuthorizationServer, ClinicalDataSource};
use crate::error::{AuthError, AuthResult, ClientResult};
use crate::render::{RenderSink, ResourceKind};

/// Query parameters of the redirect back from the provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    pub code: Option<String>,

    #[serde(default)]
    pub state: Option<String>,

    #[serde(default)]
    pub error: Option<String>,

    #[serde(default)]
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// True when the request carries anything the callback must act on.
    #[must_use]
    pub fn is_callback(&self) -> bool {
        self.code.as_deref().is_some_and(|c| !c.is_empty()) || self.error.is_some()
    }
}

/// A completed token exchange.
#[derive(Clone)]
pub struct Authorization {
    pub access_token: String,
    pub patient_id: String,
}

impl std::fmt::Debug for Authorization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authorization")
            .field("patient_id", &self.patient_id)
            .finish()
    }
}

/// Which chart regions loaded and which failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartLoad {
    pub patient_id: String,
    pub rendered: Vec<ResourceKind>,
    pub failed: Vec<ResourceKind>,
}

impl ChartLoad {
    /// True when all four resource types rendered.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Terminal state of one callback run.
#[derive(Debug)]
pub enum CallbackOutcome {
    /// No authorization code in the URL.
    Idle,
    /// Token obtained; chart regions rendered (individually may have failed).
    Loaded(ChartLoad),
    /// The callback could not be trusted or the exchange failed.
    Failed(AuthError),
}

/// Compare two secrets without short-circuiting on the first difference.
fn secrets_match(a: &str, b: &str) -> bool {
    a.len() == b.len() && a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Verify the redirect and exchange its code.
///
/// Both stored secrets are consumed whatever the outcome, so a round trip
/// can be completed at most once. Returns `Ok(None)` when there is no code.
pub async fn complete_authorization(
    params: &CallbackParams,
    session: &Session,
    auth_server: &dyn AuthorizationServer,
) -> AuthResult<Option<Authorization>> {
    if !params.is_callback() {
        return Ok(None);
    }

    let stored_state = session.take_item(STATE_KEY).await;
    let verifier = session.take_item(PKCE_VERIFIER_KEY).await;

    if let Some(error) = &params.error {
        return Err(AuthError::provider(error.clone(), params.error_description.clone()));
    }
    let Some(code) = params.code.as_deref() else {
        return Ok(None);
    };

    match (stored_state.as_deref(), params.state.as_deref()) {
        (Some(stored), Some(returned)) if secrets_match(stored, returned) => {}
        (Some(_), Some(_)) => return Err(AuthError::StateMismatch),
        _ => return Err(AuthError::MissingState),
    }

    let verifier = verifier.ok_or(AuthError::MissingVerifier)?;

    let token = auth_server.exchange_code(code, &verifier).await?;
    let patient_id = token.patient_id().ok_or(AuthError::MissingPatient)?.to_owned();

    tracing::info!(
        patient = %patient_id,
        scope = token.scope.as_deref().unwrap_or_default(),
        expires_in = ?token.expires_in,
        "Authorization code exchanged"
    );

    Ok(Some(Authorization { access_token: token.access_token, patient_id }))
}

/// Fetch the four resource types concurrently and render each independently.
pub async fn load_and_render<S>(
    data: &dyn ClinicalDataSource,
    access_token: &str,
    patient_id: &str,
    sink: &mut S,
) -> ChartLoad
where
    S: RenderSink + ?Sized,
{
    let (patient, medications, lab_reports, vital_signs) = tokio::join!(
        data.patient(access_token, patient_id),
        data.medications(access_token, patient_id),
        data.lab_reports(access_token, patient_id),
        data.vital_signs(access_token, patient_id),
    );

    let mut load =
        ChartLoad { patient_id: patient_id.to_owned(), rendered: Vec::new(), failed: Vec::new() };

    deliver(sink, &mut load, ResourceKind::Patient, patient, |s, p| s.patient(p));
    deliver(sink, &mut load, ResourceKind::Medications, medications, |s, b| s.medications(b));
    deliver(sink, &mut load, ResourceKind::LabReports, lab_reports, |s, b| s.lab_reports(b));
    deliver(sink, &mut load, ResourceKind::VitalSigns, vital_signs, |s, b| s.vital_signs(b));

    load
}

fn deliver<S, T>(
    sink: &mut S,
    load: &mut ChartLoad,
    kind: ResourceKind,
    result: ClientResult<T>,
    render: impl FnOnce(&mut S, &T),
) where
    S: RenderSink + ?Sized,
{
    match result {
        Ok(value) => {
            render(sink, &value);
            load.rendered.push(kind);
        }
        Err(e) => {
            tracing::warn!(resource = %kind, error = %e, "Error fetching patient data");
            sink.resource_failed(kind, &e);
            load.failed.push(kind);
        }
    }
}

/// Run the callback for one page load.
///
/// Failures are reported to `sink` as status text and returned as
/// [`CallbackOutcome::Failed`]; nothing is retried.
pub async fn handle_callback<S>(
    params: &CallbackParams,
    session: &Session,
    auth_server: &dyn AuthorizationServer,
    data: &dyn ClinicalDataSource,
    sink: &mut S,
) -> CallbackOutcome
where
    S: RenderSink + Send + ?Sized,
{
    let authorization = match complete_authorization(params, session, auth_server).await {
        Ok(Some(authorization)) => authorization,
        Ok(None) => {
            tracing::debug!("No authorization code found in the URL");
            return CallbackOutcome::Idle;
        }
        Err(e) => {
            tracing::error!(error = %e, "Error during authorization callback");
            sink.status(&e.to_user_message());
            return CallbackOutcome::Failed(e);
        }
    };

    let load =
        load_and_render(data, &authorization.access_token, &authorization.patient_id, sink).await;

    if load.is_complete() {
        tracing::info!(patient = %load.patient_id, "Chart loaded");
    } else {
        tracing::warn!(patient = %load.patient_id, failed = ?load.failed, "Chart partially loaded");
    }

    CallbackOutcome::Loaded(load)
}
