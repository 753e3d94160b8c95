//! HTML chart page.
//!
//! All provider-supplied text is HTML-escaped.

use super::{
    NOT_AVAILABLE, RenderSink, ResourceKind, UNKNOWN, format_display_date,
    format_display_datetime, html_escape,
};
use crate::error::ClientError;
use crate::models::{Bundle, MedicationRequest, Observation, Patient};

/// Patient summary paragraphs.
#[must_use]
pub fn patient_details(patient: &Patient) -> String {
    let name = patient.display_name().unwrap_or_else(|| UNKNOWN.to_string());
    let gender = patient.gender.as_deref().unwrap_or(NOT_AVAILABLE);
    let birth_date = patient
        .birth_date
        .as_deref()
        .map(format_display_date)
        .unwrap_or_else(|| NOT_AVAILABLE.into());
    let identifier = patient.first_identifier().unwrap_or(NOT_AVAILABLE);

    format!(
        "<p>Name: {}</p>\n<p>Gender: {}</p>\n<p>Date of Birth: {}</p>\n<p>Identifier: {}</p>\n",
        html_escape(&name),
        html_escape(gender),
        html_escape(&birth_date),
        html_escape(identifier),
    )
}

/// Medication table rows (5 columns).
#[must_use]
pub fn medication_rows(bundle: &Bundle<MedicationRequest>) -> String {
    if bundle.is_empty() {
        return "<tr><td colspan='5'>No medications found.</td></tr>".to_string();
    }

    let mut output = String::new();
    for med in bundle.resources() {
        let date =
            |d: Option<&str>| d.map(format_display_date).unwrap_or_else(|| NOT_AVAILABLE.into());
        output.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            html_escape(med.medication_name().unwrap_or(UNKNOWN)),
            html_escape(med.status.as_deref().unwrap_or(NOT_AVAILABLE)),
            html_escape(med.dosage_text().unwrap_or(NOT_AVAILABLE)),
            html_escape(&date(med.start_date())),
            html_escape(&date(med.end_date())),
        ));
    }
    output
}

/// Lab report list items.
#[must_use]
pub fn lab_report_items(bundle: &Bundle<Observation>) -> String {
    if bundle.is_empty() {
        return "<li>No lab reports found.</li>".to_string();
    }

    let mut output = String::new();
    for obs in bundle.resources() {
        let value = obs.value_display().unwrap_or_else(|| NOT_AVAILABLE.into());
        let date = observation_date(obs);
        output.push_str(&format!(
            "<li><strong>Lab Test:</strong> {}<br>\n<strong>Result:</strong> {}<br>\n<strong>Date:</strong> {}</li>\n",
            html_escape(obs.code_text()),
            html_escape(&value),
            html_escape(&date),
        ));
    }
    output
}

/// Vital sign table rows (3 columns).
#[must_use]
pub fn vital_sign_rows(bundle: &Bundle<Observation>) -> String {
    if bundle.is_empty() {
        return "<tr><td colspan='3'>No vital signs found.</td></tr>".to_string();
    }

    let mut output = String::new();
    for obs in bundle.resources() {
        let value = obs.value_display().unwrap_or_else(|| NOT_AVAILABLE.into());
        output.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            html_escape(obs.code_text()),
            html_escape(&value),
            html_escape(&observation_date(obs)),
        ));
    }
    output
}

fn observation_date(obs: &Observation) -> String {
    obs.effective_date_time
        .as_deref()
        .map(format_display_datetime)
        .unwrap_or_else(|| NOT_AVAILABLE.into())
}

/// The single page of the application: sign-in, status and chart regions.
#[derive(Debug, Default)]
pub struct HtmlPage {
    status: Vec<String>,
    patient: Option<String>,
    medications: Option<String>,
    lab_reports: Option<String>,
    vital_signs: Option<String>,
}

impl HtmlPage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True once any chart region has content.
    #[must_use]
    pub fn has_chart(&self) -> bool {
        self.patient.is_some()
            || self.medications.is_some()
            || self.lab_reports.is_some()
            || self.vital_signs.is_some()
    }

    /// Status messages in the order they were reported.
    #[must_use]
    pub fn status_messages(&self) -> &[String] {
        &self.status
    }

    /// Render the complete document.
    ///
    /// The loading indicator is always emitted hidden: a rendered page is
    /// either idle or finished.
    #[must_use]
    pub fn render(&self) -> String {
        let status_html: String =
            self.status.iter().map(|m| format!("<div>{}</div>", html_escape(m))).collect();
        let chart_display = if self.has_chart() { "block" } else { "none" };

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width,initial-scale=1">
<title>Patient Chart</title>
<style>
body {{ font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; background: #f5f5f5; margin: 0; padding: 24px; color: #333; }}
.card {{ background: #fff; border-radius: 8px; box-shadow: 0 2px 8px rgba(0,0,0,0.1); padding: 24px; margin: 0 auto 16px; max-width: 900px; }}
h1 {{ font-size: 22px; margin: 0 0 8px; }}
h2 {{ font-size: 18px; margin: 0 0 12px; }}
#signInButton {{ display: inline-block; padding: 10px 16px; background: #4a90d9; color: #fff; border-radius: 4px; text-decoration: none; font-weight: 500; }}
#signInButton:hover {{ background: #357abd; }}
#debugInfo {{ font-family: monospace; font-size: 13px; color: #a00; margin-top: 12px; }}
table {{ width: 100%; border-collapse: collapse; }}
th, td {{ text-align: left; padding: 6px 8px; border-bottom: 1px solid #eee; }}
</style>
</head>
<body>
<div class="card">
<h1>Patient Chart</h1>
<a id="signInButton" href="/signin" onclick="document.getElementById('loadingIndicator').style.display='block'">Sign in with Epic</a>
<div id="loadingIndicator" style="display:none">Loading...</div>
<div id="debugInfo">{status_html}</div>
</div>
<div id="patientInfo" style="display:{chart_display}">
<div class="card">
<h2>Patient Details</h2>
<div id="patientDetails">{patient}</div>
</div>
<div class="card">
<h2>Medications</h2>
<table>
<thead><tr><th>Medication</th><th>Status</th><th>Dosage</th><th>Start Date</th><th>End Date</th></tr></thead>
<tbody id="medicationsList">{medications}</tbody>
</table>
</div>
<div class="card">
<h2>Lab Reports</h2>
<ul id="labReportsList">{lab_reports}</ul>
</div>
<div class="card">
<h2>Vital Signs</h2>
<table>
<thead><tr><th>Vital Sign</th><th>Value</th><th>Date</th></tr></thead>
<tbody id="vitalSignsList">{vital_signs}</tbody>
</table>
</div>
</div>
</body>
</html>"#,
            status_html = status_html,
            chart_display = chart_display,
            patient = self.patient.as_deref().unwrap_or_default(),
            medications = self.medications.as_deref().unwrap_or_default(),
            lab_reports = self.lab_reports.as_deref().unwrap_or_default(),
            vital_signs = self.vital_signs.as_deref().unwrap_or_default(),
        )
    }
}

impl RenderSink for HtmlPage {
    fn status(&mut self, message: &str) {
        self.status.push(message.to_string());
    }

    fn patient(&mut self, patient: &Patient) {
        self.patient = Some(patient_details(patient));
    }

    fn medications(&mut self, bundle: &Bundle<MedicationRequest>) {
        self.medications = Some(medication_rows(bundle));
    }

    fn lab_reports(&mut self, bundle: &Bundle<Observation>) {
        self.lab_reports = Some(lab_report_items(bundle));
    }

    fn vital_signs(&mut self, bundle: &Bundle<Observation>) {
        self.vital_signs = Some(vital_sign_rows(bundle));
    }

    fn resource_failed(&mut self, kind: ResourceKind, error: &ClientError) {
        let message = format!("Error fetching {kind}: {error}");
        let cell = html_escape(&message);
        match kind {
            ResourceKind::Patient => self.patient = Some(format!("<p>{cell}</p>\n")),
            ResourceKind::Medications => {
                self.medications = Some(format!("<tr><td colspan='5'>{cell}</td></tr>"));
            }
            ResourceKind::LabReports => self.lab_reports = Some(format!("<li>{cell}</li>")),
            ResourceKind::VitalSigns => {
                self.vital_signs = Some(format!("<tr><td colspan='3'>{cell}</td></tr>"));
            }
        }
        self.status.push(message);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn bundle<T: serde::de::DeserializeOwned>(entries: serde_json::Value) -> Bundle<T> {
        serde_json::from_value(json!({"resourceType": "Bundle", "entry": entries})).unwrap()
    }

    #[test]
    fn test_empty_medications_placeholder() {
        let rows = medication_rows(&Bundle::default());
        assert_eq!(rows, "<tr><td colspan='5'>No medications found.</td></tr>");
        assert_eq!(rows.matches("<tr>").count(), 1);
    }

    #[test]
    fn test_medication_without_dosage() {
        let meds: Bundle<MedicationRequest> = bundle(json!([{
            "resource": {"status": "active", "medicationCodeableConcept": {"text": "Metformin"}}
        }]));
        let rows = medication_rows(&meds);
        assert_eq!(
            rows.trim_end(),
            "<tr><td>Metformin</td><td>active</td><td>N/A</td><td>N/A</td><td>N/A</td></tr>"
        );
    }

    #[test]
    fn test_medication_with_dates() {
        let meds: Bundle<MedicationRequest> = bundle(json!([{
            "resource": {
                "dosageInstruction": [{
                    "text": "1 tab daily",
                    "timing": {"repeat": {"boundsPeriod": {"start": "2024-01-15"}}}
                }]
            }
        }]));
        let rows = medication_rows(&meds);
        assert!(
            rows.contains("<td>Unknown</td><td>N/A</td><td>1 tab daily</td><td>1/15/2024</td><td>N/A</td>")
        );
    }

    #[test]
    fn test_lab_item() {
        let labs: Bundle<Observation> = bundle(json!([{
            "resource": {
                "code": {"text": "Glucose"},
                "valueQuantity": {"value": 5.4, "unit": "mg/dL"}
            }
        }]));
        let items = lab_report_items(&labs);
        assert!(items.contains("Glucose"));
        assert!(items.contains("5.4 mg/dL"));
        assert!(items.contains("<strong>Date:</strong> N/A"));
    }

    #[test]
    fn test_outcome_only_bundle_shows_placeholder() {
        let labs: Bundle<Observation> = bundle(json!([{
            "search": {"mode": "outcome"},
            "resource": {
                "resourceType": "OperationOutcome",
                "issue": [{"severity": "information", "code": "informational"}]
            }
        }]));
        assert_eq!(lab_report_items(&labs), "<li>No lab reports found.</li>");
    }

    #[test]
    fn test_empty_labs_and_vitals() {
        assert_eq!(lab_report_items(&Bundle::default()), "<li>No lab reports found.</li>");
        assert_eq!(
            vital_sign_rows(&Bundle::default()),
            "<tr><td colspan='3'>No vital signs found.</td></tr>"
        );
    }

    #[test]
    fn test_vital_sign_row() {
        let vitals: Bundle<Observation> = bundle(json!([{
            "resource": {
                "code": {"text": "Heart rate"},
                "valueQuantity": {"value": 72, "unit": "/min"},
                "effectiveDateTime": "2023-06-01T09:05:00Z"
            }
        }]));
        assert_eq!(
            vital_sign_rows(&vitals).trim_end(),
            "<tr><td>Heart rate</td><td>72 /min</td><td>6/1/2023 09:05</td></tr>"
        );
    }

    #[test]
    fn test_patient_details_fallbacks() {
        let html = patient_details(&Patient::default());
        assert!(html.contains("Name: Unknown"));
        assert!(html.contains("Gender: N/A"));
        assert!(html.contains("Date of Birth: N/A"));
        assert!(html.contains("Identifier: N/A"));
    }

    #[test]
    fn test_provider_text_is_escaped() {
        let meds: Bundle<MedicationRequest> = bundle(json!([{
            "resource": {"medicationCodeableConcept": {"text": "<b>x</b>"}}
        }]));
        let rows = medication_rows(&meds);
        assert!(rows.contains("&lt;b&gt;x&lt;/b&gt;"));
        assert!(!rows.contains("<b>"));
    }

    #[test]
    fn test_failed_resource_only_affects_its_region() {
        let mut page = HtmlPage::new();
        page.medications(&Bundle::default());
        page.resource_failed(ResourceKind::LabReports, &ClientError::server(503, "down"));

        let html = page.render();
        assert!(html.contains("No medications found."));
        assert!(html.contains("Error fetching lab reports"));
        assert!(page.has_chart());
        assert_eq!(page.status_messages().len(), 1);
    }

    #[test]
    fn test_idle_page_hides_chart_and_loading() {
        let html = HtmlPage::new().render();
        assert!(html.contains(r#"id="patientInfo" style="display:none""#));
        assert!(html.contains(r#"id="loadingIndicator" style="display:none""#));
        assert!(html.contains(r#"href="/signin""#));
    }
}
