//! Chart rendering.
//!
//! The callback hands every fetched resource to a [`RenderSink`]; it never
//! touches markup itself. [`HtmlPage`] is the sink used by the web server.

mod html;

pub use html::{HtmlPage, lab_report_items, medication_rows, patient_details, vital_sign_rows};

use chrono::{DateTime, NaiveDate};

use crate::error::ClientError;
use crate::models::{Bundle, MedicationRequest, Observation, Patient};

/// Fallback for absent values.
pub const NOT_AVAILABLE: &str = "N/A";

/// Fallback for absent names.
pub const UNKNOWN: &str = "Unknown";

/// The four display regions of the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Patient,
    Medications,
    LabReports,
    VitalSigns,
}

impl ResourceKind {
    /// Human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Patient => "patient details",
            Self::Medications => "medications",
            Self::LabReports => "lab reports",
            Self::VitalSigns => "vital signs",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Receives the outcome of each step of the chart load.
pub trait RenderSink {
    /// Diagnostic text for the status area.
    fn status(&mut self, message: &str);

    fn patient(&mut self, patient: &Patient);

    fn medications(&mut self, bundle: &Bundle<MedicationRequest>);

    fn lab_reports(&mut self, bundle: &Bundle<Observation>);

    fn vital_signs(&mut self, bundle: &Bundle<Observation>);

    /// One resource type could not be fetched; the others still render.
    fn resource_failed(&mut self, kind: ResourceKind, error: &ClientError);
}

/// Format a FHIR `date` or `dateTime` as a calendar date (`M/D/YYYY`).
///
/// Values that do not parse are returned unchanged.
#[must_use]
pub fn format_display_date(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.date_naive().format("%-m/%-d/%Y").to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%-m/%-d/%Y").to_string();
    }
    raw.to_string()
}

/// Format a FHIR `dateTime` with its time of day (`M/D/YYYY HH:MM`).
///
/// The time is shown in the offset it was recorded with. Date-only values
/// fall back to [`format_display_date`].
#[must_use]
pub fn format_display_datetime(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.format("%-m/%-d/%Y %H:%M").to_string(),
        Err(_) => format_display_date(raw),
    }
}

/// Escape HTML special characters.
#[must_use]
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<script>alert("xss")</script>"#),
            "&lt;script&gt;alert(&quot;xss&quot;)&lt;/script&gt;"
        );
    }

    #[test]
    fn test_format_date_only() {
        assert_eq!(format_display_date("2024-01-05"), "1/5/2024");
    }

    #[test]
    fn test_format_datetime_as_date() {
        assert_eq!(format_display_date("2023-06-01T10:00:00Z"), "6/1/2023");
        assert_eq!(format_display_date("2023-06-01T23:30:00-05:00"), "6/1/2023");
    }

    #[test]
    fn test_format_unparseable_passthrough() {
        assert_eq!(format_display_date("2024-03"), "2024-03");
        assert_eq!(format_display_date("yesterday"), "yesterday");
    }

    #[test]
    fn test_format_datetime_keeps_time() {
        assert_eq!(format_display_datetime("2023-06-01T09:05:00Z"), "6/1/2023 09:05");
        assert_eq!(format_display_datetime("2023-06-01"), "6/1/2023");
    }

    #[test]
    fn test_resource_kind_labels() {
        assert_eq!(ResourceKind::LabReports.to_string(), "lab reports");
        assert_eq!(ResourceKind::Patient.label(), "patient details");
    }
}
