//! FHIR MedicationRequest resource.

use serde::{Deserialize, Serialize};

use super::{CodeableConcept, FhirResource};

/// A medication order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationRequest {
    #[serde(default)]
    pub resource_type: Option<String>,

    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub medication_codeable_concept: Option<CodeableConcept>,

    #[serde(default)]
    pub medication_reference: Option<Reference>,

    /// Absent and empty are treated the same.
    #[serde(default)]
    pub dosage_instruction: Option<Vec<Dosage>>,
}

/// A reference to another resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Reference {
    #[serde(default)]
    pub reference: Option<String>,

    #[serde(default)]
    pub display: Option<String>,
}

/// Dosage instructions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dosage {
    #[serde(default)]
    pub text: Option<String>,

    #[serde(default)]
    pub timing: Option<Timing>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timing {
    #[serde(default)]
    pub repeat: Option<Repeat>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repeat {
    #[serde(default)]
    pub bounds_period: Option<Period>,
}

/// A start/end time range.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Period {
    #[serde(default)]
    pub start: Option<String>,

    #[serde(default)]
    pub end: Option<String>,
}

impl FhirResource for MedicationRequest {
    const RESOURCE_TYPE: &'static str = "MedicationRequest";

    fn resource_type(&self) -> Option<&str> {
        self.resource_type.as_deref()
    }
}

impl MedicationRequest {
    /// Medication name from the coded concept, then the reference display.
    #[must_use]
    pub fn medication_name(&self) -> Option<&str> {
        self.medication_codeable_concept
            .as_ref()
            .and_then(|c| c.text.as_deref())
            .or_else(|| self.medication_reference.as_ref()?.display.as_deref())
    }

    /// The first dosage instruction, if any.
    #[must_use]
    pub fn first_dosage(&self) -> Option<&Dosage> {
        self.dosage_instruction.as_ref()?.first()
    }

    /// Dosage text of the first instruction.
    #[must_use]
    pub fn dosage_text(&self) -> Option<&str> {
        self.first_dosage()?.text.as_deref()
    }

    fn bounds(&self) -> Option<&Period> {
        self.first_dosage()?.timing.as_ref()?.repeat.as_ref()?.bounds_period.as_ref()
    }

    /// Start of the dosing period.
    #[must_use]
    pub fn start_date(&self) -> Option<&str> {
        self.bounds()?.start.as_deref()
    }

    /// End of the dosing period.
    #[must_use]
    pub fn end_date(&self) -> Option<&str> {
        self.bounds()?.end.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_full_medication_request() {
        let med: MedicationRequest = serde_json::from_value(json!({
            "resourceType": "MedicationRequest",
            "status": "active",
            "medicationCodeableConcept": {"text": "Lisinopril 10 MG Oral Tablet"},
            "dosageInstruction": [{
                "text": "Take 1 tablet daily",
                "timing": {"repeat": {"boundsPeriod": {"start": "2024-01-15", "end": "2024-07-15"}}}
            }]
        }))
        .unwrap();
        assert_eq!(med.medication_name(), Some("Lisinopril 10 MG Oral Tablet"));
        assert_eq!(med.dosage_text(), Some("Take 1 tablet daily"));
        assert_eq!(med.start_date(), Some("2024-01-15"));
        assert_eq!(med.end_date(), Some("2024-07-15"));
    }

    #[test]
    fn test_reference_display_fallback() {
        let med: MedicationRequest = serde_json::from_value(json!({
            "medicationReference": {"reference": "Medication/1", "display": "Aspirin"}
        }))
        .unwrap();
        assert_eq!(med.medication_name(), Some("Aspirin"));
    }

    #[test]
    fn test_empty_dosage_list() {
        let med: MedicationRequest =
            serde_json::from_value(json!({"dosageInstruction": []})).unwrap();
        assert!(med.first_dosage().is_none());
        assert!(med.start_date().is_none());
    }
}
