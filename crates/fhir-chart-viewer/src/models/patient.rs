//! FHIR Patient resource.

use serde::{Deserialize, Serialize};

/// Patient demographics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub name: Vec<HumanName>,

    /// Administrative gender (male | female | other | unknown).
    #[serde(default)]
    pub gender: Option<String>,

    /// Date of birth (YYYY-MM-DD).
    #[serde(default)]
    pub birth_date: Option<String>,

    #[serde(default)]
    pub identifier: Vec<Identifier>,
}

/// A patient name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HumanName {
    #[serde(default)]
    pub r#use: Option<String>,

    #[serde(default)]
    pub text: Option<String>,

    #[serde(default)]
    pub family: Option<String>,

    #[serde(default)]
    pub given: Vec<String>,
}

/// A business identifier (MRN etc.).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Identifier {
    #[serde(default)]
    pub system: Option<String>,

    #[serde(default)]
    pub value: Option<String>,
}

impl HumanName {
    /// Given names followed by the family name.
    ///
    /// Falls back to `text` when no parts are present.
    #[must_use]
    pub fn display(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .given
            .iter()
            .map(String::as_str)
            .chain(self.family.as_deref())
            .filter(|p| !p.is_empty())
            .collect();
        if parts.is_empty() { self.text.clone() } else { Some(parts.join(" ")) }
    }
}

impl Patient {
    /// Display name from the first name entry.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        self.name.first()?.display()
    }

    /// Value of the first identifier.
    #[must_use]
    pub fn first_identifier(&self) -> Option<&str> {
        self.identifier.first()?.value.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_display_name() {
        let patient: Patient = serde_json::from_value(json!({
            "resourceType": "Patient",
            "name": [{"use": "official", "family": "Lin", "given": ["Derrick", "J"]}],
            "identifier": [{"system": "urn:oid:1", "value": "E1234"}]
        }))
        .unwrap();
        assert_eq!(patient.display_name().as_deref(), Some("Derrick J Lin"));
        assert_eq!(patient.first_identifier(), Some("E1234"));
    }

    #[test]
    fn test_name_text_fallback() {
        let name = HumanName { text: Some("Camila Lopez".into()), ..HumanName::default() };
        assert_eq!(name.display().as_deref(), Some("Camila Lopez"));
    }

    #[test]
    fn test_missing_fields() {
        let patient: Patient = serde_json::from_value(json!({"resourceType": "Patient"})).unwrap();
        assert!(patient.display_name().is_none());
        assert!(patient.first_identifier().is_none());
        assert!(patient.gender.is_none());
    }
}
