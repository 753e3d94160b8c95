//! FHIR Observation resource (labs and vital signs).

use serde::{Deserialize, Serialize};

use super::{CodeableConcept, FhirResource};

/// A measurement or lab result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    #[serde(default)]
    pub resource_type: Option<String>,

    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub code: Option<CodeableConcept>,

    #[serde(default)]
    pub value_quantity: Option<Quantity>,

    #[serde(default)]
    pub value_string: Option<String>,

    #[serde(default)]
    pub effective_date_time: Option<String>,
}

/// A measured amount.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    #[serde(default)]
    pub value: Option<f64>,

    #[serde(default)]
    pub unit: Option<String>,
}

impl Quantity {
    /// `"<value> <unit>"`, or just the value when the unit is absent.
    #[must_use]
    pub fn display(&self) -> Option<String> {
        let value = self.value?;
        Some(match self.unit.as_deref() {
            Some(unit) if !unit.is_empty() => format!("{value} {unit}"),
            _ => value.to_string(),
        })
    }
}

impl FhirResource for Observation {
    const RESOURCE_TYPE: &'static str = "Observation";

    fn resource_type(&self) -> Option<&str> {
        self.resource_type.as_deref()
    }
}

impl Observation {
    /// Code text, or `"Unknown"`.
    #[must_use]
    pub fn code_text(&self) -> &str {
        self.code.as_ref().and_then(|c| c.text.as_deref()).unwrap_or("Unknown")
    }

    /// Displayable value from `valueQuantity`, then `valueString`.
    #[must_use]
    pub fn value_display(&self) -> Option<String> {
        self.value_quantity
            .as_ref()
            .and_then(Quantity::display)
            .or_else(|| self.value_string.clone())
    }
}
