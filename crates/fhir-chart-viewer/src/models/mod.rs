//! Data models for the token endpoint and FHIR R4 resources.
//!
//! Only the fields the chart view reads are modelled. All fields use
//! `#[serde(default)]` so partially populated resources still parse.

mod bundle;
mod medication;
mod observation;
mod patient;
mod token;

pub use bundle::{Bundle, BundleEntry, EntrySearch};
pub use medication::{Dosage, MedicationRequest, Period, Reference, Repeat, Timing};
pub use observation::{Observation, Quantity};
pub use patient::{HumanName, Identifier, Patient};
pub use token::TokenResponse;

use serde::{Deserialize, Serialize};

/// A FHIR CodeableConcept, reduced to its display text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeableConcept {
    #[serde(default)]
    pub text: Option<String>,
}

/// A resource type returned by a FHIR search.
pub trait FhirResource {
    /// The `resourceType` this type models.
    const RESOURCE_TYPE: &'static str;

    /// The `resourceType` the server sent, if any.
    fn resource_type(&self) -> Option<&str>;
}
