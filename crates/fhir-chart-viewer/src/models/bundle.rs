//! FHIR search result bundles.

use serde::{Deserialize, Serialize};

use super::FhirResource;

/// Search mode of entries carrying server messages rather than matches.
const OUTCOME_MODE: &str = "outcome";

/// A searchset bundle of zero or more resources.
///
/// A bundle without an `entry` array is an empty result, not an error.
/// Entries that are not matches of the requested type (for example an
/// `OperationOutcome` with `search.mode = "outcome"`) are skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle<T> {
    #[serde(default)]
    pub resource_type: Option<String>,

    /// Total matches reported by the server.
    #[serde(default)]
    pub total: Option<u32>,

    #[serde(default = "Vec::new")]
    pub entry: Vec<BundleEntry<T>>,
}

/// One `{resource: {...}}` wrapper in a bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry<T> {
    #[serde(default)]
    pub full_url: Option<String>,

    #[serde(default)]
    pub search: Option<EntrySearch>,

    pub resource: T,
}

/// `Bundle.entry.search`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntrySearch {
    /// `match`, `include` or `outcome`.
    #[serde(default)]
    pub mode: Option<String>,
}

impl<T: FhirResource> BundleEntry<T> {
    /// True unless the entry is a server message or another resource type.
    #[must_use]
    pub fn is_match(&self) -> bool {
        let outcome = self
            .search
            .as_ref()
            .and_then(|s| s.mode.as_deref())
            .is_some_and(|mode| mode == OUTCOME_MODE);
        let other_type = self
            .resource
            .resource_type()
            .is_some_and(|rt| rt != T::RESOURCE_TYPE);
        !outcome && !other_type
    }
}

impl<T: FhirResource> Bundle<T> {
    /// Iterate the matched resources.
    pub fn resources(&self) -> impl Iterator<Item = &T> {
        self.entry.iter().filter(|e| e.is_match()).map(|e| &e.resource)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources().next().is_none()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.resources().count()
    }
}

impl<T> Default for Bundle<T> {
    fn default() -> Self {
        Self { resource_type: None, total: None, entry: Vec::new() }
    }
}
