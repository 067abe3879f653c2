// src/models/core.rs
use serde::{Deserialize, Serialize};

/// A stored contact as handed over by the contact store. The engine never
/// mutates one of these in place; merges produce a fresh record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub organization: Option<String>,
    /// vCard-like text; may be empty or malformed.
    #[serde(default)]
    pub raw_contact_text: String,
    /// Opaque references to stored images. Kept from the master on merge.
    #[serde(default)]
    pub images: Vec<String>,
}

impl ContactRecord {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        organization: Option<&str>,
        raw_contact_text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            organization: organization.map(str::to_string),
            raw_contact_text: raw_contact_text.into(),
            images: Vec::new(),
        }
    }
}

/// Reduced view of a record used while indexing and grouping.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LightContact {
    pub id: String,
    pub name: String,
    pub org: Option<String>,
    /// Normalized, deduplicated, in order of appearance.
    pub emails: Vec<String>,
    /// Digits plus an optional leading '+', deduplicated.
    pub phones: Vec<String>,
}
