// src/merge/contact.rs - Record-level merge producing the surviving contact
use anyhow::{bail, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::merge::fields::merge_fields;
use crate::merge::vcard::{ContactCodec, ContactFields, FieldKey, FieldValue, VCardCodec};
use crate::models::core::ContactRecord;

/// Manual values applied after automatic merging.
pub type MergeOverrides = BTreeMap<FieldKey, FieldValue>;

/// What the contact store has to persist: upsert `merged`, delete the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOutcome {
    pub merged: ContactRecord,
    pub superseded_ids: Vec<String>,
}

/// Merges `duplicates` into `master` with the vCard codec.
pub fn merge_contacts(
    master: &ContactRecord,
    duplicates: &[&ContactRecord],
    overrides: Option<&MergeOverrides>,
) -> ContactRecord {
    merge_contacts_with(&VCardCodec, master, duplicates, overrides)
}

/// The result keeps the master's id and images. Display name and
/// organization are derived from the merged text afterwards.
pub fn merge_contacts_with<C: ContactCodec + ?Sized>(
    codec: &C,
    master: &ContactRecord,
    duplicates: &[&ContactRecord],
    overrides: Option<&MergeOverrides>,
) -> ContactRecord {
    let master_fields = fields_for_record(codec, master);
    let duplicate_fields: Vec<ContactFields> = duplicates
        .iter()
        .map(|record| fields_for_record(codec, record))
        .collect();

    let mut merged = merge_fields(master_fields, &duplicate_fields, &BTreeSet::new());
    if let Some(overrides) = overrides {
        for (key, value) in overrides {
            merged.set(*key, value.clone());
        }
    }
    record_from_fields(codec, master, &merged)
}

/// Resolves `master_id` among `records` and merges every other record into
/// it.
pub fn merge_group(
    records: &[ContactRecord],
    master_id: &str,
    overrides: Option<&MergeOverrides>,
) -> Result<MergeOutcome> {
    let master = match records.iter().find(|r| r.id == master_id) {
        Some(master) => master,
        None => bail!(
            "Master contact {} not found among {} records",
            master_id,
            records.len()
        ),
    };

    let mut seen = BTreeSet::new();
    let duplicates: Vec<&ContactRecord> = records
        .iter()
        .filter(|r| r.id != master_id)
        .filter(|r| seen.insert(r.id.as_str()))
        .collect();
    if duplicates.is_empty() {
        warn!("Merge into {} requested without any duplicates", master_id);
    }

    info!(
        "🔀 Merging {} duplicate(s) into contact {}",
        duplicates.len(),
        master_id
    );
    let merged = merge_contacts(master, &duplicates, overrides);
    Ok(MergeOutcome {
        merged,
        superseded_ids: duplicates.iter().map(|r| r.id.clone()).collect(),
    })
}

/// Parses the record text and fills name and organization from the record
/// columns when the text lacks them.
pub fn fields_for_record<C: ContactCodec + ?Sized>(codec: &C, record: &ContactRecord) -> ContactFields {
    let mut fields = codec.parse(&record.raw_contact_text);
    if fields.full_name.trim().is_empty() && fields.structured_display_name().is_none() {
        fields.full_name = record.display_name.trim().to_string();
    }
    if fields.organization.trim().is_empty() {
        if let Some(org) = record.organization.as_deref().map(str::trim) {
            fields.organization = org.to_string();
        }
    }
    fields
}

/// Builds the surviving record from merged fields. Only the master's id and
/// images carry over unchanged.
pub fn record_from_fields<C: ContactCodec + ?Sized>(
    codec: &C,
    master: &ContactRecord,
    fields: &ContactFields,
) -> ContactRecord {
    let display_name = Some(fields.full_name.trim().to_string())
        .filter(|name| !name.is_empty())
        .or_else(|| fields.structured_display_name())
        .unwrap_or_else(|| master.display_name.clone());

    ContactRecord {
        id: master.id.clone(),
        display_name,
        organization: fields.organization_name(),
        raw_contact_text: codec.generate(fields),
        images: master.images.clone(),
    }
}
