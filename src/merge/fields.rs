// src/merge/fields.rs - Field-level union and back-fill of duplicate contacts
use log::debug;
use std::collections::{BTreeSet, HashSet};

use crate::matching::normalize::{clean_phone_number, normalize_string};
use crate::merge::vcard::{ContactCodec, ContactFields, FieldKey, TypedValue, VCardCodec};

/// Visible separator placed between merged notes.
pub const NOTE_SEPARATOR: &str = "\n---\n";

const SINGLE_VALUED: [FieldKey; 4] = [
    FieldKey::FullName,
    FieldKey::Organization,
    FieldKey::Title,
    FieldKey::Birthday,
];
const MULTI_VALUED: [FieldKey; 4] = [
    FieldKey::Emails,
    FieldKey::Phones,
    FieldKey::Urls,
    FieldKey::Addresses,
];

/// Merges duplicate contact texts into the master text with the vCard codec.
pub fn merge_vcards<S: AsRef<str>>(master_text: &str, duplicate_texts: &[S]) -> String {
    merge_vcards_with(&VCardCodec, master_text, duplicate_texts)
}

/// Parses master and duplicates with `codec`, merges and regenerates the
/// complete text. Nothing of the master is ever dropped.
pub fn merge_vcards_with<C, S>(codec: &C, master_text: &str, duplicate_texts: &[S]) -> String
where
    C: ContactCodec + ?Sized,
    S: AsRef<str>,
{
    let master = codec.parse(master_text);
    let duplicates: Vec<ContactFields> = duplicate_texts
        .iter()
        .map(|text| codec.parse(text.as_ref()))
        .collect();
    codec.generate(&merge_fields(master, &duplicates, &BTreeSet::new()))
}

/// Folds every duplicate into `master` in order. Fields in `locked` keep the
/// master's value untouched.
pub fn merge_fields(
    mut master: ContactFields,
    duplicates: &[ContactFields],
    locked: &BTreeSet<FieldKey>,
) -> ContactFields {
    for duplicate in duplicates {
        for key in SINGLE_VALUED {
            if locked.contains(&key) {
                continue;
            }
            let incoming = duplicate_text(duplicate, key);
            let current = master.text_mut(key);
            if current.trim().is_empty() && !incoming.trim().is_empty() {
                debug!("Back-filling {} from duplicate", key.as_str());
                *current = incoming.to_string();
            }
        }

        // N travels with the full name it belongs to.
        if !locked.contains(&FieldKey::FullName)
            && master.structured_name.trim().is_empty()
            && !duplicate.structured_name.trim().is_empty()
        {
            master.structured_name = duplicate.structured_name.clone();
        }

        if !locked.contains(&FieldKey::Note) {
            master.note = merge_notes(&master.note, &duplicate.note);
        }

        for key in MULTI_VALUED {
            if locked.contains(&key) {
                continue;
            }
            let incoming = duplicate_list(duplicate, key);
            let appended = union_values(master.list_mut(key), incoming, key);
            if appended > 0 {
                debug!("Appended {} {} from duplicate", appended, key.as_str());
            }
        }
    }
    master
}

/// Concatenates two notes unless one is empty or the duplicate's note is
/// already part of the master's.
pub fn merge_notes(master_note: &str, duplicate_note: &str) -> String {
    let incoming = duplicate_note.trim();
    if incoming.is_empty() || master_note.contains(incoming) {
        return master_note.to_string();
    }
    if master_note.trim().is_empty() {
        return incoming.to_string();
    }
    format!("{}{}{}", master_note, NOTE_SEPARATOR, incoming)
}

/// Appends values whose comparison key is not yet present. Returns how many
/// were added.
fn union_values(target: &mut Vec<TypedValue>, incoming: &[TypedValue], key: FieldKey) -> usize {
    let mut present: HashSet<String> = target.iter().map(|v| comparison_key(key, &v.value)).collect();
    let mut appended = 0;
    for value in incoming {
        if present.insert(comparison_key(key, &value.value)) {
            target.push(value.clone());
            appended += 1;
        }
    }
    appended
}

/// Normalized form used to decide whether two values are the same entry.
pub fn comparison_key(key: FieldKey, value: &str) -> String {
    match key {
        FieldKey::Phones => {
            let cleaned = clean_phone_number(value);
            if cleaned.is_empty() {
                normalize_string(value)
            } else {
                cleaned
            }
        }
        FieldKey::Urls => normalize_string(value).trim_end_matches('/').to_string(),
        _ => normalize_string(value),
    }
}

fn duplicate_text(fields: &ContactFields, key: FieldKey) -> &str {
    match key {
        FieldKey::FullName => &fields.full_name,
        FieldKey::Organization => &fields.organization,
        FieldKey::Title => &fields.title,
        FieldKey::Birthday => &fields.birthday,
        _ => &fields.note,
    }
}

fn duplicate_list(fields: &ContactFields, key: FieldKey) -> &[TypedValue] {
    match key {
        FieldKey::Phones => &fields.phones,
        FieldKey::Urls => &fields.urls,
        FieldKey::Addresses => &fields.addresses,
        _ => &fields.emails,
    }
}
