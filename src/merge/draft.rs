// src/merge/draft.rs - Interactive two-record reconciliation
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::merge::contact::{fields_for_record, record_from_fields, MergeOutcome};
use crate::merge::fields::merge_fields;
use crate::merge::vcard::{ContactFields, FieldKey, FieldValue, VCardCodec};
use crate::models::core::ContactRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MasterSide {
    A,
    B,
}

impl MasterSide {
    pub fn other(self) -> Self {
        match self {
            MasterSide::A => MasterSide::B,
            MasterSide::B => MasterSide::A,
        }
    }
}

/// Review state for one duplicate pair.
///
/// `fields` always mirrors the current master except for keys in
/// `dirty_fields`, which hold the reviewer's edits and survive master swaps.
/// Committing merges the other side in with dirty keys locked, so manual
/// edits are never overwritten by the automatic union.
#[derive(Debug, Clone)]
pub struct MergeDraft {
    side_a: ContactRecord,
    side_b: ContactRecord,
    master_side: MasterSide,
    fields: ContactFields,
    dirty_fields: BTreeSet<FieldKey>,
}

impl MergeDraft {
    pub fn new(side_a: ContactRecord, side_b: ContactRecord) -> Self {
        Self::with_master(side_a, side_b, MasterSide::A)
    }

    pub fn with_master(side_a: ContactRecord, side_b: ContactRecord, master_side: MasterSide) -> Self {
        let mut draft = Self {
            side_a,
            side_b,
            master_side,
            fields: ContactFields::default(),
            dirty_fields: BTreeSet::new(),
        };
        draft.fields = fields_for_record(&VCardCodec, draft.master());
        draft
    }

    pub fn master_side(&self) -> MasterSide {
        self.master_side
    }

    pub fn master(&self) -> &ContactRecord {
        match self.master_side {
            MasterSide::A => &self.side_a,
            MasterSide::B => &self.side_b,
        }
    }

    pub fn duplicate(&self) -> &ContactRecord {
        match self.master_side {
            MasterSide::A => &self.side_b,
            MasterSide::B => &self.side_a,
        }
    }

    pub fn fields(&self) -> &ContactFields {
        &self.fields
    }

    pub fn field(&self, key: FieldKey) -> FieldValue {
        self.fields.get(key)
    }

    pub fn dirty_fields(&self) -> &BTreeSet<FieldKey> {
        &self.dirty_fields
    }

    pub fn is_dirty(&self, key: FieldKey) -> bool {
        self.dirty_fields.contains(&key)
    }

    /// Records a manual edit and marks the field dirty.
    pub fn edit(&mut self, key: FieldKey, value: FieldValue) {
        debug!("Draft edit on {}", key.as_str());
        self.fields.set(key, value);
        if key == FieldKey::FullName {
            // N belongs to the old name and would contradict the edited FN
            self.fields.structured_name.clear();
        }
        self.dirty_fields.insert(key);
    }

    pub fn swap_master(&mut self) {
        self.set_master(self.master_side.other());
    }

    /// Re-derives every clean field from the new master. Choosing the side
    /// that is already master changes nothing.
    pub fn set_master(&mut self, side: MasterSide) {
        if side == self.master_side {
            return;
        }
        self.master_side = side;

        let mut fields = fields_for_record(&VCardCodec, self.master());
        for key in &self.dirty_fields {
            fields.set(*key, self.fields.get(*key));
        }
        if self.is_dirty(FieldKey::FullName) {
            fields.structured_name = self.fields.structured_name.clone();
        }
        self.fields = fields;
        debug!(
            "Draft master is now {} ({} dirty fields kept)",
            self.master().id,
            self.dirty_fields.len()
        );
    }

    /// Merges the duplicate into the draft's fields and hands back what the
    /// store has to persist.
    pub fn commit(self) -> MergeOutcome {
        let duplicate_fields = fields_for_record(&VCardCodec, self.duplicate());
        let merged_fields = merge_fields(self.fields.clone(), &[duplicate_fields], &self.dirty_fields);
        let merged = record_from_fields(&VCardCodec, self.master(), &merged_fields);

        info!(
            "✅ Committed merge of {} into {} ({} manual edits)",
            self.duplicate().id,
            merged.id,
            self.dirty_fields.len()
        );
        MergeOutcome {
            merged,
            superseded_ids: vec![self.duplicate().id.clone()],
        }
    }

    /// Drops the draft without producing a merge.
    pub fn skip(self) {
        info!(
            "⏭️ Skipped merge of {} and {}",
            self.side_a.id, self.side_b.id
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::vcard::{ContactCodec, TypedValue};

    fn side_a() -> ContactRecord {
        ContactRecord::new(
            "a",
            "Jane Doe",
            Some("Acme"),
            "FN:Jane Doe\nORG:Acme\nTITLE:CEO\nEMAIL:jane@acme.com",
        )
    }

    fn side_b() -> ContactRecord {
        ContactRecord::new(
            "b",
            "Jane D.",
            Some("Beta"),
            "FN:Jane D.\nORG:Beta\nTITLE:CTO\nEMAIL:jane@beta.io\nBDAY:1985-03-02",
        )
    }

    #[test]
    fn test_dirty_field_survives_master_swap() {
        let mut draft = MergeDraft::new(side_a(), side_b());
        draft.edit(FieldKey::Title, FieldValue::Text("Founder".to_string()));
        draft.swap_master();

        assert_eq!(draft.master_side(), MasterSide::B);
        assert_eq!(draft.fields().title, "Founder");
        assert_eq!(draft.fields().full_name, "Jane D.");
        assert_eq!(draft.fields().organization, "Beta");
        assert_eq!(draft.fields().birthday, "1985-03-02");
        assert_eq!(draft.fields().emails, vec![TypedValue::new("jane@beta.io")]);

        draft.swap_master();
        assert_eq!(draft.fields().title, "Founder");
        assert_eq!(draft.fields().organization, "Acme");
        assert_eq!(draft.fields().birthday, "");
    }

    #[test]
    fn test_set_master_to_current_side_is_noop() {
        let mut draft = MergeDraft::new(side_a(), side_b());
        draft.edit(FieldKey::Organization, FieldValue::Text("Acme GmbH".to_string()));
        draft.set_master(MasterSide::A);
        assert_eq!(draft.fields().organization, "Acme GmbH");
        assert!(draft.is_dirty(FieldKey::Organization));
        assert!(!draft.is_dirty(FieldKey::Title));
    }

    #[test]
    fn test_commit_keeps_manual_edits() {
        let mut draft = MergeDraft::new(side_a(), side_b());
        draft.edit(FieldKey::Emails, FieldValue::List(vec![TypedValue::new("jane@new.com")]));
        draft.edit(FieldKey::Birthday, FieldValue::Text(String::new()));

        let outcome = draft.commit();
        assert_eq!(outcome.merged.id, "a");
        assert_eq!(outcome.superseded_ids, vec!["b"]);

        let fields = VCardCodec.parse(&outcome.merged.raw_contact_text);
        // locked list is not unioned with the other side
        assert_eq!(fields.emails, vec![TypedValue::new("jane@new.com")]);
        // a cleared dirty field is not back-filled
        assert_eq!(fields.birthday, "");
        assert_eq!(fields.title, "CEO");
    }

    #[test]
    fn test_commit_after_swap_merges_into_new_master() {
        let mut draft = MergeDraft::new(side_a(), side_b());
        draft.swap_master();
        let outcome = draft.commit();
        assert_eq!(outcome.merged.id, "b");
        assert_eq!(outcome.superseded_ids, vec!["a"]);
        assert_eq!(outcome.merged.organization.as_deref(), Some("Beta"));
        let fields = VCardCodec.parse(&outcome.merged.raw_contact_text);
        assert_eq!(fields.emails.len(), 2);
    }

    #[test]
    fn test_edited_full_name_drops_stale_structured_name() {
        let a = ContactRecord::new("a", "Jane Doe", None, "N:Doe;Jane;;;\nFN:Jane Doe");
        let b = ContactRecord::new("b", "Jane D.", None, "N:D.;Jane;;;\nFN:Jane D.");
        let mut draft = MergeDraft::new(a, b);
        draft.edit(FieldKey::FullName, FieldValue::Text("Jane Q. Doe".to_string()));
        draft.swap_master();
        assert_eq!(draft.fields().full_name, "Jane Q. Doe");
        assert_eq!(draft.fields().structured_name, "");

        let outcome = draft.commit();
        assert_eq!(outcome.merged.display_name, "Jane Q. Doe");
        assert!(!outcome.merged.raw_contact_text.contains("\r\nN:"));
        let fields = VCardCodec.parse(&outcome.merged.raw_contact_text);
        assert_eq!(fields.full_name, "Jane Q. Doe");
        assert_eq!(fields.structured_name, "");
    }

    #[test]
    fn test_skip_consumes_draft() {
        let draft = MergeDraft::with_master(side_a(), side_b(), MasterSide::B);
        assert_eq!(draft.master().id, "b");
        assert_eq!(draft.duplicate().id, "a");
        draft.skip();
    }
}
