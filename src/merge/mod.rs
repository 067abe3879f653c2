pub mod contact;
pub mod draft;
pub mod fields;
pub mod vcard;

pub use contact::{merge_contacts, merge_group, MergeOutcome, MergeOverrides};
pub use draft::{MasterSide, MergeDraft};
pub use fields::{merge_vcards, merge_vcards_with};
pub use vcard::{ContactCodec, ContactFields, FieldKey, FieldValue, TypedValue, VCardCodec};
