// src/merge/vcard.rs - Structured contact fields and the text codec behind them
use log::debug;
use serde::{Deserialize, Serialize};

const DEFAULT_VERSION: &str = "3.0";

/// One value of a multi-valued property with its raw parameter string
/// (`TYPE=work,voice`), kept verbatim so regeneration does not lose labels.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TypedValue {
    pub params: Option<String>,
    pub value: String,
}

impl TypedValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            params: None,
            value: value.into(),
        }
    }

    pub fn with_params(params: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            params: Some(params.into()),
            value: value.into(),
        }
    }
}

/// Parsed form of a contact text. Properties the merge does not understand
/// ride along untouched in `extra_lines`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactFields {
    pub version: Option<String>,
    pub full_name: String,
    /// Raw `N` value: family;given;additional;prefix;suffix
    pub structured_name: String,
    /// Raw `ORG` value, components separated by ';'
    pub organization: String,
    pub title: String,
    pub birthday: String,
    pub note: String,
    pub emails: Vec<TypedValue>,
    pub phones: Vec<TypedValue>,
    pub urls: Vec<TypedValue>,
    pub addresses: Vec<TypedValue>,
    pub extra_lines: Vec<String>,
}

/// Fields a reviewer can edit and lock during reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKey {
    FullName,
    Organization,
    Title,
    Birthday,
    Note,
    Emails,
    Phones,
    Urls,
    Addresses,
}

impl FieldKey {
    pub const ALL: [FieldKey; 9] = [
        FieldKey::FullName,
        FieldKey::Organization,
        FieldKey::Title,
        FieldKey::Birthday,
        FieldKey::Note,
        FieldKey::Emails,
        FieldKey::Phones,
        FieldKey::Urls,
        FieldKey::Addresses,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKey::FullName => "fullName",
            FieldKey::Organization => "organization",
            FieldKey::Title => "title",
            FieldKey::Birthday => "birthday",
            FieldKey::Note => "note",
            FieldKey::Emails => "emails",
            FieldKey::Phones => "phones",
            FieldKey::Urls => "urls",
            FieldKey::Addresses => "addresses",
        }
    }

    pub fn is_multi_valued(&self) -> bool {
        matches!(
            self,
            FieldKey::Emails | FieldKey::Phones | FieldKey::Urls | FieldKey::Addresses
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "value")]
pub enum FieldValue {
    Text(String),
    List(Vec<TypedValue>),
}

impl ContactFields {
    pub fn get(&self, key: FieldKey) -> FieldValue {
        match key {
            FieldKey::FullName => FieldValue::Text(self.full_name.clone()),
            FieldKey::Organization => FieldValue::Text(self.organization.clone()),
            FieldKey::Title => FieldValue::Text(self.title.clone()),
            FieldKey::Birthday => FieldValue::Text(self.birthday.clone()),
            FieldKey::Note => FieldValue::Text(self.note.clone()),
            FieldKey::Emails => FieldValue::List(self.emails.clone()),
            FieldKey::Phones => FieldValue::List(self.phones.clone()),
            FieldKey::Urls => FieldValue::List(self.urls.clone()),
            FieldKey::Addresses => FieldValue::List(self.addresses.clone()),
        }
    }

    /// Replaces one field. A text given for a list field becomes a single
    /// untyped entry; a list given for a text field is joined with ", ".
    pub fn set(&mut self, key: FieldKey, value: FieldValue) {
        if key.is_multi_valued() {
            let list = match value {
                FieldValue::List(list) => list,
                FieldValue::Text(text) if text.trim().is_empty() => Vec::new(),
                FieldValue::Text(text) => vec![TypedValue::new(text.trim())],
            };
            *self.list_mut(key) = list;
        } else {
            let text = match value {
                FieldValue::Text(text) => text,
                FieldValue::List(list) => list
                    .into_iter()
                    .map(|v| v.value)
                    .collect::<Vec<_>>()
                    .join(", "),
            };
            *self.text_mut(key) = text;
        }
    }

    pub(crate) fn text_mut(&mut self, key: FieldKey) -> &mut String {
        match key {
            FieldKey::Organization => &mut self.organization,
            FieldKey::Title => &mut self.title,
            FieldKey::Birthday => &mut self.birthday,
            FieldKey::Note => &mut self.note,
            _ => &mut self.full_name,
        }
    }

    pub(crate) fn list_mut(&mut self, key: FieldKey) -> &mut Vec<TypedValue> {
        match key {
            FieldKey::Phones => &mut self.phones,
            FieldKey::Urls => &mut self.urls,
            FieldKey::Addresses => &mut self.addresses,
            _ => &mut self.emails,
        }
    }

    /// First non-empty `ORG` component, unescaped.
    pub fn organization_name(&self) -> Option<String> {
        split_components(&self.organization)
            .into_iter()
            .map(|c| unescape_text(c.trim()))
            .find(|c| !c.is_empty())
    }

    /// "Given Family" built from the `N` value, if it holds either part.
    pub fn structured_display_name(&self) -> Option<String> {
        let parts = split_components(&self.structured_name);
        let family = parts.first().map(|p| unescape_text(p.trim())).unwrap_or_default();
        let given = parts.get(1).map(|p| unescape_text(p.trim())).unwrap_or_default();
        let joined = [given, family]
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if joined.is_empty() {
            None
        } else {
            Some(joined)
        }
    }
}

/// Converts between contact text and [`ContactFields`]. Parsing never fails:
/// anything unreadable is either dropped or preserved as an extra line.
pub trait ContactCodec {
    fn parse(&self, text: &str) -> ContactFields;
    fn generate(&self, fields: &ContactFields) -> String;
}

/// Minimal vCard 3.0/4.0 codec. Handles line folding, group prefixes
/// (`item1.EMAIL`), parameters and text escapes for FN, TITLE and NOTE.
#[derive(Debug, Clone, Copy, Default)]
pub struct VCardCodec;

impl ContactCodec for VCardCodec {
    fn parse(&self, text: &str) -> ContactFields {
        let mut fields = ContactFields::default();

        for line in unfold_lines(text) {
            if line.trim().is_empty() {
                continue;
            }
            let (head, value) = match line.split_once(':') {
                Some(split) => split,
                None => {
                    debug!("Keeping unparseable contact line verbatim: {}", line);
                    fields.extra_lines.push(line.clone());
                    continue;
                }
            };
            let (name, params) = match head.split_once(';') {
                Some((name, params)) => (name, Some(params.to_string())),
                None => (head, None),
            };
            let property = name.rsplit('.').next().unwrap_or(name).to_ascii_uppercase();
            let value = value.trim_end_matches('\r');

            match property.as_str() {
                "BEGIN" | "END" => {}
                "VERSION" if fields.version.is_none() => fields.version = Some(value.trim().to_string()),
                "FN" if fields.full_name.is_empty() => fields.full_name = unescape_text(value.trim()),
                "N" if fields.structured_name.is_empty() => fields.structured_name = value.to_string(),
                "ORG" if fields.organization.is_empty() => fields.organization = value.trim().to_string(),
                "TITLE" if fields.title.is_empty() => fields.title = unescape_text(value.trim()),
                "BDAY" if fields.birthday.is_empty() => fields.birthday = value.trim().to_string(),
                "NOTE" if fields.note.is_empty() => fields.note = unescape_text(value),
                "EMAIL" | "TEL" | "URL" | "ADR" => {
                    let typed = TypedValue {
                        params,
                        value: value.trim().to_string(),
                    };
                    if typed.value.is_empty() {
                        continue;
                    }
                    match property.as_str() {
                        "EMAIL" => fields.emails.push(typed),
                        "TEL" => fields.phones.push(typed),
                        "URL" => fields.urls.push(typed),
                        _ => fields.addresses.push(typed),
                    }
                }
                _ => fields.extra_lines.push(line.clone()),
            }
        }

        fields
    }

    fn generate(&self, fields: &ContactFields) -> String {
        let mut lines = vec![
            "BEGIN:VCARD".to_string(),
            format!(
                "VERSION:{}",
                fields.version.as_deref().unwrap_or(DEFAULT_VERSION)
            ),
        ];

        if !fields.structured_name.is_empty() {
            lines.push(format!("N:{}", fields.structured_name));
        }
        push_text(&mut lines, "FN", &escape_text(&fields.full_name));
        push_text(&mut lines, "ORG", &fields.organization);
        push_text(&mut lines, "TITLE", &escape_text(&fields.title));
        push_text(&mut lines, "BDAY", &fields.birthday);
        push_typed(&mut lines, "EMAIL", &fields.emails);
        push_typed(&mut lines, "TEL", &fields.phones);
        push_typed(&mut lines, "ADR", &fields.addresses);
        push_typed(&mut lines, "URL", &fields.urls);
        push_text(&mut lines, "NOTE", &escape_text(&fields.note));
        lines.extend(fields.extra_lines.iter().cloned());
        lines.push("END:VCARD".to_string());

        let mut text = lines.join("\r\n");
        text.push_str("\r\n");
        text
    }
}

fn push_text(lines: &mut Vec<String>, property: &str, value: &str) {
    if !value.is_empty() {
        lines.push(format!("{}:{}", property, value));
    }
}

fn push_typed(lines: &mut Vec<String>, property: &str, values: &[TypedValue]) {
    for typed in values {
        match &typed.params {
            Some(params) if !params.is_empty() => {
                lines.push(format!("{};{}:{}", property, params, typed.value))
            }
            _ => lines.push(format!("{}:{}", property, typed.value)),
        }
    }
}

/// Joins folded continuation lines (leading space or tab) onto their parent.
fn unfold_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for raw in text.split('\n') {
        let raw = raw.trim_end_matches('\r');
        if let Some(rest) = raw.strip_prefix(' ').or_else(|| raw.strip_prefix('\t')) {
            if let Some(last) = lines.last_mut() {
                last.push_str(rest);
                continue;
            }
        }
        lines.push(raw.to_string());
    }
    lines
}

/// Splits on ';' that is not escaped with a backslash.
fn split_components(value: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in value.char_indices() {
        match c {
            '\\' if !escaped => escaped = true,
            ';' if !escaped => {
                parts.push(&value[start..i]);
                start = i + 1;
            }
            _ => escaped = false,
        }
    }
    parts.push(&value[start..]);
    parts
}

fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            ',' => out.push_str("\\,"),
            ';' => out.push_str("\\;"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "BEGIN:VCARD\r\n\
        VERSION:4.0\r\n\
        N:Doe;Jane;;Dr.;\r\n\
        FN:Jane Doe\r\n\
        ORG:Acme Inc.;Sales\r\n\
        TITLE:Head of Sales\\, EMEA\r\n\
        item1.EMAIL;TYPE=work:jane@acme.com\r\n\
        TEL;TYPE=cell:+49 170 1234567\r\n\
        URL:https://acme.com/\r\n\
        NOTE:Met at the fair\\nfollow up in May\r\n\
        PHOTO;ENCODING=b;TYPE=JPEG:AAAA\r\n  BBBB\r\n\
        X-CUSTOM:kept\r\n\
        END:VCARD\r\n";

    #[test]
    fn test_parse_sample() {
        let fields = VCardCodec.parse(SAMPLE);
        assert_eq!(fields.version.as_deref(), Some("4.0"));
        assert_eq!(fields.full_name, "Jane Doe");
        assert_eq!(fields.title, "Head of Sales, EMEA");
        assert_eq!(fields.note, "Met at the fair\nfollow up in May");
        assert_eq!(fields.emails, vec![TypedValue::with_params("TYPE=work", "jane@acme.com")]);
        assert_eq!(fields.phones[0].value, "+49 170 1234567");
        assert_eq!(fields.urls[0].value, "https://acme.com/");
        assert_eq!(fields.organization_name().as_deref(), Some("Acme Inc."));
        assert_eq!(fields.structured_display_name().as_deref(), Some("Jane Doe"));
        assert_eq!(
            fields.extra_lines,
            vec!["PHOTO;ENCODING=b;TYPE=JPEG:AAAA BBBB", "X-CUSTOM:kept"]
        );
    }

    #[test]
    fn test_generate_keeps_all_content() {
        let fields = VCardCodec.parse(SAMPLE);
        let text = VCardCodec.generate(&fields);
        assert!(text.starts_with("BEGIN:VCARD\r\nVERSION:4.0\r\n"));
        assert!(text.ends_with("END:VCARD\r\n"));
        assert!(text.contains("TITLE:Head of Sales\\, EMEA\r\n"));
        assert!(text.contains("EMAIL;TYPE=work:jane@acme.com\r\n"));
        assert!(text.contains("NOTE:Met at the fair\\nfollow up in May\r\n"));
        assert!(text.contains("X-CUSTOM:kept\r\n"));
        assert_eq!(VCardCodec.parse(&text), fields);
    }

    #[test]
    fn test_default_version_and_malformed_input() {
        let fields = VCardCodec.parse("just some text\nEMAIL:a@b.com");
        assert_eq!(fields.emails.len(), 1);
        assert_eq!(fields.extra_lines, vec!["just some text"]);
        let text = VCardCodec.generate(&ContactFields::default());
        assert_eq!(text, "BEGIN:VCARD\r\nVERSION:3.0\r\nEND:VCARD\r\n");
    }

    #[test]
    fn test_set_coerces_between_kinds() {
        let mut fields = ContactFields::default();
        fields.set(FieldKey::Emails, FieldValue::Text(" x@y.com ".to_string()));
        assert_eq!(fields.emails, vec![TypedValue::new("x@y.com")]);
        fields.set(
            FieldKey::Title,
            FieldValue::List(vec![TypedValue::new("CEO"), TypedValue::new("Founder")]),
        );
        assert_eq!(fields.title, "CEO, Founder");
        assert_eq!(fields.get(FieldKey::Title), FieldValue::Text("CEO, Founder".to_string()));
    }

    #[test]
    fn test_split_components_respects_escapes() {
        assert_eq!(split_components("a\\;b;c"), vec!["a\\;b", "c"]);
        assert_eq!(split_components(""), vec![""]);
    }
}
