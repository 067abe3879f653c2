// src/matching/disambiguation.rs - Evidence that two look-alike contacts are different people
use crate::matching::normalize::{email_local_part, normalize_name, normalize_string};
use crate::models::core::LightContact;

/// Name tokens this short ("j", "de") appear in too many addresses to count.
const MIN_EMAIL_TOKEN_LEN: usize = 3;

/// True if any name token of three or more characters occurs inside the
/// email's local part.
pub fn is_name_in_email(name: &str, email: &str) -> bool {
    let local = email_local_part(email).to_lowercase();
    normalize_name(name)
        .split(' ')
        .filter(|token| token.chars().count() >= MIN_EMAIL_TOKEN_LEN)
        .any(|token| local.contains(token))
}

/// Returns true when the two contacts must not be merged.
///
/// Only present-but-mismatching data counts as a conflict. A contact with no
/// organization, no email or no phone never conflicts on that category.
pub fn are_different_people(c1: &LightContact, c2: &LightContact) -> bool {
    conflicting_organizations(c1, c2) || conflicting_emails(c1, c2) || conflicting_phones(c1, c2)
}

fn conflicting_organizations(c1: &LightContact, c2: &LightContact) -> bool {
    let org1 = normalize_string(c1.org.as_deref().unwrap_or(""));
    let org2 = normalize_string(c2.org.as_deref().unwrap_or(""));
    !org1.is_empty() && !org2.is_empty() && org1 != org2
}

fn conflicting_emails(c1: &LightContact, c2: &LightContact) -> bool {
    if c1.emails.is_empty() || c2.emails.is_empty() {
        return false;
    }
    if c1.emails.iter().any(|e| c2.emails.contains(e)) {
        return false;
    }
    // jane.doe@acme.com and j.doe@acme.com for "Jane Doe" are still the same person
    let name_matches_other = c2.emails.iter().any(|e| is_name_in_email(&c1.name, e))
        || c1.emails.iter().any(|e| is_name_in_email(&c2.name, e));
    !name_matches_other
}

fn conflicting_phones(c1: &LightContact, c2: &LightContact) -> bool {
    !c1.phones.is_empty()
        && !c2.phones.is_empty()
        && !c1.phones.iter().any(|p| c2.phones.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(name: &str, org: Option<&str>, emails: &[&str], phones: &[&str]) -> LightContact {
        LightContact {
            id: name.to_string(),
            name: name.to_string(),
            org: org.map(str::to_string),
            emails: emails.iter().map(|s| s.to_string()).collect(),
            phones: phones.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_is_name_in_email() {
        assert!(is_name_in_email("Jane Doe", "jane.doe@acme.com"));
        assert!(is_name_in_email("Dr. Jane Doe", "j.doe@acme.com"));
        assert!(!is_name_in_email("Jo Li", "joli@acme.com"));
        // only the local part counts
        assert!(!is_name_in_email("Acme Smith", "jd@acme.com"));
    }

    #[test]
    fn test_org_conflict() {
        let a = contact("Jane Doe", Some("Acme"), &[], &[]);
        let b = contact("Jane Doe", Some("  ACME "), &[], &[]);
        let c = contact("Jane Doe", Some("Other Corp"), &[], &[]);
        let d = contact("Jane Doe", None, &[], &[]);
        assert!(!are_different_people(&a, &b));
        assert!(are_different_people(&a, &c));
        assert!(!are_different_people(&a, &d));
    }

    #[test]
    fn test_email_conflict_with_name_escape() {
        let a = contact("Jane Doe", None, &["jane.doe@acme.com"], &[]);
        let b = contact("Jane Doe", None, &["j.doe@acme.com"], &[]);
        assert!(!are_different_people(&a, &b));

        let c = contact("Jane Doe", None, &["jane@acme.com"], &[]);
        let d = contact("Jane Doe", None, &["j@other.com"], &[]);
        // "jane" appears in c's address, so d's name escapes the conflict
        assert!(!are_different_people(&c, &d));

        let e = contact("Max Power", None, &["mp@a.com"], &[]);
        let f = contact("Max Power", None, &["xy@b.com"], &[]);
        assert!(are_different_people(&e, &f));
    }

    #[test]
    fn test_phone_conflict() {
        let a = contact("Jane", None, &[], &["0301234567"]);
        let b = contact("Jane", None, &[], &["0307654321"]);
        let c = contact("Jane", None, &[], &["0307654321", "0301234567"]);
        assert!(are_different_people(&a, &b));
        assert!(!are_different_people(&a, &c));
    }

    #[test]
    fn test_missing_data_never_conflicts() {
        let a = contact("Jane", None, &[], &[]);
        let b = contact("Jane", Some("Acme"), &["jane@acme.com"], &["0301234567"]);
        assert!(!are_different_people(&a, &b));
        assert!(!are_different_people(&b, &a));
    }
}
