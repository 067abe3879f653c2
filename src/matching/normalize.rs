// src/matching/normalize.rs - String, name, email and phone normalization

/// Leading honorifics removed before name comparison. German `hr.`/`fr.`
/// show up on cards scanned from the DACH region.
pub const NAME_TITLES: [&str; 6] = ["dr.", "prof.", "mr.", "mrs.", "hr.", "fr."];

/// Lower-cases, trims and collapses whitespace runs to a single space.
pub fn normalize_string(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Same as [`normalize_string`] with leading titles stripped. Stacked titles
/// ("Prof. Dr.") are removed in any order.
pub fn normalize_name(s: &str) -> String {
    let mut normalized = normalize_string(s);
    while let Some(rest) = NAME_TITLES
        .iter()
        .find_map(|title| normalized.strip_prefix(*title))
    {
        normalized = rest.trim_start().to_string();
    }
    normalized
}

pub fn normalize_email(email: &str) -> String {
    normalize_string(email)
}

/// Everything before the first '@', or the whole string when there is none.
pub fn email_local_part(email: &str) -> &str {
    match email.split_once('@') {
        Some((local, _)) => local,
        None => email,
    }
}

/// Keeps digits and '+'. No country-code folding: "+49 30 1234" and
/// "030 1234" stay different numbers.
pub fn clean_phone_number(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

pub fn phone_digit_count(cleaned: &str) -> usize {
    cleaned.chars().filter(|c| c.is_ascii_digit()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_string() {
        assert_eq!(normalize_string("  Jane   DOE \t"), "jane doe");
        assert_eq!(normalize_string(""), "");
        assert_eq!(normalize_string("   "), "");
    }

    #[test]
    fn test_normalize_name_strips_titles() {
        assert_eq!(normalize_name("Dr. Jane Doe"), "jane doe");
        assert_eq!(normalize_name("PROF.  Hans Maier"), "hans maier");
        assert_eq!(normalize_name("Mrs. Smith"), "smith");
        assert_eq!(normalize_name("Hr. Müller"), "müller");
        assert_eq!(normalize_name("Fr. Dr. Schulz"), "schulz");
        assert_eq!(normalize_name("Prof. Dr. Hans Weber"), "hans weber");
        assert_eq!(normalize_name("Dr. Hr.Prof. Hans Weber"), "hans weber");
        assert_eq!(normalize_name("Dr. Prof. Weber"), "weber");
        // "mr." must not eat the start of "mrs."
        assert_eq!(normalize_name("Mrs.Jones"), "jones");
        assert_eq!(normalize_name("Drake"), "drake");
    }

    #[test]
    fn test_clean_phone_number() {
        assert_eq!(clean_phone_number("+49 (30) 123-456"), "+4930123456");
        assert_eq!(clean_phone_number("tel:555 0100"), "5550100");
        assert_eq!(clean_phone_number("n/a"), "");
        assert_eq!(phone_digit_count("+4930"), 4);
    }

    #[test]
    fn test_email_local_part() {
        assert_eq!(email_local_part("jane.doe@acme.com"), "jane.doe");
        assert_eq!(email_local_part("no-at-sign"), "no-at-sign");
        assert_eq!(normalize_email(" Jane@X.com "), "jane@x.com");
    }
}
