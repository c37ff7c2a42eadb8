//! Contact detection and normalization
//!
//! Decides whether a raw answer is an email address or a phone number and
//! produces the normalized form stored on the lead. Email is tried first;
//! anything that is neither comes back untouched as `Invalid`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use crate::config::{MAX_PHONE_DIGITS, MIN_EMAIL_LENGTH, MIN_PHONE_DIGITS};

/// Anchored email shape: local@domain.tld with an alphabetic TLD of 2+ chars
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
});

/// Kind of contact channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactType {
    Email,
    Phone,
}

impl ContactType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactType::Email => "email",
            ContactType::Phone => "phone",
        }
    }
}

impl fmt::Display for ContactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A normalized contact value paired with its type
///
/// Value and type travel together so a lead can never hold one without the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(rename = "contact")]
    value: String,
    #[serde(rename = "contact_type")]
    kind: ContactType,
}

impl Contact {
    /// Detect and normalize; `None` when the input is neither email nor phone
    pub fn parse(raw: &str) -> Option<Self> {
        detect_contact_type(raw).into_contact()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn kind(&self) -> ContactType {
        self.kind
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.value, self.kind)
    }
}

/// Outcome of contact detection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactDetection {
    /// Trimmed, lower-cased address
    Email(String),
    /// Digits only
    Phone(String),
    /// The original input, unmodified
    Invalid(String),
}

impl ContactDetection {
    pub fn contact_type(&self) -> Option<ContactType> {
        match self {
            ContactDetection::Email(_) => Some(ContactType::Email),
            ContactDetection::Phone(_) => Some(ContactType::Phone),
            ContactDetection::Invalid(_) => None,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            ContactDetection::Email(v) | ContactDetection::Phone(v) | ContactDetection::Invalid(v) => v,
        }
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, ContactDetection::Invalid(_))
    }

    pub fn into_contact(self) -> Option<Contact> {
        match self {
            ContactDetection::Email(value) => Some(Contact {
                value,
                kind: ContactType::Email,
            }),
            ContactDetection::Phone(value) => Some(Contact {
                value,
                kind: ContactType::Phone,
            }),
            ContactDetection::Invalid(_) => None,
        }
    }
}

/// Classify a raw contact string as email, phone or invalid
pub fn detect_contact_type(input: &str) -> ContactDetection {
    let trimmed = input.trim();

    if validate_email(trimmed) {
        return ContactDetection::Email(normalize_email(trimmed));
    }

    if validate_phone(trimmed) {
        return ContactDetection::Phone(normalize_phone(trimmed));
    }

    ContactDetection::Invalid(input.to_string())
}

/// Email check: regex shape, minimum length, exactly one '@', no edge or doubled dots
pub fn validate_email(email: &str) -> bool {
    if email.chars().count() < MIN_EMAIL_LENGTH {
        return false;
    }

    if email.starts_with('.') || email.ends_with('.') || email.contains("..") {
        return false;
    }

    if email.matches('@').count() != 1 {
        return false;
    }

    EMAIL_RE.is_match(email)
}

/// Phone check: the digit-only projection must hold 7..=15 digits
pub fn validate_phone(phone: &str) -> bool {
    let digits = count_digits(phone);
    (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits)
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Strip every non-digit character
pub fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn count_digits(s: &str) -> usize {
    s.chars().filter(|c| c.is_ascii_digit()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_email_detection_trims_and_lowercases() {
        assert_eq!(
            detect_contact_type("ana@ex.com "),
            ContactDetection::Email("ana@ex.com".to_string())
        );
        assert_eq!(
            detect_contact_type("  Ana.Perez@Example.COM"),
            ContactDetection::Email("ana.perez@example.com".to_string())
        );
    }

    #[test]
    fn test_phone_detection() {
        assert_eq!(
            detect_contact_type("+1 (555) 123-4567"),
            ContactDetection::Phone("15551234567".to_string())
        );
        assert_eq!(
            detect_contact_type("1234567"),
            ContactDetection::Phone("1234567".to_string())
        );
    }

    #[test]
    fn test_phone_digit_bounds() {
        assert!(!validate_phone("123456"));
        assert!(validate_phone("123456789012345"));
        assert!(!validate_phone("1234567890123456"));
    }

    #[test]
    fn test_phone_counts_ascii_digits_only() {
        // Arabic-Indic digits do not count toward the phone length
        let arabic = "\u{0665}\u{0665}\u{0665}\u{0661}\u{0662}\u{0663}\u{0664}";
        assert!(!validate_phone(arabic));
        assert_eq!(
            detect_contact_type(arabic),
            ContactDetection::Invalid(arabic.to_string())
        );

        let mixed = "555 12 \u{0663}\u{0664}\u{0665}\u{0666}";
        assert!(!validate_phone(mixed));
        assert_eq!(normalize_phone("+34 600\u{0661}123 456"), "34600123456");
    }

    #[test]
    fn test_invalid_returns_original_input() {
        assert_eq!(
            detect_contact_type("not-an-email"),
            ContactDetection::Invalid("not-an-email".to_string())
        );
        assert_eq!(
            detect_contact_type("  nope  "),
            ContactDetection::Invalid("  nope  ".to_string())
        );
        assert_eq!(detect_contact_type(""), ContactDetection::Invalid(String::new()));
    }

    #[test]
    fn test_email_rejections() {
        assert!(!validate_email("a@b.c"));
        assert!(!validate_email(".ana@ex.com"));
        assert!(!validate_email("ana@ex.com."));
        assert!(!validate_email("ana..perez@ex.com"));
        assert!(!validate_email("ana@@ex.com"));
        assert!(!validate_email("ana@ex@ample.com"));
        assert!(!validate_email("ana@ex.c0m"));
        assert!(!validate_email("ana perez@ex.com"));
        assert!(validate_email("a@b.co"));
        assert!(validate_email("first.last+tag%x@sub-domain.example.org"));
    }

    #[test]
    fn test_email_wins_over_phone() {
        // Enough digits to be a phone number, but a valid email first
        let detection = detect_contact_type("5551234567@carrier.net");
        assert_eq!(detection.contact_type(), Some(ContactType::Email));
    }

    #[test]
    fn test_contact_parse_pairs_type_and_value() {
        let contact = Contact::parse("ANA@EX.COM").unwrap();
        assert_eq!(contact.value(), "ana@ex.com");
        assert_eq!(contact.kind(), ContactType::Email);
        assert!(Contact::parse("???").is_none());
    }

    #[test]
    fn test_contact_type_serde() {
        assert_eq!(serde_json::to_string(&ContactType::Phone).unwrap(), "\"phone\"");
        assert_eq!(ContactType::Email.to_string(), "email");
    }

    fn email_strategy() -> impl Strategy<Value = String> {
        (
            "[a-zA-Z0-9_%+-]{1,8}",
            "[a-zA-Z0-9-]{1,8}",
            "[a-zA-Z]{2,5}",
        )
            .prop_map(|(local, domain, tld)| format!("{}@{}.{}", local, domain, tld))
    }

    proptest! {
        #[test]
        fn valid_emails_normalize_to_lowercase(email in email_strategy(), pad in " {0,2}") {
            let raw = format!("{}{}{}", pad, email, pad);
            prop_assert_eq!(
                detect_contact_type(&raw),
                ContactDetection::Email(email.to_lowercase())
            );
        }

        #[test]
        fn digit_projection_in_range_is_phone(
            digits in "[0-9]{7,15}",
            sep in "[ ()+-]{0,3}",
        ) {
            let raw = format!("{}{}", sep, digits);
            prop_assert_eq!(detect_contact_type(&raw), ContactDetection::Phone(digits.clone()));
        }

        #[test]
        fn normalization_is_idempotent(email in email_strategy(), phone in "[0-9 ()+-]{7,20}") {
            let once = normalize_email(&email);
            prop_assert_eq!(normalize_email(&once), once.clone());

            let once = normalize_phone(&phone);
            prop_assert_eq!(normalize_phone(&once), once.clone());
        }

        #[test]
        fn non_contact_text_is_invalid_and_untouched(text in "[a-z ]{0,12}") {
            prop_assert_eq!(detect_contact_type(&text), ContactDetection::Invalid(text.clone()));
        }
    }
}
