//! Field rules for the opt-in form and their inline error display.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::dom::{Document, NodeId};

static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email shape regex should be valid")
});

/// Minimum number of digits a phone number must carry.
pub const MIN_PHONE_DIGITS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Phone,
    Email,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    Required(FieldKind),
    Invalid(FieldKind),
}

impl FieldError {
    pub const fn message(self) -> &'static str {
        match self {
            Self::Required(FieldKind::Phone) => "Phone number is required",
            Self::Invalid(FieldKind::Phone) => {
                "Please enter a valid phone number (at least 10 digits)"
            }
            Self::Required(FieldKind::Email) => "Email address is required",
            Self::Invalid(FieldKind::Email) => "Please enter a valid email address",
        }
    }
}

impl FieldKind {
    pub fn check(self, value: &str) -> Result<(), FieldError> {
        match self {
            Self::Phone => validate_phone(value),
            Self::Email => validate_email(value),
        }
    }
}

pub fn validate_phone(value: &str) -> Result<(), FieldError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FieldError::Required(FieldKind::Phone));
    }
    let digits = value.chars().filter(char::is_ascii_digit).count();
    if digits < MIN_PHONE_DIGITS {
        return Err(FieldError::Invalid(FieldKind::Phone));
    }
    Ok(())
}

pub fn validate_email(value: &str) -> Result<(), FieldError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FieldError::Required(FieldKind::Email));
    }
    if !EMAIL_SHAPE.is_match(value) {
        return Err(FieldError::Invalid(FieldKind::Email));
    }
    Ok(())
}

/// A validated input together with the status element that follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub kind: FieldKind,
    pub input: NodeId,
    pub status: NodeId,
}

impl Field {
    /// Links the status element to the input for assistive tech.
    pub(crate) fn associate(&self, doc: &mut Document) {
        let status_id = match doc.get(self.status).id() {
            Some(id) => id.to_string(),
            None => {
                let base = doc.get(self.input).id().unwrap_or("field").to_string();
                let id = format!("{base}-error");
                doc.set_id(self.status, id.clone());
                id
            }
        };
        doc.set_attribute(self.input, "aria-describedby", status_id);
    }

    /// Checks the input's current value and reflects the outcome.
    pub fn validate(&self, doc: &mut Document, error_class: &str) -> bool {
        match self.kind.check(doc.value(self.input)) {
            Ok(()) => {
                self.clear_error(doc, error_class);
                true
            }
            Err(error) => {
                debug!(field = ?self.kind, message = error.message(), "Field failed validation");
                self.show_error(doc, error, error_class);
                false
            }
        }
    }

    pub fn show_error(&self, doc: &mut Document, error: FieldError, error_class: &str) {
        doc.add_class(self.input, error_class);
        doc.set_attribute(self.input, "aria-invalid", "true");
        doc.set_text(self.status, error.message());
    }

    pub fn clear_error(&self, doc: &mut Document, error_class: &str) {
        doc.remove_class(self.input, error_class);
        doc.remove_attribute(self.input, "aria-invalid");
        doc.set_text(self.status, "");
    }

    pub fn has_error(&self, doc: &Document, error_class: &str) -> bool {
        doc.has_class(self.input, error_class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Element, Tag};
    use proptest::prelude::*;

    #[test]
    fn test_phone_rules() {
        assert_eq!(validate_phone(""), Err(FieldError::Required(FieldKind::Phone)));
        assert_eq!(validate_phone("   "), Err(FieldError::Required(FieldKind::Phone)));
        assert_eq!(validate_phone("555-1234"), Err(FieldError::Invalid(FieldKind::Phone)));
        assert_eq!(validate_phone("555-123-4567"), Ok(()));
        assert_eq!(validate_phone("+1 (555) 123.4567"), Ok(()));
        assert_eq!(validate_phone("phone: 5551234567"), Ok(()));
    }

    #[test]
    fn test_email_rules() {
        assert_eq!(validate_email("a@b.co"), Ok(()));
        assert_eq!(validate_email("  a@b.co  "), Ok(()));
        assert_eq!(validate_email("first.last@mail.example.org"), Ok(()));
        assert_eq!(validate_email(""), Err(FieldError::Required(FieldKind::Email)));
        assert_eq!(validate_email("a@b"), Err(FieldError::Invalid(FieldKind::Email)));
        assert_eq!(validate_email("a b@c.com"), Err(FieldError::Invalid(FieldKind::Email)));
        assert_eq!(validate_email("a@@b.com"), Err(FieldError::Invalid(FieldKind::Email)));
        assert_eq!(validate_email("@b.com"), Err(FieldError::Invalid(FieldKind::Email)));
    }

    #[test]
    fn test_field_reflects_errors_in_document() {
        let mut doc = Document::new();
        let body = doc.body();
        let input = doc.append(body, Element::new(Tag::Input).with_id("phone"));
        let status = doc.append(body, Element::new(Tag::Span));
        let field = Field {
            kind: FieldKind::Phone,
            input,
            status,
        };
        field.associate(&mut doc);
        assert_eq!(doc.attribute(input, "aria-describedby"), Some("phone-error"));
        assert_eq!(doc.get(status).id(), Some("phone-error"));

        assert!(!field.validate(&mut doc, "is-invalid"));
        assert!(field.has_error(&doc, "is-invalid"));
        assert_eq!(doc.get(status).text(), "Phone number is required");
        assert_eq!(doc.attribute(input, "aria-invalid"), Some("true"));

        doc.set_value(input, "(555) 123-4567");
        assert!(field.validate(&mut doc, "is-invalid"));
        assert!(!field.has_error(&doc, "is-invalid"));
        assert_eq!(doc.get(status).text(), "");
        assert_eq!(doc.attribute(input, "aria-invalid"), None);
    }

    proptest! {
        #[test]
        fn phone_valid_iff_ten_digits(
            digits in proptest::collection::vec(0u8..10, 0..16),
            separators in proptest::collection::vec(prop::sample::select(vec!["", "-", " ", ".", "(", ")", "+"]), 16),
        ) {
            let mut value = String::new();
            for (digit, separator) in digits.iter().zip(separators.iter()) {
                value.push_str(separator);
                value.push(char::from(b'0' + digit));
            }
            let result = validate_phone(&value);
            if digits.len() >= MIN_PHONE_DIGITS {
                prop_assert_eq!(result, Ok(()));
            } else {
                prop_assert!(result.is_err());
            }
        }

        #[test]
        fn email_with_whitespace_in_local_part_is_rejected(
            left in "[a-z]{1,8}",
            right in "[a-z]{1,8}",
            domain in "[a-z]{1,8}\\.[a-z]{2,4}",
        ) {
            let value = format!("{left} {right}@{domain}");
            prop_assert_eq!(validate_email(&value), Err(FieldError::Invalid(FieldKind::Email)));
        }

        #[test]
        fn email_without_dot_in_domain_is_rejected(
            local in "[a-z0-9]{1,8}",
            domain in "[a-z0-9]{1,8}",
        ) {
            let value = format!("{local}@{domain}");
            prop_assert_eq!(validate_email(&value), Err(FieldError::Invalid(FieldKind::Email)));
        }
    }
}
