//! Synchronous field rules and the username directory rule.

use crate::{DomainError, FormField, ValidationResult};
use std::collections::BTreeSet;

/// Usernames already assigned at the gate.
pub const DEFAULT_TAKEN_USERNAMES: [&str; 4] = ["james", "lars", "kirk", "robert"];

/// Message shown for a taken username.
pub const DEFAULT_TAKEN_MESSAGE: &str = "Username taken at Gate M72";

/// `"{label} is required"` when `value` is blank after trimming.
pub fn validate_required(value: &str, label: &str) -> ValidationResult {
    if value.trim().is_empty() {
        ValidationResult::invalid(format!("{label} is required"))
    } else {
        ValidationResult::Valid
    }
}

/// Email check, in order: present, contains `@`, exactly one `@` with a
/// non-empty local part and domain.
pub fn validate_email(value: &str) -> ValidationResult {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return ValidationResult::invalid("Email is required");
    }
    if !trimmed.contains('@') {
        return ValidationResult::invalid("Email must contain @");
    }

    let mut parts = trimmed.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty() => {
            ValidationResult::Valid
        },
        _ => ValidationResult::invalid("Invalid email format"),
    }
}

/// Synchronous rule for `field`. Username has no synchronous rule and is
/// always `None`; it goes through the debounced directory check.
pub fn validate_field(field: FormField, value: &str) -> Option<ValidationResult> {
    match field {
        FormField::Email => Some(validate_email(value)),
        FormField::FullName | FormField::Seat => Some(validate_required(value, field.label())),
        FormField::Username => None,
    }
}

/// Case-insensitive rejection set for usernames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsernameRules {
    taken: BTreeSet<Box<str>>,
    taken_message: Box<str>,
}

impl UsernameRules {
    /// Build from raw entries. Entries are trimmed and lowercased; blanks are rejected.
    pub fn new<I, S>(taken: I, taken_message: impl Into<Box<str>>) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized = BTreeSet::new();
        for (index, entry) in taken.into_iter().enumerate() {
            let entry = entry.as_ref().trim();
            if entry.is_empty() {
                return Err(DomainError::EmptyUsername { index });
            }
            normalized.insert(entry.to_lowercase().into_boxed_str());
        }
        Ok(Self {
            taken: normalized,
            taken_message: taken_message.into(),
        })
    }

    /// Returns true if `username` matches a taken entry, ignoring case.
    #[must_use]
    pub fn is_taken(&self, username: &str) -> bool {
        self.taken.contains(username.to_lowercase().as_str())
    }

    /// Directory verdict for `username`.
    #[must_use]
    pub fn classify(&self, username: &str) -> ValidationResult {
        if self.is_taken(username) {
            ValidationResult::invalid(self.taken_message.clone())
        } else {
            ValidationResult::Valid
        }
    }

    /// Normalised taken entries in sorted order.
    pub fn taken(&self) -> impl Iterator<Item = &str> {
        self.taken.iter().map(AsRef::as_ref)
    }

    /// Rejection message.
    #[must_use]
    pub fn taken_message(&self) -> &str {
        &self.taken_message
    }
}

impl Default for UsernameRules {
    fn default() -> Self {
        Self {
            taken: DEFAULT_TAKEN_USERNAMES
                .iter()
                .map(|name| Box::<str>::from(*name))
                .collect(),
            taken_message: DEFAULT_TAKEN_MESSAGE.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn required_fields_use_their_label() {
        assert_eq!(
            validate_required("   ", "Full Name"),
            ValidationResult::invalid("Full Name is required")
        );
        assert_eq!(validate_required(" 3F ", "Seat"), ValidationResult::Valid);
    }

    #[test]
    fn email_errors_are_reported_in_order() {
        assert_eq!(
            validate_email("  "),
            ValidationResult::invalid("Email is required")
        );
        assert_eq!(
            validate_email("lars.metallica.com"),
            ValidationResult::invalid("Email must contain @")
        );
        for bad in ["@metallica.com", "lars@", "lars@@metallica.com", "a@b@c"] {
            assert_eq!(
                validate_email(bad),
                ValidationResult::invalid("Invalid email format"),
                "{bad}"
            );
        }
        assert_eq!(validate_email(" lars@metallica.com "), ValidationResult::Valid);
    }

    #[test]
    fn username_has_no_synchronous_rule() {
        assert_eq!(validate_field(FormField::Username, ""), None);
        assert_eq!(
            validate_field(FormField::Seat, ""),
            Some(ValidationResult::invalid("Seat is required"))
        );
    }

    #[test]
    fn default_directory_is_case_insensitive() {
        let rules = UsernameRules::default();
        assert_eq!(
            rules.classify("LaRs"),
            ValidationResult::invalid(DEFAULT_TAKEN_MESSAGE)
        );
        assert_eq!(rules.classify("alice"), ValidationResult::Valid);
        assert_eq!(
            rules.taken().collect::<Vec<_>>(),
            vec!["james", "kirk", "lars", "robert"]
        );
    }

    #[test]
    fn custom_directory_normalises_entries() -> Result<(), DomainError> {
        let rules = UsernameRules::new([" Cliff ", "JASON"], "Taken")?;
        assert!(rules.is_taken("cliff"));
        assert!(rules.is_taken("Jason"));
        assert!(!rules.is_taken("lars"));
        assert_eq!(
            UsernameRules::new(["kirk", " "], "Taken"),
            Err(DomainError::EmptyUsername { index: 1 })
        );
        Ok(())
    }

    proptest! {
        #[test]
        fn well_formed_addresses_are_valid(
            local in "[a-z0-9._%+-]{1,16}",
            domain in "[a-z0-9-]{1,12}\\.[a-z]{2,6}",
        ) {
            let address = format!("{local}@{domain}");
            prop_assert_eq!(validate_email(&address), ValidationResult::Valid);
        }

        #[test]
        fn required_rule_only_depends_on_trimmed_emptiness(value in "\\PC{0,24}") {
            let result = validate_required(&value, "Seat");
            prop_assert_eq!(result.is_valid(), !value.trim().is_empty());
        }

        #[test]
        fn directory_ignores_case(name in "[a-zA-Z]{1,10}") {
            let rules = UsernameRules::default();
            prop_assert_eq!(rules.is_taken(&name), rules.is_taken(&name.to_lowercase()));
        }
    }
}
