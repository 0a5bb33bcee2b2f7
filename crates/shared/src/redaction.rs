//! Masking of passenger data and secrets before it reaches a log sink.

/// Placeholder written in place of fully redacted values.
pub const REDACTED: &str = "[REDACTED]";

/// Returns true if values under `key` must never be logged verbatim.
///
/// ```
/// use checkin_shared::is_sensitive_key;
///
/// assert!(is_sensitive_key("email"));
/// assert!(is_sensitive_key("CHECKIN_API_TOKEN"));
/// assert!(!is_sensitive_key("seat"));
/// ```
pub fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    ["email", "token", "secret", "password", "credential"]
        .iter()
        .any(|marker| key.contains(marker))
}

/// Keep the first character of the local part and the whole domain.
///
/// ```
/// use checkin_shared::mask_email;
///
/// assert_eq!(mask_email("kirk@enterprise.ship"), "k***@enterprise.ship");
/// assert_eq!(mask_email("not-an-address"), "[REDACTED]");
/// ```
pub fn mask_email(value: &str) -> String {
    let trimmed = value.trim();
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
            let first: String = local.chars().take(1).collect();
            format!("{first}***@{domain}")
        },
        _ => REDACTED.to_owned(),
    }
}

/// Masked rendering of `value` when `key` is sensitive, otherwise `None`.
pub fn redact_for_key(key: &str, value: &str) -> Option<String> {
    if !is_sensitive_key(key) {
        return None;
    }
    if key.to_ascii_lowercase().contains("email") {
        return Some(mask_email(value));
    }
    Some(REDACTED.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passenger_contact_fields_are_sensitive() {
        assert!(is_sensitive_key("email"));
        assert!(is_sensitive_key("passengerEmail"));
        assert!(!is_sensitive_key("username"));
        assert!(!is_sensitive_key("fullName"));
    }

    #[test]
    fn emails_keep_domain_for_debugging() {
        assert_eq!(mask_email(" lars@metal.band "), "l***@metal.band");
        assert_eq!(mask_email("@metal.band"), REDACTED);
        assert_eq!(mask_email("lars@"), REDACTED);
    }

    #[test]
    fn redact_for_key_masks_by_kind() {
        assert_eq!(
            redact_for_key("email", "james@gate.m72").as_deref(),
            Some("j***@gate.m72")
        );
        assert_eq!(redact_for_key("apiToken", "abc").as_deref(), Some(REDACTED));
        assert_eq!(redact_for_key("seat", "12A"), None);
    }
}
