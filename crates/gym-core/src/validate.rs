// ABOUTME: Field validators for form input: email addresses and phone numbers.
// ABOUTME: The store never calls these; callers validate before create or update.

/// Minimum and maximum digit counts for a phone number.
pub const PHONE_DIGITS_MIN: usize = 10;
pub const PHONE_DIGITS_MAX: usize = 15;

/// Accepts `local@domain.tld`: no whitespace, exactly one `@`, and a dot
/// inside the domain that is neither its first nor its last character.
pub fn validate_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Accepts 10 to 15 ASCII digits and nothing else.
pub fn validate_phone(phone: &str) -> bool {
    (PHONE_DIGITS_MIN..=PHONE_DIGITS_MAX).contains(&phone.len())
        && phone.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_accepts_ordinary_addresses() {
        assert!(validate_email("admin@gym.com"));
        assert!(validate_email("ana.garcia@ejemplo.com.co"));
        assert!(validate_email("a@x.com"));
    }

    #[test]
    fn email_rejects_malformed_addresses() {
        assert!(!validate_email(""));
        assert!(!validate_email("admin"));
        assert!(!validate_email("@gym.com"));
        assert!(!validate_email("admin@gym"));
        assert!(!validate_email("admin@gym."));
        assert!(!validate_email("admin@.com"));
        assert!(!validate_email("ad min@gym.com"));
        assert!(!validate_email("a@b@gym.com"));
    }

    #[test]
    fn phone_length_and_digits() {
        assert!(validate_phone("3001234567"));
        assert!(validate_phone("573001234567"));
        assert!(!validate_phone("300123456"));
        assert!(!validate_phone("3001234567890123"));
        assert!(!validate_phone("300-123-4567"));
        assert!(!validate_phone("+573001234567"));
    }
}
