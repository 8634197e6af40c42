//! crates/study_assistant_core/src/password.rs
//!
//! The password composition policy applied during registration. Evaluation
//! returns the exact subset of unmet rules so the auth flow can enumerate
//! every failure at once instead of stopping at the first.

pub const MIN_LENGTH: usize = 8;

/// One rule of the composition policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordRule {
    MinLength,
    Uppercase,
    Lowercase,
    Digit,
    Special,
}

impl PasswordRule {
    /// The user-facing description shown when the rule is unmet.
    pub fn description(&self) -> String {
        match self {
            PasswordRule::MinLength => format!("at least {} characters", MIN_LENGTH),
            PasswordRule::Uppercase => "an uppercase letter".to_string(),
            PasswordRule::Lowercase => "a lowercase letter".to_string(),
            PasswordRule::Digit => "a digit".to_string(),
            PasswordRule::Special => "a special character".to_string(),
        }
    }
}

/// Returns the rules `password` does not satisfy, in policy order.
pub fn evaluate(password: &str) -> Vec<PasswordRule> {
    let mut unmet = Vec::new();
    if password.chars().count() < MIN_LENGTH {
        unmet.push(PasswordRule::MinLength);
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        unmet.push(PasswordRule::Uppercase);
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        unmet.push(PasswordRule::Lowercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        unmet.push(PasswordRule::Digit);
    }
    if !password.chars().any(|c| !c.is_alphanumeric()) {
        unmet.push(PasswordRule::Special);
    }
    unmet
}

pub fn is_valid(password: &str) -> bool {
    evaluate(password).is_empty()
}

/// Builds the single error message enumerating every unmet rule.
pub fn requirements_message(unmet: &[PasswordRule]) -> String {
    let parts: Vec<String> = unmet.iter().map(|r| r.description()).collect();
    format!("Password must contain {}", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_password_has_no_unmet_rules() {
        assert!(evaluate("Abcdef1!").is_empty());
        assert!(is_valid("Abcdef1!"));
    }

    #[test]
    fn empty_password_fails_every_rule() {
        assert_eq!(
            evaluate(""),
            vec![
                PasswordRule::MinLength,
                PasswordRule::Uppercase,
                PasswordRule::Lowercase,
                PasswordRule::Digit,
                PasswordRule::Special,
            ]
        );
    }

    #[test]
    fn reports_the_exact_unmet_subset() {
        // Long enough, mixed case, but no digit and no special character.
        assert_eq!(
            evaluate("Abcdefghij"),
            vec![PasswordRule::Digit, PasswordRule::Special]
        );
        // Everything but an uppercase letter.
        assert_eq!(evaluate("abcdef1!"), vec![PasswordRule::Uppercase]);
    }

    #[test]
    fn length_is_counted_in_characters_not_bytes() {
        // Eight characters, multi-byte ones included.
        assert!(!evaluate("Ábcdef1!").contains(&PasswordRule::MinLength));
    }

    #[test]
    fn message_enumerates_all_unmet_rules() {
        let msg = requirements_message(&evaluate("abc"));
        assert!(msg.contains("at least 8 characters"));
        assert!(msg.contains("an uppercase letter"));
        assert!(msg.contains("a digit"));
        assert!(msg.contains("a special character"));
        assert!(!msg.contains("a lowercase letter"));
    }
}
