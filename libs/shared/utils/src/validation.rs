use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

use shared_config::PhonePolicy;
use shared_models::error::AppError;

pub const MIN_PASSWORD_LENGTH: usize = 6;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
    })
}

fn clock_regex() -> &'static Regex {
    static CLOCK: OnceLock<Regex> = OnceLock::new();
    CLOCK.get_or_init(|| {
        Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").expect("clock pattern is valid")
    })
}

// `\d` would also admit non-ASCII digits.
fn phone_pattern(policy: &PhonePolicy) -> String {
    match policy {
        PhonePolicy::MinDigits { min } => format!(r"^[0-9]{{{},}}$", min),
        PhonePolicy::ExactDigits { digits } => format!(r"^[0-9]{{{}}}$", digits),
        PhonePolicy::CountryCode { code, digits } => {
            format!(r"^{}\s?[0-9]{{{}}}$", regex::escape(code), digits)
        }
    }
}

/// A phone policy with its pattern compiled once.
#[derive(Debug, Clone)]
pub struct PhoneValidator {
    pattern: Option<Regex>,
}

impl PhoneValidator {
    pub fn new(policy: &PhonePolicy) -> Self {
        let pattern = match Regex::new(&phone_pattern(policy)) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!("Phone policy {:?} cannot be compiled, rejecting all numbers: {}", policy, e);
                None
            }
        };
        Self { pattern }
    }

    pub fn is_valid(&self, phone: &str) -> bool {
        self.pattern
            .as_ref()
            .map(|re| re.is_match(phone.trim()))
            .unwrap_or(false)
    }

    pub fn validate(&self, phone: &str) -> Result<(), AppError> {
        if self.is_valid(phone) {
            Ok(())
        } else {
            Err(AppError::Validation("Please enter a valid phone number".to_string()))
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email.trim())
}

/// Strict 24-hour `HH:MM`, used when a schedule is entered.
pub fn is_valid_clock_time(value: &str) -> bool {
    clock_regex().is_match(value)
}

/// Fails with "All fields are required" if any field is blank.
pub fn require_fields(fields: &[&str]) -> Result<(), AppError> {
    if fields.iter().any(|f| f.trim().is_empty()) {
        return Err(AppError::Validation("All fields are required".to_string()));
    }
    Ok(())
}

pub fn validate_password_change(current: &str, new: &str, confirm: &str) -> Result<(), AppError> {
    if current.is_empty() || new.is_empty() || confirm.is_empty() {
        return Err(AppError::Validation("All password fields are required".to_string()));
    }
    if new != confirm {
        return Err(AppError::Validation("New passwords do not match".to_string()));
    }
    validate_new_password(new)
}

pub fn validate_new_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn min_digit_policy_accepts_longer_numbers() {
        let policy = PhoneValidator::new(&PhonePolicy::MinDigits { min: 7 });
        assert!(policy.is_valid("1234567"));
        assert!(policy.is_valid("71234567890"));
        assert!(!policy.is_valid("123456"));
        assert!(!policy.is_valid("12-34567"));
    }

    #[test]
    fn exact_digit_policy_is_exact() {
        let policy = PhoneValidator::new(&PhonePolicy::ExactDigits { digits: 8 });
        assert!(policy.is_valid("71234567"));
        assert!(!policy.is_valid("7123456"));
        assert!(!policy.is_valid("712345678"));
    }

    #[test]
    fn country_code_policy_requires_prefix() {
        let policy = PhoneValidator::new(&PhonePolicy::CountryCode { code: "+267".to_string(), digits: 8 });
        assert!(policy.is_valid("+26771234567"));
        assert!(policy.is_valid("+267 71234567"));
        assert!(!policy.is_valid("71234567"));
        assert!(!policy.is_valid("+2677123456"));
    }

    #[test]
    fn non_ascii_digits_are_rejected() {
        // Arabic-Indic and full-width digits
        let exact = PhoneValidator::new(&PhonePolicy::ExactDigits { digits: 8 });
        assert!(!exact.is_valid("\u{667}\u{661}\u{662}\u{663}\u{664}\u{665}\u{666}\u{667}"));
        assert!(!exact.is_valid("\u{ff17}1234567"));
        assert!(exact.is_valid("71234567"));

        let min = PhoneValidator::new(&PhonePolicy::MinDigits { min: 7 });
        assert!(!min.is_valid("\u{967}\u{968}\u{969}\u{96a}\u{96b}\u{96c}\u{96d}"));

        let country = PhoneValidator::new(&PhonePolicy::CountryCode { code: "+267".to_string(), digits: 8 });
        assert!(!country.is_valid("+267\u{667}\u{661}\u{662}\u{663}\u{664}\u{665}\u{666}\u{667}"));
    }

    #[test]
    fn validator_reports_the_screen_message() {
        let validator = PhoneValidator::new(&PhonePolicy::MinDigits { min: 7 });
        assert!(validator.validate(" 1234567 ").is_ok());
        assert_matches!(
            validator.validate("12345"),
            Err(AppError::Validation(msg)) if msg == "Please enter a valid phone number"
        );
    }

    #[test]
    fn password_change_rules_apply_in_order() {
        assert_matches!(
            validate_password_change("", "secret1", "secret1"),
            Err(AppError::Validation(msg)) if msg == "All password fields are required"
        );
        assert_matches!(
            validate_password_change("old", "secret1", "secret2"),
            Err(AppError::Validation(msg)) if msg == "New passwords do not match"
        );
        assert_matches!(
            validate_password_change("old", "abc", "abc"),
            Err(AppError::Validation(msg)) if msg == "Password must be at least 6 characters"
        );
        assert!(validate_password_change("old", "secret1", "secret1").is_ok());
    }

    #[test]
    fn clock_times_are_strict() {
        assert!(is_valid_clock_time("09:00"));
        assert!(is_valid_clock_time("23:59"));
        assert!(!is_valid_clock_time("9:00"));
        assert!(!is_valid_clock_time("24:00"));
        assert!(!is_valid_clock_time("12:60"));
        assert!(!is_valid_clock_time("0\u{669}:00"));
    }

    #[test]
    fn emails_and_required_fields() {
        assert!(is_valid_email("dr.smith@clinic.bw"));
        assert!(!is_valid_email("dr.smith@clinic"));
        assert!(require_fields(&["a", "b"]).is_ok());
        assert!(require_fields(&["a", "  "]).is_err());
    }
}
