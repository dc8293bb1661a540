use regex::Regex;
use std::sync::LazyLock;

/// Usernames that can never be registered, compared case-insensitively.
pub const FORBIDDEN_USERNAMES: &[&str] = &["me"];

pub const MAX_LENGTH_EMAIL: usize = 254;
pub const MAX_LENGTH_USERNAME: usize = 150;
pub const MAX_LENGTH_NAME: usize = 150;
pub const MAX_LENGTH_RECIPE_NAME: usize = 256;
pub const MIN_COOKING_TIME: i32 = 1;
pub const MIN_INGREDIENT_AMOUNT: i32 = 1;
pub const MIN_PASSWORD_LENGTH: usize = 8;

static USERNAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").unwrap());
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("This field may not be blank.".to_string());
    }
    if username.chars().count() > MAX_LENGTH_USERNAME {
        return Err(format!(
            "Ensure this field has no more than {} characters.",
            MAX_LENGTH_USERNAME
        ));
    }
    if !USERNAME_RE.is_match(username) {
        return Err(
            "Username may contain only letters, digits and @/./+/-/_ characters.".to_string(),
        );
    }
    let lowered = username.to_lowercase();
    if FORBIDDEN_USERNAMES.contains(&lowered.as_str()) {
        return Err(format!("Username {:?} is not allowed.", username));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("This field may not be blank.".to_string());
    }
    if email.chars().count() > MAX_LENGTH_EMAIL {
        return Err(format!(
            "Ensure this field has no more than {} characters.",
            MAX_LENGTH_EMAIL
        ));
    }
    if !EMAIL_RE.is_match(email) {
        return Err("Enter a valid email address.".to_string());
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "This password is too short. It must contain at least {} characters.",
            MIN_PASSWORD_LENGTH
        ));
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err("This password is entirely numeric.".to_string());
    }
    Ok(())
}

/// Shared check for required human-name fields (first_name, last_name).
pub fn validate_name(value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err("This field may not be blank.".to_string());
    }
    if value.chars().count() > MAX_LENGTH_NAME {
        return Err(format!(
            "Ensure this field has no more than {} characters.",
            MAX_LENGTH_NAME
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_blacklist_is_case_insensitive() {
        assert!(validate_username("me").is_err());
        assert!(validate_username("ME").is_err());
        assert!(validate_username("Me").is_err());
        assert!(validate_username("mee").is_ok());
    }

    #[test]
    fn test_username_charset() {
        assert!(validate_username("chef.2024@home+x_y-z").is_ok());
        assert!(validate_username("chef 2024").is_err());
        assert!(validate_username("chef!").is_err());
        assert!(validate_username("").is_err());
    }

    #[test]
    fn test_username_length_limit() {
        let long = "a".repeat(MAX_LENGTH_USERNAME + 1);
        assert!(validate_username(&long).is_err());
        let ok = "a".repeat(MAX_LENGTH_USERNAME);
        assert!(validate_username(&ok).is_ok());
    }

    #[test]
    fn test_email() {
        assert!(validate_email("cook@example.com").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("a@b").is_err());
        assert!(validate_email("").is_err());
        let long = format!("{}@example.com", "a".repeat(MAX_LENGTH_EMAIL));
        assert!(validate_email(&long).is_err());
    }

    #[test]
    fn test_password_policy() {
        assert!(validate_password("1234567").is_err());
        assert!(validate_password("12345678").is_err());
        assert!(validate_password("p4ssw0rd").is_ok());
        assert!(validate_password("short1a").is_err());
    }

    #[test]
    fn test_name_required() {
        assert!(validate_name("Ada").is_ok());
        assert!(validate_name("  ").is_err());
    }
}
