use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 20;
pub const PASSWORD_MIN_LEN: usize = 6;
pub const PASSWORD_MAX_LEN: usize = 50;
/// Emails must stay under 100 characters.
pub const EMAIL_MAX_LEN: usize = 99;

/// A rejected form field. `Display` is the message shown to the visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("Username must be at least 3 characters long")]
    UsernameTooShort,
    #[error("Username must be at most 20 characters long")]
    UsernameTooLong,
    #[error("Username can only contain letters, numbers, and underscores")]
    UsernameInvalidCharacters,
    #[error("Password must be at least 6 characters long")]
    PasswordTooShort,
    #[error("Password must be at most 50 characters long")]
    PasswordTooLong,
    #[error("Please enter a valid email address")]
    EmailInvalidFormat,
    #[error("Email must be less than 100 characters")]
    EmailTooLong,
}

lazy_static! {
    static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_]+$").unwrap();
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap();
}

pub fn validate_username(username: &str) -> Result<(), FieldError> {
    let len = username.chars().count();
    if len < USERNAME_MIN_LEN {
        return Err(FieldError::UsernameTooShort);
    }
    if len > USERNAME_MAX_LEN {
        return Err(FieldError::UsernameTooLong);
    }
    if !USERNAME_RE.is_match(username) {
        return Err(FieldError::UsernameInvalidCharacters);
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), FieldError> {
    let len = password.chars().count();
    if len < PASSWORD_MIN_LEN {
        return Err(FieldError::PasswordTooShort);
    }
    if len > PASSWORD_MAX_LEN {
        return Err(FieldError::PasswordTooLong);
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), FieldError> {
    if !EMAIL_RE.is_match(email) {
        return Err(FieldError::EmailInvalidFormat);
    }
    if email.chars().count() > EMAIL_MAX_LEN {
        return Err(FieldError::EmailTooLong);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_length_bounds() {
        assert_eq!(validate_username("ab"), Err(FieldError::UsernameTooShort));
        assert_eq!(validate_username(""), Err(FieldError::UsernameTooShort));
        assert!(validate_username("abc").is_ok());
        assert!(validate_username(&"a".repeat(20)).is_ok());
        assert_eq!(
            validate_username(&"a".repeat(21)),
            Err(FieldError::UsernameTooLong)
        );
    }

    #[test]
    fn username_charset() {
        assert!(validate_username("Bob_42").is_ok());
        assert_eq!(
            validate_username("bob smith"),
            Err(FieldError::UsernameInvalidCharacters)
        );
        assert_eq!(
            validate_username("bob-smith"),
            Err(FieldError::UsernameInvalidCharacters)
        );
        assert_eq!(
            validate_username("björn"),
            Err(FieldError::UsernameInvalidCharacters)
        );
    }

    #[test]
    fn username_length_reported_before_charset() {
        assert_eq!(validate_username("!!"), Err(FieldError::UsernameTooShort));
        assert_eq!(
            validate_username(&"!".repeat(25)),
            Err(FieldError::UsernameTooLong)
        );
    }

    #[test]
    fn password_length_bounds() {
        assert_eq!(validate_password("12345"), Err(FieldError::PasswordTooShort));
        assert!(validate_password("123456").is_ok());
        assert!(validate_password(&"p".repeat(50)).is_ok());
        assert_eq!(
            validate_password(&"p".repeat(51)),
            Err(FieldError::PasswordTooLong)
        );
        // any characters are fine
        assert!(validate_password("  \t émoji 🔑 ").is_ok());
    }

    #[test]
    fn email_format() {
        assert!(validate_email("a@b.com").is_ok());
        assert!(validate_email("first.last+tag@mail.example.org").is_ok());
        assert_eq!(
            validate_email("not-an-email"),
            Err(FieldError::EmailInvalidFormat)
        );
        assert_eq!(validate_email("a@b.c"), Err(FieldError::EmailInvalidFormat));
        assert_eq!(validate_email("a b@c.com"), Err(FieldError::EmailInvalidFormat));
        assert_eq!(validate_email("@b.com"), Err(FieldError::EmailInvalidFormat));
    }

    #[test]
    fn email_too_long() {
        let email = format!("{}@b.co", "x".repeat(95));
        assert_eq!(email.len(), 100);
        assert_eq!(validate_email(&email), Err(FieldError::EmailTooLong));

        let fits = format!("{}@b.co", "x".repeat(94));
        assert!(validate_email(&fits).is_ok());
    }

    #[test]
    fn messages_are_user_facing() {
        assert_eq!(
            FieldError::UsernameInvalidCharacters.to_string(),
            "Username can only contain letters, numbers, and underscores"
        );
        assert_eq!(
            FieldError::EmailInvalidFormat.to_string(),
            "Please enter a valid email address"
        );
    }
}
