//! Common validation rules shared across request payloads.

use validator::{ValidateEmail, ValidationError};

/// Validates email shape using the same rule as the derive attribute.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if !email.validate_email() {
        return Err(ValidationError::new("email_invalid"));
    }
    Ok(())
}

/// Validates password strength.
///
/// Requirements:
/// - At least 8 characters
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.len() < 8 {
        return Err(ValidationError::new("password_too_short"));
    }
    Ok(())
}
