use garde::Validate;

use crate::error::{AppError, Result};

#[derive(Validate)]
struct Registration {
    #[garde(email)]
    email: String,
    #[garde(length(min = 8, max = 128))]
    password: String,
}

/// Validates the credentials submitted at registration.
///
/// # Arguments
///
/// * `email` - The email address, taken as-is (identity is case-sensitive).
/// * `password` - The plaintext password.
///
/// # Returns
///
/// A `Result<()>` indicating whether the registration input is valid.
pub fn validate_registration(email: &str, password: &str) -> Result<()> {
    Registration {
        email: email.to_string(),
        password: password.to_string(),
    }
    .validate().map_err(|report| {
        let field = report
            .iter()
            .next()
            .map(|(path, _)| path.to_string())
            .unwrap_or_else(|| "email".to_string());
        let message = if field == "password" {
            "Password must be between 8 and 128 characters."
        } else {
            "Please enter a valid email address."
        };
        AppError::validation(field, message)
    })
}
