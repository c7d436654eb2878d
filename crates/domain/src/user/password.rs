use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use super::{UserError, UserResult};

const MIN_PASSWORD_LENGTH: usize = 8;

/// Checks the password policy: at least 8 ASCII letters or digits, with at
/// least one of each.
pub fn validate_password(password: &str) -> UserResult<()> {
    let long_enough = password.len() >= MIN_PASSWORD_LENGTH;
    let alphanumeric = password.chars().all(|c| c.is_ascii_alphanumeric());
    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if long_enough && alphanumeric && has_letter && has_digit {
        Ok(())
    } else {
        Err(UserError::Validation(
            "Password has to have a minimum of 8 characters and at least 1 digit, 1 letter."
                .to_string(),
        ))
    }
}

pub fn hash_password(password: &str) -> UserResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::PasswordHash(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> UserResult<bool> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
