//! Password hashing with Argon2id.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::error::AppError;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Reject passwords shorter than [`MIN_PASSWORD_LENGTH`] or without a special character.
pub fn validate_password_strength(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH
        || password.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(AppError::Validation("Password not strong enough".to_string()));
    }
    Ok(())
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            tracing::error!(error = %e, "Password hashing failed");
            AppError::Upstream("Failed to create account. Please try again later.".to_string())
        })
}

/// Returns `false` for a wrong password or an unparseable stored hash.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash is malformed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strength_rules() {
        assert!(validate_password_strength("short!").is_err());
        assert!(validate_password_strength("longenoughbutplain").is_err());
        assert!(validate_password_strength("longenough!").is_ok());
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse!").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse!", &hash));
        assert!(!verify_password("wrong horse!", &hash));
        assert!(!verify_password("anything", "not-a-hash"));
    }
}
