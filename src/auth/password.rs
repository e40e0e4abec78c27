use crate::error::AppError;
use bcrypt::{hash, verify, DEFAULT_COST};

/// Hashes a plain-text password with bcrypt. Every hash carries its own random salt.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

/// Checks a plain-text password against a stored bcrypt hash.
///
/// A malformed stored hash is reported as an error rather than a mismatch.
pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    verify(password, hashed_password)
        .map_err(|e| AppError::InternalServerError(format!("Failed to verify password: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hashing_and_verification() {
        let password = "s3cret-password";
        let hashed = hash_password(password).unwrap();

        assert_ne!(hashed, password);
        assert!(verify_password(password, &hashed).unwrap());
        assert!(!verify_password("not-the-password", &hashed).unwrap());
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let first = hash_password("repeatable").unwrap();
        let second = hash_password("repeatable").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_with_invalid_hash() {
        match verify_password("s3cret-password", "invalidhashformat") {
            Err(AppError::InternalServerError(msg)) => {
                assert!(msg.contains("Failed to verify password"));
            }
            Ok(false) => {}
            Ok(true) => panic!("Password verification should fail for invalid hash format"),
            Err(e) => panic!("Unexpected error: {:?}", e),
        }
    }
}
