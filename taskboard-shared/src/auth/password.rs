/// Password hashing module using Argon2id
///
/// This module provides secure password hashing using the Argon2id
/// algorithm. Digests are stored in PHC string format, so parameters and
/// salt travel with the hash.
///
/// # Security
///
/// - **Algorithm**: Argon2id (hybrid of Argon2i and Argon2d)
/// - **Memory**: 64 MB (65536 KB)
/// - **Iterations**: 3 passes
/// - **Parallelism**: 4 lanes
/// - **Output**: 32-byte hash
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let digest = hash_password("super_secret_password")?;
/// assert!(verify_password("super_secret_password", &digest)?);
/// assert!(!verify_password("wrong_password", &digest)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// Invalid password digest format
    #[error("Invalid password digest format: {0}")]
    InvalidDigest(String),
}

/// Hashes a password using Argon2id with secure parameters
///
/// Output is a PHC string, e.g.:
///
/// ```text
/// $argon2id$v=19$m=65536,t=3,p=4$c2FsdHNhbHRzYWx0$hash...
/// ```
///
/// # Errors
///
/// Returns `PasswordError::HashError` if hashing fails
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let params = ParamsBuilder::new()
        .m_cost(65536) // 64 MB
        .t_cost(3)
        .p_cost(4)
        .output_len(32)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

    let digest = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

    Ok(digest.to_string())
}

/// Verifies a password against a stored digest
///
/// Comparison is constant-time.
///
/// # Returns
///
/// `Ok(true)` if the password matches, `Ok(false)` if it doesn't
///
/// # Errors
///
/// Returns `PasswordError::InvalidDigest` if the stored digest cannot be
/// parsed, `PasswordError::VerifyError` for other failures.
pub fn verify_password(password: &str, digest: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(digest)
        .map_err(|e| PasswordError::InvalidDigest(format!("Failed to parse digest: {}", e)))?;

    // Parameters are embedded in the digest
    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(format!(
            "Verification failed: {}",
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_format() {
        let digest = hash_password("test_password_123").expect("Hash should succeed");

        assert!(digest.starts_with("$argon2id$"));
        assert!(digest.contains("v=19"));
        assert!(digest.contains("m=65536"));
        assert!(digest.contains("t=3"));
        assert!(digest.contains("p=4"));
    }

    #[test]
    fn test_hash_password_produces_different_salts() {
        let digest1 = hash_password("same_password").expect("Hash 1 should succeed");
        let digest2 = hash_password("same_password").expect("Hash 2 should succeed");

        // Different salts = different digests
        assert_ne!(digest1, digest2);
    }

    #[test]
    fn test_verify_password_correct() {
        let digest = hash_password("correct_password").expect("Hash should succeed");
        assert!(verify_password("correct_password", &digest).expect("Verify should succeed"));
    }

    #[test]
    fn test_verify_password_incorrect() {
        let digest = hash_password("correct_password").expect("Hash should succeed");
        assert!(!verify_password("wrong_password", &digest).expect("Verify should succeed"));
    }

    #[test]
    fn test_verify_password_empty() {
        let digest = hash_password("password").expect("Hash should succeed");
        assert!(!verify_password("", &digest).expect("Verify should succeed"));
    }

    #[test]
    fn test_verify_password_invalid_digest() {
        assert!(verify_password("password", "invalid_digest").is_err());
    }

    #[test]
    fn test_hash_verify_roundtrip() {
        let passwords = vec![
            "simple",
            "with spaces",
            "with-special-chars!@#$%",
            "unicode-密码-パスワード",
        ];

        for password in passwords {
            let digest = hash_password(password).expect("Hash should succeed");
            assert!(
                verify_password(password, &digest).expect("Verify should succeed"),
                "Password '{}' should verify",
                password
            );
        }
    }
}
