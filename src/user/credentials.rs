use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::warn;

use crate::shared::AppError;

/// Opaque credential service. The rest of the crate only ever sees hashed
/// credentials through this interface, so the hashing scheme can change
/// without touching the directory or the handlers.
pub trait CredentialService: Send + Sync {
    /// Derives a storable hash from a plaintext password
    fn derive(&self, plain: &str) -> Result<String, AppError>;

    /// Verifies a plaintext password against a stored hash
    fn verify(&self, plain: &str, hash: &str) -> bool;
}

/// Argon2id implementation used in production
pub struct Argon2Credentials;

impl CredentialService for Argon2Credentials {
    fn derive(&self, plain: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| {
                warn!(error = %e, "Failed to derive password hash");
                AppError::Internal
            })
    }

    fn verify(&self, plain: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            warn!("Stored credential is not a valid password hash");
            return false;
        };

        Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_then_verify() {
        let credentials = Argon2Credentials;

        let hash = credentials.derive("correct horse battery staple").unwrap();
        assert_ne!(hash, "correct horse battery staple");
        assert!(credentials.verify("correct horse battery staple", &hash));
    }

    #[test]
    fn test_wrong_password_fails_verification() {
        let credentials = Argon2Credentials;

        let hash = credentials.derive("password-1").unwrap();
        assert!(!credentials.verify("password-2", &hash));
    }

    #[test]
    fn test_garbage_hash_fails_verification() {
        let credentials = Argon2Credentials;

        assert!(!credentials.verify("password-1", "not-a-phc-string"));
    }

    #[test]
    fn test_hashes_are_salted() {
        let credentials = Argon2Credentials;

        let a = credentials.derive("password-1").unwrap();
        let b = credentials.derive("password-1").unwrap();
        assert_ne!(a, b);
    }
}
