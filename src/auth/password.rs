/// Password Hashing and Verification
///
/// bcrypt with a fixed cost factor. Hashing failures abort the calling
/// operation; verification failures of any kind read as a non-match.

use crate::error::AuthError;

/// bcrypt cost factor (2^12 rounds).
const BCRYPT_COST: u32 = 12;

/// Hash a password for storage.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    bcrypt::hash(password, BCRYPT_COST)
        .map_err(|e| AuthError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against its stored hash.
///
/// Returns false for a malformed hash instead of erroring, so the caller
/// cannot distinguish a corrupt record from a wrong password.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match bcrypt::verify(password, hash) {
        Ok(valid) => valid,
        Err(e) => {
            tracing::warn!(error = %e, "Password verification failed on malformed hash");
            false
        }
    }
}
