use argon2::{
    password_hash::{PasswordHasher, PasswordVerifier, SaltString},
    Argon2, PasswordHash,
};
use rand::rngs::OsRng;
use tracing::warn;

use super::errors::AuthError;

/// Hash a password into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::HashError(e.to_string()))?
        .to_string())
}

const BCRYPT_PREFIXES: [&str; 3] = ["$2a$", "$2b$", "$2y$"];

fn is_bcrypt(stored: &str) -> bool {
    BCRYPT_PREFIXES.iter().any(|p| stored.starts_with(p))
}

/// Check a password against a stored argon2 PHC or legacy bcrypt hash.
pub fn verify_password(password: &str, stored: &str) -> bool {
    if is_bcrypt(stored) {
        return match bcrypt::verify(password, stored) {
            Ok(matched) => matched,
            Err(e) => {
                warn!(error = %e, "stored bcrypt hash is malformed");
                false
            }
        };
    }
    let parsed = match PasswordHash::new(stored) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "stored password hash is not a PHC string");
            return false;
        }
    };
    Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok()
}

/// Whether a stored value already looks like a password hash rather than plaintext.
pub fn is_password_hash(stored: &str) -> bool {
    stored.starts_with("$argon2") || is_bcrypt(stored)
}

/// Hashes that verify but should be replaced with argon2 on the next successful login.
pub fn needs_rehash(stored: &str) -> bool {
    is_bcrypt(stored)
}
