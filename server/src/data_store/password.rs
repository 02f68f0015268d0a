//! Password hashing with PBKDF2-HMAC-SHA256
//!
//! Hashes are stored as a single string `pbkdf2_sha256$<iterations>$<salt>$<hash>` with salt and
//! hash in standard base64 encoding, so that the number of iterations can be increased later
//! without invalidating existing hashes.

use base64::Engine;
use ring::rand::SecureRandom;
use std::num::NonZeroU32;

const ALGORITHM_NAME: &str = "pbkdf2_sha256";
static ALGORITHM: ring::pbkdf2::Algorithm = ring::pbkdf2::PBKDF2_HMAC_SHA256;
pub const DEFAULT_ITERATIONS: u32 = 600_000;
const SALT_LENGTH: usize = 16;
const HASH_LENGTH: usize = ring::digest::SHA256_OUTPUT_LEN;

#[derive(Debug, PartialEq, Eq)]
pub enum PasswordHashError {
    /// The stored hash string does not follow our hash format
    InvalidFormat,
    /// The system's random number generator failed
    RandomGenerationFailed,
}

impl std::fmt::Display for PasswordHashError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFormat => f.write_str("Invalid password hash format"),
            Self::RandomGenerationFailed => f.write_str("Could not generate random salt"),
        }
    }
}

impl std::error::Error for PasswordHashError {}

/// Create a salted hash of the given password for storing it in the database.
pub fn hash_password(password: &str) -> Result<String, PasswordHashError> {
    hash_password_with_iterations(password, DEFAULT_ITERATIONS)
}

pub fn hash_password_with_iterations(
    password: &str,
    iterations: u32,
) -> Result<String, PasswordHashError> {
    let iterations = NonZeroU32::new(iterations).ok_or(PasswordHashError::InvalidFormat)?;
    let mut salt = [0u8; SALT_LENGTH];
    ring::rand::SystemRandom::new()
        .fill(&mut salt)
        .map_err(|_| PasswordHashError::RandomGenerationFailed)?;
    let mut hash = [0u8; HASH_LENGTH];
    ring::pbkdf2::derive(ALGORITHM, iterations, &salt, password.as_bytes(), &mut hash);

    let engine = base64::engine::general_purpose::STANDARD;
    Ok(format!(
        "{}${}${}${}",
        ALGORITHM_NAME,
        iterations,
        engine.encode(salt),
        engine.encode(hash)
    ))
}

/// Check the password against a hash string created by [hash_password].
///
/// The comparison is done in constant time.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, PasswordHashError> {
    let (iterations, salt, hash) = parse_hash(stored_hash)?;
    Ok(ring::pbkdf2::verify(ALGORITHM, iterations, &salt, password.as_bytes(), &hash).is_ok())
}

/// Do the same amount of work as [verify_password] with a hash of [DEFAULT_ITERATIONS], without
/// any result.
///
/// Used when a login attempt references an unknown user, to not reveal the (non-)existence of a
/// user account by the response time.
pub fn simulate_password_verification(password: &str) {
    let mut hash = [0u8; HASH_LENGTH];
    ring::pbkdf2::derive(
        ALGORITHM,
        NonZeroU32::new(DEFAULT_ITERATIONS).unwrap_or(NonZeroU32::MIN),
        &[0u8; SALT_LENGTH],
        password.as_bytes(),
        &mut hash,
    );
}

fn parse_hash(stored_hash: &str) -> Result<(NonZeroU32, Vec<u8>, Vec<u8>), PasswordHashError> {
    let mut parts = stored_hash.split('$');
    if parts.next() != Some(ALGORITHM_NAME) {
        return Err(PasswordHashError::InvalidFormat);
    }
    let iterations = parts
        .next()
        .and_then(|i| i.parse::<NonZeroU32>().ok())
        .ok_or(PasswordHashError::InvalidFormat)?;
    let engine = base64::engine::general_purpose::STANDARD;
    let salt = parts
        .next()
        .and_then(|s| engine.decode(s).ok())
        .ok_or(PasswordHashError::InvalidFormat)?;
    let hash = parts
        .next()
        .and_then(|s| engine.decode(s).ok())
        .ok_or(PasswordHashError::InvalidFormat)?;
    if parts.next().is_some() || hash.len() != HASH_LENGTH {
        return Err(PasswordHashError::InvalidFormat);
    }
    Ok((iterations, salt, hash))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_password() {
        let hash = hash_password_with_iterations("correct horse", 1000).unwrap();
        assert!(hash.starts_with("pbkdf2_sha256$1000$"));
        assert_eq!(verify_password("correct horse", &hash), Ok(true));
        assert_eq!(verify_password("correct h0rse", &hash), Ok(false));
        assert_eq!(verify_password("", &hash), Ok(false));
    }

    #[test]
    fn test_salt_is_random() {
        let hash1 = hash_password_with_iterations("secret", 1000).unwrap();
        let hash2 = hash_password_with_iterations("secret", 1000).unwrap();
        assert_ne!(hash1, hash2);
        assert_eq!(verify_password("secret", &hash2), Ok(true));
    }

    #[test]
    fn test_invalid_hash_format() {
        assert_eq!(
            verify_password("x", "md5$abc"),
            Err(PasswordHashError::InvalidFormat)
        );
        assert_eq!(
            verify_password("x", "pbkdf2_sha256$0$AAAA$AAAA"),
            Err(PasswordHashError::InvalidFormat)
        );
        assert_eq!(
            verify_password("x", "pbkdf2_sha256$1000$AAAA$AAAA"),
            Err(PasswordHashError::InvalidFormat)
        );
    }
}
