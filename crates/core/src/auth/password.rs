//! Salted password hashes in the form `sha256$<salt>$<hex digest>`.

use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

const SCHEME: &str = "sha256";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordError {
    #[error("Malformed password hash")]
    Malformed,

    #[error("Password must not be empty")]
    Empty,
}

fn digest(salt: &str, plain: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(plain.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Hash a plain-text password with a fresh random salt.
pub fn hash_password(plain: &str) -> Result<String, PasswordError> {
    if plain.is_empty() {
        return Err(PasswordError::Empty);
    }
    let salt = Uuid::new_v4().simple().to_string();
    Ok(format!("{}${}${}", SCHEME, salt, digest(&salt, plain)))
}

/// Whether `stored` is already in hashed form.
pub fn is_password_hash(stored: &str) -> bool {
    split_hash(stored).is_some()
}

fn split_hash(stored: &str) -> Option<(&str, &str)> {
    let mut parts = stored.splitn(3, '$');
    let scheme = parts.next()?;
    let salt = parts.next()?;
    let hex = parts.next()?;
    if scheme != SCHEME || salt.is_empty() || hex.len() != 64 {
        return None;
    }
    Some((salt, hex))
}

/// Check `plain` against a stored hash.
pub fn verify_password(plain: &str, stored: &str) -> Result<bool, PasswordError> {
    let (salt, expected) = split_hash(stored).ok_or(PasswordError::Malformed)?;
    let actual = digest(salt, plain);
    Ok(constant_time_eq(actual.as_bytes(), expected.as_bytes()))
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
