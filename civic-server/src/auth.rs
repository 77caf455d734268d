//! Password hashing and session token generation.
//!
//! Stored password format is `"<salt>:<key>"`: `salt` is 16 random bytes as
//! hex, and the bytes of that hex string are the scrypt salt. `key` is the
//! 64-byte scrypt output as hex (N = 2^14, r = 8, p = 1).

use rand::rngs::OsRng;
use rand::RngCore;
use scrypt::Params;
use sha2::{Digest, Sha256};
use thiserror::Error;

const SCRYPT_LOG_N: u8 = 14;
const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 1;
const KEY_LEN: usize = 64;
const SALT_LEN: usize = 16;
const SESSION_TOKEN_LEN: usize = 32;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("scrypt failed: {0}")]
    Scrypt(String),
}

fn derive_key(password: &str, salt: &str) -> Result<[u8; KEY_LEN], PasswordError> {
    let params = Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, KEY_LEN)
        .map_err(|e| PasswordError::Scrypt(e.to_string()))?;
    let mut key = [0u8; KEY_LEN];
    scrypt::scrypt(password.as_bytes(), salt.as_bytes(), &params, &mut key)
        .map_err(|e| PasswordError::Scrypt(e.to_string()))?;
    Ok(key)
}

/// Hash `password` with a fresh random salt.
///
/// CPU-heavy; call from `spawn_blocking` in async code.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let mut salt_bytes = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt_bytes);
    let salt = hex::encode(salt_bytes);
    hash_password_with_salt(password, &salt)
}

pub fn hash_password_with_salt(password: &str, salt: &str) -> Result<String, PasswordError> {
    let key = derive_key(password, salt)?;
    Ok(format!("{}:{}", salt, hex::encode(key)))
}

/// Check `password` against a stored `salt:key` string.
///
/// Malformed stored values never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt, key_hex)) = stored.split_once(':') else {
        return false;
    };
    let Ok(expected) = hex::decode(key_hex) else {
        return false;
    };
    if expected.len() != KEY_LEN {
        return false;
    }
    match derive_key(password, salt) {
        Ok(actual) => constant_time_eq(&actual, &expected),
        Err(_) => false,
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// New random session token, hex encoded. Sent to the client only.
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; SESSION_TOKEN_LEN];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Digest stored server-side in place of the session token.
pub fn hash_session_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let stored = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &stored));
        assert!(!verify_password("wrong horse", &stored));
    }

    #[test]
    fn test_stored_format_is_salt_colon_key() {
        let stored = hash_password_with_salt("pw", "00112233445566778899aabbccddeeff").unwrap();
        let (salt, key) = stored.split_once(':').unwrap();
        assert_eq!(salt, "00112233445566778899aabbccddeeff");
        assert_eq!(key.len(), KEY_LEN * 2);
    }

    #[test]
    fn test_same_salt_is_deterministic() {
        let a = hash_password_with_salt("pw", "abcd").unwrap();
        let b = hash_password_with_salt("pw", "abcd").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_random_salts_differ() {
        let a = hash_password("pw").unwrap();
        let b = hash_password("pw").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_stored_hash_never_verifies() {
        assert!(!verify_password("pw", ""));
        assert!(!verify_password("pw", "no-colon"));
        assert!(!verify_password("pw", "salt:not-hex"));
        assert!(!verify_password("pw", "salt:abcd"));
    }

    #[test]
    fn test_session_tokens() {
        let a = generate_session_token();
        let b = generate_session_token();
        assert_eq!(a.len(), SESSION_TOKEN_LEN * 2);
        assert_ne!(a, b);
        assert_eq!(hash_session_token(&a), hash_session_token(&a));
        assert_ne!(hash_session_token(&a), hash_session_token(&b));
        assert_ne!(hash_session_token(&a), a);
    }
}
