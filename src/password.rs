//! Salted PBKDF2 password hashes in the portal's stored format.
//!
//! The salt is 16 random bytes kept as a hex string, and the hex string itself
//! is the PBKDF2 salt input. Hashes are PBKDF2-HMAC-SHA512, 1000 rounds, 64 bytes,
//! hex encoded.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha512;
use subtle::ConstantTimeEq;
use thiserror::Error;

const SALT_LEN: usize = 16;
const ROUNDS: u32 = 1000;
const HASH_LEN: usize = 64;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordHash {
    #[serde(rename = "passwordHash")]
    pub hash: String,
    pub salt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordError {
    #[error("पासवर्ड कम से कम 6 अक्षर का होना चाहिए")]
    TooShort,
    #[error("पासवर्ड मेल नहीं खाते")]
    Mismatch,
}

pub fn hash_password(plain: &str) -> PasswordHash {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    let salt = hex::encode(salt);

    PasswordHash {
        hash: derive(plain, &salt),
        salt,
    }
}

pub fn verify_password(plain: &str, stored: &PasswordHash) -> bool {
    if stored.hash.is_empty() || stored.salt.is_empty() {
        return false;
    }
    derive(plain, &stored.salt)
        .as_bytes()
        .ct_eq(stored.hash.as_bytes())
        .into()
}

/// Registration rules for a new password and its confirmation.
pub fn validate_new_password(password: &str, confirm: &str) -> Result<(), PasswordError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(PasswordError::TooShort);
    }
    if password != confirm {
        return Err(PasswordError::Mismatch);
    }
    Ok(())
}

fn derive(plain: &str, salt: &str) -> String {
    let mut out = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha512>(plain.as_bytes(), salt.as_bytes(), ROUNDS, &mut out);
    hex::encode(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN_SALT: &str = "00112233445566778899aabbccddeeff";
    const KNOWN_HASH: &str = "ae19507b759114913be313330b9ed5c80d45c9718ff3bbc46d220fe510e1042f85fbdbbc9ba0d26ec0dfc0d1d6f651b103995c1e6c6f7abbb5291da3e12ac9a1";

    #[test]
    fn test_verifies_stored_hash() {
        let stored = PasswordHash {
            hash: KNOWN_HASH.to_string(),
            salt: KNOWN_SALT.to_string(),
        };
        assert!(verify_password("secret123", &stored));
        assert!(!verify_password("secret124", &stored));
    }

    #[test]
    fn test_hash_then_verify() {
        let stored = hash_password("hunter22");
        assert_eq!(stored.salt.len(), SALT_LEN * 2);
        assert_eq!(stored.hash.len(), HASH_LEN * 2);
        assert!(verify_password("hunter22", &stored));
        assert!(!verify_password("Hunter22", &stored));
    }

    #[test]
    fn test_salts_are_unique() {
        let a = hash_password("same-password");
        let b = hash_password("same-password");
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn test_missing_hash_never_verifies() {
        let stored = PasswordHash {
            hash: String::new(),
            salt: KNOWN_SALT.to_string(),
        };
        assert!(!verify_password("", &stored));
    }

    #[test]
    fn test_serializes_as_stored_fields() {
        let stored = PasswordHash {
            hash: "ab".to_string(),
            salt: "cd".to_string(),
        };
        let json = serde_json::to_value(&stored).unwrap();
        assert_eq!(json, serde_json::json!({ "passwordHash": "ab", "salt": "cd" }));
    }

    #[test]
    fn test_new_password_rules() {
        assert_eq!(validate_new_password("12345", "12345"), Err(PasswordError::TooShort));
        assert_eq!(validate_new_password("123456", "1234567"), Err(PasswordError::Mismatch));
        assert_eq!(validate_new_password("पासवर्ड१२", "पासवर्ड१२"), Ok(()));
    }
}
