//! Password value object.
//!
//! Hashing and verification go through Argon2 with default parameters.
//! Temporary passwords handed out by staff are generated here too.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use hmac::{Hmac, Mac};
use rand::seq::SliceRandom;
use sha2::Sha256;

use crate::config::{MIN_PASSWORD_LENGTH, TEMPORARY_PASSWORD_LENGTH};
use crate::errors::{AppError, AppResult, FieldErrors};

/// Characters used for generated passwords (no look-alikes such as `0/O`, `1/l`).
const TEMPORARY_PASSWORD_ALPHABET: &[u8] =
    b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz23456789!@#$%*?";

type HmacSha256 = Hmac<Sha256>;

/// Hashed password.
#[derive(Clone)]
pub struct Password {
    hash: String,
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Hash a plain text password.
    ///
    /// # Errors
    /// Returns a validation error if the password is shorter than
    /// `MIN_PASSWORD_LENGTH` characters.
    pub fn new(plain_text: &str) -> AppResult<Self> {
        if plain_text.chars().count() < MIN_PASSWORD_LENGTH as usize {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        let hash = Self::hash(plain_text)?;
        Ok(Self { hash })
    }

    /// Wrap a hash loaded from storage.
    pub fn from_hash(hash: String) -> Self {
        Self { hash }
    }

    pub fn as_str(&self) -> &str {
        &self.hash
    }

    pub fn into_string(self) -> String {
        self.hash
    }

    /// Verify a plain text password against this hash.
    pub fn verify(&self, plain_text: &str) -> bool {
        Self::verify_hash(plain_text, &self.hash).unwrap_or(false)
    }

    /// Keyed digest of the stored hash, hex encoded.
    ///
    /// Changes whenever the password changes, so tokens bound to it stop
    /// validating once they have been used. The hash itself never leaves
    /// the server.
    pub fn fingerprint(&self, key: &[u8]) -> AppResult<String> {
        Ok(hex::encode(self.fingerprint_mac(key)?.finalize().into_bytes()))
    }

    /// Constant-time check of a fingerprint produced by [`Password::fingerprint`].
    pub fn matches_fingerprint(&self, key: &[u8], fingerprint: &str) -> bool {
        let Ok(expected) = hex::decode(fingerprint) else {
            return false;
        };
        self.fingerprint_mac(key)
            .map(|mac| mac.verify_slice(&expected).is_ok())
            .unwrap_or(false)
    }

    fn fingerprint_mac(&self, key: &[u8]) -> AppResult<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(key)
            .map_err(|e| AppError::internal(format!("Invalid fingerprint key: {}", e)))?;
        mac.update(self.hash.as_bytes());
        Ok(mac)
    }

    /// Random password for staff-issued credentials.
    pub fn generate_temporary() -> String {
        let mut rng = rand::rngs::OsRng;
        (0..TEMPORARY_PASSWORD_LENGTH)
            .map(|_| {
                *TEMPORARY_PASSWORD_ALPHABET
                    .choose(&mut rng)
                    .unwrap_or(&b'x') as char
            })
            .collect()
    }

    /// Check a "new password / confirm password" pair.
    ///
    /// Errors are keyed by the form field they belong to.
    pub fn check_pair(
        password: &str,
        confirmation: &str,
        password_field: &str,
        confirmation_field: &str,
    ) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if password.is_empty() {
            errors.add(password_field, "This field is required.");
        } else if password.chars().count() < MIN_PASSWORD_LENGTH as usize {
            errors.add(
                password_field,
                format!(
                    "This password is too short. It must contain at least {} characters.",
                    MIN_PASSWORD_LENGTH
                ),
            );
        }

        if confirmation.is_empty() {
            errors.add(confirmation_field, "This field is required.");
        } else if !password.is_empty() && password != confirmation {
            errors.add(confirmation_field, "Passwords do not match");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn hash(plain_text: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Self::argon2()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?;
        Ok(hash.to_string())
    }

    fn verify_hash(plain_text: &str, hash: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AppError::internal(format!("Invalid hash format: {}", e)))?;
        Ok(Self::argon2()
            .verify_password(plain_text.as_bytes(), &parsed)
            .is_ok())
    }

    #[inline]
    fn argon2() -> Argon2<'static> {
        Argon2::default()
    }
}

impl From<Password> for String {
    fn from(password: Password) -> Self {
        password.hash
    }
}

impl PartialEq for Password {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Password {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_and_verify() {
        let plain = "SecurePassword123!";
        let password = Password::new(plain).unwrap();

        assert!(password.verify(plain));
        assert!(!password.verify("WrongPassword123"));
    }

    #[test]
    fn test_password_too_short() {
        assert!(Password::new("short").is_err());
        assert!(Password::new("12345678").is_ok());
    }

    #[test]
    fn test_fingerprint_changes_with_password() {
        let key = b"fingerprint-key-of-at-least-32-bytes";
        let first = Password::new("FirstPassword1").unwrap();
        let second = Password::new("FirstPassword1").unwrap();

        let fp = first.fingerprint(key).unwrap();
        assert_eq!(fp.len(), 64);
        assert_ne!(fp, second.fingerprint(key).unwrap());
        assert!(Password::from_hash(first.as_str().to_string()).matches_fingerprint(key, &fp));
        assert!(!second.matches_fingerprint(key, &fp));
    }

    #[test]
    fn test_fingerprint_does_not_expose_hash() {
        let key = b"fingerprint-key-of-at-least-32-bytes";
        let password = Password::new("FirstPassword1").unwrap();
        let fp = password.fingerprint(key).unwrap();

        let tail: String = password.as_str().chars().rev().take(8).collect();
        let tail: String = tail.chars().rev().collect();
        assert!(!fp.contains(&tail));
        assert_ne!(fp, password.fingerprint(b"another-key-another-key-another").unwrap());
        assert!(!password.matches_fingerprint(b"another-key-another-key-another", &fp));
        assert!(!password.matches_fingerprint(key, "not hex"));
    }

    #[test]
    fn test_generated_password_shape() {
        let generated = Password::generate_temporary();
        assert_eq!(generated.len(), TEMPORARY_PASSWORD_LENGTH);
        assert!(generated
            .bytes()
            .all(|b| TEMPORARY_PASSWORD_ALPHABET.contains(&b)));
        assert_ne!(generated, Password::generate_temporary());
        assert!(Password::new(&generated).is_ok());
    }

    #[test]
    fn test_check_pair_reports_each_field() {
        let errors = Password::check_pair("", "", "new_password1", "new_password2").unwrap_err();
        assert!(errors.contains("new_password1"));
        assert!(errors.contains("new_password2"));

        let errors =
            Password::check_pair("LongEnough1", "Different1", "password1", "password2").unwrap_err();
        assert_eq!(errors.get("password2"), ["Passwords do not match".to_string()]);

        let errors = Password::check_pair("short", "short", "p1", "p2").unwrap_err();
        assert!(errors.contains("p1"));
        assert!(!errors.contains("p2"));

        assert!(Password::check_pair("LongEnough1", "LongEnough1", "p1", "p2").is_ok());
    }
}
