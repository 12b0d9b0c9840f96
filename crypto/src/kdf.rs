use crate::error::{CryptoError, CryptoResult};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

/// Key Derivation Function utilities
pub struct Kdf;

impl Kdf {
    /// Derive a key using PBKDF2-HMAC-SHA256
    ///
    /// # Arguments
    /// * `password` - The secret to derive from
    /// * `salt` - Salt for key derivation (externally managed, rotatable)
    /// * `iterations` - Number of iterations (higher = more secure but slower)
    /// * `key_length` - Length of derived key in bytes
    pub fn pbkdf2(
        password: &[u8],
        salt: &[u8],
        iterations: u32,
        key_length: usize,
    ) -> CryptoResult<Zeroizing<Vec<u8>>> {
        if salt.is_empty() {
            return Err(CryptoError::KeyDerivationFailed(
                "salt must not be empty".to_string(),
            ));
        }

        let mut derived_key = Zeroizing::new(vec![0u8; key_length]);
        pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut derived_key);

        Ok(derived_key)
    }

    /// Derive a 32-byte AES-256 key using PBKDF2.
    ///
    /// This is intentionally expensive; callers derive once at service
    /// construction and cache the result.
    pub fn derive_aes256_key(
        password: &[u8],
        salt: &[u8],
        iterations: u32,
    ) -> CryptoResult<[u8; 32]> {
        let derived = Self::pbkdf2(password, salt, iterations, 32)?;
        let mut key = [0u8; 32];
        key.copy_from_slice(&derived);
        Ok(key)
    }

    /// Generate a cryptographically secure random salt
    pub fn generate_salt(length: usize) -> Vec<u8> {
        let mut salt = vec![0u8; length];
        rand::thread_rng().fill_bytes(&mut salt);
        salt
    }

    /// Generate a salt and encode as base64 (for storage)
    pub fn generate_salt_base64(length: usize) -> String {
        use base64::{engine::general_purpose::STANDARD, Engine};
        let salt = Self::generate_salt(length);
        STANDARD.encode(salt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pbkdf2_derivation_is_deterministic() {
        let password = b"my_secure_password";
        let salt = Kdf::generate_salt(32);

        let key1 = Kdf::derive_aes256_key(password, &salt, 100_000).unwrap();
        let key2 = Kdf::derive_aes256_key(password, &salt, 100_000).unwrap();

        // Same password and salt should produce same key
        assert_eq!(key1, key2);
        assert_eq!(key1.len(), 32);
    }

    #[test]
    fn test_pbkdf2_different_salts() {
        let password = b"my_secure_password";
        let salt1 = Kdf::generate_salt(32);
        let salt2 = Kdf::generate_salt(32);

        let key1 = Kdf::derive_aes256_key(password, &salt1, 100_000).unwrap();
        let key2 = Kdf::derive_aes256_key(password, &salt2, 100_000).unwrap();

        // Different salts should produce different keys
        assert_ne!(key1, key2);
    }

    #[test]
    fn test_empty_salt_rejected() {
        let result = Kdf::derive_aes256_key(b"password", &[], 100_000);
        assert!(result.is_err());
    }

    #[test]
    fn test_salt_generation() {
        let salt1 = Kdf::generate_salt(32);
        let salt2 = Kdf::generate_salt(32);

        // Salts should be unique
        assert_ne!(salt1, salt2);
        assert_eq!(salt1.len(), 32);
    }
}
