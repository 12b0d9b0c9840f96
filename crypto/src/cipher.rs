use crate::error::{CryptoError, CryptoResult};
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use lazy_static::lazy_static;
use rand::RngCore;
use regex::Regex;
use zeroize::ZeroizeOnDrop;

lazy_static! {
    static ref ENVELOPE_RE: Regex =
        Regex::new(r"^v\d+:[A-Za-z0-9+/]+={0,2}:[A-Za-z0-9+/]+={0,2}$")
            .expect("envelope pattern is valid");
}

/// Returns true when a value carries the versioned ciphertext envelope.
///
/// The `v{n}:` prefix is the explicit encrypted-field marker; stored fields
/// without it are plaintext, so callers never have to infer encryption from
/// string shape or length.
pub fn is_envelope(value: &str) -> bool {
    ENVELOPE_RE.is_match(value)
}

/// AES-256-GCM cipher with memory security
///
/// This implementation provides:
/// - AES-256 in Galois/Counter Mode (NIST approved)
/// - 96-bit nonces (recommended for GCM)
/// - Authentication tags for integrity
/// - Memory zeroization on drop
#[derive(ZeroizeOnDrop)]
pub struct Aes256GcmCipher {
    #[zeroize(skip)]
    cipher: Aes256Gcm,
    /// Working key - automatically zeroized on drop
    key: [u8; 32],
    /// Key version for rotation support
    key_version: u32,
}

impl Aes256GcmCipher {
    /// Create a new cipher from a 32-byte key
    pub fn new(key: [u8; 32]) -> CryptoResult<Self> {
        let cipher = Aes256Gcm::new_from_slice(&key).map_err(|_| CryptoError::InvalidKeyLength {
            expected: 32,
            got: key.len(),
        })?;

        Ok(Self {
            cipher,
            key,
            key_version: 1,
        })
    }

    /// Create with specific key version
    pub fn with_version(mut self, version: u32) -> Self {
        self.key_version = version;
        self
    }

    /// Generate a new random key (cryptographically secure)
    pub fn generate_key() -> [u8; 32] {
        let mut key = [0u8; 32];
        OsRng.fill_bytes(&mut key);
        key
    }

    /// Get the current key version
    pub fn version(&self) -> u32 {
        self.key_version
    }

    /// Encrypt a string into the versioned envelope
    /// `v{version}:{nonce_b64}:{ciphertext_b64}`.
    pub fn encrypt_str(&self, plaintext: &str) -> CryptoResult<String> {
        // Random 96-bit nonce (12 bytes - optimal for GCM)
        let mut nonce_bytes = [0u8; 12];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| CryptoError::EncryptionFailed)?;

        let nonce_b64 = BASE64.encode(nonce_bytes);
        let ciphertext_b64 = BASE64.encode(&ciphertext);

        Ok(format!(
            "v{}:{}:{}",
            self.key_version, nonce_b64, ciphertext_b64
        ))
    }

    /// Decrypt a versioned envelope, verifying the authentication tag.
    pub fn decrypt_str(&self, envelope: &str) -> CryptoResult<String> {
        let parts: Vec<&str> = envelope.split(':').collect();
        if parts.len() != 3 {
            return Err(CryptoError::InvalidEnvelope(
                "expected v{n}:{nonce}:{ciphertext}".to_string(),
            ));
        }

        let version = parts[0]
            .strip_prefix('v')
            .and_then(|v| v.parse::<u32>().ok())
            .ok_or_else(|| CryptoError::InvalidEnvelope("missing version prefix".to_string()))?;

        // With key rotation the version would select the matching key; a
        // single working key only accepts its own version.
        if version != self.key_version {
            return Err(CryptoError::UnsupportedKeyVersion {
                version,
                current: self.key_version,
            });
        }

        let nonce_bytes = BASE64
            .decode(parts[1])
            .map_err(|_| CryptoError::InvalidEnvelope("nonce is not valid base64".to_string()))?;
        if nonce_bytes.len() != 12 {
            return Err(CryptoError::InvalidEnvelope(
                "nonce must be 12 bytes".to_string(),
            ));
        }
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = BASE64.decode(parts[2]).map_err(|_| {
            CryptoError::InvalidEnvelope("ciphertext is not valid base64".to_string())
        })?;

        let plaintext = self
            .cipher
            .decrypt(nonce, ciphertext.as_ref())
            .map_err(|_| CryptoError::DecryptionFailed)?;

        String::from_utf8(plaintext).map_err(|_| CryptoError::InvalidUtf8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> Aes256GcmCipher {
        Aes256GcmCipher::new(Aes256GcmCipher::generate_key()).unwrap()
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let cipher = cipher();

        let plaintext = "Hello, secure world!";
        let envelope = cipher.encrypt_str(plaintext).unwrap();
        let decrypted = cipher.decrypt_str(&envelope).unwrap();

        assert_eq!(plaintext, decrypted);
    }

    #[test]
    fn test_envelope_format() {
        let cipher = cipher().with_version(5);

        let envelope = cipher.encrypt_str("test data").unwrap();

        assert!(envelope.starts_with("v5:"));
        assert!(is_envelope(&envelope));
        assert_eq!(envelope.split(':').count(), 3);
    }

    #[test]
    fn test_different_nonces() {
        let cipher = cipher();

        let plaintext = "same plaintext";
        let envelope1 = cipher.encrypt_str(plaintext).unwrap();
        let envelope2 = cipher.encrypt_str(plaintext).unwrap();

        // Same plaintext should produce different ciphertexts (different nonces)
        assert_ne!(envelope1, envelope2);
        assert_eq!(cipher.decrypt_str(&envelope1).unwrap(), plaintext);
        assert_eq!(cipher.decrypt_str(&envelope2).unwrap(), plaintext);
    }

    #[test]
    fn test_tampered_ciphertext_rejected() {
        let cipher = cipher();

        let envelope = cipher.encrypt_str("authenticated data").unwrap();
        let mut parts: Vec<String> = envelope.split(':').map(String::from).collect();
        parts[2] = BASE64.encode(b"forged ciphertext bytes here");
        let tampered = parts.join(":");

        assert!(matches!(
            cipher.decrypt_str(&tampered),
            Err(CryptoError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_malformed_envelope_rejected() {
        let cipher = cipher();

        assert!(matches!(
            cipher.decrypt_str("not an envelope"),
            Err(CryptoError::InvalidEnvelope(_))
        ));
        assert!(matches!(
            cipher.decrypt_str("x1:abc:def"),
            Err(CryptoError::InvalidEnvelope(_))
        ));
    }

    #[test]
    fn test_wrong_version_rejected() {
        let key = Aes256GcmCipher::generate_key();
        let cipher_v1 = Aes256GcmCipher::new(key).unwrap().with_version(1);
        let cipher_v2 = Aes256GcmCipher::new(key).unwrap().with_version(2);

        let envelope = cipher_v1.encrypt_str("version test").unwrap();
        assert!(matches!(
            cipher_v2.decrypt_str(&envelope),
            Err(CryptoError::UnsupportedKeyVersion { version: 1, .. })
        ));
    }

    #[test]
    fn test_foreign_key_rejected() {
        let cipher_a = cipher();
        let cipher_b = cipher();

        let envelope = cipher_a.encrypt_str("foreign data").unwrap();
        assert!(matches!(
            cipher_b.decrypt_str(&envelope),
            Err(CryptoError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_empty_plaintext() {
        let cipher = cipher();

        let envelope = cipher.encrypt_str("").unwrap();
        assert_eq!(cipher.decrypt_str(&envelope).unwrap(), "");
    }

    #[test]
    fn test_is_envelope_rejects_plaintext() {
        assert!(!is_envelope("0551234567"));
        assert!(!is_envelope("user@example.sa"));
        assert!(!is_envelope(""));
        assert!(!is_envelope("v1:only-two-parts"));
    }
}
