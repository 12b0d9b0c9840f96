use crate::cipher::{is_envelope, Aes256GcmCipher};
use crate::config::CryptoConfig;
use crate::error::CryptoResult;
use crate::kdf::Kdf;
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::debug;

/// PII fields encrypted at rest (PDPL).
pub const PII_FIELDS: &[&str] = &[
    "national_id",
    "iqama_id",
    "phone",
    "email",
    "address",
    "birth_date",
    "passport_number",
    "tax_id",
    "bank_account",
    "credit_card",
];

/// Financial fields encrypted at rest.
pub const FINANCIAL_FIELDS: &[&str] = &[
    "credit_limit",
    "current_balance",
    "bank_account",
    "credit_card",
    "account_number",
    "swift_code",
    "iban",
];

/// Field-level encryption service for PII and financial data.
///
/// The working key is derived from the master secret exactly once at
/// construction and cached for the lifetime of the service; the instance is
/// safe for concurrent read-only use across request handlers.
pub struct EncryptionService {
    cipher: Aes256GcmCipher,
}

impl EncryptionService {
    /// Derive the working key and build the service.
    ///
    /// This is the expensive step (PBKDF2 at the configured iteration
    /// count); construct once at process start and share the instance.
    pub fn new(config: &CryptoConfig) -> CryptoResult<Self> {
        let key = Kdf::derive_aes256_key(
            config.master_key.expose_secret().as_bytes(),
            &config.kdf_salt,
            config.iterations,
        )?;
        let cipher = Aes256GcmCipher::new(key)?;
        debug!(iterations = config.iterations, "encryption service key derived");
        Ok(Self { cipher })
    }

    /// Build the service from the process environment.
    ///
    /// # Errors
    /// Fails with [`crate::CryptoError::MissingMasterKey`] when the master
    /// key is absent; callers must treat this as fatal at startup.
    pub fn from_env() -> CryptoResult<Self> {
        Self::new(&CryptoConfig::from_env()?)
    }

    /// Encrypt a single value into a text-safe envelope.
    pub fn encrypt(&self, plaintext: &str) -> CryptoResult<String> {
        self.cipher.encrypt_str(plaintext)
    }

    /// Decrypt a single envelope.
    ///
    /// # Errors
    /// [`crate::CryptoError::DecryptionFailed`] on tag mismatch (tampered or
    /// foreign data) and [`crate::CryptoError::InvalidEnvelope`] on malformed
    /// input - distinguishable from "field was never encrypted", which is
    /// detectable up front via [`is_envelope`].
    pub fn decrypt(&self, envelope: &str) -> CryptoResult<String> {
        self.cipher.decrypt_str(envelope)
    }

    /// Return a copy of `record` with the named, present, non-null fields
    /// replaced by their ciphertext envelopes. Absent and null fields pass
    /// through untouched; non-string scalars are stringified first.
    pub fn encrypt_fields(&self, record: &Value, fields: &[&str]) -> CryptoResult<Value> {
        let mut out = record.clone();
        let Some(map) = out.as_object_mut() else {
            return Ok(out);
        };

        for field in fields {
            let Some(value) = map.get(*field) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            let plaintext = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            let envelope = self.encrypt(&plaintext)?;
            map.insert((*field).to_string(), Value::String(envelope));
        }

        Ok(out)
    }

    /// Inverse of [`encrypt_fields`](Self::encrypt_fields).
    ///
    /// Only values carrying the envelope marker are decrypted; unmarked
    /// values are legacy plaintext and pass through unchanged. A marked
    /// value that fails to decrypt is corrupt ciphertext and propagates the
    /// error rather than being silently kept.
    pub fn decrypt_fields(&self, record: &Value, fields: &[&str]) -> CryptoResult<Value> {
        let mut out = record.clone();
        let Some(map) = out.as_object_mut() else {
            return Ok(out);
        };

        for field in fields {
            let envelope = match map.get(*field) {
                Some(Value::String(s)) if is_envelope(s) => s.clone(),
                _ => continue,
            };
            let plaintext = self.decrypt(&envelope)?;
            map.insert((*field).to_string(), Value::String(plaintext));
        }

        Ok(out)
    }

    /// Encrypt the standard PII field set (PDPL data protection at rest).
    pub fn encrypt_pii(&self, record: &Value) -> CryptoResult<Value> {
        self.encrypt_fields(record, PII_FIELDS)
    }

    /// Encrypt the standard financial field set.
    pub fn encrypt_financial(&self, record: &Value) -> CryptoResult<Value> {
        self.encrypt_fields(record, FINANCIAL_FIELDS)
    }
}
