use crate::error::{CryptoError, CryptoResult};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use secrecy::SecretString;
use std::env;

/// Environment variable holding the master secret.
pub const MASTER_KEY_ENV: &str = "ENCRYPTION_MASTER_KEY";

/// Environment variable holding the base64-encoded KDF salt.
///
/// The salt is owned by the key-management system and rotatable per
/// deployment; a compile-time salt shared across all deployments would
/// weaken the derivation guarantee.
pub const KDF_SALT_ENV: &str = "ENCRYPTION_KDF_SALT";

/// Environment variable overriding the PBKDF2 iteration count.
pub const KDF_ITERATIONS_ENV: &str = "ENCRYPTION_KDF_ITERATIONS";

/// Default PBKDF2 iteration count (OWASP 2023 recommendation).
pub const DEFAULT_KDF_ITERATIONS: u32 = 600_000;

/// Minimum iteration count accepted from the environment.
pub const MIN_KDF_ITERATIONS: u32 = 100_000;

/// Minimum salt length in bytes.
pub const MIN_SALT_LENGTH: usize = 16;

/// Key material configuration for the encryption service.
///
/// Construction is the place where missing key material must surface:
/// a service without its master key cannot start, and discovering that
/// at first use would mean serving traffic with no way to protect PII.
#[derive(Debug, Clone)]
pub struct CryptoConfig {
    /// Master secret, never stored in plaintext in the data model.
    pub master_key: SecretString,
    /// Salt fed to the KDF alongside the master secret.
    pub kdf_salt: Vec<u8>,
    /// PBKDF2 iteration count.
    pub iterations: u32,
}

impl CryptoConfig {
    /// Build a config from explicit key material.
    pub fn new(master_key: impl Into<String>, kdf_salt: Vec<u8>) -> Self {
        Self {
            master_key: SecretString::new(master_key.into()),
            kdf_salt,
            iterations: DEFAULT_KDF_ITERATIONS,
        }
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Load key material from the process environment, failing fast at
    /// startup when the master key or salt is absent.
    pub fn from_env() -> CryptoResult<Self> {
        let master_key = env::var(MASTER_KEY_ENV).map_err(|_| CryptoError::MissingMasterKey)?;
        if master_key.is_empty() {
            return Err(CryptoError::MissingMasterKey);
        }

        let salt_b64 = env::var(KDF_SALT_ENV).map_err(|_| CryptoError::MissingKdfSalt)?;
        let kdf_salt = BASE64.decode(salt_b64.trim()).map_err(|e| {
            CryptoError::Configuration(format!("{KDF_SALT_ENV} is not valid base64: {e}"))
        })?;
        if kdf_salt.len() < MIN_SALT_LENGTH {
            return Err(CryptoError::Configuration(format!(
                "{KDF_SALT_ENV} must decode to at least {MIN_SALT_LENGTH} bytes"
            )));
        }

        let iterations = match env::var(KDF_ITERATIONS_ENV) {
            Ok(raw) => raw.parse::<u32>().map_err(|_| {
                CryptoError::Configuration(format!("{KDF_ITERATIONS_ENV} must be an integer"))
            })?,
            Err(_) => DEFAULT_KDF_ITERATIONS,
        };
        if iterations < MIN_KDF_ITERATIONS {
            return Err(CryptoError::Configuration(format!(
                "{KDF_ITERATIONS_ENV} must be at least {MIN_KDF_ITERATIONS}"
            )));
        }

        Ok(Self {
            master_key: SecretString::new(master_key),
            kdf_salt,
            iterations,
        })
    }
}
