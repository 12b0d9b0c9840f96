use thiserror::Error;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error(
        "encryption master key not configured: set ENCRYPTION_MASTER_KEY or pass the key explicitly"
    )]
    MissingMasterKey,

    #[error(
        "kdf salt not configured: set ENCRYPTION_KDF_SALT to the base64 salt owned by the key-management system"
    )]
    MissingKdfSalt,

    #[error("invalid crypto configuration: {0}")]
    Configuration(String),

    #[error("key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("invalid key length: expected {expected} bytes, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },

    #[error("encryption failed")]
    EncryptionFailed,

    #[error("decryption failed: authentication tag mismatch or foreign ciphertext")]
    DecryptionFailed,

    #[error("invalid ciphertext envelope: {0}")]
    InvalidEnvelope(String),

    #[error("unsupported key version {version}, current key is version {current}")]
    UnsupportedKeyVersion { version: u32, current: u32 },

    #[error("decrypted data is not valid UTF-8")]
    InvalidUtf8,

    #[error("internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

pub type CryptoResult<T> = Result<T, CryptoError>;
