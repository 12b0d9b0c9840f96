//! Field-level encryption for the SSDP trust core
//!
//! This crate owns the key material lifecycle and the envelope format used
//! to protect PII and financial fields at rest:
//!
//! - PBKDF2-HMAC-SHA256 key derivation from an externally managed master
//!   secret and rotatable salt, performed once at service construction
//! - AES-256-GCM authenticated encryption with per-call random nonces
//! - Text-safe versioned envelopes (`v{n}:{nonce}:{ciphertext}`) whose
//!   prefix doubles as the explicit encrypted-field marker
//! - Field-level helpers for encrypting whole records (PDPL PII set,
//!   financial set) without touching absent or null fields
//!
//! # Example
//!
//! ```no_run
//! use crypto::{CryptoConfig, EncryptionService};
//!
//! # fn main() -> Result<(), crypto::CryptoError> {
//! let config = CryptoConfig::from_env()?; // fatal if the master key is absent
//! let service = EncryptionService::new(&config)?;
//!
//! let envelope = service.encrypt("1012345678")?;
//! assert_eq!(service.decrypt(&envelope)?, "1012345678");
//! # Ok(())
//! # }
//! ```

pub mod cipher;
pub mod config;
pub mod error;
pub mod kdf;
pub mod service;

pub use cipher::{is_envelope, Aes256GcmCipher};
pub use config::CryptoConfig;
pub use error::{CryptoError, CryptoResult};
pub use kdf::Kdf;
pub use service::{EncryptionService, FINANCIAL_FIELDS, PII_FIELDS};
