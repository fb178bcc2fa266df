//! Envelope decryption gateway.
//!
//! Session requests arrive as compact JWE envelopes: an RSA-OAEP-256
//! wrapped content key and an A256GCM payload. Key unwrapping is delegated
//! to an external key service behind [`KeyUnwrapper`]; content decryption
//! happens locally once the content key is recovered.

mod decrypter;
mod envelope;

pub use decrypter::EnvelopeDecrypter;
pub use envelope::{CompactEnvelope, EnvelopeHeader};

#[cfg(test)]
pub(crate) use envelope::test_support;

use async_trait::async_trait;

/// Ordered key alias candidates tried under rotation, newest first.
pub const KEY_ALIAS_CANDIDATES: [&str; 3] = [
    "session_decryption_key_active_alias",
    "session_decryption_key_inactive_alias",
    "session_decryption_key_previous_alias",
];

/// Reference to a key held by the external key service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyRef {
    /// A rotation alias.
    Alias(&'static str),
    /// A direct key id.
    KeyId(String),
}

impl KeyRef {
    /// Human-readable candidate name for diagnostics.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Alias(alias) => alias,
            Self::KeyId(id) => id,
        }
    }
}

/// Failure to unwrap a content key with one particular key reference.
#[derive(Debug, thiserror::Error)]
#[error("Key unwrap failed: {message}")]
pub struct KeyUnwrapError {
    /// Description of the unwrap failure.
    pub message: String,
}

impl KeyUnwrapError {
    /// Creates a new unwrap error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// External key service capable of unwrapping a wrapped content key.
#[async_trait]
pub trait KeyUnwrapper: Send + Sync {
    /// Unwraps `wrapped` with the key identified by `key_ref`, returning
    /// the raw content encryption key.
    async fn unwrap(&self, key_ref: &KeyRef, wrapped: &[u8]) -> Result<Vec<u8>, KeyUnwrapError>;
}

/// Errors raised by the envelope gateway.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    /// The compact serialization is structurally invalid.
    #[error("Malformed envelope: {message}")]
    Malformed {
        /// Description of the structural fault.
        message: String,
    },

    /// The envelope names an algorithm this gateway does not support.
    #[error("Unsupported envelope algorithm: {algorithm}")]
    UnsupportedAlgorithm {
        /// The offending `alg` or `enc` value.
        algorithm: String,
    },

    /// No usable decryption key is configured.
    #[error("Decryption key configuration error: {message}")]
    KeyConfiguration {
        /// Description of the configuration fault.
        message: String,
    },

    /// The envelope could not be decrypted with any available key.
    #[error("Envelope decryption failed")]
    DecryptionFailed {
        /// `true` when every rotation candidate was tried and failed.
        aliases_exhausted: bool,
    },
}

impl EnvelopeError {
    /// Creates a new `Malformed` error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}
