//! Compact envelope parsing and content decryption.

use aes_gcm::aead::{Aead, Payload};
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;

use super::EnvelopeError;

/// A256GCM nonce length in bytes.
const IV_LEN: usize = 12;
/// A256GCM authentication tag length in bytes.
const TAG_LEN: usize = 16;
/// A256GCM content key length in bytes.
const CEK_LEN: usize = 32;

/// Protected header of a compact envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct EnvelopeHeader {
    /// Key wrapping algorithm.
    pub alg: String,
    /// Content encryption algorithm.
    pub enc: String,
}

/// A parsed compact envelope: protected header, wrapped content key, IV,
/// ciphertext, and authentication tag.
#[derive(Debug, Clone)]
pub struct CompactEnvelope {
    /// Base64url-encoded protected header, kept verbatim because it is the
    /// additional authenticated data for content decryption.
    protected: String,
    /// Decoded protected header.
    header: EnvelopeHeader,
    /// RSA-wrapped content encryption key.
    encrypted_key: Vec<u8>,
    iv: Vec<u8>,
    ciphertext: Vec<u8>,
    tag: Vec<u8>,
}

impl CompactEnvelope {
    /// Parses the five dot-separated base64url parts of a compact
    /// serialization.
    pub fn parse(compact: &str) -> Result<Self, EnvelopeError> {
        let parts: Vec<&str> = compact.split('.').collect();
        if parts.len() != 5 {
            return Err(EnvelopeError::malformed(format!(
                "expected 5 parts, found {}",
                parts.len()
            )));
        }

        let header_bytes = decode_part(parts[0], "protected header")?;
        let header: EnvelopeHeader = serde_json::from_slice(&header_bytes)
            .map_err(|_| EnvelopeError::malformed("protected header is not valid JSON"))?;

        let encrypted_key = decode_part(parts[1], "encrypted key")?;
        let iv = decode_part(parts[2], "initialization vector")?;
        let ciphertext = decode_part(parts[3], "ciphertext")?;
        let tag = decode_part(parts[4], "authentication tag")?;

        if encrypted_key.is_empty() {
            return Err(EnvelopeError::malformed("encrypted key is empty"));
        }
        if iv.len() != IV_LEN {
            return Err(EnvelopeError::malformed("initialization vector length"));
        }
        if tag.len() != TAG_LEN {
            return Err(EnvelopeError::malformed("authentication tag length"));
        }

        Ok(Self {
            protected: parts[0].to_string(),
            header,
            encrypted_key,
            iv,
            ciphertext,
            tag,
        })
    }

    /// Rejects envelopes not using RSA-OAEP-256 key wrapping with A256GCM
    /// content encryption.
    pub fn check_algorithms(&self) -> Result<(), EnvelopeError> {
        if self.header.alg != "RSA-OAEP-256" {
            return Err(EnvelopeError::UnsupportedAlgorithm {
                algorithm: self.header.alg.clone(),
            });
        }
        if self.header.enc != "A256GCM" {
            return Err(EnvelopeError::UnsupportedAlgorithm {
                algorithm: self.header.enc.clone(),
            });
        }
        Ok(())
    }

    /// Returns the wrapped content encryption key.
    #[must_use]
    pub fn encrypted_key(&self) -> &[u8] {
        &self.encrypted_key
    }

    /// Returns the decoded protected header.
    #[must_use]
    pub fn header(&self) -> &EnvelopeHeader {
        &self.header
    }

    /// Decrypts the content with the recovered content key. The base64url
    /// protected header is the additional authenticated data, so any header
    /// tampering fails the tag check.
    pub fn decrypt_content(&self, cek: &[u8]) -> Result<Vec<u8>, EnvelopeError> {
        if cek.len() != CEK_LEN {
            return Err(EnvelopeError::DecryptionFailed {
                aliases_exhausted: false,
            });
        }
        let cipher = Aes256Gcm::new_from_slice(cek).map_err(|_| {
            EnvelopeError::DecryptionFailed {
                aliases_exhausted: false,
            }
        })?;

        let mut msg = Vec::with_capacity(self.ciphertext.len() + self.tag.len());
        msg.extend_from_slice(&self.ciphertext);
        msg.extend_from_slice(&self.tag);

        cipher
            .decrypt(
                Nonce::from_slice(&self.iv),
                Payload {
                    msg: &msg,
                    aad: self.protected.as_bytes(),
                },
            )
            .map_err(|_| EnvelopeError::DecryptionFailed {
                aliases_exhausted: false,
            })
    }
}

fn decode_part(part: &str, what: &str) -> Result<Vec<u8>, EnvelopeError> {
    URL_SAFE_NO_PAD
        .decode(part)
        .map_err(|_| EnvelopeError::malformed(format!("{what} is not valid base64url")))
}
