//! Key-rotation aware envelope decryption.

use std::sync::Arc;

use super::envelope::CompactEnvelope;
use super::{EnvelopeError, KEY_ALIAS_CANDIDATES, KeyRef, KeyUnwrapper};
use crate::config::DecryptionConfig;
use crate::metrics::{ALL_ALIASES_UNAVAILABLE, MetricsSink};

/// Decrypts compact envelopes, trying rotation key candidates in order.
pub struct EnvelopeDecrypter {
    unwrapper: Arc<dyn KeyUnwrapper>,
    metrics: Arc<dyn MetricsSink>,
    config: DecryptionConfig,
}

impl EnvelopeDecrypter {
    /// Creates a decrypter over the given key service and metrics sink.
    #[must_use]
    pub fn new(
        unwrapper: Arc<dyn KeyUnwrapper>,
        metrics: Arc<dyn MetricsSink>,
        config: DecryptionConfig,
    ) -> Self {
        Self {
            unwrapper,
            metrics,
            config,
        }
    }

    /// Decrypts a compact envelope and returns the plaintext payload.
    ///
    /// Candidate failures are logged server-side only; the returned error
    /// never identifies which keys were tried.
    pub async fn decrypt(&self, compact: &str) -> Result<Vec<u8>, EnvelopeError> {
        let envelope = CompactEnvelope::parse(compact)?;
        envelope.check_algorithms()?;
        let cek = self.unwrap_cek(&envelope).await?;
        envelope.decrypt_content(&cek)
    }

    async fn unwrap_cek(&self, envelope: &CompactEnvelope) -> Result<Vec<u8>, EnvelopeError> {
        if !self.config.key_rotation_enabled {
            let key_id = self.config.legacy_key_id.clone().ok_or_else(|| {
                EnvelopeError::KeyConfiguration {
                    message: "key rotation disabled and no key id configured".to_string(),
                }
            })?;
            return self
                .try_candidate(&KeyRef::KeyId(key_id), envelope)
                .await
                .ok_or(EnvelopeError::DecryptionFailed {
                    aliases_exhausted: false,
                });
        }

        for alias in KEY_ALIAS_CANDIDATES {
            if let Some(cek) = self.try_candidate(&KeyRef::Alias(alias), envelope).await {
                return Ok(cek);
            }
        }

        // Exhaustion is counted exactly once, before any legacy fallback.
        self.metrics.increment(ALL_ALIASES_UNAVAILABLE);

        if self.config.legacy_key_fallback_enabled {
            if let Some(key_id) = &self.config.legacy_key_id {
                let key_ref = KeyRef::KeyId(key_id.clone());
                if let Some(cek) = self.try_candidate(&key_ref, envelope).await {
                    return Ok(cek);
                }
            }
        }

        Err(EnvelopeError::DecryptionFailed {
            aliases_exhausted: true,
        })
    }

    async fn try_candidate(
        &self,
        key_ref: &KeyRef,
        envelope: &CompactEnvelope,
    ) -> Option<Vec<u8>> {
        match self.unwrapper.unwrap(key_ref, envelope.encrypted_key()).await {
            Ok(cek) => Some(cek),
            Err(err) => {
                tracing::warn!(
                    candidate = key_ref.name(),
                    error = %err,
                    "decryption key candidate failed"
                );
                None
            }
        }
    }
}
