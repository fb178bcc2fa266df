//! Counter metrics seam.
//!
//! The protocol core records a small fixed set of counters. The sink trait
//! keeps the metrics backend out of this crate; the default implementation
//! emits counters as structured tracing events.

/// Counter incremented when every decryption key candidate has failed.
pub const ALL_ALIASES_UNAVAILABLE: &str = "all_aliases_unavailable_for_decryption";

/// Counter incremented when an authorization response is produced.
pub const AUTHORIZATION_SENT: &str = "authorization_sent";

/// Counter incremented when an access token is issued.
pub const ACCESS_TOKEN_ISSUED: &str = "accesstoken";

/// Counter incremented when a token exchange fails for any reason.
pub const ACCESS_TOKEN_EXCHANGE_FAILED: &str = "accesstoken_failure";

/// Counter incremented when a client assertion fails signature verification.
pub const TOKEN_SIGNATURE_VALIDATION_FAILED: &str = "token_signature_validation_failed";

/// A sink for counter increments.
pub trait MetricsSink: Send + Sync {
    /// Increments the named counter by one.
    fn increment(&self, name: &str);
}

/// Default sink that surfaces counters as tracing events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMetrics;

impl MetricsSink for TracingMetrics {
    fn increment(&self, name: &str) {
        tracing::info!(counter = name, "metric incremented");
    }
}
