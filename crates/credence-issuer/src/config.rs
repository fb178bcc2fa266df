//! Issuer configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level configuration for the issuer protocol core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IssuerConfig {
    /// Session lifetime from creation.
    #[serde(with = "humantime_serde")]
    pub session_ttl: Duration,

    /// Authorization code lifetime from issuance.
    #[serde(with = "humantime_serde")]
    pub authorization_code_ttl: Duration,

    /// Access token lifetime from exchange.
    #[serde(with = "humantime_serde")]
    pub access_token_ttl: Duration,

    /// Scope value the authorization request must carry.
    pub required_scope: String,

    /// Top-level claim names treated as sensitive by the claim parser.
    /// An empty list redacts everything.
    pub sensitive_claim_fields: Vec<String>,

    /// Envelope decryption settings.
    pub decryption: DecryptionConfig,
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            session_ttl: Duration::from_secs(3600),
            authorization_code_ttl: Duration::from_secs(600),
            access_token_ttl: Duration::from_secs(3600),
            required_scope: "openid".to_string(),
            sensitive_claim_fields: default_sensitive_fields(),
            decryption: DecryptionConfig::default(),
        }
    }
}

/// Default sensitive top-level claim names.
#[must_use]
pub fn default_sensitive_fields() -> Vec<String> {
    vec![
        "name".to_string(),
        "birthDate".to_string(),
        "address".to_string(),
    ]
}

/// Key-rotation behaviour of the envelope decrypter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecryptionConfig {
    /// When `true`, try the ordered key aliases before giving up.
    pub key_rotation_enabled: bool,

    /// When `true`, after alias exhaustion fall back once to
    /// `legacy_key_id`.
    pub legacy_key_fallback_enabled: bool,

    /// Key id used when rotation is disabled, and as the legacy fallback
    /// when it is enabled.
    pub legacy_key_id: Option<String>,
}

impl Default for DecryptionConfig {
    fn default() -> Self {
        Self {
            key_rotation_enabled: true,
            legacy_key_fallback_enabled: false,
            legacy_key_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = IssuerConfig::default();
        assert_eq!(config.session_ttl, Duration::from_secs(3600));
        assert_eq!(config.authorization_code_ttl, Duration::from_secs(600));
        assert_eq!(config.required_scope, "openid");
        assert_eq!(
            config.sensitive_claim_fields,
            vec!["name", "birthDate", "address"]
        );
        assert!(config.decryption.key_rotation_enabled);
        assert!(!config.decryption.legacy_key_fallback_enabled);
    }

    #[test]
    fn test_humantime_durations() {
        let config: IssuerConfig = serde_json::from_value(serde_json::json!({
            "session_ttl": "30m",
            "authorization_code_ttl": "5m",
        }))
        .unwrap();
        assert_eq!(config.session_ttl, Duration::from_secs(1800));
        assert_eq!(config.authorization_code_ttl, Duration::from_secs(300));
        // Unspecified fields keep their defaults.
        assert_eq!(config.access_token_ttl, Duration::from_secs(3600));
    }
}
