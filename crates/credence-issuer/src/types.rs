//! Protocol data types.
//!
//! These are the durable and wire-adjacent shapes shared across the
//! validator, the session service, and the endpoint logic.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

/// Raw body of a session creation request, before any validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSessionRequest {
    /// Client id asserted by the caller, outside the envelope.
    pub client_id: String,
    /// Compact encrypted envelope carrying the signed request JWT.
    pub request: String,
}

/// A fully validated session request, extracted from the signed JWT inside
/// the envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRequest {
    /// Client id from the outer request body.
    pub client_id: String,
    /// Client id claimed inside the JWT.
    pub jwt_client_id: String,
    /// `iss` claim.
    pub issuer: String,
    /// `aud` claim.
    pub audience: String,
    /// `sub` claim.
    pub subject: String,
    /// `nbf` claim, seconds since the epoch.
    pub not_before: Option<i64>,
    /// `exp` claim, seconds since the epoch.
    pub expiry: Option<i64>,
    /// Redirect URI the client will use for the callback leg.
    pub redirect_uri: Option<String>,
    /// `response_type` claim; `code` for this grant.
    pub response_type: Option<String>,
    /// Opaque CSRF state supplied by the client.
    pub state: Option<String>,
    /// Cross-journey session id carried through from the caller.
    pub persistent_session_id: Option<String>,
    /// Per-journey id used to correlate audit events.
    pub client_session_id: Option<String>,
    /// Free-form journey context hint.
    pub context: Option<String>,
    /// Identity claims shared by the calling service.
    pub shared_claims: Option<SharedClaims>,
    /// Evidence scoring requirements requested by the caller.
    pub evidence_requested: Option<EvidenceRequest>,
}

/// Identity claims handed over at session creation.
///
/// The known sensitive members must be arrays when present; their element
/// structure belongs to the credential schema, not the protocol core.
/// Unknown members are carried through untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SharedClaims {
    /// Name entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Vec<Value>>,
    /// Birth date entries.
    #[serde(rename = "birthDate", skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<Vec<Value>>,
    /// Address entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Vec<Value>>,
    /// Any further claim members.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Evidence scoring requirements. All fields are optional; unknown keys in
/// the input are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceRequest {
    #[serde(rename = "scoringPolicy", skip_serializing_if = "Option::is_none")]
    pub scoring_policy: Option<String>,
    #[serde(rename = "strengthScore", skip_serializing_if = "Option::is_none")]
    pub strength_score: Option<u32>,
    #[serde(rename = "validityScore", skip_serializing_if = "Option::is_none")]
    pub validity_score: Option<u32>,
    #[serde(rename = "verificationScore", skip_serializing_if = "Option::is_none")]
    pub verification_score: Option<u32>,
    #[serde(
        rename = "activityHistoryScore",
        skip_serializing_if = "Option::is_none"
    )]
    pub activity_history_score: Option<u32>,
    #[serde(
        rename = "identityFraudScore",
        skip_serializing_if = "Option::is_none"
    )]
    pub identity_fraud_score: Option<u32>,
}

/// A durable session record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique session id.
    pub session_id: Uuid,
    /// Owning client id.
    pub client_id: String,
    /// Subject the session was created for.
    pub subject: String,
    /// CSRF state echoed back on the authorization leg.
    pub state: Option<String>,
    /// Redirect URI pinned at session creation.
    pub redirect_uri: Option<String>,
    /// Creation instant.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Session expiry instant.
    #[serde(with = "time::serde::rfc3339")]
    pub expiry: OffsetDateTime,
    /// Single-use authorization code, if issued.
    pub authorization_code: Option<String>,
    /// Expiry of the authorization code.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub authorization_code_expiry: Option<OffsetDateTime>,
    /// Bearer access token, once the code has been exchanged.
    pub access_token: Option<String>,
    /// Instant of the token exchange.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub access_token_exchanged_at: Option<OffsetDateTime>,
    /// Expiry of the access token.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub access_token_expiry: Option<OffsetDateTime>,
    /// Per-journey correlation id.
    pub client_session_id: Option<String>,
    /// Cross-journey session id.
    pub persistent_session_id: Option<String>,
    /// Journey context hint.
    pub context: Option<String>,
    /// Evidence scoring requirements, if requested.
    pub evidence_requested: Option<EvidenceRequest>,
    /// Number of evidence attempts made in this session.
    pub attempt_count: u32,
}

impl Session {
    /// Returns `true` if the session has passed its expiry at `now`.
    #[must_use]
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        now > self.expiry
    }

    /// Returns `true` if the authorization code has passed its expiry at
    /// `now`. A session without a code expiry is treated as expired.
    #[must_use]
    pub fn is_authorization_code_expired(&self, now: OffsetDateTime) -> bool {
        match self.authorization_code_expiry {
            Some(expiry) => now > expiry,
            None => true,
        }
    }
}

/// An opaque bearer access token issued on exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BearerAccessToken {
    /// The token value.
    pub access_token: String,
    /// Always `Bearer`.
    pub token_type: String,
    /// Lifetime in seconds.
    pub expires_in: u64,
}

impl BearerAccessToken {
    /// Creates a bearer token wrapper with the given value and lifetime.
    #[must_use]
    pub fn new(access_token: String, expires_in: u64) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}

/// Registered authentication material for a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientAuthConfig {
    /// Registered redirect URI, compared by exact string equality.
    pub redirect_uri: Option<String>,
    /// Audience the client's JWTs must target.
    pub audience: String,
    /// Issuer the client's JWTs must carry.
    pub issuer: String,
    /// JWS algorithm the client signs with, e.g. `ES256`.
    pub signing_algorithm: String,
    /// PEM-encoded public signing key.
    pub public_signing_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn session_at(expiry: OffsetDateTime) -> Session {
        Session {
            session_id: Uuid::new_v4(),
            client_id: "ipv-core".to_string(),
            subject: "urn:fdc:gov.uk:2022:subject".to_string(),
            state: Some("state-1".to_string()),
            redirect_uri: Some("https://example.com/callback".to_string()),
            created_at: datetime!(2024-06-01 12:00 UTC),
            expiry,
            authorization_code: None,
            authorization_code_expiry: None,
            access_token: None,
            access_token_exchanged_at: None,
            access_token_expiry: None,
            client_session_id: None,
            persistent_session_id: None,
            context: None,
            evidence_requested: None,
            attempt_count: 0,
        }
    }

    #[test]
    fn session_expiry_is_strict() {
        let expiry = datetime!(2024-06-01 13:00 UTC);
        let session = session_at(expiry);
        assert!(!session.is_expired(expiry));
        assert!(session.is_expired(expiry + time::Duration::seconds(1)));
    }

    #[test]
    fn missing_code_expiry_counts_as_expired() {
        let session = session_at(datetime!(2024-06-01 13:00 UTC));
        assert!(session.is_authorization_code_expired(datetime!(2024-06-01 12:01 UTC)));
    }

    #[test]
    fn evidence_request_ignores_unknown_keys() {
        let parsed: EvidenceRequest = serde_json::from_value(serde_json::json!({
            "scoringPolicy": "gpg45",
            "strengthScore": 2,
            "somethingNew": true,
        }))
        .unwrap();
        assert_eq!(parsed.scoring_policy.as_deref(), Some("gpg45"));
        assert_eq!(parsed.strength_score, Some(2));
        assert_eq!(parsed.validity_score, None);
    }

    #[test]
    fn shared_claims_carry_unknown_members() {
        let parsed: SharedClaims = serde_json::from_value(serde_json::json!({
            "name": [{"nameParts": []}],
            "socialSecurityRecord": [{"personalNumber": "123"}],
        }))
        .unwrap();
        assert!(parsed.name.is_some());
        assert!(parsed.extra.contains_key("socialSecurityRecord"));
    }

    #[test]
    fn bearer_token_shape() {
        let token = BearerAccessToken::new("abc".to_string(), 3600);
        let json = serde_json::to_value(&token).unwrap();
        assert_eq!(json["token_type"], "Bearer");
        assert_eq!(json["expires_in"], 3600);
    }
}
