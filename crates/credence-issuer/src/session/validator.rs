//! Session request validation.
//!
//! Turns a raw encrypted session request into a validated [`SessionRequest`]:
//! decrypt, resolve the client registration, verify the signature, extract
//! and pin the claims, and parse shared claims through the redacting parser.

use std::sync::Arc;

use serde_json::Value;

use crate::config::IssuerConfig;
use crate::crypto::{EnvelopeDecrypter, EnvelopeError};
use crate::error::IssuerError;
use crate::jwt::{SignatureVerifier, SignedJwt};
use crate::pii::parse_redacted;
use crate::storage::ClientConfigProvider;
use crate::types::{ClientAuthConfig, RawSessionRequest, SessionRequest};

/// Validates raw session requests.
pub struct SessionRequestValidator {
    decrypter: EnvelopeDecrypter,
    clients: Arc<dyn ClientConfigProvider>,
    verifier: Arc<dyn SignatureVerifier>,
    config: IssuerConfig,
}

impl SessionRequestValidator {
    /// Creates a validator over the given collaborators.
    #[must_use]
    pub fn new(
        decrypter: EnvelopeDecrypter,
        clients: Arc<dyn ClientConfigProvider>,
        verifier: Arc<dyn SignatureVerifier>,
        config: IssuerConfig,
    ) -> Self {
        Self {
            decrypter,
            clients,
            verifier,
            config,
        }
    }

    /// Runs the full validation pipeline.
    pub async fn validate(&self, raw: &RawSessionRequest) -> Result<SessionRequest, IssuerError> {
        if raw.client_id.is_empty() || raw.request.is_empty() {
            return Err(IssuerError::session_validation(
                "could not parse request body",
            ));
        }

        let plaintext = self
            .decrypter
            .decrypt(&raw.request)
            .await
            .map_err(map_envelope_error)?;
        let compact = String::from_utf8(plaintext).map_err(|_| {
            IssuerError::session_validation("decrypted payload is not valid UTF-8")
        })?;
        let jwt = SignedJwt::parse(&compact)?;

        let client_config = self
            .clients
            .client_auth_config(&raw.client_id)
            .await?
            .ok_or_else(|| {
                IssuerError::client_configuration(format!(
                    "no registration found for client '{}'",
                    raw.client_id
                ))
            })?;

        self.verifier.verify(&jwt, &client_config)?;

        let request = self.extract_claims(&raw.client_id, &jwt)?;
        pin_redirect_uri(&request, &client_config)?;
        Ok(request)
    }

    fn extract_claims(
        &self,
        outer_client_id: &str,
        jwt: &SignedJwt,
    ) -> Result<SessionRequest, IssuerError> {
        let issuer = required_str(jwt, "iss")?;
        let audience = required_str(jwt, "aud")?;
        let subject = required_str(jwt, "sub")?;

        let jwt_client_id = jwt
            .claim_str("client_id")
            .unwrap_or(outer_client_id)
            .to_string();
        if jwt_client_id != outer_client_id {
            return Err(IssuerError::session_validation(
                "client id in request JWT does not match request client id",
            ));
        }

        let shared_claims = match jwt.claims().get("shared_claims") {
            Some(raw) => Some(
                parse_redacted(raw, &self.config.sensitive_claim_fields)
                    .map_err(|err| IssuerError::session_validation(err.to_string()))?,
            ),
            None => None,
        };

        let evidence_requested = match jwt.claims().get("evidence_requested") {
            Some(raw) => Some(serde_json::from_value(raw.clone()).map_err(|_| {
                IssuerError::session_validation("evidence_requested is malformed")
            })?),
            None => None,
        };

        Ok(SessionRequest {
            client_id: outer_client_id.to_string(),
            jwt_client_id,
            issuer,
            audience,
            subject,
            not_before: jwt.claim_i64("nbf"),
            expiry: jwt.claim_i64("exp"),
            redirect_uri: optional_str(jwt.claims(), "redirect_uri"),
            response_type: optional_str(jwt.claims(), "response_type"),
            state: optional_str(jwt.claims(), "state"),
            persistent_session_id: optional_str(jwt.claims(), "persistent_session_id"),
            client_session_id: optional_str(jwt.claims(), "govuk_signin_journey_id"),
            context: optional_str(jwt.claims(), "context"),
            shared_claims,
            evidence_requested,
        })
    }
}

/// Registered and requested redirect URIs must match by exact string
/// equality; both absent counts as a match.
fn pin_redirect_uri(
    request: &SessionRequest,
    client_config: &ClientAuthConfig,
) -> Result<(), IssuerError> {
    if request.redirect_uri != client_config.redirect_uri {
        return Err(IssuerError::session_validation(format!(
            "redirect URI '{}' does not match registered URI '{}'",
            request.redirect_uri.as_deref().unwrap_or("<none>"),
            client_config.redirect_uri.as_deref().unwrap_or("<none>"),
        )));
    }
    Ok(())
}

fn map_envelope_error(err: EnvelopeError) -> IssuerError {
    match err {
        EnvelopeError::KeyConfiguration { message } => IssuerError::internal(message),
        other => IssuerError::session_validation(other.to_string()),
    }
}

fn required_str(jwt: &SignedJwt, name: &str) -> Result<String, IssuerError> {
    jwt.claim_str(name)
        .map(str::to_string)
        .ok_or_else(|| IssuerError::session_validation(format!("missing required claim '{name}'")))
}

fn optional_str(claims: &Value, name: &str) -> Option<String> {
    claims.get(name).and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::crypto::test_support::seal;
    use crate::crypto::{KeyRef, KeyUnwrapError, KeyUnwrapper};
    use crate::jwt::test_support::{AcceptAllVerifier, RejectAllVerifier, fake_jws};
    use crate::metrics::TracingMetrics;
    use crate::storage::test_support::StaticClients;

    struct FixedKeyUnwrapper {
        cek: Vec<u8>,
    }

    #[async_trait]
    impl KeyUnwrapper for FixedKeyUnwrapper {
        async fn unwrap(
            &self,
            _key_ref: &KeyRef,
            _wrapped: &[u8],
        ) -> Result<Vec<u8>, KeyUnwrapError> {
            Ok(self.cek.clone())
        }
    }

    fn registered_client(redirect_uri: Option<&str>) -> ClientAuthConfig {
        ClientAuthConfig {
            redirect_uri: redirect_uri.map(str::to_string),
            audience: "https://credence.example".to_string(),
            issuer: "ipv-core".to_string(),
            signing_algorithm: "ES256".to_string(),
            public_signing_key: String::new(),
        }
    }

    fn validator(
        cek: Vec<u8>,
        client: Option<ClientAuthConfig>,
        verifier: Arc<dyn SignatureVerifier>,
    ) -> SessionRequestValidator {
        let decrypter = EnvelopeDecrypter::new(
            Arc::new(FixedKeyUnwrapper { cek }),
            Arc::new(TracingMetrics),
            crate::config::DecryptionConfig::default(),
        );
        SessionRequestValidator::new(
            decrypter,
            Arc::new(StaticClients { config: client }),
            verifier,
            IssuerConfig::default(),
        )
    }

    fn request_claims() -> serde_json::Value {
        json!({
            "iss": "ipv-core",
            "aud": "https://credence.example",
            "sub": "urn:fdc:gov.uk:2022:subject",
            "client_id": "ipv-core",
            "redirect_uri": "https://example.com/callback",
            "response_type": "code",
            "state": "state-1",
            "govuk_signin_journey_id": "journey-1",
            "shared_claims": {
                "name": [{ "nameParts": [{ "type": "GivenName", "value": "Jane" }] }],
                "birthDate": [{ "value": "1990-01-01" }],
            },
        })
    }

    fn sealed_request(claims: &serde_json::Value) -> (RawSessionRequest, Vec<u8>) {
        let (compact, cek) = seal(fake_jws(claims).as_bytes());
        (
            RawSessionRequest {
                client_id: "ipv-core".to_string(),
                request: compact,
            },
            cek,
        )
    }

    #[tokio::test]
    async fn validates_a_complete_request() {
        let (raw, cek) = sealed_request(&request_claims());
        let v = validator(
            cek,
            Some(registered_client(Some("https://example.com/callback"))),
            Arc::new(AcceptAllVerifier),
        );

        let request = v.validate(&raw).await.unwrap();
        assert_eq!(request.client_id, "ipv-core");
        assert_eq!(request.subject, "urn:fdc:gov.uk:2022:subject");
        assert_eq!(request.state.as_deref(), Some("state-1"));
        assert_eq!(request.client_session_id.as_deref(), Some("journey-1"));
        assert!(request.shared_claims.is_some());
    }

    #[tokio::test]
    async fn empty_body_fields_fail_early() {
        let v = validator(
            vec![7u8; 32],
            Some(registered_client(None)),
            Arc::new(AcceptAllVerifier),
        );
        let raw = RawSessionRequest {
            client_id: String::new(),
            request: "x".to_string(),
        };
        let err = v.validate(&raw).await.unwrap_err();
        assert_eq!(err.to_string(), "Session validation failed: could not parse request body");
    }

    #[tokio::test]
    async fn garbage_envelope_is_a_validation_error() {
        let v = validator(
            vec![7u8; 32],
            Some(registered_client(None)),
            Arc::new(AcceptAllVerifier),
        );
        let raw = RawSessionRequest {
            client_id: "ipv-core".to_string(),
            request: "not.an.envelope".to_string(),
        };
        let err = v.validate(&raw).await.unwrap_err();
        assert!(matches!(err, IssuerError::SessionValidation { .. }));
    }

    #[tokio::test]
    async fn unknown_client_is_a_configuration_error() {
        let (raw, cek) = sealed_request(&request_claims());
        let v = validator(cek, None, Arc::new(AcceptAllVerifier));
        let err = v.validate(&raw).await.unwrap_err();
        assert!(matches!(err, IssuerError::ClientConfiguration { .. }));
        assert_eq!(err.http_status(), 500);
    }

    #[tokio::test]
    async fn bad_signature_is_a_validation_error() {
        let (raw, cek) = sealed_request(&request_claims());
        let v = validator(
            cek,
            Some(registered_client(Some("https://example.com/callback"))),
            Arc::new(RejectAllVerifier),
        );
        let err = v.validate(&raw).await.unwrap_err();
        assert!(matches!(err, IssuerError::SessionValidation { .. }));
    }

    #[tokio::test]
    async fn redirect_uri_mismatch_is_rejected() {
        let (raw, cek) = sealed_request(&request_claims());
        let v = validator(
            cek,
            Some(registered_client(Some("https://other.example/cb"))),
            Arc::new(AcceptAllVerifier),
        );
        let err = v.validate(&raw).await.unwrap_err();
        assert!(err.to_string().contains("does not match registered URI"));
    }

    #[tokio::test]
    async fn absent_redirect_uri_on_both_sides_matches() {
        let mut claims = request_claims();
        claims.as_object_mut().unwrap().remove("redirect_uri");
        let (raw, cek) = sealed_request(&claims);
        let v = validator(
            cek,
            Some(registered_client(None)),
            Arc::new(AcceptAllVerifier),
        );
        let request = v.validate(&raw).await.unwrap();
        assert_eq!(request.redirect_uri, None);
    }

    #[tokio::test]
    async fn absent_request_uri_against_registered_uri_mismatches() {
        let mut claims = request_claims();
        claims.as_object_mut().unwrap().remove("redirect_uri");
        let (raw, cek) = sealed_request(&claims);
        let v = validator(
            cek,
            Some(registered_client(Some("https://example.com/callback"))),
            Arc::new(AcceptAllVerifier),
        );
        assert!(v.validate(&raw).await.is_err());
    }

    #[tokio::test]
    async fn client_id_mismatch_is_rejected() {
        let mut claims = request_claims();
        claims["client_id"] = json!("someone-else");
        let (raw, cek) = sealed_request(&claims);
        let v = validator(
            cek,
            Some(registered_client(Some("https://example.com/callback"))),
            Arc::new(AcceptAllVerifier),
        );
        let err = v.validate(&raw).await.unwrap_err();
        assert!(matches!(err, IssuerError::SessionValidation { .. }));
    }

    #[tokio::test]
    async fn missing_required_claim_is_rejected() {
        let mut claims = request_claims();
        claims.as_object_mut().unwrap().remove("sub");
        let (raw, cek) = sealed_request(&claims);
        let v = validator(
            cek,
            Some(registered_client(Some("https://example.com/callback"))),
            Arc::new(AcceptAllVerifier),
        );
        let err = v.validate(&raw).await.unwrap_err();
        assert!(err.to_string().contains("missing required claim 'sub'"));
    }

    #[tokio::test]
    async fn malformed_shared_claims_error_is_redacted() {
        let mut claims = request_claims();
        // `name` must be an array; a bare string fails deserialization.
        claims["shared_claims"] = json!({ "name": "Jane Secret", "journey": "j-1" });
        let (raw, cek) = sealed_request(&claims);
        let v = validator(
            cek,
            Some(registered_client(Some("https://example.com/callback"))),
            Arc::new(AcceptAllVerifier),
        );
        let err = v.validate(&raw).await.unwrap_err();
        let text = err.to_string();
        assert!(!text.contains("Jane Secret"));
        assert!(text.contains("******"));
        assert!(text.contains("j-1"));
    }

    #[tokio::test]
    async fn evidence_requested_parses_permissively() {
        let mut claims = request_claims();
        claims["evidence_requested"] = json!({
            "scoringPolicy": "gpg45",
            "strengthScore": 2,
            "futureField": "ignored",
        });
        let (raw, cek) = sealed_request(&claims);
        let v = validator(
            cek,
            Some(registered_client(Some("https://example.com/callback"))),
            Arc::new(AcceptAllVerifier),
        );
        let request = v.validate(&raw).await.unwrap();
        let evidence = request.evidence_requested.unwrap();
        assert_eq!(evidence.scoring_policy.as_deref(), Some("gpg45"));
        assert_eq!(evidence.strength_score, Some(2));
        assert_eq!(evidence.verification_score, None);
    }
}
