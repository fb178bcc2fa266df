//! Token exchange endpoint logic.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::audit::{AuditContext, AuditEventType, AuditSink};
use crate::error::IssuerError;
use crate::jwt::{SignatureVerifier, SignedJwt};
use crate::metrics::{
    ACCESS_TOKEN_EXCHANGE_FAILED, ACCESS_TOKEN_ISSUED, MetricsSink,
    TOKEN_SIGNATURE_VALIDATION_FAILED,
};
use crate::session::SessionService;
use crate::storage::ClientConfigProvider;
use crate::types::{BearerAccessToken, Session};

use super::{AUTHORIZATION_CODE_GRANT, JWT_BEARER_ASSERTION_TYPE};

/// Form body of a token request. Fields are optional so that shape
/// validation, not deserialization, produces the protocol error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenRequest {
    pub grant_type: Option<String>,
    pub code: Option<String>,
    pub redirect_uri: Option<String>,
    pub client_assertion_type: Option<String>,
    pub client_assertion: Option<String>,
}

/// Exchanges single-use authorization codes for bearer access tokens.
pub struct TokenService {
    sessions: Arc<SessionService>,
    clients: Arc<dyn ClientConfigProvider>,
    verifier: Arc<dyn SignatureVerifier>,
    audit: Arc<dyn AuditSink>,
    metrics: Arc<dyn MetricsSink>,
}

impl TokenService {
    /// Creates a token service over the given collaborators.
    #[must_use]
    pub fn new(
        sessions: Arc<SessionService>,
        clients: Arc<dyn ClientConfigProvider>,
        verifier: Arc<dyn SignatureVerifier>,
        audit: Arc<dyn AuditSink>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            sessions,
            clients,
            verifier,
            audit,
            metrics,
        }
    }

    /// Runs the full exchange: shape validation, code lookup, client
    /// assertion verification, redirect pinning, and single-use token
    /// issuance. Every rejected exchange records the failure counter.
    pub async fn exchange(&self, request: &TokenRequest) -> Result<BearerAccessToken, IssuerError> {
        match self.try_exchange(request).await {
            Ok(token) => Ok(token),
            Err(err) => {
                self.metrics.increment(ACCESS_TOKEN_EXCHANGE_FAILED);
                Err(err)
            }
        }
    }

    async fn try_exchange(
        &self,
        request: &TokenRequest,
    ) -> Result<BearerAccessToken, IssuerError> {
        let (code, redirect_uri, assertion) = validate_shape(request)?;

        let session = self.sessions.get_session_by_authorization_code(code).await?;

        self.verify_client_assertion(&session, assertion).await?;

        // The session pins whatever the original request carried; absent on
        // both sides is a match.
        if redirect_uri != session.redirect_uri.as_deref() {
            return Err(IssuerError::token_validation(
                "redirect_uri does not match session",
            ));
        }

        let token = self.sessions.issue_access_token(&session).await?;

        self.audit
            .publish(
                AuditEventType::AccessTokenIssued,
                &AuditContext::for_session(&session),
            )
            .await?;
        self.metrics.increment(ACCESS_TOKEN_ISSUED);

        tracing::info!(
            session_id = %session.session_id,
            client_id = %session.client_id,
            "access token issued"
        );
        Ok(token)
    }

    async fn verify_client_assertion(
        &self,
        session: &Session,
        assertion: &str,
    ) -> Result<(), IssuerError> {
        let jwt = SignedJwt::parse(assertion)
            .map_err(|_| IssuerError::token_validation("client_assertion is not a valid JWT"))?;

        // The assertion is verified against the key registered for the
        // session's owning client, not any id claimed in the assertion.
        let client_config = self
            .clients
            .client_auth_config(&session.client_id)
            .await?
            .ok_or_else(|| {
                IssuerError::client_configuration(format!(
                    "no registration found for client '{}'",
                    session.client_id
                ))
            })?;

        if self.verifier.verify(&jwt, &client_config).is_err() {
            self.metrics.increment(TOKEN_SIGNATURE_VALIDATION_FAILED);
            return Err(IssuerError::token_validation(
                "client assertion signature verification failed",
            ));
        }
        Ok(())
    }
}

fn validate_shape(request: &TokenRequest) -> Result<(&str, Option<&str>, &str), IssuerError> {
    match request.grant_type.as_deref() {
        Some(AUTHORIZATION_CODE_GRANT) => {}
        Some(other) => {
            return Err(IssuerError::token_validation(format!(
                "unsupported grant_type '{other}'"
            )));
        }
        None => return Err(IssuerError::token_validation("grant_type is required")),
    }

    match request.client_assertion_type.as_deref() {
        Some(JWT_BEARER_ASSERTION_TYPE) => {}
        _ => {
            return Err(IssuerError::token_validation(
                "client_assertion_type must be the JWT bearer assertion type",
            ));
        }
    }

    let code = non_empty(request.code.as_deref())
        .ok_or_else(|| IssuerError::token_validation("code is required"))?;
    let assertion = non_empty(request.client_assertion.as_deref())
        .ok_or_else(|| IssuerError::token_validation("client_assertion is required"))?;

    // The redirect URI may legitimately be absent; the session comparison
    // decides whether that is acceptable.
    Ok((code, non_empty(request.redirect_uri.as_deref()), assertion))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
