//! Authorization endpoint logic.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::{AuditContext, AuditEventType, AuditSink};
use crate::config::IssuerConfig;
use crate::error::IssuerError;
use crate::metrics::{AUTHORIZATION_SENT, MetricsSink};
use crate::session::SessionService;

/// Query parameters of an authorization request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationRequest {
    pub client_id: String,
    pub redirect_uri: String,
    pub response_type: String,
    pub scope: String,
    pub state: String,
}

/// A value nested one level deep, matching the response wire shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WrappedValue {
    pub value: String,
}

/// Successful authorization response handed back to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationSuccessResponse {
    #[serde(rename = "authorizationCode")]
    pub authorization_code: WrappedValue,
    #[serde(rename = "redirectionURI")]
    pub redirection_uri: String,
    pub state: WrappedValue,
}

/// Produces authorization responses for sessions whose evidence journey
/// has completed.
pub struct AuthorizationService {
    sessions: Arc<SessionService>,
    audit: Arc<dyn AuditSink>,
    metrics: Arc<dyn MetricsSink>,
    config: IssuerConfig,
}

impl AuthorizationService {
    /// Creates an authorization service over the given collaborators.
    #[must_use]
    pub fn new(
        sessions: Arc<SessionService>,
        audit: Arc<dyn AuditSink>,
        metrics: Arc<dyn MetricsSink>,
        config: IssuerConfig,
    ) -> Self {
        Self {
            sessions,
            audit,
            metrics,
            config,
        }
    }

    /// Validates the request against the session and hands back the
    /// session's authorization code.
    ///
    /// A session whose code has not been issued yet is denied access, not
    /// treated as a server fault: the evidence journey simply has not
    /// completed.
    pub async fn authorize(
        &self,
        session_id: Uuid,
        request: &AuthorizationRequest,
    ) -> Result<AuthorizationSuccessResponse, IssuerError> {
        let session = self.sessions.get_session(session_id).await?;

        if request.response_type != "code" {
            return Err(IssuerError::session_validation(format!(
                "unsupported response_type '{}'",
                request.response_type
            )));
        }
        if !request
            .scope
            .split_whitespace()
            .any(|s| s == self.config.required_scope)
        {
            return Err(IssuerError::session_validation(format!(
                "scope does not include '{}'",
                self.config.required_scope
            )));
        }
        if request.client_id != session.client_id {
            return Err(IssuerError::session_validation(
                "client_id does not match session",
            ));
        }

        let code = session
            .authorization_code
            .as_deref()
            .filter(|code| !code.is_empty())
            .ok_or_else(|| IssuerError::access_denied("authorization code not yet issued"))?
            .to_string();

        self.audit
            .publish(
                AuditEventType::AuthorizationSent,
                &AuditContext::for_session(&session),
            )
            .await?;
        self.metrics.increment(AUTHORIZATION_SENT);

        Ok(AuthorizationSuccessResponse {
            authorization_code: WrappedValue { value: code },
            redirection_uri: request.redirect_uri.clone(),
            state: WrappedValue {
                value: request.state.clone(),
            },
        })
    }
}
