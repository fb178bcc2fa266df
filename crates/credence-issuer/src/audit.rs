//! Audit event publication.
//!
//! Every lifecycle transition emits an audit event. Publication failures
//! propagate to the caller as errors: a transition that cannot be audited
//! must not be reported as a success.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::IssuerError;

/// Lifecycle events the issuer publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEventType {
    /// A session was created.
    Start,
    /// An authorization response was handed to the client.
    AuthorizationSent,
    /// An access token was issued in exchange for an authorization code.
    AccessTokenIssued,
}

/// Correlation material attached to every audit event. Never carries claim
/// values or token material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditContext {
    /// Session the event belongs to.
    pub session_id: Uuid,
    /// Owning client id.
    pub client_id: String,
    /// Per-journey correlation id, when the caller supplied one.
    pub client_session_id: Option<String>,
    /// Cross-journey session id, when the caller supplied one.
    pub persistent_session_id: Option<String>,
}

impl AuditContext {
    /// Builds an audit context from a session record.
    #[must_use]
    pub fn for_session(session: &crate::types::Session) -> Self {
        Self {
            session_id: session.session_id,
            client_id: session.client_id.clone(),
            client_session_id: session.client_session_id.clone(),
            persistent_session_id: session.persistent_session_id.clone(),
        }
    }
}

/// Destination for audit events.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Publishes one event. Failures must be returned, not swallowed.
    async fn publish(
        &self,
        event: AuditEventType,
        context: &AuditContext,
    ) -> Result<(), IssuerError>;
}

/// Sink that emits audit events as structured tracing records. Suitable for
/// development; production embedders supply their own sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn publish(
        &self,
        event: AuditEventType,
        context: &AuditContext,
    ) -> Result<(), IssuerError> {
        tracing::info!(
            event = ?event,
            session_id = %context.session_id,
            client_id = %context.client_id,
            client_session_id = context.client_session_id.as_deref(),
            "audit event"
        );
        Ok(())
    }
}
